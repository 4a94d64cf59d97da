use anchor_client::{
    solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey},
    Cluster,
};

/// Connection settings for a votesol client. Immutable once a session is built from it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// RPC endpoint of the ledger
    pub cluster: Cluster,
    /// Deployed votesol program
    pub program_id: Pubkey,
    /// Authority whose whitelist entries grant eligibility
    pub whitelist_authority: Pubkey,
    pub commitment: CommitmentConfig,
    /// Optional compute unit price prepended to every transaction
    pub micro_lamports: Option<u64>,
}

impl ClientConfig {
    pub fn new(cluster: Cluster, whitelist_authority: Pubkey) -> Self {
        Self {
            cluster,
            program_id: crate::ID,
            whitelist_authority,
            commitment: CommitmentConfig::confirmed(),
            micro_lamports: None,
        }
    }

    pub fn rpc_url(&self) -> &str {
        self.cluster.url()
    }
}
