use anchor_client::{
    solana_client::nonblocking::rpc_client::RpcClient,
    solana_sdk::{
        commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
        transaction::Transaction,
    },
};
use async_trait::async_trait;
use log::debug;

use crate::error::VoteError;

/// Raw account contents together with the slot they were observed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAccount {
    pub slot: u64,
    pub lamports: u64,
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

/// The channel used to read ledger state and broadcast transactions.
/// Timeouts surface as [VoteError::NetworkError].
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Returns `None` when no account exists at `address`.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<FetchedAccount>, VoteError>;

    async fn latest_blockhash(&self) -> Result<Hash, VoteError>;

    /// Broadcasts `transaction` and waits until the ledger finalizes or rejects it.
    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, VoteError>;
}

pub struct RpcTransport {
    rpc: RpcClient,
}

impl RpcTransport {
    pub fn new(rpc_url: String, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(rpc_url, commitment),
        }
    }
}

#[async_trait]
impl LedgerTransport for RpcTransport {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<FetchedAccount>, VoteError> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await?;
        let slot = response.context.slot;
        debug!("Fetched {} at slot {}", address, slot);

        Ok(response.value.map(|account| FetchedAccount {
            slot,
            lamports: account.lamports,
            owner: account.owner,
            data: account.data,
        }))
    }

    async fn latest_blockhash(&self) -> Result<Hash, VoteError> {
        Ok(self.rpc.get_latest_blockhash().await?)
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, VoteError> {
        Ok(self.rpc.send_and_confirm_transaction(transaction).await?)
    }
}
