use anchor_client::{
    solana_client::client_error::ClientError as RpcClientError, solana_sdk::pubkey::Pubkey,
};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoteError {
    #[error("Address derivation exhausted every bump seed")]
    DerivationExhausted,
    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),
    #[error("Failed to decode account {address}: {reason}")]
    DecodeError { address: Pubkey, reason: String },
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),
    #[error("Caller is not whitelisted")]
    NotWhitelisted,
    #[error("A vote for this caller is already in flight")]
    AlreadyInFlight,
    #[error("Wallet not connected")]
    WalletNotConnected,
    #[error("Wallet refused to sign: {0}")]
    SigningFailed(String),
}

impl VoteError {
    /// Only transport failures are safe to retry; everything else is a
    /// deliberate outcome from the ledger, the wallet or the coordinator.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VoteError::NetworkError(_))
    }

    pub fn decode(address: Pubkey, reason: impl ToString) -> Self {
        VoteError::DecodeError {
            address,
            reason: reason.to_string(),
        }
    }
}

impl From<RpcClientError> for VoteError {
    fn from(err: RpcClientError) -> Self {
        match err.get_transaction_error() {
            Some(tx_err) => VoteError::TransactionRejected(tx_err.to_string()),
            None => VoteError::NetworkError(err.to_string()),
        }
    }
}
