use std::sync::Arc;

use anchor_client::solana_sdk::{
    pubkey::Pubkey, signature::Keypair, signer::Signer, transaction::Transaction,
};
use async_trait::async_trait;
use log::info;
use tokio::sync::watch;

use crate::error::VoteError;

/// What the client needs from a wallet: who is signing, and a signature on demand.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    fn identity(&self) -> Option<Pubkey>;

    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, VoteError>;
}

pub struct KeypairWallet {
    keypair: Keypair,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl WalletCapability for KeypairWallet {
    fn identity(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn sign_transaction(
        &self,
        mut transaction: Transaction,
    ) -> Result<Transaction, VoteError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| VoteError::SigningFailed(e.to_string()))?;
        Ok(transaction)
    }
}

/// Connection state published by a [WalletSession]. `generation` is bumped on
/// every disconnect, so a reconnect is never mistaken for the session it replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Pubkey>,
    pub generation: u64,
}

impl SessionState {
    /// True while `caller` is still connected within `generation`.
    pub fn is_current(&self, caller: &Pubkey, generation: u64) -> bool {
        self.identity.as_ref() == Some(caller) && self.generation == generation
    }
}

/// Tracks which identity is currently connected. Subscribers are woken on
/// every connect and disconnect.
#[derive(Clone)]
pub struct WalletSession {
    wallet: Arc<dyn WalletCapability>,
    active: Arc<watch::Sender<SessionState>>,
}

impl WalletSession {
    /// Creates a session that is connected to `wallet`'s identity, if it has one.
    pub fn new(wallet: Arc<dyn WalletCapability>) -> Self {
        let (active, _) = watch::channel(SessionState {
            identity: wallet.identity(),
            generation: 0,
        });
        Self {
            wallet,
            active: Arc::new(active),
        }
    }

    pub fn wallet(&self) -> &dyn WalletCapability {
        self.wallet.as_ref()
    }

    pub fn identity(&self) -> Option<Pubkey> {
        self.active.borrow().identity
    }

    pub fn state(&self) -> SessionState {
        *self.active.borrow()
    }

    pub fn connect(&self) -> Option<Pubkey> {
        let identity = self.wallet.identity();
        info!("Wallet connected: {:?}", identity);
        self.active.send_modify(|state| state.identity = identity);
        identity
    }

    pub fn disconnect(&self) {
        self.active.send_if_modified(|state| match state.identity.take() {
            Some(previous) => {
                state.generation += 1;
                info!("Wallet disconnected: {}", previous);
                true
            }
            None => false,
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.active.subscribe()
    }
}
