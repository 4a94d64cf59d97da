use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anchor_client::solana_sdk::{pubkey::Pubkey, signature::Signature};
use log::{debug, info, warn};
use tokio::sync::watch;

use crate::{
    ballot_cache::BallotStateCache,
    config::ClientConfig,
    error::VoteError,
    program_client::ProgramClient,
    schema::{BallotTally, VoteOption},
    wallet::{SessionState, WalletCapability, WalletSession},
    whitelist::WhitelistGate,
};

/// Progress of a vote request for one (caller, ballot box) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotePhase {
    Idle,
    Gating,
    Submitting,
    Refreshing,
    Completed,
    Rejected,
    Failed,
    Abandoned,
}

impl VotePhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            VotePhase::Completed | VotePhase::Rejected | VotePhase::Failed | VotePhase::Abandoned
        )
    }

    pub fn can_advance_to(self, next: VotePhase) -> bool {
        use VotePhase::*;
        match (self, next) {
            (Idle, Gating) => true,
            (from, Gating) => from.is_terminal(),
            (Gating, Submitting | Rejected | Failed | Abandoned) => true,
            (Submitting, Refreshing | Failed | Abandoned) => true,
            (Refreshing, Completed | Abandoned) => true,
            _ => false,
        }
    }
}

/// Terminal result of [VoteCoordinator::cast_vote].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote was confirmed. `tally` is `None` when the follow-up refresh
    /// could not be applied; the vote itself still landed.
    Completed {
        signature: Signature,
        tally: Option<BallotTally>,
    },
    /// Nothing was submitted: [VoteError::NotWhitelisted],
    /// [VoteError::AlreadyInFlight] or [VoteError::WalletNotConnected].
    Rejected(VoteError),
    Failed(VoteError),
    /// The wallet disconnected before the vote was confirmed.
    Abandoned,
}

impl VoteOutcome {
    pub fn phase(&self) -> VotePhase {
        match self {
            VoteOutcome::Completed { .. } => VotePhase::Completed,
            VoteOutcome::Rejected(_) => VotePhase::Rejected,
            VoteOutcome::Failed(_) => VotePhase::Failed,
            VoteOutcome::Abandoned => VotePhase::Abandoned,
        }
    }

    pub fn into_result(self) -> Result<(Signature, Option<BallotTally>), VoteError> {
        match self {
            VoteOutcome::Completed { signature, tally } => Ok((signature, tally)),
            VoteOutcome::Rejected(err) | VoteOutcome::Failed(err) => Err(err),
            VoteOutcome::Abandoned => Err(VoteError::WalletNotConnected),
        }
    }
}

impl fmt::Display for VoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteOutcome::Completed { signature, .. } => write!(f, "completed ({})", signature),
            VoteOutcome::Rejected(err) => write!(f, "rejected: {}", err),
            VoteOutcome::Failed(err) => write!(f, "failed: {}", err),
            VoteOutcome::Abandoned => write!(f, "abandoned"),
        }
    }
}

type FlightKey = (Pubkey, Pubkey);

#[derive(Debug, Default)]
struct FlightState {
    running: HashMap<FlightKey, VotePhase>,
    /// Most recent request to reach a terminal phase.
    last: Option<(FlightKey, VotePhase)>,
}

/// Phases of the requests in flight plus the last finished one. Finished
/// requests leave `running`, so it stays bounded by the requests in progress.
#[derive(Debug, Default)]
struct FlightRegistry {
    state: Mutex<FlightState>,
}

impl FlightRegistry {
    fn lock(&self) -> MutexGuard<'_, FlightState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn phase(&self, key: &FlightKey) -> VotePhase {
        let state = self.lock();
        match (state.running.get(key), state.last) {
            (Some(phase), _) => *phase,
            (None, Some((last, phase))) if last == *key => phase,
            _ => VotePhase::Idle,
        }
    }

    /// Claims `key` for a new request, or returns `None` while another request
    /// for the same key is still running.
    fn begin(&self, key: FlightKey) -> Option<Flight<'_>> {
        let mut state = self.lock();
        let current = state.running.get(&key).copied().unwrap_or(VotePhase::Idle);
        if !current.can_advance_to(VotePhase::Gating) {
            return None;
        }
        state.running.insert(key, VotePhase::Gating);
        Some(Flight {
            registry: self,
            key,
            phase: VotePhase::Gating,
        })
    }

    fn record(&self, key: FlightKey, phase: VotePhase) {
        let mut state = self.lock();
        if phase.is_terminal() {
            state.running.remove(&key);
            state.last = Some((key, phase));
        } else {
            state.running.insert(key, phase);
        }
    }

    #[cfg(test)]
    fn running(&self) -> usize {
        self.lock().running.len()
    }
}

/// Exclusive claim on a [FlightKey]. Dropping it before a terminal phase is
/// reached records the request as abandoned and frees the key.
struct Flight<'a> {
    registry: &'a FlightRegistry,
    key: FlightKey,
    phase: VotePhase,
}

impl Flight<'_> {
    fn advance(&mut self, next: VotePhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal vote transition {:?} -> {:?}",
            self.phase,
            next
        );
        debug!("Vote by {}: {:?} -> {:?}", self.key.0, self.phase, next);
        self.phase = next;
        self.registry.record(self.key, next);
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if !self.phase.is_terminal() {
            warn!("Vote by {} dropped while {:?}", self.key.0, self.phase);
            self.advance(VotePhase::Abandoned);
        }
    }
}

/// Runs `fut` unless `caller` disconnects first. A disconnect followed by a
/// reconnect still counts, since it starts a new session generation.
async fn while_connected<F: Future>(
    session: &mut watch::Receiver<SessionState>,
    caller: Pubkey,
    generation: u64,
    fut: F,
) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = session.wait_for(|state| !state.is_current(&caller, generation)) => None,
        output = fut => Some(output),
    }
}

/// Orchestrates gate check, vote submission and cache refresh for the
/// connected wallet.
pub struct VoteCoordinator {
    client: ProgramClient,
    gate: WhitelistGate,
    cache: Arc<BallotStateCache>,
    session: WalletSession,
    ballot_box: Pubkey,
    flights: FlightRegistry,
}

impl VoteCoordinator {
    pub fn new(
        client: ProgramClient,
        gate: WhitelistGate,
        session: WalletSession,
    ) -> Result<Self, VoteError> {
        let ballot_box = client.ballot_box_address()?;
        Ok(Self {
            client,
            gate,
            cache: Arc::new(BallotStateCache::new()),
            session,
            ballot_box,
            flights: FlightRegistry::default(),
        })
    }

    pub fn from_config(
        config: &ClientConfig,
        wallet: Arc<dyn WalletCapability>,
    ) -> Result<Self, VoteError> {
        Self::new(
            ProgramClient::from_config(config),
            WhitelistGate::new(config.whitelist_authority),
            WalletSession::new(wallet),
        )
    }

    pub fn client(&self) -> &ProgramClient {
        &self.client
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn cache(&self) -> Arc<BallotStateCache> {
        self.cache.clone()
    }

    pub fn phase(&self, caller: &Pubkey) -> VotePhase {
        self.flights.phase(&(*caller, self.ballot_box))
    }

    /// Casts `option` on behalf of `caller`, who must be the connected wallet.
    /// Only one request per caller runs at a time; a second one is rejected
    /// with [VoteError::AlreadyInFlight] without touching the ledger.
    pub async fn cast_vote(&self, caller: Pubkey, option: VoteOption) -> VoteOutcome {
        let mut session = self.session.subscribe();
        let entry = *session.borrow();
        if entry.identity != Some(caller) {
            warn!("Vote by {} refused: wallet not connected", caller);
            return VoteOutcome::Rejected(VoteError::WalletNotConnected);
        }

        let Some(mut flight) = self.flights.begin((caller, self.ballot_box)) else {
            debug!("Vote by {} ignored: already in flight", caller);
            return VoteOutcome::Rejected(VoteError::AlreadyInFlight);
        };

        let outcome = self.drive(&mut flight, &mut session, entry.generation, caller, option).await;
        flight.advance(outcome.phase());
        info!("Vote by {} for {}: {}", caller, option, outcome);
        outcome
    }

    async fn drive(
        &self,
        flight: &mut Flight<'_>,
        session: &mut watch::Receiver<SessionState>,
        generation: u64,
        caller: Pubkey,
        option: VoteOption,
    ) -> VoteOutcome {
        let eligibility = self.gate.check_eligible(&caller, &self.client);
        match while_connected(session, caller, generation, eligibility).await {
            None => return VoteOutcome::Abandoned,
            Some(Err(err)) => return VoteOutcome::Failed(err),
            Some(Ok(false)) => return VoteOutcome::Rejected(VoteError::NotWhitelisted),
            Some(Ok(true)) => {}
        }

        flight.advance(VotePhase::Submitting);
        let submission = self.client.vote(self.session.wallet(), option);
        let signature = match while_connected(session, caller, generation, submission).await {
            None => return VoteOutcome::Abandoned,
            Some(Err(err)) => return VoteOutcome::Failed(err),
            Some(Ok(signature)) => signature,
        };

        // Only refresh once the submission is confirmed.
        flight.advance(VotePhase::Refreshing);
        let refresh = self.cache.refresh(&self.client);
        let tally = match while_connected(session, caller, generation, refresh).await {
            None => {
                warn!("Wallet disconnected before refresh; cache left untouched");
                None
            }
            Some(Err(err)) => {
                warn!("Vote {} confirmed but refresh failed: {}", signature, err);
                None
            }
            Some(Ok(tally)) => Some(tally),
        };

        VoteOutcome::Completed { signature, tally }
    }
}
