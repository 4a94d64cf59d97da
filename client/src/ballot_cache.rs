use std::sync::{PoisonError, RwLock};

use log::{debug, warn};

use crate::{error::VoteError, program_client::ProgramClient, schema::BallotTally};

/// Local mirror of the remote ballot box. It is only ever written by
/// [BallotStateCache::refresh] and never moves backwards.
#[derive(Debug, Default)]
pub struct BallotStateCache {
    current: RwLock<Option<BallotTally>>,
}

impl BallotStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<BallotTally> {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-fetches the ballot box and returns the value held afterwards.
    pub async fn refresh(&self, client: &ProgramClient) -> Result<BallotTally, VoteError> {
        let fetched = client.fetch_ballot_box().await?;
        Ok(self.apply(fetched))
    }

    fn apply(&self, fetched: BallotTally) -> BallotTally {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        match *current {
            Some(cached) if !fetched.supersedes(&cached) => {
                warn!(
                    "Discarding stale ballot box read at slot {} (cached slot {})",
                    fetched.slot, cached.slot
                );
                cached
            }
            _ => {
                debug!(
                    "Ballot box at slot {}: left={} right={}",
                    fetched.slot, fetched.left_votes, fetched.right_votes
                );
                *current = Some(fetched);
                fetched
            }
        }
    }
}
