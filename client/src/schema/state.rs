use anchor_lang::prelude::*;
use std::{fmt, str::FromStr};

#[account]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BallotBox {
    /// Votes cast for the left option
    pub left_votes: u64,
    /// Votes cast for the right option
    pub right_votes: u64,
}

impl BallotBox {
    pub const LEN: usize = 8 + 8 + 8;

    pub fn total_votes(&self) -> u64 {
        self.left_votes.saturating_add(self.right_votes)
    }
}

/// Grants voting eligibility to `target`. Only its existence matters.
#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct WhitelistRecord {
    /// Authority that created the entry
    pub authority: Pubkey,
    /// Wallet allowed to vote
    pub target: Pubkey,
}

impl WhitelistRecord {
    pub const LEN: usize = 8 + 32 + 32;
}

#[derive(Debug, AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteOption {
    Left,
    Right,
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteOption::Left => write!(f, "left"),
            VoteOption::Right => write!(f, "right"),
        }
    }
}

impl FromStr for VoteOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(VoteOption::Left),
            "right" => Ok(VoteOption::Right),
            _ => Err(format!("invalid vote option: {}", s)),
        }
    }
}

/// Client-side view of a [BallotBox] as observed at `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallotTally {
    pub left_votes: u64,
    pub right_votes: u64,
    /// Lamport balance of the ballot box account
    pub balance: u64,
    /// Ledger slot the values were read at
    pub slot: u64,
}

impl BallotTally {
    pub fn new(ballot_box: &BallotBox, balance: u64, slot: u64) -> Self {
        Self {
            left_votes: ballot_box.left_votes,
            right_votes: ballot_box.right_votes,
            balance,
            slot,
        }
    }

    pub fn total_votes(&self) -> u64 {
        self.left_votes.saturating_add(self.right_votes)
    }

    /// True when `self` may replace `cached` without moving any counter backwards.
    pub fn supersedes(&self, cached: &BallotTally) -> bool {
        self.slot >= cached.slot
            && self.left_votes >= cached.left_votes
            && self.right_votes >= cached.right_votes
    }
}
