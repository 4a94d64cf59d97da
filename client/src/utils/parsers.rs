use anchor_client::solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::schema::VoteOption;

pub fn parse_pubkey(s: &str) -> Result<Pubkey, String> {
    Pubkey::from_str(s).map_err(|e| format!("invalid pubkey: {e}"))
}

pub fn parse_vote_option(s: &str) -> Result<VoteOption, String> {
    VoteOption::from_str(s)
}

pub fn parse_log_type(s: &str) -> Result<LogType, String> {
    match s.to_lowercase().as_str() {
        "ballot-box" => Ok(LogType::BallotBox),
        "whitelist" => Ok(LogType::Whitelist),
        _ => Err(format!("invalid log type: {}", s)),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogType {
    BallotBox,
    Whitelist,
}
