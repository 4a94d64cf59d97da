//! Instruction arguments for the votesol program.
//!
//! Discriminators are the first 8 bytes of `sha256("global:<name>")`.

use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, InstructionData};

use super::state::VoteOption;

pub trait LedgerInstruction: InstructionData {
    const NAME: &'static str;
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct CreateBallot {}

impl Discriminator for CreateBallot {
    const DISCRIMINATOR: &'static [u8] = &[143, 185, 213, 35, 169, 149, 14, 28];
}

impl InstructionData for CreateBallot {}

impl LedgerInstruction for CreateBallot {
    const NAME: &'static str = "create_ballot";
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct CreateWhitelist {
    pub target: Pubkey,
}

impl Discriminator for CreateWhitelist {
    const DISCRIMINATOR: &'static [u8] = &[89, 182, 231, 206, 68, 173, 60, 6];
}

impl InstructionData for CreateWhitelist {}

impl LedgerInstruction for CreateWhitelist {
    const NAME: &'static str = "create_whitelist";
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct Vote {
    pub vote_option: VoteOption,
}

impl Discriminator for Vote {
    const DISCRIMINATOR: &'static [u8] = &[227, 110, 155, 23, 136, 126, 172, 25];
}

impl InstructionData for Vote {}

impl LedgerInstruction for Vote {
    const NAME: &'static str = "vote";
}
