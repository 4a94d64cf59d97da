use anchor_client::solana_sdk::pubkey::Pubkey;
use log::debug;

use crate::error::VoteError;

pub const BALLOT_BOX_SEED: &[u8] = b"ballot_box";
pub const WHITELIST_SEED: &[u8] = b"whitelist";

/// Finds the off-curve address for `seeds` under `program_id`, searching bump
/// seeds from 255 downwards. The result is a pure function of its inputs.
pub fn derive(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8), VoteError> {
    let (address, bump) = Pubkey::try_find_program_address(seeds, program_id)
        .ok_or(VoteError::DerivationExhausted)?;
    debug!("Derived {} (bump {}) under {}", address, bump, program_id);
    Ok((address, bump))
}

pub fn ballot_box_address(program_id: &Pubkey) -> Result<(Pubkey, u8), VoteError> {
    derive(&[BALLOT_BOX_SEED], program_id)
}

pub fn whitelist_address(
    program_id: &Pubkey,
    authority: &Pubkey,
    target: &Pubkey,
) -> Result<(Pubkey, u8), VoteError> {
    derive(
        &[WHITELIST_SEED, authority.as_ref(), target.as_ref()],
        program_id,
    )
}
