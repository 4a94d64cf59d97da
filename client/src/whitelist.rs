use anchor_client::solana_sdk::pubkey::Pubkey;
use log::debug;

use crate::{
    error::VoteError, pda::whitelist_address, program_client::ProgramClient,
    schema::WhitelistRecord,
};

/// Decides whether a caller may vote, based on the existence of a whitelist
/// record created by `authority` for that caller.
#[derive(Debug, Clone)]
pub struct WhitelistGate {
    authority: Pubkey,
}

impl WhitelistGate {
    pub fn new(authority: Pubkey) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> Pubkey {
        self.authority
    }

    /// A missing record means "not eligible". Every other failure is returned
    /// as an error so it is never mistaken for a denial.
    pub async fn check_eligible(
        &self,
        caller: &Pubkey,
        client: &ProgramClient,
    ) -> Result<bool, VoteError> {
        let (address, _) = whitelist_address(&client.program_id(), &self.authority, caller)?;

        match client.fetch_account::<WhitelistRecord>(&address).await {
            Ok(account) => {
                let record = account.record;
                if record.authority != self.authority || record.target != *caller {
                    return Err(VoteError::decode(
                        address,
                        format!(
                            "whitelist entry is for ({}, {})",
                            record.authority, record.target
                        ),
                    ));
                }
                debug!("{} is whitelisted by {}", caller, self.authority);
                Ok(true)
            }
            Err(VoteError::AccountNotFound(_)) => {
                debug!("{} is not whitelisted by {}", caller, self.authority);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
