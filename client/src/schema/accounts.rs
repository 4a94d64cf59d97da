//! Account lists for the votesol instructions, in the order the program expects.

use anchor_lang::prelude::*;

pub struct CreateBallot {
    pub authority: Pubkey,
    pub ballot_box: Pubkey,
    pub system_program: Pubkey,
}

impl ToAccountMetas for CreateBallot {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.authority, true),
            AccountMeta::new(self.ballot_box, false),
            AccountMeta::new_readonly(self.system_program, false),
        ]
    }
}

pub struct CreateWhitelist {
    pub authority: Pubkey,
    pub whitelist: Pubkey,
    pub system_program: Pubkey,
}

impl ToAccountMetas for CreateWhitelist {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.authority, true),
            AccountMeta::new(self.whitelist, false),
            AccountMeta::new_readonly(self.system_program, false),
        ]
    }
}

pub struct Vote {
    pub ballot_box: Pubkey,
    pub authority: Pubkey,
    pub system_program: Pubkey,
}

impl ToAccountMetas for Vote {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.ballot_box, false),
            AccountMeta::new(self.authority, true),
            AccountMeta::new_readonly(self.system_program, false),
        ]
    }
}
