use std::sync::Arc;

use anchor_client::{
    anchor_lang::{system_program, AccountDeserialize, ToAccountMetas},
    solana_sdk::{
        compute_budget::ComputeBudgetInstruction, instruction::Instruction, message::Message,
        pubkey::Pubkey, signature::Signature, transaction::Transaction,
    },
};
use log::{debug, info};

use crate::{
    config::ClientConfig,
    error::VoteError,
    pda::{ballot_box_address, whitelist_address},
    schema::{
        accounts, instruction, BallotBox, BallotTally, LedgerInstruction, VoteOption,
        WhitelistRecord,
    },
    transport::{LedgerTransport, RpcTransport},
    wallet::WalletCapability,
};

/// A decoded record together with the account metadata it was read with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedAccount<T> {
    pub slot: u64,
    pub lamports: u64,
    pub record: T,
}

/// Typed access to the votesol program over a [LedgerTransport].
#[derive(Clone)]
pub struct ProgramClient {
    transport: Arc<dyn LedgerTransport>,
    program_id: Pubkey,
    micro_lamports: Option<u64>,
}

impl ProgramClient {
    pub fn new(transport: Arc<dyn LedgerTransport>, program_id: Pubkey) -> Self {
        Self {
            transport,
            program_id,
            micro_lamports: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let transport = RpcTransport::new(config.rpc_url().to_string(), config.commitment);
        Self::new(Arc::new(transport), config.program_id).with_micro_lamports(config.micro_lamports)
    }

    pub fn with_micro_lamports(mut self, micro_lamports: Option<u64>) -> Self {
        self.micro_lamports = micro_lamports;
        self
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn ballot_box_address(&self) -> Result<Pubkey, VoteError> {
        Ok(ballot_box_address(&self.program_id)?.0)
    }

    pub async fn fetch_account<T: AccountDeserialize>(
        &self,
        address: &Pubkey,
    ) -> Result<TypedAccount<T>, VoteError> {
        let account = self
            .transport
            .get_account(address)
            .await?
            .ok_or(VoteError::AccountNotFound(*address))?;

        if account.owner != self.program_id {
            return Err(VoteError::decode(
                *address,
                format!("owned by {} instead of {}", account.owner, self.program_id),
            ));
        }

        let record = T::try_deserialize(&mut account.data.as_slice())
            .map_err(|e| VoteError::decode(*address, e))?;
        debug!("Decoded {} at slot {}", address, account.slot);

        Ok(TypedAccount {
            slot: account.slot,
            lamports: account.lamports,
            record,
        })
    }

    /// Fetches the singleton ballot box. A missing ballot box is a setup fault
    /// and is returned as [VoteError::AccountNotFound].
    pub async fn fetch_ballot_box(&self) -> Result<BallotTally, VoteError> {
        let address = self.ballot_box_address()?;
        let account = self.fetch_account::<BallotBox>(&address).await?;
        Ok(BallotTally::new(&account.record, account.lamports, account.slot))
    }

    pub async fn fetch_whitelist(
        &self,
        authority: &Pubkey,
        target: &Pubkey,
    ) -> Result<WhitelistRecord, VoteError> {
        let (address, _) = whitelist_address(&self.program_id, authority, target)?;
        Ok(self.fetch_account::<WhitelistRecord>(&address).await?.record)
    }

    /// Builds a transaction invoking `args` with `accounts`, has every wallet in
    /// `signers` sign it and blocks until the ledger confirms or rejects it.
    /// The first signer pays the fees.
    pub async fn submit_instruction<I: LedgerInstruction>(
        &self,
        args: I,
        accounts: impl ToAccountMetas,
        signers: &[&dyn WalletCapability],
    ) -> Result<Signature, VoteError> {
        let payer = signers
            .first()
            .and_then(|signer| signer.identity())
            .ok_or(VoteError::WalletNotConnected)?;

        let mut ixs = Vec::with_capacity(2);
        if let Some(lamports) = self.micro_lamports {
            ixs.push(ComputeBudgetInstruction::set_compute_unit_price(lamports));
        }
        ixs.push(Instruction {
            program_id: self.program_id,
            accounts: accounts.to_account_metas(None),
            data: args.data(),
        });

        let blockhash = self.transport.latest_blockhash().await?;
        let message = Message::new_with_blockhash(&ixs, Some(&payer), &blockhash);
        let mut tx = Transaction::new_unsigned(message);
        for signer in signers {
            tx = signer.sign_transaction(tx).await?;
        }
        if !tx.is_signed() {
            return Err(VoteError::SigningFailed(format!(
                "{} is missing required signatures",
                I::NAME
            )));
        }

        info!("Sending {} from {}", I::NAME, payer);
        let signature = self.transport.send_and_confirm(&tx).await?;
        info!("{} confirmed: {}", I::NAME, signature);
        Ok(signature)
    }

    pub async fn create_ballot(
        &self,
        signer: &dyn WalletCapability,
    ) -> Result<Signature, VoteError> {
        let authority = signer.identity().ok_or(VoteError::WalletNotConnected)?;
        self.submit_instruction(
            instruction::CreateBallot {},
            accounts::CreateBallot {
                authority,
                ballot_box: self.ballot_box_address()?,
                system_program: system_program::ID,
            },
            &[signer],
        )
        .await
    }

    pub async fn create_whitelist(
        &self,
        signer: &dyn WalletCapability,
        target: Pubkey,
    ) -> Result<Signature, VoteError> {
        let authority = signer.identity().ok_or(VoteError::WalletNotConnected)?;
        let (whitelist, _) = whitelist_address(&self.program_id, &authority, &target)?;
        self.submit_instruction(
            instruction::CreateWhitelist { target },
            accounts::CreateWhitelist {
                authority,
                whitelist,
                system_program: system_program::ID,
            },
            &[signer],
        )
        .await
    }

    pub async fn vote(
        &self,
        signer: &dyn WalletCapability,
        vote_option: VoteOption,
    ) -> Result<Signature, VoteError> {
        let authority = signer.identity().ok_or(VoteError::WalletNotConnected)?;
        self.submit_instruction(
            instruction::Vote { vote_option },
            accounts::Vote {
                ballot_box: self.ballot_box_address()?,
                authority,
                system_program: system_program::ID,
            },
            &[signer],
        )
        .await
    }
}
