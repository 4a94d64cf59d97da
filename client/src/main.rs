use anchor_client::{
    solana_sdk::{
        pubkey::Pubkey,
        signature::{read_keypair_file, Keypair},
        signer::Signer,
    },
    Cluster,
};
use anyhow::{anyhow, Result};
use clap::Parser;
use log::info;
use std::{path::PathBuf, str::FromStr, sync::Arc};
use tokio::runtime::Builder;
use votesol_client::{
    pda, utils::*, ClientConfig, KeypairWallet, ProgramClient, VoteCoordinator, VoteOption,
    WalletCapability, WhitelistGate,
};

#[derive(Clone, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, env)]
    pub keypair_path: Option<PathBuf>,

    #[arg(short, long, env, default_value = "https://api.devnet.solana.com")]
    pub rpc_url: String,

    #[arg(long, env, value_parser = parse_pubkey)]
    pub program_id: Option<Pubkey>,

    #[arg(long, env, value_parser = parse_pubkey, help = "Defaults to the keypair's pubkey")]
    pub whitelist_authority: Option<Pubkey>,

    #[arg(long, env)]
    pub micro_lamports: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    fn load_keypair(&self) -> Result<Keypair> {
        let path = self
            .keypair_path
            .as_ref()
            .ok_or_else(|| anyhow!("Missing --keypair-path argument"))?;
        read_keypair_file(path).map_err(|e| anyhow!("Failed to read keypair {:?}: {}", path, e))
    }

    fn config(&self, signer: Option<Pubkey>) -> Result<ClientConfig> {
        let cluster = Cluster::from_str(&self.rpc_url)
            .map_err(|e| anyhow!("Invalid rpc url {}: {}", self.rpc_url, e))?;
        let whitelist_authority = self
            .whitelist_authority
            .or(signer)
            .ok_or_else(|| anyhow!("Missing --whitelist-authority argument"))?;

        let mut config = ClientConfig::new(cluster, whitelist_authority);
        if let Some(program_id) = self.program_id {
            config.program_id = program_id;
        }
        config.micro_lamports = self.micro_lamports;
        Ok(config)
    }
}

#[derive(clap::Subcommand, Clone)]
pub enum Commands {
    Derive {
        #[arg(long = "seed", required = true, help = "UTF-8 seed, repeat in order")]
        seeds: Vec<String>,
    },
    CreateBallot {},
    CreateWhitelist {
        #[arg(long, value_parser = parse_pubkey, help = "Wallet to whitelist")]
        target: Pubkey,
    },
    Vote {
        #[arg(long, value_parser = parse_vote_option, help = "left | right")]
        option: VoteOption,
    },
    CheckEligible {
        #[arg(long, value_parser = parse_pubkey, help = "Defaults to the keypair's pubkey")]
        target: Option<Pubkey>,
    },
    Log {
        #[arg(long, value_parser = parse_log_type, help = "Account type: ballot-box | whitelist")]
        ty: LogType,

        #[arg(long, value_parser = parse_pubkey)]
        target: Option<Pubkey>,
    },
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(false)
        .try_init();

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let cli = Cli::parse();
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command.clone() {
        Commands::Derive { seeds } => {
            let program_id = cli.program_id.unwrap_or(votesol_client::ID);
            let seeds: Vec<&[u8]> = seeds.iter().map(|seed| seed.as_bytes()).collect();
            let (address, bump) = pda::derive(&seeds, &program_id)?;
            println!("Address: {}", address);
            println!("Bump: {}", bump);
        }
        Commands::Log { ty, target } => {
            let signer = cli.load_keypair().ok().map(|keypair| keypair.pubkey());
            let config = cli.config(signer)?;
            let client = ProgramClient::from_config(&config);

            match ty {
                LogType::BallotBox => {
                    let tally = client.fetch_ballot_box().await?;
                    println!("{:?}", tally);
                }
                LogType::Whitelist => {
                    let target = target.ok_or_else(|| anyhow!("Missing --target argument"))?;
                    let record = client
                        .fetch_whitelist(&config.whitelist_authority, &target)
                        .await?;
                    println!("{:?}", record);
                }
            }
        }
        Commands::CreateBallot {} => {
            info!("CreateBallot...");

            let wallet = KeypairWallet::new(cli.load_keypair()?);
            let config = cli.config(wallet.identity())?;
            let client = ProgramClient::from_config(&config);

            let tx = client.create_ballot(&wallet).await?;
            info!("Transaction sent: {}", tx);
        }
        Commands::CreateWhitelist { target } => {
            info!("CreateWhitelist...");

            let wallet = KeypairWallet::new(cli.load_keypair()?);
            let config = cli.config(wallet.identity())?;
            let client = ProgramClient::from_config(&config);

            let tx = client.create_whitelist(&wallet, target).await?;
            info!("Transaction sent: {}", tx);
        }
        Commands::Vote { option } => {
            let keypair = cli.load_keypair()?;
            let caller = keypair.pubkey();
            let config = cli.config(Some(caller))?;
            let coordinator =
                VoteCoordinator::from_config(&config, Arc::new(KeypairWallet::new(keypair)))?;

            let (signature, tally) = coordinator.cast_vote(caller, option).await.into_result()?;
            info!("Transaction sent: {}", signature);

            info!("== Voted {} ==", option);
            match tally {
                Some(tally) => {
                    info!("Left votes: {}", tally.left_votes);
                    info!("Right votes: {}", tally.right_votes);
                }
                None => info!("Ballot box could not be refreshed"),
            }
        }
        Commands::CheckEligible { target } => {
            let signer = cli.load_keypair().ok().map(|keypair| keypair.pubkey());
            let target = target
                .or(signer)
                .ok_or_else(|| anyhow!("Missing --target argument"))?;
            let config = cli.config(signer)?;
            let client = ProgramClient::from_config(&config);

            let gate = WhitelistGate::new(config.whitelist_authority);
            let eligible = gate.check_eligible(&target, &client).await?;
            println!("{} eligible: {}", target, eligible);
        }
    }
    Ok(())
}
