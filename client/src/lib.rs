#![allow(unexpected_cfgs)] // See: https://solana.stackexchange.com/a/19845

pub mod ballot_cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod pda;
pub mod program_client;
pub mod schema;
pub mod transport;
pub mod utils;
pub mod wallet;
pub mod whitelist;

use anchor_lang::declare_id;

pub use ballot_cache::*;
pub use config::*;
pub use coordinator::*;
pub use error::*;
pub use program_client::*;
pub use schema::*;
pub use transport::*;
pub use wallet::*;
pub use whitelist::*;

declare_id!("HWFFMkkxfV2xSpxytZQaEDP1QCYLKG71Vxt7bZ6zgFhK");
