pub mod accounts;
pub mod instruction;
pub mod state;

pub use instruction::LedgerInstruction;
pub use state::*;
