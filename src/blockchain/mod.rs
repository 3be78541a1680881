pub mod block;
pub mod error;
pub mod model;
pub mod payload;

pub use block::Block;
pub use error::LedgerError;
pub use model::{GenesisAllocation, Ledger};
pub use payload::{BlockPayload, TransactionPayload};

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0000";
