use thiserror::Error;

use crate::transaction::TransactionError;

/// Why a block was refused by the ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("transaction {id} is invalid: {source}")]
    InvalidTransaction {
        id: String,
        source: TransactionError,
    },

    #[error("transaction {0} is no longer pending")]
    NotPending(String),

    #[error("output {0} is consumed more than once in the block")]
    DoubleSpendInBlock(String),

    #[error("previous hash {found} does not match chain tip {expected}")]
    BrokenLinkage { expected: String, found: String },

    #[error("stored hash {0} does not match the block contents")]
    HashMismatch(String),

    #[error("hash {hash} does not meet difficulty {difficulty}")]
    InsufficientWork { hash: String, difficulty: u32 },
}
