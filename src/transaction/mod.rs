pub mod input;
pub mod model;
pub mod output;
pub mod utxo;

pub use input::Input;
pub use model::{Transaction, TransactionError};
pub use output::{Output, OutputMode};
pub use utxo::{OutputPool, Spender, UtxoView};
