pub mod api;
pub mod blockchain;
pub mod config;
pub mod node;
pub mod transaction;
mod util;
