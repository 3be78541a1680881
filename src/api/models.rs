use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::sync::atomic::AtomicU64;

use crate::blockchain::{BlockPayload, Ledger, TransactionPayload};
use crate::config::Config;
use crate::node::Node;

/// Shared application state: one ledger behind a single-writer lock,
/// plus the peers mined blocks are pushed to.
pub struct AppState {
    pub ledger: RwLock<Ledger>,
    pub peers: Vec<Node>,
    pub http: reqwest::Client,
    /// Bumped under the ledger write lock on every change of the chain tip;
    /// in-flight mining aborts when it moves.
    pub tip_generation: AtomicU64,
}

impl AppState {
    pub fn new(ledger: Ledger, peers: Vec<Node>, http: reqwest::Client) -> Self {
        Self {
            ledger: RwLock::new(ledger),
            peers,
            http,
            tip_generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.peer_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::new(
            Ledger::with_genesis(config.difficulty, config.genesis.clone()),
            config.peers.clone(),
            http,
        )
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub difficulty: u32,
    pub chain: Vec<BlockPayload>,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub mined_index: usize,
    pub hash: String,
    pub nonce: u64,
    pub difficulty: u32,
    pub transactions: usize,
    pub elapsed_ms: u128,
}

/* ---------- TX API Models ---------- */

/// Spend the output with `output_id`, optionally signed.
#[derive(Deserialize)]
pub struct TxInputRequest {
    pub output_id: String,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Deserialize)]
pub struct TxOutputRequest {
    pub address: String,
    pub amount: i64,
}

#[derive(Deserialize)]
pub struct NewTxRequest {
    pub inputs: Vec<TxInputRequest>,
    pub outputs: Vec<TxOutputRequest>,
    /// Attach a fee output for the leftover amount, paid to this address.
    #[serde(default)]
    pub fee_address: Option<String>,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub transaction: TransactionPayload,
    pub fee: i64,
}

#[derive(Serialize)]
pub struct MempoolResponse {
    pub size: usize,
    pub utxo_pool_size: usize,
    pub transactions: Vec<String>, // list ids for brevity
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: i64,
}

/* ---------- Peer API Models ---------- */

#[derive(Serialize)]
pub struct IngestResponse {
    pub accepted: bool,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct PeersResponse {
    pub peers: Vec<Node>,
}
