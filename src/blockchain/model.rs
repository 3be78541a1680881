use log::{debug, info, warn};
use std::collections::HashSet;

use super::{Block, BlockPayload, DEFAULT_DIFFICULTY, LedgerError};
use crate::transaction::{Output, OutputMode, OutputPool, Spender, Transaction, UtxoView};

/// Coinbase output placed in the genesis block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisAllocation {
    pub address: String,
    pub amount: i64,
}

/// In-memory ledger: the chain, the pending transactions and the outputs
/// they offered since the last block.
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    transactions: Vec<Transaction>,
    transaction_output_pool: OutputPool,
    difficulty: u32,
    genesis_allocation: Option<GenesisAllocation>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_difficulty(DEFAULT_DIFFICULTY)
    }

    pub fn with_difficulty(difficulty: u32) -> Self {
        Self::with_genesis(difficulty, None)
    }

    /// Initialize a ledger whose genesis block optionally funds one address.
    pub fn with_genesis(difficulty: u32, genesis_allocation: Option<GenesisAllocation>) -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            transactions: Vec::new(),
            transaction_output_pool: OutputPool::new(),
            difficulty,
            genesis_allocation,
        };
        ledger.create_genesis_block();
        ledger
    }

    /// Reset to a single genesis block. Drops the chain and both pools.
    pub fn create_genesis_block(&mut self) -> &Block {
        let transactions = match &self.genesis_allocation {
            Some(alloc) => vec![Transaction::at(
                vec![],
                vec![Output::at(
                    alloc.address.clone(),
                    alloc.amount,
                    OutputMode::Normal,
                    0,
                )],
                0,
            )],
            None => Vec::new(),
        };
        self.chain = vec![Block::genesis(transactions)];
        self.transactions.clear();
        self.transaction_output_pool.clear();
        info!("genesis block created (hash={})", self.chain[0].hash);
        &self.chain[0]
    }

    pub fn genesis_block(&self) -> &Block {
        &self.chain[0]
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Ledger should always have at least the genesis block")
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction_output_pool(&self) -> &OutputPool {
        &self.transaction_output_pool
    }

    /// Queue `tx` and offer its outputs. Does not validate:
    /// callers check `tx.is_valid(ledger)` first.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transaction_output_pool.add_tx_outputs(&tx);
        debug!(
            "transaction {} queued (pending={}, pool={})",
            tx.id(),
            self.transactions.len() + 1,
            self.transaction_output_pool.len()
        );
        self.transactions.push(tx);
    }

    /// Unmined block over the pending transactions, linked to the tip.
    pub fn candidate_block(&self) -> Block {
        Block::new(self.transactions.clone(), self.last_block().hash.clone())
    }

    /// Mine the pending transactions into a new block and append it.
    pub fn add_block(&mut self) -> &Block {
        let mut block = self.candidate_block();
        block.mine(self.difficulty);
        self.append(block)
    }

    /// Append a block mined elsewhere from `candidate_block()`.
    /// Fails if the tip moved, the seal does not hold or one of its
    /// transactions has left the pending pool (e.g. across a reset).
    pub fn commit_mined_block(&mut self, block: Block) -> Result<&Block, LedgerError> {
        self.check_seal(&block)?;
        for tx in &block.transactions {
            if !self.transactions.iter().any(|t| t.id() == tx.id()) {
                return Err(LedgerError::NotPending(tx.id().to_string()));
            }
        }
        Ok(self.append(block))
    }

    pub fn block_by_hash(&self, hash: &str) -> Option<&Block> {
        self.chain.iter().find(|b| b.hash == hash)
    }

    /// Resolve an output id against the chain first, then the pool.
    pub fn transaction_output(&self, id: &str) -> Option<&Output> {
        self.chain
            .iter()
            .flat_map(|b| b.transactions.iter())
            .flat_map(|t| t.outputs().iter())
            .find(|o| o.id() == id)
            .or_else(|| self.transaction_output_pool.get(id))
    }

    /// Received minus spent for `address` over mined and pending transactions.
    pub fn balance(&self, address: &str) -> i64 {
        let mut balance: i128 = 0;
        let all = self
            .chain
            .iter()
            .flat_map(|b| b.transactions.iter())
            .chain(self.transactions.iter());

        for tx in all {
            for output in tx.outputs() {
                if output.address() == address {
                    balance += i128::from(output.amount());
                }
            }
            for input in tx.inputs() {
                let spent = input.transaction_output();
                if spent.address() == address {
                    balance -= i128::from(spent.amount());
                }
            }
        }

        i64::try_from(balance).unwrap_or(if balance < 0 { i64::MIN } else { i64::MAX })
    }

    /// Validate the chain: every block after genesis must hash to its
    /// stored hash and point at its predecessor.
    pub fn is_valid_chain(&self) -> bool {
        self.chain.windows(2).all(|pair| {
            let (previous, current) = (&pair[0], &pair[1]);
            current.hash == current.calculate_hash() && current.previous_hash == previous.hash
        })
    }

    /// Blocks from index `height` to the tip; empty past the tip.
    pub fn blocks_from_height(&self, height: usize) -> &[Block] {
        self.chain.get(height..).unwrap_or(&[])
    }

    /// Offer a block proposed by a peer. Returns whether it was appended.
    pub fn add_block_from_payload(&mut self, payload: BlockPayload) -> bool {
        match self.try_add_block_from_payload(payload) {
            Ok(_) => true,
            Err(e) => {
                warn!("remote block rejected: {e}");
                false
            }
        }
    }

    /// Rebuild and check a peer block against the current view.
    /// Nothing is mutated unless every check passes.
    pub fn try_add_block_from_payload(
        &mut self,
        payload: BlockPayload,
    ) -> Result<&Block, LedgerError> {
        let block = Block::from(payload);

        let mut consumed = HashSet::<&str>::new();
        for tx in &block.transactions {
            tx.validate(&*self)
                .map_err(|source| LedgerError::InvalidTransaction {
                    id: tx.id().to_string(),
                    source,
                })?;
            for input in tx.inputs() {
                let id = input.transaction_output().id();
                if !consumed.insert(id) {
                    return Err(LedgerError::DoubleSpendInBlock(id.to_string()));
                }
            }
        }

        self.check_seal(&block)?;
        Ok(self.append(block))
    }

    fn check_seal(&self, block: &Block) -> Result<(), LedgerError> {
        let tip = &self.last_block().hash;
        if &block.previous_hash != tip {
            return Err(LedgerError::BrokenLinkage {
                expected: tip.clone(),
                found: block.previous_hash.clone(),
            });
        }
        if block.is_valid(self.difficulty) {
            return Ok(());
        }
        if block.hash != block.calculate_hash() {
            return Err(LedgerError::HashMismatch(block.hash.clone()));
        }
        Err(LedgerError::InsufficientWork {
            hash: block.hash.clone(),
            difficulty: self.difficulty,
        })
    }

    /// Push `block` and drop the transactions it confirms, with their outputs.
    fn append(&mut self, block: Block) -> &Block {
        let included: HashSet<&str> = block.transactions.iter().map(|t| t.id()).collect();
        let before = self.transactions.len();

        let pool = &mut self.transaction_output_pool;
        self.transactions.retain(|t| {
            if included.contains(t.id()) {
                pool.remove_tx_outputs(t);
                false
            } else {
                true
            }
        });
        if !pool.is_empty() {
            for tx in &block.transactions {
                pool.remove_tx_outputs(tx);
            }
        }

        info!(
            "block #{} appended (hash={}, nonce={}, txs={}, pending {} -> {})",
            self.chain.len(),
            block.hash,
            block.nonce,
            block.transactions.len(),
            before,
            self.transactions.len()
        );
        self.chain.push(block);
        self.last_block()
    }
}

impl UtxoView for Ledger {
    fn transaction_output(&self, id: &str) -> Option<&Output> {
        Ledger::transaction_output(self, id)
    }

    fn spender_of(&self, output_id: &str) -> Option<Spender<'_>> {
        let consumes = |t: &&Transaction| {
            t.inputs()
                .iter()
                .any(|i| i.transaction_output().id() == output_id)
        };
        let mined = self
            .chain
            .iter()
            .flat_map(|b| b.transactions.iter())
            .find(consumes)
            .map(|t| Spender {
                transaction_id: t.id(),
                committed: true,
            });
        mined.or_else(|| {
            self.transactions.iter().find(consumes).map(|t| Spender {
                transaction_id: t.id(),
                committed: false,
            })
        })
    }
}
