use crate::transaction::Transaction;
use crate::util::{now_nanos, sha256_hex};

use super::GENESIS_PREVIOUS_HASH;

/// A single block in the chain holding an ordered list of transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub timestamp: i64, // nanoseconds since the Unix epoch
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub nonce: u64,   // Proof-of-Work nonce
    pub hash: String, // Cached hash of the block
}

impl Block {
    /// Create a new block (not mined yet). Call `mine()` to perform PoW.
    pub fn new(transactions: Vec<Transaction>, previous_hash: String) -> Self {
        Self::with_timestamp(now_nanos(), transactions, previous_hash)
    }

    /// Create the genesis block. Timestamp is fixed at 0 so identically
    /// configured nodes agree on the genesis hash.
    pub fn genesis(transactions: Vec<Transaction>) -> Self {
        Self::with_timestamp(0, transactions, GENESIS_PREVIOUS_HASH.to_string())
    }

    pub fn with_timestamp(
        timestamp: i64,
        transactions: Vec<Transaction>,
        previous_hash: String,
    ) -> Self {
        let mut block = Self {
            timestamp,
            transactions,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.calculate_hash();
        block
    }

    pub fn transactions_to_string(&self) -> String {
        self.transactions.iter().map(|t| format!("{t}, ")).collect()
    }

    pub fn id_value_string(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.timestamp,
            self.transactions_to_string(),
            self.previous_hash,
            self.nonce
        )
    }

    /// SHA-256 over timestamp, transactions, previous hash and nonce
    /// (excluding the `hash` field itself).
    pub fn calculate_hash(&self) -> String {
        sha256_hex(&self.id_value_string())
    }

    /// Perform Proof-of-Work by finding a nonce that yields a hash
    /// starting with `difficulty` leading zeros (in hex).
    pub fn mine(&mut self, difficulty: u32) {
        self.mine_until(difficulty, || false);
    }

    /// Like `mine`, but polls `cancelled` between nonce increments.
    /// Returns `false` if mining was abandoned before a solution was found.
    pub fn mine_until<F>(&mut self, difficulty: u32, mut cancelled: F) -> bool
    where
        F: FnMut() -> bool,
    {
        let target_prefix = "0".repeat(difficulty as usize);
        while !self.hash.starts_with(&target_prefix) {
            if cancelled() {
                return false;
            }
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = self.calculate_hash();
        }
        true
    }

    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        self.hash.len() >= difficulty as usize
            && self
                .hash
                .chars()
                .take(difficulty as usize)
                .all(|c| c == '0')
    }

    /// Validate that the block's cached `hash` matches its content and
    /// satisfies the PoW difficulty. (Does NOT validate chain linkage.)
    pub fn is_valid(&self, difficulty: u32) -> bool {
        self.hash == self.calculate_hash() && self.meets_difficulty(difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::transaction::{Input, Output, OutputMode, Transaction};
    use crate::util::sha256_hex;

    fn sample_tx() -> Transaction {
        Transaction::new(
            vec![Input::new(Output::new("addr", 2))],
            vec![Output::new("addr", 1)],
        )
    }

    #[test]
    fn hash_follows_field_order() {
        let tx = Transaction::at(vec![], vec![Output::at("a", 1, OutputMode::Normal, 1)], 1);
        let b = Block::with_timestamp(1234567890, vec![tx.clone()], "prev".into());
        let expected = sha256_hex(&format!("1234567890, {tx}, , prev, 0"));
        assert_eq!(b.hash, expected);
        assert_eq!(b.calculate_hash(), expected);
    }

    #[test]
    fn genesis_uses_sentinel() {
        let b = Block::genesis(vec![]);
        assert_eq!(b.previous_hash, "0000");
        assert_eq!(b.nonce, 0);
        assert_eq!(b.hash, b.calculate_hash());
        assert_eq!(b, Block::genesis(vec![]));
    }

    #[test]
    fn hash_is_stable_across_calls() {
        let b = Block::new(vec![sample_tx()], "prev".into());
        let first = b.calculate_hash();
        for _ in 0..5 {
            assert_eq!(first, b.calculate_hash());
        }
        assert_eq!(first, b.hash);
    }

    #[test]
    fn mining_produces_leading_zeros() {
        for difficulty in 0..=3u32 {
            let mut b = Block::new(vec![sample_tx()], "prev".into());
            b.mine(difficulty);
            assert!(b.hash.starts_with(&"0".repeat(difficulty as usize)));
            assert!(b.is_valid(difficulty));
        }
    }

    #[test]
    fn cancelled_mining_stops_early() {
        let mut b = Block::new(vec![sample_tx()], "prev".into());
        // 64 leading zeros is unreachable in practice
        let mut polls = 0;
        let finished = b.mine_until(64, || {
            polls += 1;
            polls > 10
        });
        assert!(!finished);
        assert_eq!(b.nonce, 10);
        assert_eq!(b.hash, b.calculate_hash());
    }

    #[test]
    fn invalid_when_mutated() {
        let mut b = Block::new(vec![sample_tx()], "prev".into());
        b.mine(2);
        let old_hash = b.hash.clone();

        // Mutate: add a new tx (tampering)
        b.transactions.push(sample_tx());

        assert_ne!(old_hash, b.calculate_hash());
        assert!(!b.is_valid(2));
    }

    #[test]
    fn nonce_change_is_detected() {
        let mut b = Block::new(vec![], "prev".into());
        b.mine(1);
        b.nonce += 1;
        assert_ne!(b.hash, b.calculate_hash());
    }
}
