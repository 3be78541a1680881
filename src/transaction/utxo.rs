use std::collections::HashMap;

use super::model::Transaction;
use super::output::Output;

/// Output resolution oracle consulted by `Transaction::validate`.
pub trait UtxoView {
    /// Resolve an output id to the recorded output.
    fn transaction_output(&self, id: &str) -> Option<&Output>;

    /// Transaction whose inputs consume `output_id`, if any.
    fn spender_of(&self, output_id: &str) -> Option<Spender<'_>>;
}

/// A transaction consuming some output, and whether it is already mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spender<'a> {
    pub transaction_id: &'a str,
    pub committed: bool,
}

/// Outputs offered since the last block, keyed by output id.
/// Cleared whenever the transactions that produced them get mined.
#[derive(Debug, Default, Clone)]
pub struct OutputPool {
    map: HashMap<String, Output>,
}

impl OutputPool {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(&mut self, output: Output) {
        self.map.insert(output.id().to_string(), output);
    }

    pub fn remove(&mut self, id: &str) -> Option<Output> {
        self.map.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Output> {
        self.map.get(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Offer every output of `tx`.
    pub fn add_tx_outputs(&mut self, tx: &Transaction) {
        for out in tx.outputs() {
            self.insert(out.clone());
        }
    }

    /// Withdraw every output of `tx`.
    pub fn remove_tx_outputs(&mut self, tx: &Transaction) {
        for out in tx.outputs() {
            self.remove(out.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OutputPool;
    use crate::transaction::{Output, Transaction};

    #[test]
    fn adds_and_removes_transaction_outputs() {
        let tx = Transaction::new(vec![], vec![Output::new("a", 1), Output::new("b", 2)]);
        let mut pool = OutputPool::new();
        pool.add_tx_outputs(&tx);
        assert_eq!(pool.len(), 2);
        assert!(pool.get(tx.outputs()[0].id()).is_some());
        assert_eq!(pool.get(tx.outputs()[1].id()).map(Output::amount), Some(2));

        pool.remove_tx_outputs(&tx);
        assert!(pool.is_empty());
    }
}
