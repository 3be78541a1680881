//! Wire records for blocks and their transactions.
//!
//! These are the shapes exchanged with peers and returned by the API.
//! Converting a record back into a domain value keeps every stored id,
//! time and hash as given; nothing is recomputed.

use serde::{Deserialize, Serialize};

use super::Block;
use crate::transaction::{Input, Output, OutputMode, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPayload {
    pub id: String,
    pub address: String,
    pub amount: i64,
    pub mode: OutputMode,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPayload {
    pub id: String,
    pub time: i64,
    pub signature: Option<String>,
    pub transaction_output: OutputPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPayload {
    pub id: String,
    pub time: i64,
    pub inputs: Vec<InputPayload>,
    pub outputs: Vec<OutputPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPayload {
    pub timestamp: i64,
    pub transactions: Vec<TransactionPayload>,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
}

impl From<&Output> for OutputPayload {
    fn from(out: &Output) -> Self {
        Self {
            id: out.id().to_string(),
            address: out.address().to_string(),
            amount: out.amount(),
            mode: out.mode(),
            time: out.time(),
        }
    }
}

impl From<OutputPayload> for Output {
    fn from(p: OutputPayload) -> Self {
        Output::from_parts(p.id, p.address, p.amount, p.mode, p.time)
    }
}

impl From<&Input> for InputPayload {
    fn from(input: &Input) -> Self {
        Self {
            id: input.id().to_string(),
            time: input.time(),
            signature: input.signature().map(str::to_string),
            transaction_output: input.transaction_output().into(),
        }
    }
}

impl From<InputPayload> for Input {
    fn from(p: InputPayload) -> Self {
        Input::from_parts(p.id, p.transaction_output.into(), p.signature, p.time)
    }
}

impl From<&Transaction> for TransactionPayload {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id().to_string(),
            time: tx.time(),
            inputs: tx.inputs().iter().map(InputPayload::from).collect(),
            outputs: tx.outputs().iter().map(OutputPayload::from).collect(),
        }
    }
}

impl From<TransactionPayload> for Transaction {
    fn from(p: TransactionPayload) -> Self {
        Transaction::from_parts(
            p.id,
            p.inputs.into_iter().map(Input::from).collect(),
            p.outputs.into_iter().map(Output::from).collect(),
            p.time,
        )
    }
}

impl From<&Block> for BlockPayload {
    fn from(block: &Block) -> Self {
        Self {
            timestamp: block.timestamp,
            transactions: block
                .transactions
                .iter()
                .map(TransactionPayload::from)
                .collect(),
            previous_hash: block.previous_hash.clone(),
            nonce: block.nonce,
            hash: block.hash.clone(),
        }
    }
}

impl From<BlockPayload> for Block {
    fn from(p: BlockPayload) -> Self {
        Block {
            timestamp: p.timestamp,
            transactions: p.transactions.into_iter().map(Transaction::from).collect(),
            previous_hash: p.previous_hash,
            nonce: p.nonce,
            hash: p.hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BlockPayload;
    use crate::blockchain::Block;
    use crate::transaction::{Input, Output, OutputMode, Transaction};

    fn sample_block() -> Block {
        let mut input = Input::new(Output::new("alice", 5));
        input.set_signature("sig");
        let mut tx = Transaction::new(vec![input], vec![Output::new("bob", 4)]);
        tx.add_fee_output("miner");
        Block::new(vec![tx], "prev".into())
    }

    #[test]
    fn json_uses_wire_field_names() {
        let block = sample_block();
        let value = serde_json::to_value(BlockPayload::from(&block)).expect("serialize");

        assert_eq!(value["previous_hash"], "prev");
        assert_eq!(value["nonce"], 0);
        let tx = &value["transactions"][0];
        assert_eq!(tx["id"], block.transactions[0].id());
        assert_eq!(tx["inputs"][0]["signature"], "sig");
        assert_eq!(tx["inputs"][0]["transaction_output"]["address"], "alice");
        assert_eq!(tx["outputs"][0]["mode"], "normal");
        assert_eq!(tx["outputs"][1]["mode"], "fee");
    }

    #[test]
    fn decoding_keeps_stored_ids() {
        let json = r#"{
            "timestamp": 42,
            "previous_hash": "0000",
            "nonce": 7,
            "hash": "stored-hash",
            "transactions": [{
                "id": "tx-id",
                "time": 1,
                "inputs": [{
                    "id": "in-id",
                    "time": 2,
                    "signature": null,
                    "transaction_output": {"id": "out-a", "address": "a", "amount": 3, "mode": "normal", "time": 3}
                }],
                "outputs": [{"id": "out-b", "address": "b", "amount": 2, "mode": "fee", "time": 4}]
            }]
        }"#;
        let payload: BlockPayload = serde_json::from_str(json).expect("parse");
        let block = Block::from(payload.clone());

        assert_eq!(block.hash, "stored-hash");
        assert_eq!(block.nonce, 7);
        let tx = &block.transactions[0];
        assert_eq!(tx.id(), "tx-id");
        assert_eq!(tx.inputs()[0].id(), "in-id");
        assert!(tx.inputs()[0].signature().is_none());
        assert_eq!(tx.inputs()[0].transaction_output().id(), "out-a");
        assert_eq!(tx.outputs()[0].mode(), OutputMode::Fee);

        assert_eq!(BlockPayload::from(&block), payload);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let json = r#"{"id": "o", "address": "a", "amount": 1, "mode": "bonus", "time": 0}"#;
        assert!(serde_json::from_str::<super::OutputPayload>(json).is_err());
    }
}
