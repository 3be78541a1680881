use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::input::Input;
use super::output::{Output, OutputMode};
use super::utxo::UtxoView;
use crate::util::{now_nanos, sha256_hex};

/// Why a transaction was refused against a ledger view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("referenced output {0} not found")]
    MissingOutput(String),

    #[error("referenced output {0} does not match the recorded output")]
    OutputMismatch(String),

    #[error("output {output} already spent by transaction {spender}")]
    AlreadySpent { output: String, spender: String },

    #[error("output {0} referenced by more than one input")]
    DuplicateInput(String),

    #[error("invalid signature on input {0}")]
    InvalidSignature(String),

    #[error("output {0} amount must be greater than 0")]
    NonPositiveAmount(String),

    #[error("transaction carries more than one fee output")]
    MultipleFeeOutputs,

    #[error("negative total amount")]
    NegativeTotal,

    #[error("inputs total {inputs} is less than outputs total {outputs}")]
    InsufficientInputs { inputs: i128, outputs: i128 },
}

/// Ordered inputs consumed and outputs produced.
/// The id covers inputs and outputs only, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: String,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    time: i64,
}

impl Transaction {
    pub fn new(inputs: Vec<Input>, outputs: Vec<Output>) -> Self {
        Self::at(inputs, outputs, now_nanos())
    }

    pub fn at(inputs: Vec<Input>, outputs: Vec<Output>, time: i64) -> Self {
        let mut tx = Self {
            id: String::new(),
            inputs,
            outputs,
            time,
        };
        tx.id = tx.generate_id();
        tx
    }

    /// Rebuild a transaction from a stored record. The id is trusted as given.
    pub(crate) fn from_parts(id: String, inputs: Vec<Input>, outputs: Vec<Output>, time: i64) -> Self {
        Self {
            id,
            inputs,
            outputs,
            time,
        }
    }

    fn generate_id(&self) -> String {
        sha256_hex(&self.id_value_string())
    }

    pub fn inputs_to_string(&self) -> String {
        self.inputs.iter().map(|i| format!("{i}, ")).collect()
    }

    pub fn outputs_to_string(&self) -> String {
        self.outputs.iter().map(|o| format!("{o}, ")).collect()
    }

    pub fn id_value_string(&self) -> String {
        format!("{} -> {}", self.inputs_to_string(), self.outputs_to_string())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    /// Fee a miner could claim: inputs minus outputs, floored at 0.
    /// Defined as 0 once any output is already a fee output.
    pub fn fee(&self) -> i64 {
        let input_sum: i128 = self
            .inputs
            .iter()
            .map(|i| i128::from(i.transaction_output().amount()))
            .sum();

        let mut output_sum: i128 = 0;
        for output in &self.outputs {
            if output.mode() != OutputMode::Normal {
                return 0;
            }
            output_sum += i128::from(output.amount());
        }

        let fee = input_sum - output_sum;
        if fee < 0 {
            return 0;
        }
        i64::try_from(fee).unwrap_or(i64::MAX)
    }

    pub fn has_fee_output(&self) -> bool {
        self.outputs.iter().any(Output::is_fee)
    }

    pub fn fee_output(&self) -> Option<&Output> {
        self.outputs.iter().find(|o| o.is_fee())
    }

    /// Append a fee output for `address` worth `fee()`.
    /// Returns `None` when the transaction already carries one.
    pub fn add_fee_output(&mut self, address: impl Into<String>) -> Option<&Output> {
        if self.has_fee_output() {
            return None;
        }
        let fee = self.fee();
        self.outputs
            .push(Output::with_mode(address, fee, OutputMode::Fee));
        self.id = self.generate_id();
        self.outputs.last()
    }

    pub fn is_valid<V: UtxoView + ?Sized>(&self, view: &V) -> bool {
        self.validate(view).is_ok()
    }

    /// Check the transaction against `view` without mutating anything.
    pub fn validate<V: UtxoView + ?Sized>(&self, view: &V) -> Result<(), TransactionError> {
        let mut seen = HashSet::<&str>::new();
        let mut total_input_amount: i128 = 0;

        for input in &self.inputs {
            let referenced = input.transaction_output();
            let resolved = view
                .transaction_output(referenced.id())
                .ok_or_else(|| TransactionError::MissingOutput(referenced.id().to_string()))?;
            if resolved != referenced {
                return Err(TransactionError::OutputMismatch(referenced.id().to_string()));
            }

            if !input.verify_signature(referenced.address()) {
                return Err(TransactionError::InvalidSignature(input.id().to_string()));
            }

            if !seen.insert(referenced.id()) {
                return Err(TransactionError::DuplicateInput(referenced.id().to_string()));
            }

            // A pending record of this very transaction is not a double spend;
            // a mined one always is.
            if let Some(spender) = view.spender_of(referenced.id()) {
                if spender.committed || spender.transaction_id != self.id {
                    return Err(TransactionError::AlreadySpent {
                        output: referenced.id().to_string(),
                        spender: spender.transaction_id.to_string(),
                    });
                }
            }

            total_input_amount += i128::from(referenced.amount());
        }

        let mut total_output_amount: i128 = 0;
        let mut fee_outputs = 0usize;
        for output in &self.outputs {
            if output.amount() <= 0 {
                return Err(TransactionError::NonPositiveAmount(output.id().to_string()));
            }
            if output.is_fee() {
                fee_outputs += 1;
            }
            total_output_amount += i128::from(output.amount());
        }

        if fee_outputs > 1 {
            return Err(TransactionError::MultipleFeeOutputs);
        }
        if total_input_amount < 0 || total_output_amount < 0 {
            return Err(TransactionError::NegativeTotal);
        }
        if total_input_amount < total_output_amount {
            return Err(TransactionError::InsufficientInputs {
                inputs: total_input_amount,
                outputs: total_output_amount,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.id_value_string())
    }
}
