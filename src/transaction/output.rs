use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::{now_nanos, sha256_hex};

/// Whether an output carries ordinary value or the miner fee of its transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Normal,
    Fee,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Normal => write!(f, "normal"),
            OutputMode::Fee => write!(f, "fee"),
        }
    }
}

/// An atomic unit of value addressed to `address`.
/// The id is the SHA-256 of `address amount mode time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    id: String,
    address: String,
    amount: i64,
    mode: OutputMode,
    time: i64, // nanoseconds
}

impl Output {
    pub fn new(address: impl Into<String>, amount: i64) -> Self {
        Self::with_mode(address, amount, OutputMode::Normal)
    }

    pub fn with_mode(address: impl Into<String>, amount: i64, mode: OutputMode) -> Self {
        Self::at(address, amount, mode, now_nanos())
    }

    /// Build an output with an explicit creation time.
    pub fn at(address: impl Into<String>, amount: i64, mode: OutputMode, time: i64) -> Self {
        let mut output = Self {
            id: String::new(),
            address: address.into(),
            amount,
            mode,
            time,
        };
        output.id = sha256_hex(&output.id_value_string());
        output
    }

    /// Rebuild an output from a stored record. The id is trusted as given.
    pub(crate) fn from_parts(
        id: String,
        address: String,
        amount: i64,
        mode: OutputMode,
        time: i64,
    ) -> Self {
        Self {
            id,
            address,
            amount,
            mode,
            time,
        }
    }

    pub fn id_value_string(&self) -> String {
        format!("{} {} {} {}", self.address, self.amount, self.mode, self.time)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_fee(&self) -> bool {
        self.mode == OutputMode::Fee
    }

    pub fn time(&self) -> i64 {
        self.time
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.id_value_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{Output, OutputMode};
    use crate::util::sha256_hex;

    #[test]
    fn id_is_hash_of_value_string() {
        let out = Output::at("address", 1, OutputMode::Normal, 1234567890);
        assert_eq!(out.id_value_string(), "address 1 normal 1234567890");
        assert_eq!(out.id(), sha256_hex("address 1 normal 1234567890"));
    }

    #[test]
    fn default_mode_is_normal() {
        let out = Output::new("address", 7);
        assert_eq!(out.mode(), OutputMode::Normal);
        assert!(!out.is_fee());
    }

    #[test]
    fn distinct_content_gives_distinct_ids() {
        let base = Output::at("a", 1, OutputMode::Normal, 10);
        let variants = [
            Output::at("b", 1, OutputMode::Normal, 10),
            Output::at("a", 2, OutputMode::Normal, 10),
            Output::at("a", 1, OutputMode::Fee, 10),
            Output::at("a", 1, OutputMode::Normal, 11),
        ];
        for v in &variants {
            assert_ne!(base.id(), v.id());
        }
    }

    #[test]
    fn display_prefixes_id() {
        let out = Output::at("addr", 3, OutputMode::Fee, 5);
        assert_eq!(out.to_string(), format!("{}: addr 3 fee 5", out.id()));
    }
}
