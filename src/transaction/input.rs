use std::fmt;

use super::output::Output;
use crate::util::{now_nanos, sha256_hex};

/// Consumes exactly one previously created output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    id: String,
    transaction_output: Output,
    signature: Option<String>,
    time: i64,
}

impl Input {
    pub fn new(transaction_output: Output) -> Self {
        Self::at(transaction_output, now_nanos())
    }

    pub fn at(transaction_output: Output, time: i64) -> Self {
        let mut input = Self {
            id: String::new(),
            transaction_output,
            signature: None,
            time,
        };
        input.id = sha256_hex(&input.id_value_string());
        input
    }

    /// Rebuild an input from a stored record. The id is trusted as given.
    pub(crate) fn from_parts(
        id: String,
        transaction_output: Output,
        signature: Option<String>,
        time: i64,
    ) -> Self {
        Self {
            id,
            transaction_output,
            signature,
            time,
        }
    }

    pub fn set_signature(&mut self, signature: impl Into<String>) {
        self.signature = Some(signature.into());
    }

    /// Signature verification hook. Fails closed: only an unsigned input
    /// verifies, any non-empty signature is rejected until a real scheme exists.
    pub fn verify_signature(&self, _public_key: &str) -> bool {
        match &self.signature {
            None => true,
            Some(sig) => sig.is_empty(),
        }
    }

    pub fn id_value_string(&self) -> String {
        format!("{} {}", self.time, self.transaction_output)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transaction_output(&self) -> &Output {
        &self.transaction_output
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn time(&self) -> i64 {
        self.time
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.id_value_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Input;
    use crate::transaction::{Output, OutputMode};
    use crate::util::sha256_hex;

    #[test]
    fn id_covers_time_and_output() {
        let out = Output::at("address", 1, OutputMode::Normal, 1);
        let input = Input::at(out.clone(), 1234567890);
        assert_eq!(input.id_value_string(), format!("1234567890 {out}"));
        assert_eq!(input.id(), sha256_hex(&input.id_value_string()));
        assert_eq!(input.transaction_output(), &out);
    }

    #[test]
    fn unsigned_input_verifies() {
        let input = Input::new(Output::new("address", 1));
        assert!(input.signature().is_none());
        assert!(input.verify_signature("address"));
    }

    #[test]
    fn signed_input_fails_closed() {
        let mut input = Input::new(Output::new("address", 1));
        input.set_signature("3045022100deadbeef");
        assert_eq!(input.signature(), Some("3045022100deadbeef"));
        assert!(!input.verify_signature("address"));
    }

    #[test]
    fn signature_does_not_change_id() {
        let mut input = Input::at(Output::at("a", 1, OutputMode::Normal, 1), 2);
        let before = input.id().to_string();
        input.set_signature("sig");
        assert_eq!(before, input.id());
    }
}
