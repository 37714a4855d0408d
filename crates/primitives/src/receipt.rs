//! Transaction receipts.
//!
//! Ledger nodes disagree on receipt field spelling (`block_number` or `blockNumber`,
//! `revert_reason` or `revertReason`). [`RawReceipt`] accepts either and is normalised
//! exactly once into the canonical [`Receipt`] the rest of the system works with.

use serde::Deserialize;
use serde_json::Value;

use crate::{FeltError, TxHash, parse_felt};

/// Reason reported when a reverted receipt carries no readable reason.
pub const UNKNOWN_REVERT_REASON: &str = "Unknown revert reason";

/// Outcome of executing an included transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Execution succeeded.
    #[default]
    Succeeded,
    /// The transaction was included but the program reverted.
    Reverted,
}

/// Canonical receipt for an included transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Hash of the transaction.
    pub tx_hash: TxHash,
    /// Block the transaction was included in, when the node reports it.
    pub block_number: Option<u64>,
    /// Execution status.
    pub status: ExecutionStatus,
    /// Revert reason, when the node reports one.
    pub revert_reason: Option<String>,
}

impl Receipt {
    /// Creates a receipt for a successful execution.
    pub const fn succeeded(tx_hash: TxHash, block_number: Option<u64>) -> Self {
        Self { tx_hash, block_number, status: ExecutionStatus::Succeeded, revert_reason: None }
    }

    /// Creates a receipt for a reverted execution.
    pub const fn reverted(
        tx_hash: TxHash,
        block_number: Option<u64>,
        revert_reason: Option<String>,
    ) -> Self {
        Self { tx_hash, block_number, status: ExecutionStatus::Reverted, revert_reason }
    }

    /// Returns `true` if the execution reverted.
    pub const fn is_reverted(&self) -> bool {
        matches!(self.status, ExecutionStatus::Reverted)
    }

    /// Returns the revert reason, or [`UNKNOWN_REVERT_REASON`] if the node gave none.
    pub fn reason(&self) -> &str {
        self.revert_reason.as_deref().unwrap_or(UNKNOWN_REVERT_REASON)
    }
}

/// Receipt normalisation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReceiptError {
    /// The payload is not a receipt.
    #[error("Malformed receipt: {0}")]
    Malformed(String),
    /// The transaction hash is not a valid field element.
    #[error("Invalid receipt hash: {0}")]
    Hash(#[from] FeltError),
}

/// Receipt as returned by a node, before normalisation.
///
/// Each spelling is kept in its own field, so a payload that carries both is
/// accepted. [`RawReceipt::normalize`] prefers the snake_case value and falls
/// back to the camelCase one when the former is absent or of the wrong type.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawReceipt {
    /// Transaction hash, hex encoded.
    #[serde(default)]
    pub transaction_hash: Option<String>,
    /// Transaction hash, camelCase spelling.
    #[serde(default, rename = "transactionHash")]
    pub transaction_hash_camel: Option<String>,
    /// Block number. Non-numeric values are ignored.
    #[serde(default)]
    pub block_number: Option<Value>,
    /// Block number, camelCase spelling.
    #[serde(default, rename = "blockNumber")]
    pub block_number_camel: Option<Value>,
    /// Execution status, e.g. `SUCCEEDED` or `REVERTED`.
    #[serde(default)]
    pub execution_status: Option<String>,
    /// Execution status, camelCase spelling.
    #[serde(default, rename = "executionStatus")]
    pub execution_status_camel: Option<String>,
    /// Revert reason. Non-string values are ignored.
    #[serde(default)]
    pub revert_reason: Option<Value>,
    /// Revert reason, camelCase spelling.
    #[serde(default, rename = "revertReason")]
    pub revert_reason_camel: Option<Value>,
}

impl RawReceipt {
    /// Parses a raw receipt from node JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Malformed`] if the JSON does not describe a receipt.
    pub fn from_json(json: &str) -> Result<Self, ReceiptError> {
        let raw: Self =
            serde_json::from_str(json).map_err(|e| ReceiptError::Malformed(e.to_string()))?;
        if raw.transaction_hash.is_none() && raw.transaction_hash_camel.is_none() {
            return Err(ReceiptError::Malformed("missing transaction hash".to_string()));
        }
        Ok(raw)
    }

    /// Normalises into the canonical [`Receipt`].
    ///
    /// A receipt without an execution status is treated as reverted only when it
    /// carries a revert reason.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Malformed`] if no transaction hash is present and
    /// [`ReceiptError::Hash`] if it cannot be parsed.
    pub fn normalize(self) -> Result<Receipt, ReceiptError> {
        let hash = self
            .transaction_hash
            .or(self.transaction_hash_camel)
            .ok_or_else(|| ReceiptError::Malformed("missing transaction hash".to_string()))?;
        let tx_hash = parse_felt(&hash)?;

        let block_number = [&self.block_number, &self.block_number_camel]
            .into_iter()
            .find_map(|value| value.as_ref().and_then(Value::as_u64));
        let revert_reason = [&self.revert_reason, &self.revert_reason_camel]
            .into_iter()
            .find_map(|value| value.as_ref().and_then(Value::as_str))
            .map(str::to_owned);

        let reverted = match self.execution_status.or(self.execution_status_camel).as_deref() {
            Some(status) => status.eq_ignore_ascii_case("REVERTED"),
            None => revert_reason.is_some(),
        };

        let status = if reverted { ExecutionStatus::Reverted } else { ExecutionStatus::Succeeded };
        Ok(Receipt { tx_hash, block_number, status, revert_reason })
    }
}

impl TryFrom<RawReceipt> for Receipt {
    type Error = ReceiptError;

    fn try_from(raw: RawReceipt) -> Result<Self, Self::Error> {
        raw.normalize()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::felt_from_u64;

    #[rstest]
    #[case(r#"{"transaction_hash":"0x1","block_number":42,"execution_status":"SUCCEEDED"}"#)]
    #[case(r#"{"transactionHash":"0x1","blockNumber":42,"executionStatus":"SUCCEEDED"}"#)]
    fn accepts_both_field_spellings(#[case] json: &str) {
        let receipt = RawReceipt::from_json(json).unwrap().normalize().unwrap();
        assert_eq!(receipt, Receipt::succeeded(felt_from_u64(1), Some(42)));
    }

    #[rstest]
    #[case(r#"{"transaction_hash":"0x2","execution_status":"REVERTED","revert_reason":"boom"}"#)]
    #[case(r#"{"transactionHash":"0x2","executionStatus":"REVERTED","revertReason":"boom"}"#)]
    fn reads_revert_reason_from_either_spelling(#[case] json: &str) {
        let receipt = Receipt::try_from(RawReceipt::from_json(json).unwrap()).unwrap();
        assert!(receipt.is_reverted());
        assert_eq!(receipt.reason(), "boom");
        assert_eq!(receipt.block_number, None);
    }

    #[test]
    fn reverted_without_reason_uses_placeholder() {
        let json = r#"{"transaction_hash":"0x3","execution_status":"reverted"}"#;
        let receipt = RawReceipt::from_json(json).unwrap().normalize().unwrap();
        assert!(receipt.is_reverted());
        assert_eq!(receipt.reason(), UNKNOWN_REVERT_REASON);
    }

    #[test]
    fn non_numeric_block_number_is_ignored() {
        let json = r#"{"transaction_hash":"0x4","block_number":"0x10"}"#;
        let receipt = RawReceipt::from_json(json).unwrap().normalize().unwrap();
        assert_eq!(receipt.block_number, None);
        assert!(!receipt.is_reverted());
    }

    #[test]
    fn reason_without_status_means_reverted() {
        let json = r#"{"transaction_hash":"0x5","revert_reason":"out of steps"}"#;
        let receipt = RawReceipt::from_json(json).unwrap().normalize().unwrap();
        assert!(receipt.is_reverted());
    }

    #[test]
    fn snake_case_wins_when_both_spellings_are_present() {
        let json = r#"{"transaction_hash":"0x6","execution_status":"REVERTED","block_number":7,"blockNumber":8,"revert_reason":"first","revertReason":"second"}"#;
        let receipt = RawReceipt::from_json(json).unwrap().normalize().unwrap();
        assert_eq!(receipt.block_number, Some(7));
        assert_eq!(receipt.reason(), "first");
    }

    #[rstest]
    #[case(r#"{"execution_status":"SUCCEEDED","block_number":null,"blockNumber":42,"transaction_hash":"0x1"}"#)]
    #[case(r#"{"transaction_hash":"0x1","block_number":"latest","blockNumber":42}"#)]
    #[case(r#"{"transactionHash":"0x1","transaction_hash":"0x1","blockNumber":42}"#)]
    fn camel_case_fills_in_for_unusable_snake_case(#[case] json: &str) {
        let receipt = RawReceipt::from_json(json).unwrap().normalize().unwrap();
        assert_eq!(receipt, Receipt::succeeded(felt_from_u64(1), Some(42)));
    }

    #[test]
    fn revert_reason_falls_back_to_camel_case() {
        let json = r#"{"transaction_hash":"0x7","execution_status":"REVERTED","revert_reason":null,"revertReason":"no stamina"}"#;
        let receipt = RawReceipt::from_json(json).unwrap().normalize().unwrap();
        assert_eq!(receipt.reason(), "no stamina");
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(RawReceipt::from_json("{}"), Err(ReceiptError::Malformed(_))));
        let bad_hash = RawReceipt::from_json(r#"{"transaction_hash":"xyz"}"#).unwrap();
        assert!(matches!(bad_hash.normalize(), Err(ReceiptError::Hash(_))));
    }
}
