//! Transaction manager error types.

use courier_primitives::TxHash;
use thiserror::Error;

/// Errors reported by a [`LedgerClient`](crate::LedgerClient) adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Transport or node error.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The node refused the transaction before inclusion.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// Fee estimation failed.
    #[error("Fee estimation failed: {0}")]
    FeeEstimation(String),

    /// The target contract is not deployed.
    #[error("Contract not found: {0}")]
    ContractNotFound(String),
}

impl LedgerError {
    /// Classifies a node error message into the appropriate variant.
    pub fn from_rpc_error(msg: &str) -> Self {
        let lower = msg.to_lowercase();

        if lower.contains("contract not found") || lower.contains("class hash not found") {
            Self::ContractNotFound(msg.to_string())
        } else if lower.contains("insufficient")
            || lower.contains("invalid transaction nonce")
            || lower.contains("validation failure")
            || lower.contains("rejected")
        {
            Self::Rejected(msg.to_string())
        } else {
            Self::Rpc(msg.to_string())
        }
    }
}

/// Dispatch errors.
///
/// The display text of every variant is the message carried by the
/// `transactionFailed` event for the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// The ledger rejected or never accepted the transaction.
    #[error("Transaction failed to submit: {0}")]
    Submission(String),

    /// Querying the receipt failed. Says nothing about the execution result.
    #[error("Transaction failed while waiting for confirmation: {message}")]
    Confirmation {
        /// Hash of the submitted transaction.
        tx_hash: TxHash,
        /// Underlying error message.
        message: String,
    },

    /// The transaction was included but its execution reverted.
    #[error("Transaction failed with reason: {reason}")]
    Reverted {
        /// Hash of the reverted transaction.
        tx_hash: TxHash,
        /// Revert reason reported by the node, or a placeholder.
        reason: String,
    },

    /// A call needs randomness but no provider is configured.
    #[error("Randomness unavailable: {0}")]
    Randomness(String),

    /// The scheduler went away before settling the call.
    #[error("Transaction queue closed before the call was settled")]
    QueueClosed,

    /// A batch session received a call for a different signer.
    #[error("Batch session is bound to another signer")]
    SignerMismatch,
}

impl TxError {
    /// Returns the transaction hash, when the failure happened after submission.
    pub const fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Confirmation { tx_hash, .. } | Self::Reverted { tx_hash, .. } => Some(*tx_hash),
            _ => None,
        }
    }
}

impl From<LedgerError> for TxError {
    fn from(err: LedgerError) -> Self {
        Self::Submission(err.to_string())
    }
}

/// Trait for determining if an error is retryable.
pub trait Retryable {
    /// Returns true if the error is retryable.
    fn is_retryable(&self) -> bool;
}

impl Retryable for LedgerError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}

impl Retryable for TxError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Submission(_) | Self::Confirmation { .. })
    }
}
