//! Dispatch outcomes.

use std::sync::Arc;

use courier_primitives::{Receipt, TxHash};

/// What a caller gets back for a dispatched transaction.
///
/// Failures are reported through `Err(TxError)` instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxOutcome {
    /// The receipt arrived in time and execution succeeded.
    Confirmed(Arc<Receipt>),
    /// The receipt did not arrive within the confirmation timeout. The wait
    /// continues in the background and reports through the event bus.
    Pending {
        /// Hash of the submitted transaction.
        tx_hash: TxHash,
    },
    /// A manual batch session buffered the calls instead of submitting them.
    Queued,
}

impl TxOutcome {
    /// Returns the transaction hash, if the calls were submitted.
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Confirmed(receipt) => Some(receipt.tx_hash),
            Self::Pending { tx_hash } => Some(*tx_hash),
            Self::Queued => None,
        }
    }

    /// Returns the receipt, if the transaction confirmed in time.
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Self::Confirmed(receipt) => Some(receipt),
            _ => None,
        }
    }

    /// Returns `true` for [`TxOutcome::Pending`].
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Returns `true` for [`TxOutcome::Queued`].
    pub const fn is_queued(&self) -> bool {
        matches!(self, Self::Queued)
    }
}
