//! Deferred calls waiting in the queue.

use courier_primitives::{Account, CallDescriptor, TransactionKind};
use courier_txmgr::{TxError, TxOutcome};

use crate::{CategoryLimits, Dispatch};

/// A call that has not been submitted yet.
///
/// The queue reads `signer` and `calls` directly when it merges several
/// pending calls into one transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingCall {
    /// Account the calls are signed under.
    pub signer: Account,
    /// Calls to execute atomically.
    pub calls: Vec<CallDescriptor>,
    /// Grouping key. Calls without one group with each other.
    pub batch_id: Option<String>,
}

impl PendingCall {
    /// Creates a pending call with no batch id.
    pub fn new(signer: Account, calls: impl IntoIterator<Item = CallDescriptor>) -> Self {
        Self { signer, calls: calls.into_iter().collect(), batch_id: None }
    }

    /// Creates a pending call for a single descriptor.
    pub fn single(signer: Account, call: CallDescriptor) -> Self {
        Self::new(signer, [call])
    }

    /// Sets the grouping key.
    #[must_use]
    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    /// Returns the number of descriptors carried.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns `true` if no descriptors are carried.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Returns the merge limit for this call as classified by `dispatcher`.
    pub fn batch_limit<D: Dispatch>(&self, dispatcher: &D, limits: &CategoryLimits) -> usize {
        limits.batch_limit_for(self.kind(dispatcher))
    }

    fn kind<D: Dispatch>(&self, dispatcher: &D) -> Option<TransactionKind> {
        dispatcher.transaction_kind(&self.calls)
    }

    /// Submits this call on its own.
    pub async fn execute<D: Dispatch>(self, dispatcher: &D) -> Result<TxOutcome, TxError> {
        dispatcher.dispatch(&self.signer, self.calls).await
    }
}
