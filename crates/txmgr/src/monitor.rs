//! Receipt waiting and outcome classification.

use std::sync::Arc;

use courier_primitives::{Receipt, TxHash};

use crate::{
    DispatchEvent, EventBus, HeartbeatManager, LedgerClient, TxMeta, config::TxManagerConfig,
    error::TxError,
};

/// Waits for receipts and turns them into outcomes.
///
/// A monitor only holds shared handles, so it can be moved into a detached
/// task that outlives the caller that started the wait.
pub struct TxMonitor<L> {
    /// Ledger client.
    ledger: Arc<L>,
    /// Transaction manager configuration.
    config: TxManagerConfig,
    /// Confirmations are recorded as heartbeats.
    heartbeat: Arc<HeartbeatManager>,
    /// Failures are emitted here.
    events: Arc<EventBus>,
}

impl<L> Clone for TxMonitor<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            config: self.config.clone(),
            heartbeat: Arc::clone(&self.heartbeat),
            events: Arc::clone(&self.events),
        }
    }
}

impl<L> TxMonitor<L> {
    /// Creates a new transaction monitor.
    pub const fn new(
        ledger: Arc<L>,
        config: TxManagerConfig,
        heartbeat: Arc<HeartbeatManager>,
        events: Arc<EventBus>,
    ) -> Self {
        Self { ledger, config, heartbeat, events }
    }
}

impl<L: LedgerClient> TxMonitor<L> {
    /// Waits for the receipt of `tx_hash` and checks its execution status.
    ///
    /// Every received receipt is recorded as a confirmation heartbeat, reverted
    /// ones included. Failures are emitted as
    /// [`DispatchEvent::TransactionFailed`] carrying `meta` and the hash.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Confirmation`] if the receipt query fails and
    /// [`TxError::Reverted`] if execution reverted.
    pub async fn wait_and_check(&self, tx_hash: TxHash, meta: TxMeta) -> Result<Arc<Receipt>, TxError> {
        let meta = meta.with_tx_hash(tx_hash);

        let receipt = match self.ledger.wait_for_receipt(tx_hash, self.config.receipt_retry_interval).await {
            Ok(receipt) => receipt,
            Err(e) => {
                let err = TxError::Confirmation { tx_hash, message: e.to_string() };
                tracing::error!(tx = %tx_hash, error = %e, "receipt wait failed");
                self.fail(&err, meta);
                return Err(err);
            }
        };

        self.heartbeat.record_transaction_confirmation(tx_hash, receipt.block_number);

        if receipt.is_reverted() {
            let err = TxError::Reverted { tx_hash, reason: receipt.reason().to_string() };
            self.fail(&err, meta);
            return Err(err);
        }

        tracing::info!(tx = %tx_hash, block = ?receipt.block_number, "transaction confirmed");
        Ok(Arc::new(receipt))
    }

    fn fail(&self, err: &TxError, meta: TxMeta) {
        self.events.emit(&DispatchEvent::TransactionFailed { message: err.to_string(), meta });
    }
}

impl<L> std::fmt::Debug for TxMonitor<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxMonitor").field("config", &self.config).finish_non_exhaustive()
    }
}
