//! Transaction submission.

use std::sync::Arc;

use courier_primitives::{Account, CallDescriptor, ResourceBounds, TxHash};

use crate::{
    LedgerClient, SubmitOptions, bounds::ResourceBoundAdjuster, config::TxManagerConfig,
    error::TxError,
};

/// Publishes transactions to the ledger.
///
/// When fee estimation is enabled the estimate is passed through the
/// [`ResourceBoundAdjuster`] and the adjusted bounds are submitted explicitly.
pub struct TxSubmitter<L> {
    /// Ledger client.
    ledger: Arc<L>,
    /// Transaction manager configuration.
    config: TxManagerConfig,
    /// L2 gas adjustment.
    adjuster: ResourceBoundAdjuster,
}

impl<L> TxSubmitter<L> {
    /// Creates a new transaction submitter.
    pub const fn new(ledger: Arc<L>, config: TxManagerConfig) -> Self {
        let adjuster = ResourceBoundAdjuster::new(config.l2_gas_floor, config.l2_gas_boost);
        Self { ledger, config, adjuster }
    }

    /// Returns the resource bound adjuster in use.
    pub const fn adjuster(&self) -> &ResourceBoundAdjuster {
        &self.adjuster
    }
}

impl<L: LedgerClient> TxSubmitter<L> {
    /// Estimates the fee for `calls` and returns the adjusted bounds.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Submission`] if the estimate fails.
    pub async fn resource_bounds(
        &self,
        account: &Account,
        calls: &[CallDescriptor],
    ) -> Result<ResourceBounds, TxError> {
        let estimate = self.ledger.estimate_fee(account, calls).await?;
        let bounds = self.adjuster.adjust(&estimate);
        if bounds.l2_gas.max_amount != estimate.resource_bounds.l2_gas.max_amount {
            tracing::debug!(
                estimated = estimate.resource_bounds.l2_gas.max_amount,
                adjusted = bounds.l2_gas.max_amount,
                "raised l2 gas bound"
            );
        }
        Ok(bounds)
    }

    /// Submits `calls` as one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Submission`] if fee estimation fails or the ledger
    /// does not accept the transaction.
    pub async fn publish(
        &self,
        account: &Account,
        calls: &[CallDescriptor],
    ) -> Result<TxHash, TxError> {
        if calls.is_empty() {
            return Err(TxError::Submission("no calls to submit".to_string()));
        }

        let resource_bounds = if self.config.estimate_fees {
            Some(self.resource_bounds(account, calls).await?)
        } else {
            None
        };

        let options = SubmitOptions {
            namespace: self.config.namespace.clone(),
            version: self.config.tx_version,
            resource_bounds,
        };
        let tx_hash = self.ledger.submit(account, calls, &options).await?;
        tracing::info!(tx = %tx_hash, calls = calls.len(), "transaction submitted");
        Ok(tx_hash)
    }
}

impl<L> std::fmt::Debug for TxSubmitter<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxSubmitter")
            .field("config", &self.config)
            .field("adjuster", &self.adjuster)
            .finish_non_exhaustive()
    }
}
