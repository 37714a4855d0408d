//! Ledger client seam.

use std::time::Duration;

use async_trait::async_trait;
use courier_primitives::{Account, CallDescriptor, FeeEstimate, Receipt, ResourceBounds, TxHash, U256};

use crate::LedgerError;

/// Parameters attached to a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Contract namespace the calls are routed through.
    pub namespace: String,
    /// Transaction version.
    pub version: u8,
    /// Explicit resource bounds. `None` lets the ledger client estimate them itself.
    pub resource_bounds: Option<ResourceBounds>,
}

/// The operations the dispatch engine needs from a ledger RPC client.
///
/// Adapters are responsible for normalising node receipts into [`Receipt`]
/// (see [`courier_primitives::RawReceipt`]).
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submits `calls` as a single atomic transaction signed by `account`.
    async fn submit(
        &self,
        account: &Account,
        calls: &[CallDescriptor],
        options: &SubmitOptions,
    ) -> Result<TxHash, LedgerError>;

    /// Waits until the node reports a receipt for `tx_hash`, polling every `retry_interval`.
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        retry_interval: Duration,
    ) -> Result<Receipt, LedgerError>;

    /// Estimates the fee of submitting `calls` under `account`.
    async fn estimate_fee(
        &self,
        account: &Account,
        calls: &[CallDescriptor],
    ) -> Result<FeeEstimate, LedgerError>;

    /// Executes a read-only call.
    async fn call_contract(
        &self,
        namespace: &str,
        call: &CallDescriptor,
    ) -> Result<Vec<U256>, LedgerError>;
}
