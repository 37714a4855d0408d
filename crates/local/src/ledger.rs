//! In-memory ledger.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use courier_primitives::{
    Account, CallDescriptor, FeeEstimate, RawReceipt, Receipt, ResourceBound, ResourceBounds,
    TxHash, U256, felt_from_u64,
};
use courier_txmgr::{LedgerClient, LedgerError, SubmitOptions};
use serde::Deserialize;
use serde_json::json;

/// What happens to one submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// Accept and confirm successfully.
    #[default]
    Confirm,
    /// Accept, then report a reverted execution.
    Revert(Option<String>),
    /// Refuse the submission.
    Reject(String),
    /// Accept, then fail the receipt query.
    FailWait(String),
}

/// A submission the ledger accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// Assigned transaction hash.
    pub tx_hash: TxHash,
    /// Signer.
    pub account: Account,
    /// Calls, in submission order.
    pub calls: Vec<CallDescriptor>,
    /// Submission options.
    pub options: SubmitOptions,
}

#[derive(Debug, Default)]
struct LedgerState {
    script: VecDeque<Behavior>,
    submissions: Vec<Submission>,
    pending: HashMap<TxHash, Behavior>,
    attempts: u64,
    next_block: u64,
}

/// A scripted in-memory [`LedgerClient`].
#[derive(Debug)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    reads: Mutex<HashMap<String, Vec<U256>>>,
    latency: Duration,
    l2_gas_estimate: u64,
    revert_every: Option<u64>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    /// Block number of the first confirmed transaction.
    pub const GENESIS_BLOCK: u64 = 1;

    /// Creates a ledger that confirms everything immediately.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState { next_block: Self::GENESIS_BLOCK, ..Default::default() }),
            reads: Mutex::default(),
            latency: Duration::ZERO,
            l2_gas_estimate: 1_000_000_000,
            revert_every: None,
        }
    }

    /// Delays every receipt by `latency`.
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Sets the L2 gas amount returned by fee estimates.
    pub const fn with_l2_gas_estimate(mut self, amount: u64) -> Self {
        self.l2_gas_estimate = amount;
        self
    }

    /// Reverts every `n`th unscripted submission. Zero disables.
    pub const fn with_revert_every(mut self, n: u64) -> Self {
        self.revert_every = if n == 0 { None } else { Some(n) };
        self
    }

    /// Queues the behaviour of the next unscripted submission.
    pub fn push_behavior(&self, behavior: Behavior) {
        self.lock().script.push_back(behavior);
    }

    /// Scripts the result of read calls to `entrypoint`.
    pub fn set_read_result(&self, entrypoint: impl Into<String>, result: Vec<U256>) {
        self.reads.lock().unwrap_or_else(PoisonError::into_inner).insert(entrypoint.into(), result);
    }

    /// Returns every accepted submission.
    pub fn submissions(&self) -> Vec<Submission> {
        self.lock().submissions.clone()
    }

    /// Returns the number of accepted submissions.
    pub fn submission_count(&self) -> usize {
        self.lock().submissions.len()
    }

    /// Returns the number of submission attempts, rejected ones included.
    pub fn attempt_count(&self) -> u64 {
        self.lock().attempts
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Node-shaped receipt JSON, using the camelCase spelling.
    fn receipt_json(tx_hash: TxHash, block_number: u64, revert: Option<&Option<String>>) -> serde_json::Value {
        match revert {
            None => json!({
                "transactionHash": tx_hash.to_string(),
                "blockNumber": block_number,
                "executionStatus": "SUCCEEDED",
            }),
            Some(reason) => json!({
                "transactionHash": tx_hash.to_string(),
                "blockNumber": block_number,
                "executionStatus": "REVERTED",
                "revertReason": reason,
            }),
        }
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn submit(
        &self,
        account: &Account,
        calls: &[CallDescriptor],
        options: &SubmitOptions,
    ) -> Result<TxHash, LedgerError> {
        let mut state = self.lock();
        state.attempts += 1;

        let attempt = state.attempts;
        let behavior = state.script.pop_front().unwrap_or_else(|| match self.revert_every {
            Some(n) if attempt % n == 0 => Behavior::Revert(Some("scripted revert".to_string())),
            _ => Behavior::Confirm,
        });

        if let Behavior::Reject(reason) = behavior {
            tracing::debug!(attempt, %reason, "rejecting submission");
            return Err(LedgerError::from_rpc_error(&reason));
        }

        let tx_hash = felt_from_u64(state.submissions.len() as u64 + 1);
        state.submissions.push(Submission {
            tx_hash,
            account: account.clone(),
            calls: calls.to_vec(),
            options: options.clone(),
        });
        state.pending.insert(tx_hash, behavior);
        tracing::debug!(tx = %tx_hash, calls = calls.len(), "accepted submission");
        Ok(tx_hash)
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        _retry_interval: Duration,
    ) -> Result<Receipt, LedgerError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let json = {
            let mut state = self.lock();
            let behavior = state
                .pending
                .get(&tx_hash)
                .cloned()
                .ok_or_else(|| LedgerError::Rpc(format!("Transaction hash not found: {tx_hash}")))?;

            let block = state.next_block;
            state.next_block += 1;
            match behavior {
                Behavior::Confirm => Self::receipt_json(tx_hash, block, None),
                Behavior::Revert(reason) => Self::receipt_json(tx_hash, block, Some(&reason)),
                Behavior::FailWait(message) => return Err(LedgerError::Rpc(message)),
                Behavior::Reject(_) => {
                    return Err(LedgerError::Rpc(format!("Transaction hash not found: {tx_hash}")));
                }
            }
        };

        let raw: RawReceipt =
            serde_json::from_value(json).map_err(|e| LedgerError::Rpc(e.to_string()))?;
        raw.normalize().map_err(|e| LedgerError::Rpc(e.to_string()))
    }

    async fn estimate_fee(
        &self,
        _account: &Account,
        calls: &[CallDescriptor],
    ) -> Result<FeeEstimate, LedgerError> {
        let resource_bounds = ResourceBounds {
            l1_gas: ResourceBound::new(0, 1),
            l2_gas: ResourceBound::new(self.l2_gas_estimate, 1),
            l1_data_gas: ResourceBound::new(128 * calls.len() as u64, 1),
        };
        Ok(FeeEstimate {
            overall_fee: u128::from(self.l2_gas_estimate) + 128 * calls.len() as u128,
            resource_bounds,
        })
    }

    async fn call_contract(
        &self,
        _namespace: &str,
        call: &CallDescriptor,
    ) -> Result<Vec<U256>, LedgerError> {
        self.reads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&call.entrypoint)
            .cloned()
            .ok_or_else(|| LedgerError::ContractNotFound(call.entrypoint.clone()))
    }
}
