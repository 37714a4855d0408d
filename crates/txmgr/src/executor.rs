//! Submission state machine.

use std::{sync::Arc, time::Duration};

use courier_primitives::{
    Account, Address, CallDescriptor, Receipt, TransactionKind, TxHash, U256,
};
use tokio::task::JoinError;

use crate::{
    DesyncStatus, DispatchEvent, EventBus, HeartbeatManager, LedgerClient, LedgerError, SendState,
    SyncState, TxManagerConfig, TxMeta, TxMonitor, TxOutcome, TxSubmitter, error::TxError,
    vrf::build_randomness_calls,
};

/// Submits transactions and follows them to a terminal outcome.
///
/// Each call to [`TxExecutor::execute_and_check`] records a submission
/// heartbeat, submits the calls as one transaction and waits for the receipt
/// for at most [`TxManagerConfig::confirmation_timeout`]. If the receipt is
/// late the caller gets [`TxOutcome::Pending`] and the wait carries on in a
/// detached task whose result is only visible on the [`EventBus`].
pub struct TxExecutor<L> {
    ledger: Arc<L>,
    config: TxManagerConfig,
    submitter: Arc<TxSubmitter<L>>,
    monitor: TxMonitor<L>,
    heartbeat: Arc<HeartbeatManager>,
    events: Arc<EventBus>,
}

impl<L> Clone for TxExecutor<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            config: self.config.clone(),
            submitter: Arc::clone(&self.submitter),
            monitor: self.monitor.clone(),
            heartbeat: Arc::clone(&self.heartbeat),
            events: Arc::clone(&self.events),
        }
    }
}

impl<L> std::fmt::Debug for TxExecutor<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxExecutor")
            .field("config", &self.config)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl<L> TxExecutor<L> {
    /// Creates an executor with a fresh event bus and heartbeat manager.
    ///
    /// Heartbeats are published on the event bus as [`DispatchEvent::Heartbeat`].
    pub fn new(ledger: Arc<L>, config: TxManagerConfig) -> Self {
        let events = Arc::new(EventBus::new());
        let heartbeat = Arc::new(HeartbeatManager::with_listener(events.clone()));
        Self::with_parts(ledger, config, heartbeat, events)
    }

    /// Creates an executor over existing heartbeat and event handles.
    pub fn with_parts(
        ledger: Arc<L>,
        config: TxManagerConfig,
        heartbeat: Arc<HeartbeatManager>,
        events: Arc<EventBus>,
    ) -> Self {
        let submitter = Arc::new(TxSubmitter::new(Arc::clone(&ledger), config.clone()));
        let monitor = TxMonitor::new(
            Arc::clone(&ledger),
            config.clone(),
            Arc::clone(&heartbeat),
            Arc::clone(&events),
        );
        Self { ledger, config, submitter, monitor, heartbeat, events }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &TxManagerConfig {
        &self.config
    }

    /// Returns the ledger client.
    pub const fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Returns the event bus lifecycle events are emitted on.
    pub const fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Returns the heartbeat manager.
    pub const fn heartbeat(&self) -> &Arc<HeartbeatManager> {
        &self.heartbeat
    }

    /// Returns the current heartbeat snapshot.
    pub fn sync_state(&self) -> SyncState {
        self.heartbeat.sync_state()
    }

    /// Checks the latest heartbeat against `threshold`.
    pub fn desync_status(&self, threshold: Duration) -> DesyncStatus {
        self.heartbeat.desync_status(threshold)
    }

    /// Returns the kind used to tag events for `calls`.
    ///
    /// Calls to the randomness provider are skipped so that a prepended
    /// randomness request does not decide the kind.
    pub fn transaction_kind(&self, calls: &[CallDescriptor]) -> Option<TransactionKind> {
        let provider = self.config.randomness_provider;
        calls
            .iter()
            .find(|call| provider != Some(call.contract_address))
            .and_then(CallDescriptor::kind)
    }

    /// Prepends a randomness request for `address_to_call` to `call`.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Randomness`] if no provider is configured.
    pub fn with_randomness(
        &self,
        account: &Account,
        call: CallDescriptor,
        address_to_call: Address,
    ) -> Result<Vec<CallDescriptor>, TxError> {
        build_randomness_calls(account, call, self.config.randomness_provider, address_to_call)
    }
}

impl<L: LedgerClient + 'static> TxExecutor<L> {
    /// Submits `calls` as one transaction and waits for its outcome.
    ///
    /// Returns [`TxOutcome::Confirmed`] if the receipt arrives within the
    /// confirmation timeout, and [`TxOutcome::Pending`] otherwise. A zero
    /// timeout waits for the receipt however long it takes.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Submission`] if the ledger did not accept the
    /// transaction, [`TxError::Confirmation`] if the receipt query failed and
    /// [`TxError::Reverted`] if execution reverted. Each failure is also
    /// emitted as [`DispatchEvent::TransactionFailed`].
    pub async fn execute_and_check(
        &self,
        account: &Account,
        calls: Vec<CallDescriptor>,
    ) -> Result<TxOutcome, TxError> {
        let mut state = SendState::default();
        self.execute_tracked(account, calls, &mut state).await
    }

    /// Runs [`TxExecutor::execute_and_check`], leaving the last state reached
    /// in `state`. That is `Confirmed` or `Failed`, except on the pending path
    /// where the caller's copy stops at `WaitingTimedOut` and the detached wait
    /// settles its own.
    async fn execute_tracked(
        &self,
        account: &Account,
        calls: Vec<CallDescriptor>,
        state: &mut SendState,
    ) -> Result<TxOutcome, TxError> {
        self.heartbeat.record_transaction_submission();

        let meta = TxMeta::new(self.transaction_kind(&calls), calls.len());

        let tx_hash = match self.submitter.publish(account, &calls).await {
            Ok(tx_hash) => tx_hash,
            Err(err) => {
                state.advance(SendState::Failed);
                self.events.emit(&DispatchEvent::TransactionFailed { message: err.to_string(), meta });
                return Err(err);
            }
        };
        state.advance(SendState::Submitted);
        state.advance(SendState::WaitingConfirmed);

        if self.config.waits_indefinitely() {
            let waited = self.monitor.wait_and_check(tx_hash, meta.clone()).await;
            let receipt = settle(state, tx_hash, waited)?;
            self.complete(Arc::clone(&receipt), meta, tx_hash);
            return Ok(TxOutcome::Confirmed(receipt));
        }

        let monitor = self.monitor.clone();
        let wait_meta = meta.clone();
        let mut wait = tokio::spawn(async move { monitor.wait_and_check(tx_hash, wait_meta).await });

        let waited = tokio::time::timeout(self.config.confirmation_timeout, &mut wait).await;
        match waited {
            Ok(joined) => {
                let receipt = settle(state, tx_hash, flatten(joined, tx_hash))?;
                self.complete(Arc::clone(&receipt), meta, tx_hash);
                Ok(TxOutcome::Confirmed(receipt))
            }
            Err(_) => {
                state.advance(SendState::WaitingTimedOut);
                tracing::warn!(
                    tx = %tx_hash,
                    timeout_ms = self.config.confirmation_timeout.as_millis(),
                    %state,
                    "receipt not received in time, continuing in background"
                );
                self.events.emit(&DispatchEvent::TransactionPending {
                    tx_hash,
                    meta: meta.clone().with_tx_hash(tx_hash),
                });

                let events = Arc::clone(&self.events);
                let mut background = *state;
                tokio::spawn(async move {
                    match settle(&mut background, tx_hash, flatten(wait.await, tx_hash)) {
                        Ok(receipt) => events.emit(&DispatchEvent::TransactionComplete {
                            receipt,
                            meta: meta.with_tx_hash(tx_hash),
                        }),
                        Err(err) => {
                            tracing::error!(tx = %tx_hash, error = %err, "background confirmation failed");
                        }
                    }
                });

                Ok(TxOutcome::Pending { tx_hash })
            }
        }
    }

    /// Waits for the receipt of an already submitted transaction and checks
    /// its execution status. No timeout applies.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::Confirmation`] or [`TxError::Reverted`].
    pub async fn wait_for_transaction(&self, tx_hash: TxHash) -> Result<Arc<Receipt>, TxError> {
        self.monitor.wait_and_check(tx_hash, TxMeta::default()).await
    }

    /// Executes a read-only call in the configured namespace.
    ///
    /// Reads record no heartbeat and emit no events.
    ///
    /// # Errors
    ///
    /// Returns the ledger client's error unchanged.
    pub async fn call(&self, call: &CallDescriptor) -> Result<Vec<U256>, LedgerError> {
        self.ledger.call_contract(&self.config.namespace, call).await
    }

    fn complete(&self, receipt: Arc<Receipt>, meta: TxMeta, tx_hash: TxHash) {
        self.events
            .emit(&DispatchEvent::TransactionComplete { receipt, meta: meta.with_tx_hash(tx_hash) });
    }
}

/// Moves `state` to the terminal state matching the outcome of the receipt wait.
fn settle(
    state: &mut SendState,
    tx_hash: TxHash,
    waited: Result<Arc<Receipt>, TxError>,
) -> Result<Arc<Receipt>, TxError> {
    let next = if waited.is_ok() { SendState::Confirmed } else { SendState::Failed };
    state.advance(next);
    tracing::debug!(tx = %tx_hash, %state, "transaction settled");
    waited
}

/// Unwraps the result of the detached receipt wait.
fn flatten(
    joined: Result<Result<Arc<Receipt>, TxError>, JoinError>,
    tx_hash: TxHash,
) -> Result<Arc<Receipt>, TxError> {
    joined.map_err(|e| TxError::Confirmation { tx_hash, message: e.to_string() })?
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use courier_primitives::{FeeEstimate, felt_from_u64};
    use rstest::rstest;

    use super::*;
    use crate::{DispatchObserver, EventKind, SubmitOptions};

    /// Ledger whose receipt arrives after a fixed delay.
    struct SlowLedger {
        delay: Duration,
        revert: bool,
        fail_wait: bool,
        submissions: Mutex<Vec<Vec<CallDescriptor>>>,
    }

    impl SlowLedger {
        fn new(delay: Duration) -> Self {
            Self { delay, revert: false, fail_wait: false, submissions: Mutex::default() }
        }
    }

    #[async_trait]
    impl LedgerClient for SlowLedger {
        async fn submit(
            &self,
            _account: &Account,
            calls: &[CallDescriptor],
            _options: &SubmitOptions,
        ) -> Result<TxHash, LedgerError> {
            let mut submissions = self.submissions.lock().unwrap();
            submissions.push(calls.to_vec());
            Ok(felt_from_u64(submissions.len() as u64))
        }

        async fn wait_for_receipt(
            &self,
            tx_hash: TxHash,
            _retry_interval: Duration,
        ) -> Result<Receipt, LedgerError> {
            tokio::time::sleep(self.delay).await;
            if self.fail_wait {
                return Err(LedgerError::Rpc("node gone".to_string()));
            }
            if self.revert {
                Ok(Receipt::reverted(tx_hash, Some(4), Some("paused".to_string())))
            } else {
                Ok(Receipt::succeeded(tx_hash, Some(4)))
            }
        }

        async fn estimate_fee(
            &self,
            _account: &Account,
            _calls: &[CallDescriptor],
        ) -> Result<FeeEstimate, LedgerError> {
            Ok(FeeEstimate::default())
        }

        async fn call_contract(
            &self,
            namespace: &str,
            call: &CallDescriptor,
        ) -> Result<Vec<U256>, LedgerError> {
            Ok(vec![U256::from(namespace.len()), U256::from(call.calldata.len())])
        }
    }

    #[derive(Default)]
    struct Collector(Mutex<Vec<DispatchEvent>>);

    impl DispatchObserver for Collector {
        fn on_event(&self, event: &DispatchEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    impl Collector {
        fn kinds(&self) -> Vec<EventKind> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .map(DispatchEvent::kind)
                .filter(|kind| *kind != EventKind::Heartbeat)
                .collect()
        }
    }

    fn executor(ledger: SlowLedger, timeout: Duration) -> (TxExecutor<SlowLedger>, Arc<Collector>) {
        let config = TxManagerConfig::builder()
            .confirmation_timeout(timeout)
            .randomness_provider(Some(felt_from_u64(0xf)))
            .build();
        let executor = TxExecutor::new(Arc::new(ledger), config);
        let collector = Arc::new(Collector::default());
        executor.events().subscribe(None, collector.clone());
        (executor, collector)
    }

    fn account() -> Account {
        Account::new(felt_from_u64(0xa))
    }

    fn call(entrypoint: &str) -> CallDescriptor {
        CallDescriptor::new(felt_from_u64(0xc), entrypoint)
    }

    #[rstest]
    #[case(vec![call("explore")], Some(TransactionKind::Explore), "single call")]
    #[case(vec![call("send"), call("explore")], Some(TransactionKind::Send), "first call wins")]
    #[case(
        vec![CallDescriptor::new(felt_from_u64(0xf), "request_random"), call("explore")],
        Some(TransactionKind::Explore),
        "randomness request skipped"
    )]
    #[case(vec![call("mystery")], None, "unknown entrypoint")]
    #[case(vec![], None, "no calls")]
    fn test_transaction_kind(
        #[case] calls: Vec<CallDescriptor>,
        #[case] expected: Option<TransactionKind>,
        #[case] _description: &str,
    ) {
        let (executor, _) = executor(SlowLedger::new(Duration::ZERO), Duration::from_secs(10));
        assert_eq!(executor.transaction_kind(&calls), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_within_timeout() {
        let (executor, collector) = executor(SlowLedger::new(Duration::from_secs(2)), Duration::from_secs(10));

        let outcome = executor.execute_and_check(&account(), vec![call("explore")]).await.unwrap();
        assert!(matches!(outcome, TxOutcome::Confirmed(_)));
        assert_eq!(collector.kinds(), vec![EventKind::Complete]);

        let state = executor.sync_state();
        assert!(state.last_submitted_at.is_some());
        assert!(state.last_confirmed_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_to_pending_then_completes_in_background() {
        let (executor, collector) = executor(SlowLedger::new(Duration::from_secs(30)), Duration::from_secs(10));

        let started = tokio::time::Instant::now();
        let outcome = executor.execute_and_check(&account(), vec![call("explore")]).await.unwrap();
        assert_eq!(outcome, TxOutcome::Pending { tx_hash: felt_from_u64(1) });
        assert!(started.elapsed() >= Duration::from_secs(10));
        assert!(started.elapsed() < Duration::from_secs(30));
        assert_eq!(collector.kinds(), vec![EventKind::Pending]);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(collector.kinds(), vec![EventKind::Pending, EventKind::Complete]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_waits_synchronously() {
        let (executor, collector) = executor(SlowLedger::new(Duration::from_secs(60)), Duration::ZERO);

        let outcome = executor.execute_and_check(&account(), vec![call("explore")]).await.unwrap();
        assert!(matches!(outcome, TxOutcome::Confirmed(_)));
        assert_eq!(collector.kinds(), vec![EventKind::Complete]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revert_rejects_with_single_failure() {
        let ledger = SlowLedger { revert: true, ..SlowLedger::new(Duration::from_secs(1)) };
        let (executor, collector) = executor(ledger, Duration::from_secs(10));

        let err = executor
            .execute_and_check(&account(), vec![call("explore"), call("explore")])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Transaction failed with reason: paused");
        assert_eq!(collector.kinds(), vec![EventKind::Failed]);

        let events = collector.0.lock().unwrap();
        let meta = events.iter().find_map(DispatchEvent::meta).unwrap();
        assert_eq!(meta.call_count, Some(2));
        assert_eq!(meta.kind, Some(TransactionKind::Explore));
        assert_eq!(meta.tx_hash, Some(felt_from_u64(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_failure_is_not_raised() {
        let ledger = SlowLedger { revert: true, ..SlowLedger::new(Duration::from_secs(30)) };
        let (executor, collector) = executor(ledger, Duration::from_secs(10));

        let outcome = executor.execute_and_check(&account(), vec![call("explore")]).await.unwrap();
        assert!(outcome.is_pending());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(collector.kinds(), vec![EventKind::Pending, EventKind::Failed]);
    }

    #[rstest]
    #[case(1, false, false, 10, SendState::Confirmed, "confirmed in time")]
    #[case(1, true, false, 10, SendState::Failed, "reverted in time")]
    #[case(1, false, true, 10, SendState::Failed, "receipt query failed in time")]
    #[case(60, false, false, 0, SendState::Confirmed, "zero timeout confirms")]
    #[case(60, true, false, 0, SendState::Failed, "zero timeout reverts")]
    #[case(60, false, true, 0, SendState::Failed, "zero timeout receipt query fails")]
    #[case(30, false, false, 10, SendState::WaitingTimedOut, "pending hands off to background")]
    #[tokio::test(start_paused = true)]
    async fn test_final_send_state(
        #[case] delay_secs: u64,
        #[case] revert: bool,
        #[case] fail_wait: bool,
        #[case] timeout_secs: u64,
        #[case] expected: SendState,
        #[case] _description: &str,
    ) {
        let ledger =
            SlowLedger { revert, fail_wait, ..SlowLedger::new(Duration::from_secs(delay_secs)) };
        let (executor, _) = executor(ledger, Duration::from_secs(timeout_secs));

        let mut state = SendState::default();
        let result = executor.execute_tracked(&account(), vec![call("explore")], &mut state).await;

        assert_eq!(state, expected);
        assert_eq!(result.is_ok(), expected != SendState::Failed);
    }

    #[tokio::test]
    async fn test_rejected_submission_ends_failed() {
        let (executor, _) = executor(SlowLedger::new(Duration::ZERO), Duration::from_secs(10));

        let mut state = SendState::default();
        let result = executor.execute_tracked(&account(), Vec::new(), &mut state).await;

        assert!(result.is_err());
        assert_eq!(state, SendState::Failed);
    }

    #[tokio::test]
    async fn test_empty_submission_fails_and_emits() {
        let (executor, collector) = executor(SlowLedger::new(Duration::ZERO), Duration::from_secs(10));

        let err = executor.execute_and_check(&account(), Vec::new()).await.unwrap_err();
        assert!(matches!(err, TxError::Submission(_)));
        assert_eq!(collector.kinds(), vec![EventKind::Failed]);
        // The submission heartbeat precedes the network call.
        assert!(executor.sync_state().last_submitted_at.is_some());
    }

    #[tokio::test]
    async fn test_read_call_leaves_no_trace() {
        let (executor, collector) = executor(SlowLedger::new(Duration::ZERO), Duration::from_secs(10));

        let result = executor.call(&call("get_realm").with_arg(U256::from(1))).await.unwrap();
        assert_eq!(result, vec![U256::from("s1_eternum".len()), U256::from(1)]);
        assert!(collector.0.lock().unwrap().is_empty());
        assert_eq!(executor.sync_state(), SyncState::default());
    }

    #[tokio::test]
    async fn test_heartbeats_reach_the_event_bus() {
        let (executor, collector) = executor(SlowLedger::new(Duration::ZERO), Duration::from_secs(10));
        executor.execute_and_check(&account(), vec![call("explore")]).await.unwrap();

        let heartbeats = collector
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.kind() == EventKind::Heartbeat)
            .count();
        assert_eq!(heartbeats, 2);
    }

    #[test]
    fn test_with_randomness_uses_configured_provider() {
        let (executor, _) = executor(SlowLedger::new(Duration::ZERO), Duration::from_secs(10));
        let calls = executor.with_randomness(&account(), call("explore"), felt_from_u64(0xc)).unwrap();
        assert_eq!(calls[0].contract_address, felt_from_u64(0xf));
        assert_eq!(executor.transaction_kind(&calls), Some(TransactionKind::Explore));
    }
}
