//! End-to-end tests of the executor against the in-memory ledger.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use courier_local::{Behavior, InMemoryLedger};
use courier_primitives::{Account, CallDescriptor, TransactionKind, felt_from_u64};
use courier_txmgr::{
    DEFAULT_L2_GAS_BOOST, DispatchEvent, DispatchObserver, EventKind, HeartbeatManager,
    TxError, TxExecutor, TxManagerConfig, TxOutcome,
};
use rstest::rstest;

#[derive(Default)]
struct Collector(Mutex<Vec<DispatchEvent>>);

impl DispatchObserver for Collector {
    fn on_event(&self, event: &DispatchEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

impl Collector {
    fn count(&self, kind: EventKind) -> usize {
        self.0.lock().unwrap().iter().filter(|event| event.kind() == kind).count()
    }

    fn failure_messages(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                DispatchEvent::TransactionFailed { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

fn setup(
    ledger: InMemoryLedger,
    timeout: Duration,
) -> (Arc<InMemoryLedger>, TxExecutor<InMemoryLedger>, Arc<Collector>) {
    let ledger = Arc::new(ledger);
    let config = TxManagerConfig::builder().confirmation_timeout(timeout).build();
    let executor = TxExecutor::new(Arc::clone(&ledger), config);
    let collector = Arc::new(Collector::default());
    executor.events().subscribe(None, collector.clone());
    (ledger, executor, collector)
}

fn account() -> Account {
    Account::new(felt_from_u64(0xacc))
}

fn explorer_move() -> CallDescriptor {
    CallDescriptor::new(felt_from_u64(0x10), "explorer_move")
}

#[tokio::test]
async fn clean_confirmation_emits_one_complete_and_advances_heartbeat() {
    let (_, executor, collector) = setup(InMemoryLedger::new(), Duration::from_secs(10));
    assert!(executor.desync_status(HeartbeatManager::DEFAULT_DESYNC_THRESHOLD).is_desynced);

    let outcome = executor.execute_and_check(&account(), vec![explorer_move()]).await.unwrap();

    let TxOutcome::Confirmed(receipt) = outcome else { panic!("expected confirmation") };
    assert_eq!(receipt.tx_hash, felt_from_u64(1));
    assert_eq!(collector.count(EventKind::Complete), 1);
    assert_eq!(collector.count(EventKind::Failed), 0);

    let state = executor.sync_state();
    assert!(state.last_confirmed_at.is_some());
    assert_eq!(state.last_block_number, receipt.block_number);
    assert!(!executor.desync_status(HeartbeatManager::DEFAULT_DESYNC_THRESHOLD).is_desynced);
}

#[rstest]
#[case(Behavior::Revert(Some("Not enough stamina".to_string())), "Transaction failed with reason: Not enough stamina")]
#[case(Behavior::Revert(None), "Transaction failed with reason: Unknown revert reason")]
#[case(
    Behavior::FailWait("gateway timeout".to_string()),
    "Transaction failed while waiting for confirmation: RPC error: gateway timeout"
)]
#[case(
    Behavior::Reject("Account balance is insufficient".to_string()),
    "Transaction failed to submit: Transaction rejected: Account balance is insufficient"
)]
#[tokio::test]
async fn terminal_failures_reject_and_emit_once(#[case] behavior: Behavior, #[case] message: &str) {
    let ledger = InMemoryLedger::new();
    ledger.push_behavior(behavior);
    let (_, executor, collector) = setup(ledger, Duration::from_secs(10));

    let err = executor.execute_and_check(&account(), vec![explorer_move()]).await.unwrap_err();

    assert_eq!(err.to_string(), message);
    assert_eq!(collector.failure_messages(), vec![message.to_string()]);
    assert_eq!(collector.count(EventKind::Complete), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_receipt_yields_pending_then_background_complete() {
    let ledger = InMemoryLedger::new().with_latency(Duration::from_secs(25));
    let (_, executor, collector) = setup(ledger, Duration::from_secs(10));

    let started = tokio::time::Instant::now();
    let outcome = executor.execute_and_check(&account(), vec![explorer_move()]).await.unwrap();

    assert_eq!(outcome, TxOutcome::Pending { tx_hash: felt_from_u64(1) });
    assert!(started.elapsed() < Duration::from_secs(11));
    assert_eq!(collector.count(EventKind::Pending), 1);
    assert_eq!(collector.count(EventKind::Complete), 0);

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(collector.count(EventKind::Complete), 1);
    assert!(executor.sync_state().last_confirmed_at.is_some());
}

#[tokio::test]
async fn multi_call_metadata_skips_nothing_without_provider() {
    let (ledger, executor, collector) = setup(InMemoryLedger::new(), Duration::from_secs(10));
    let calls = vec![CallDescriptor::new(felt_from_u64(0x20), "create_order"), explorer_move()];

    executor.execute_and_check(&account(), calls.clone()).await.unwrap();

    assert_eq!(ledger.submissions()[0].calls, calls);
    let events = collector.0.lock().unwrap();
    let meta = events.iter().find_map(DispatchEvent::meta).unwrap();
    assert_eq!(meta.kind, Some(TransactionKind::CreateOrder));
    assert_eq!(meta.call_count, Some(2));
}

#[rstest]
#[case(10, DEFAULT_L2_GAS_BOOST)]
#[case(2_000_000_000, 2_000_000_000)]
#[tokio::test]
async fn submission_carries_adjusted_bounds(#[case] estimate: u64, #[case] submitted: u64) {
    let (ledger, executor, _) =
        setup(InMemoryLedger::new().with_l2_gas_estimate(estimate), Duration::from_secs(10));

    executor.execute_and_check(&account(), vec![explorer_move()]).await.unwrap();

    let submission = &ledger.submissions()[0];
    assert_eq!(submission.options.namespace, "s1_eternum");
    assert_eq!(submission.options.version, 3);
    assert_eq!(submission.options.resource_bounds.unwrap().l2_gas.max_amount, submitted);
}

#[tokio::test]
async fn wait_for_transaction_checks_a_known_hash() {
    let ledger = InMemoryLedger::new();
    ledger.push_behavior(Behavior::Revert(Some("late revert".to_string())));
    let (ledger, executor, _) = setup(ledger, Duration::from_secs(10));

    let options = courier_txmgr::SubmitOptions {
        namespace: "s1_eternum".to_string(),
        version: 3,
        resource_bounds: None,
    };
    let hash = courier_txmgr::LedgerClient::submit(ledger.as_ref(), &account(), &[explorer_move()], &options)
        .await
        .unwrap();

    let err = executor.wait_for_transaction(hash).await.unwrap_err();
    assert_eq!(err, TxError::Reverted { tx_hash: hash, reason: "late revert".to_string() });
}
