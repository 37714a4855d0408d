//! Courier demo binary.
//!
//! Enqueues a burst of game calls, lets the batching scheduler merge them and
//! submits them to a scripted in-memory ledger, then prints what every caller
//! got back together with the final sync status.

mod cli;

use std::sync::Arc;

use clap::Parser;
use cli::Args;
use courier_batcher::{SessionDispatcher, TxQueue};
use courier_primitives::{Account, felt_from_u64};
use courier_txmgr::{HeartbeatManager, LoggingObserver, TxExecutor, TxManagerConfig, TxOutcome};
use eyre::Result;
use tokio::task::JoinSet;
use tracing::info;

/// Account the demo signs with.
const DEMO_SIGNER: u64 = 0xacc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    courier_cli::init_tracing(args.verbose);

    let ledger = Arc::new(args.ledger()?);
    let config = TxManagerConfig::builder().confirmation_timeout(args.timeout()).build();
    let executor = TxExecutor::new(Arc::clone(&ledger), config);
    executor.events().subscribe(None, Arc::new(LoggingObserver));

    let sessions = Arc::new(SessionDispatcher::new(executor.clone()));
    let queue = TxQueue::new(Arc::clone(&sessions), args.queue_config());
    let signer = Account::new(felt_from_u64(DEMO_SIGNER));

    if args.manual {
        sessions.begin_batch(signer.clone(), args.immediate.iter().cloned());
    }

    info!(calls = args.calls, entrypoint = %args.entrypoint, manual = args.manual, "enqueueing");
    let mut callers = JoinSet::new();
    for index in 0..args.calls {
        let queue = queue.clone();
        let call = args.pending_call(&signer, index);
        callers.spawn(async move { (index, queue.enqueue(call).await) });
    }

    let mut results = Vec::new();
    while let Some(joined) = callers.join_next().await {
        results.push(joined?);
    }
    results.sort_by_key(|(index, _)| *index);

    for (index, result) in &results {
        match result {
            Ok(outcome) => println!("call {index:>3}: {}", describe(outcome)),
            Err(err) => println!("call {index:>3}: failed: {err}"),
        }
    }

    if args.manual {
        match sessions.end_batch(true).await {
            Ok(Some(outcome)) => println!("session flush: {}", describe(&outcome)),
            Ok(None) => println!("session flush: nothing buffered"),
            Err(err) => println!("session flush: failed: {err}"),
        }
    }

    let metrics = queue.metrics();
    println!(
        "submissions: {} ({} merged, {} failed), ledger attempts: {}",
        metrics.submissions,
        metrics.merged_submissions,
        metrics.failed_submissions,
        ledger.attempt_count()
    );

    let status = executor.desync_status(HeartbeatManager::DEFAULT_DESYNC_THRESHOLD);
    match status.elapsed_ms {
        Some(elapsed) => println!("desynced: {} (last signal {elapsed} ms ago)", status.is_desynced),
        None => println!("desynced: {} (no signal recorded)", status.is_desynced),
    }

    Ok(())
}

fn describe(outcome: &TxOutcome) -> String {
    match outcome {
        TxOutcome::Confirmed(receipt) => match receipt.block_number {
            Some(block) => format!("confirmed {} in block {block}", receipt.tx_hash),
            None => format!("confirmed {}", receipt.tx_hash),
        },
        TxOutcome::Pending { tx_hash } => format!("pending {tx_hash}"),
        TxOutcome::Queued => "queued in batch session".to_string(),
    }
}
