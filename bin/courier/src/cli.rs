//! CLI argument definitions for the courier binary

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use courier_batcher::{PendingCall, QueueConfig};
use courier_local::{InMemoryLedger, LedgerScript, LocalError};
use courier_primitives::{Account, CallDescriptor, U256, felt_from_u64};

/// Address every demo call targets.
const DEMO_SYSTEM: u64 = 0x5157;

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "courier", about = "Batch game transactions against an in-memory ledger")]
pub(crate) struct Args {
    /// Verbosity level (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Number of calls to enqueue
    #[arg(long, default_value = "6")]
    pub calls: u64,

    /// Entrypoint every call invokes
    #[arg(long, default_value = "explorer_move")]
    pub entrypoint: String,

    /// Batch id shared by all calls (none by default)
    #[arg(long)]
    pub batch_id: Option<String>,

    /// Hard cap on calls merged into one transaction
    #[arg(long, default_value = "2")]
    pub max_batch_size: usize,

    /// Debounce window in milliseconds
    #[arg(long, default_value = "0")]
    pub batch_delay_ms: u64,

    /// Receipt latency of the in-memory ledger in milliseconds
    #[arg(long, default_value = "0")]
    pub latency_ms: u64,

    /// Confirmation timeout in milliseconds (0 waits indefinitely)
    #[arg(long, default_value = "10000")]
    pub timeout_ms: u64,

    /// Revert every n-th submission (0 never reverts)
    #[arg(long, default_value = "0")]
    pub revert_every: u64,

    /// JSON ledger script, replaces --latency-ms and --revert-every
    #[arg(long, env = "COURIER_LEDGER_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Buffer everything in a manual batch session and flush it at the end
    #[arg(long)]
    pub manual: bool,

    /// Entrypoints that bypass the manual batch session
    #[arg(long, value_delimiter = ',')]
    pub immediate: Vec<String>,
}

impl Args {
    /// Builds the ledger described by the arguments.
    pub(crate) fn ledger(&self) -> Result<InMemoryLedger, LocalError> {
        if let Some(path) = &self.script {
            return Ok(LedgerScript::load(path)?.into_ledger());
        }
        Ok(InMemoryLedger::new()
            .with_latency(Duration::from_millis(self.latency_ms))
            .with_revert_every(self.revert_every))
    }

    /// Builds the queue configuration.
    pub(crate) fn queue_config(&self) -> QueueConfig {
        QueueConfig::builder()
            .max_batch_size(self.max_batch_size)
            .batch_delay(Duration::from_millis(self.batch_delay_ms))
            .build()
    }

    /// Returns the confirmation timeout.
    pub(crate) const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Builds the `index`th demo call.
    pub(crate) fn pending_call(&self, signer: &Account, index: u64) -> PendingCall {
        let call = CallDescriptor::new(felt_from_u64(DEMO_SYSTEM), self.entrypoint.as_str())
            .with_arg(U256::from(index));
        let pending = PendingCall::single(signer.clone(), call);
        match &self.batch_id {
            Some(batch_id) => pending.with_batch_id(batch_id.as_str()),
            None => pending,
        }
    }
}
