//! Heartbeat tracking and desync detection.
//!
//! Every recorded signal passes through one publish path that stamps the
//! per-source timestamp, remembers the most recent signal overall and notifies
//! the listener. [`HeartbeatManager::desync_status`] therefore reflects the
//! latest activity from any source.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use courier_primitives::TxHash;

/// Where a heartbeat came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeartbeatSource {
    /// A transaction is about to be submitted.
    Submitted,
    /// A transaction receipt arrived.
    Confirmed,
    /// The indexer stream observed chain activity.
    Stream,
    /// Injected manually, e.g. from a debug console.
    Synthetic,
}

impl HeartbeatSource {
    /// Returns the wire name of the source.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Confirmed => "confirmed",
            Self::Stream => "stream",
            Self::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for HeartbeatSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single activity signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heartbeat {
    /// Signal source.
    pub source: HeartbeatSource,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Block number, when known.
    pub block_number: Option<u64>,
    /// Transaction hash, when the signal concerns a transaction.
    pub tx_hash: Option<TxHash>,
}

/// Snapshot of the heartbeat state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncState {
    /// Last submission signal, in epoch milliseconds.
    pub last_submitted_at: Option<u64>,
    /// Last confirmation signal, in epoch milliseconds.
    pub last_confirmed_at: Option<u64>,
    /// Last stream signal, in epoch milliseconds.
    pub last_stream_at: Option<u64>,
    /// Highest-recency block number reported by any signal.
    pub last_block_number: Option<u64>,
    /// Most recent signal from any source.
    pub last_heartbeat: Option<Heartbeat>,
}

/// Result of a desync check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesyncStatus {
    /// `true` when the last signal is older than the threshold, or there is none.
    pub is_desynced: bool,
    /// Age of the last signal. `None` when nothing was ever recorded.
    pub elapsed_ms: Option<u64>,
    /// The signal the verdict is based on.
    pub last_heartbeat: Option<Heartbeat>,
}

/// Chain activity reported by the indexer stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamActivity {
    /// Block the activity belongs to.
    pub block_number: Option<u64>,
    /// When the activity happened. Defaults to now.
    pub timestamp_ms: Option<u64>,
}

/// Options for [`HeartbeatManager::simulate_heartbeat`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulatedHeartbeat {
    /// Signal source. Defaults to [`HeartbeatSource::Synthetic`].
    pub source: Option<HeartbeatSource>,
    /// Base timestamp. Defaults to now.
    pub timestamp_ms: Option<u64>,
    /// Shift applied to the base timestamp. Negative values age the signal.
    pub offset_ms: i64,
    /// Block number to report.
    pub block_number: Option<u64>,
    /// Transaction hash to report.
    pub tx_hash: Option<TxHash>,
}

/// Receives every published heartbeat.
///
/// Called synchronously on the recording task, outside any internal lock.
pub trait HeartbeatListener: Send + Sync {
    /// Called for each heartbeat.
    fn on_heartbeat(&self, heartbeat: &Heartbeat);
}

/// Tracks the most recent activity signal per source.
#[derive(Default)]
pub struct HeartbeatManager {
    state: Mutex<SyncState>,
    listener: Option<Arc<dyn HeartbeatListener>>,
}

impl fmt::Debug for HeartbeatManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeartbeatManager")
            .field("state", &self.sync_state())
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl HeartbeatManager {
    /// Default age after which the client is considered desynced.
    pub const DEFAULT_DESYNC_THRESHOLD: Duration = Duration::from_secs(10);

    /// Creates a manager with no listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager that forwards every heartbeat to `listener`.
    pub fn with_listener(listener: Arc<dyn HeartbeatListener>) -> Self {
        Self { state: Mutex::default(), listener: Some(listener) }
    }

    /// Records intent to submit a transaction.
    pub fn record_transaction_submission(&self) -> Heartbeat {
        self.publish(Heartbeat {
            source: HeartbeatSource::Submitted,
            timestamp_ms: now_ms(),
            block_number: None,
            tx_hash: None,
        })
    }

    /// Records a received receipt.
    pub fn record_transaction_confirmation(
        &self,
        tx_hash: TxHash,
        block_number: Option<u64>,
    ) -> Heartbeat {
        self.publish(Heartbeat {
            source: HeartbeatSource::Confirmed,
            timestamp_ms: now_ms(),
            block_number,
            tx_hash: Some(tx_hash),
        })
    }

    /// Records chain activity observed by the indexer stream.
    pub fn record_stream_activity(&self, activity: StreamActivity) -> Heartbeat {
        self.publish(Heartbeat {
            source: HeartbeatSource::Stream,
            timestamp_ms: activity.timestamp_ms.unwrap_or_else(now_ms),
            block_number: activity.block_number,
            tx_hash: None,
        })
    }

    /// Publishes a hand-crafted heartbeat through the regular path.
    pub fn simulate_heartbeat(&self, options: SimulatedHeartbeat) -> Heartbeat {
        let base = options.timestamp_ms.unwrap_or_else(now_ms);
        let timestamp_ms = base.saturating_add_signed(options.offset_ms);
        self.publish(Heartbeat {
            source: options.source.unwrap_or(HeartbeatSource::Synthetic),
            timestamp_ms,
            block_number: options.block_number,
            tx_hash: options.tx_hash,
        })
    }

    /// Returns the current snapshot.
    pub fn sync_state(&self) -> SyncState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Checks the latest signal against `threshold`.
    pub fn desync_status(&self, threshold: Duration) -> DesyncStatus {
        self.desync_status_at(threshold, now_ms())
    }

    /// Checks the latest signal against `threshold` as of `now_ms`.
    pub fn desync_status_at(&self, threshold: Duration, now_ms: u64) -> DesyncStatus {
        let last_heartbeat = self.sync_state().last_heartbeat;
        let Some(heartbeat) = last_heartbeat else {
            return DesyncStatus { is_desynced: true, elapsed_ms: None, last_heartbeat: None };
        };

        let elapsed = now_ms.saturating_sub(heartbeat.timestamp_ms);
        let threshold_ms = u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX);
        DesyncStatus {
            is_desynced: elapsed > threshold_ms,
            elapsed_ms: Some(elapsed),
            last_heartbeat: Some(heartbeat),
        }
    }

    fn publish(&self, heartbeat: Heartbeat) -> Heartbeat {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match heartbeat.source {
                HeartbeatSource::Submitted => state.last_submitted_at = Some(heartbeat.timestamp_ms),
                HeartbeatSource::Confirmed => state.last_confirmed_at = Some(heartbeat.timestamp_ms),
                HeartbeatSource::Stream => state.last_stream_at = Some(heartbeat.timestamp_ms),
                HeartbeatSource::Synthetic => {}
            }
            if heartbeat.block_number.is_some() {
                state.last_block_number = heartbeat.block_number;
            }
            state.last_heartbeat = Some(heartbeat.clone());
        }

        if let Some(listener) = &self.listener {
            listener.on_heartbeat(&heartbeat);
        }
        heartbeat
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
