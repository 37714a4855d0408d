//! Lifecycle events and their observers.
//!
//! The [`DispatchObserver`] trait lets components react to transaction
//! lifecycle events without coupling to the executor. Observers subscribe to
//! an [`EventBus`], optionally for a single [`EventKind`], and are called
//! synchronously. They should not block.

use std::{
    fmt,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use courier_primitives::{Receipt, TransactionKind, TxHash};

use crate::heartbeat::{Heartbeat, HeartbeatListener};

/// Metadata attached to every transaction event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxMeta {
    /// Kind of the transaction, derived from its first non-randomness call.
    pub kind: Option<TransactionKind>,
    /// Number of calls submitted. Unset when the calls are not known, as for
    /// a wait on an already submitted hash.
    pub call_count: Option<usize>,
    /// Transaction hash, once known.
    pub tx_hash: Option<TxHash>,
}

impl TxMeta {
    /// Creates metadata for a transaction of `call_count` calls.
    pub fn new(kind: Option<TransactionKind>, call_count: usize) -> Self {
        Self { kind, call_count: Some(call_count), tx_hash: None }
    }

    /// Returns a copy carrying `tx_hash`.
    #[must_use]
    pub fn with_tx_hash(mut self, tx_hash: TxHash) -> Self {
        self.tx_hash = Some(tx_hash);
        self
    }
}

/// Events emitted by the dispatch engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchEvent {
    /// The receipt did not arrive within the confirmation timeout.
    TransactionPending {
        /// Hash of the submitted transaction.
        tx_hash: TxHash,
        /// Transaction metadata.
        meta: TxMeta,
    },
    /// The transaction executed successfully.
    TransactionComplete {
        /// The receipt.
        receipt: Arc<Receipt>,
        /// Transaction metadata.
        meta: TxMeta,
    },
    /// Submission, the receipt wait or execution failed.
    TransactionFailed {
        /// Failure message.
        message: String,
        /// Transaction metadata.
        meta: TxMeta,
    },
    /// A heartbeat was recorded.
    Heartbeat(Heartbeat),
}

impl DispatchEvent {
    /// Returns the kind of this event.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::TransactionPending { .. } => EventKind::Pending,
            Self::TransactionComplete { .. } => EventKind::Complete,
            Self::TransactionFailed { .. } => EventKind::Failed,
            Self::Heartbeat(_) => EventKind::Heartbeat,
        }
    }

    /// Returns the transaction metadata, if this is a transaction event.
    pub const fn meta(&self) -> Option<&TxMeta> {
        match self {
            Self::TransactionPending { meta, .. }
            | Self::TransactionComplete { meta, .. }
            | Self::TransactionFailed { meta, .. } => Some(meta),
            Self::Heartbeat(_) => None,
        }
    }
}

/// Event kinds an observer can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`DispatchEvent::TransactionPending`].
    Pending,
    /// [`DispatchEvent::TransactionComplete`].
    Complete,
    /// [`DispatchEvent::TransactionFailed`].
    Failed,
    /// [`DispatchEvent::Heartbeat`].
    Heartbeat,
}

impl EventKind {
    /// Returns the event name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pending => "transactionPending",
            Self::Complete => "transactionComplete",
            Self::Failed => "transactionFailed",
            Self::Heartbeat => "providerHeartbeat",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Observer that receives dispatch events.
pub trait DispatchObserver: Send + Sync {
    /// Called for every event the observer is subscribed to.
    fn on_event(&self, event: &DispatchEvent);
}

/// A no-op observer for testing or when no observation is needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {
    fn on_event(&self, _event: &DispatchEvent) {}
}

/// Adapter that forwards events to an async channel.
#[derive(Debug)]
pub struct AsyncObserver {
    tx: tokio::sync::mpsc::UnboundedSender<DispatchEvent>,
}

impl AsyncObserver {
    /// Create a new async observer and its receiver.
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<DispatchEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Default for AsyncObserver {
    fn default() -> Self {
        Self::new().0
    }
}

impl DispatchObserver for AsyncObserver {
    fn on_event(&self, event: &DispatchEvent) {
        // Receiver may have been dropped
        let _ = self.tx.send(event.clone());
    }
}

/// Observer that logs events via tracing.
///
/// - `info` for pending and completed transactions
/// - `trace` for heartbeats
/// - `error` for failures
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl DispatchObserver for LoggingObserver {
    fn on_event(&self, event: &DispatchEvent) {
        match event {
            DispatchEvent::TransactionPending { tx_hash, meta } => {
                tracing::info!(tx = %tx_hash, kind = ?meta.kind, calls = ?meta.call_count, "transaction pending");
            }
            DispatchEvent::TransactionComplete { receipt, meta } => {
                tracing::info!(
                    tx = %receipt.tx_hash,
                    block = ?receipt.block_number,
                    kind = ?meta.kind,
                    calls = ?meta.call_count,
                    "transaction complete"
                );
            }
            DispatchEvent::TransactionFailed { message, meta } => {
                tracing::error!(tx = ?meta.tx_hash, kind = ?meta.kind, message = %message, "transaction failed");
            }
            DispatchEvent::Heartbeat(heartbeat) => {
                tracing::trace!(
                    source = %heartbeat.source,
                    timestamp_ms = heartbeat.timestamp_ms,
                    block = ?heartbeat.block_number,
                    "heartbeat"
                );
            }
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    filter: Option<EventKind>,
    observer: Arc<dyn DispatchObserver>,
}

/// Fan-out of dispatch events to subscribed observers.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus").field("subscribers", &self.subscriber_count()).finish_non_exhaustive()
    }
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `observer` to events of `filter`, or to every event when `None`.
    pub fn subscribe(
        &self,
        filter: Option<EventKind>,
        observer: Arc<dyn DispatchObserver>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Subscription { id, filter, observer });
        id
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.lock();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    /// Returns the number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Delivers `event` to every matching observer.
    pub fn emit(&self, event: &DispatchEvent) {
        let kind = event.kind();
        let observers: Vec<_> = self
            .lock()
            .iter()
            .filter(|s| s.filter.is_none_or(|filter| filter == kind))
            .map(|s| Arc::clone(&s.observer))
            .collect();

        // Observers may subscribe or unsubscribe from inside the callback.
        for observer in observers {
            observer.on_event(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscription>> {
        self.subscriptions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HeartbeatListener for EventBus {
    fn on_heartbeat(&self, heartbeat: &Heartbeat) {
        self.emit(&DispatchEvent::Heartbeat(heartbeat.clone()));
    }
}
