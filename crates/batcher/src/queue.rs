//! The batching scheduler.
//!
//! Callers hand [`PendingCall`]s to a [`TxQueue`] and each get their own
//! answer back, no matter how the call was grouped. A processing pass takes
//! everything queued, groups it by batch id and signer, cuts every group into
//! chunks that respect both the queue's hard cap and the cost classifier's
//! limits, and submits the chunks one after another. A chunk of one call is
//! submitted as is; a larger chunk is flattened into one transaction and its
//! result is handed to every member.

use std::{
    collections::HashMap,
    ops::Range,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use courier_primitives::{Account, CallDescriptor};
use courier_txmgr::{TxError, TxOutcome};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::{Dispatch, PendingCall, QueueConfig, QueueMetrics};

/// What each caller eventually receives.
pub type QueueResult = Result<TxOutcome, TxError>;

struct Queued {
    call: PendingCall,
    responder: oneshot::Sender<QueueResult>,
}

#[derive(Default)]
struct QueueState {
    items: Vec<Queued>,
    processing: bool,
    debounce: Option<JoinHandle<()>>,
    generation: u64,
}

struct Inner<D> {
    dispatcher: D,
    config: QueueConfig,
    state: Mutex<QueueState>,
    metrics: Mutex<QueueMetrics>,
}

/// Groups pending calls into as few transactions as their limits allow.
///
/// Cloning is cheap and every clone feeds the same queue. Only one processing
/// pass runs at a time; calls queued during a pass are picked up by the same
/// pass before it finishes.
pub struct TxQueue<D> {
    inner: Arc<Inner<D>>,
}

impl<D> Clone for TxQueue<D> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<D> std::fmt::Debug for TxQueue<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock_state();
        f.debug_struct("TxQueue")
            .field("config", &self.inner.config)
            .field("queued", &state.items.len())
            .field("processing", &state.processing)
            .finish_non_exhaustive()
    }
}

impl<D> TxQueue<D> {
    /// Creates a queue that submits through `dispatcher`.
    pub fn new(dispatcher: D, config: QueueConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                dispatcher,
                config,
                state: Mutex::default(),
                metrics: Mutex::default(),
            }),
        }
    }

    /// Returns the queue configuration.
    pub fn config(&self) -> &QueueConfig {
        &self.inner.config
    }

    /// Returns the dispatcher every chunk is submitted through.
    pub fn dispatcher(&self) -> &D {
        &self.inner.dispatcher
    }

    /// Returns the number of calls waiting for the next pass.
    pub fn len(&self) -> usize {
        self.inner.lock_state().items.len()
    }

    /// Returns `true` if no call is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` while a processing pass is running.
    pub fn is_processing(&self) -> bool {
        self.inner.lock_state().processing
    }

    /// Returns a snapshot of the queue counters.
    pub fn metrics(&self) -> QueueMetrics {
        self.inner.metrics.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl<D: Dispatch> TxQueue<D> {
    /// Queues `call` and waits for its result.
    ///
    /// # Errors
    ///
    /// Returns the error of the transaction the call was placed in, or
    /// [`TxError::QueueClosed`] if the queue dropped the call unanswered.
    pub async fn enqueue(&self, call: PendingCall) -> QueueResult {
        self.submit(call).await.unwrap_or(Err(TxError::QueueClosed))
    }

    /// Queues `call` and returns the channel its result arrives on.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, call: PendingCall) -> oneshot::Receiver<QueueResult> {
        let (responder, receiver) = oneshot::channel();
        self.inner.lock_state().items.push(Queued { call, responder });
        self.inner.lock_metrics().record_enqueue();
        self.schedule();
        receiver
    }

    fn schedule(&self) {
        let mut state = self.inner.lock_state();
        if state.processing {
            return;
        }
        if let Some(timer) = state.debounce.take() {
            timer.abort();
        }
        state.generation += 1;

        let config = &self.inner.config;
        if state.items.len() >= config.max_batch_size || config.batch_delay.is_zero() {
            state.processing = true;
            drop(state);
            tokio::spawn(Arc::clone(&self.inner).drain());
            return;
        }

        let generation = state.generation;
        let delay = config.batch_delay;
        let inner = Arc::clone(&self.inner);
        state.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut state = inner.lock_state();
                if state.generation != generation || state.processing {
                    return;
                }
                state.debounce = None;
                state.processing = true;
            }
            inner.drain().await;
        }));
    }
}

impl<D> Inner<D> {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_metrics(&self) -> MutexGuard<'_, QueueMetrics> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: Dispatch> Inner<D> {
    async fn drain(self: Arc<Self>) {
        let mut guard = ProcessingGuard { state: &self.state, armed: true };
        loop {
            let items = {
                let mut state = self.lock_state();
                if state.items.is_empty() {
                    state.processing = false;
                    guard.armed = false;
                    return;
                }
                std::mem::take(&mut state.items)
            };
            self.lock_metrics().record_pass();
            self.process(items).await;
        }
    }

    async fn process(&self, items: Vec<Queued>) {
        for (batch_id, group) in partition(items) {
            let caps: Vec<usize> = group
                .iter()
                .map(|queued| {
                    let limit = queued.call.batch_limit(&self.dispatcher, &self.config.limits);
                    self.config.chunk_cap(limit)
                })
                .collect();

            let mut members = group.into_iter();
            for range in plan_chunks(&caps) {
                let chunk: Vec<Queued> = members.by_ref().take(range.len()).collect();
                self.submit_chunk(batch_id.as_deref(), chunk).await;
            }
        }
    }

    async fn submit_chunk(&self, batch_id: Option<&str>, mut chunk: Vec<Queued>) {
        let size = chunk.len();
        if size == 1 {
            let Some(Queued { call, responder }) = chunk.pop() else { return };
            tracing::debug!(batch_id, calls = call.len(), "dispatching single call");
            let result = call.execute(&self.dispatcher).await;
            self.lock_metrics().record_submission(1, result.is_err());
            let _ = responder.send(result);
            return;
        }

        let signer: Account = chunk[0].call.signer.clone();
        let mut responders = Vec::with_capacity(size);
        let mut calls: Vec<CallDescriptor> = Vec::new();
        for Queued { call, responder } in chunk {
            calls.extend(call.calls);
            responders.push(responder);
        }

        tracing::debug!(batch_id, members = size, calls = calls.len(), "dispatching merged chunk");
        let result = self.dispatcher.dispatch(&signer, calls).await;
        if let Err(err) = &result {
            tracing::debug!(batch_id, members = size, error = %err, "merged chunk failed");
        }
        self.lock_metrics().record_submission(size, result.is_err());

        for responder in responders {
            let _ = responder.send(result.clone());
        }
    }
}

/// Resets the processing flag if a pass ends without draining the queue,
/// so that the next call can start a fresh pass.
struct ProcessingGuard<'a> {
    state: &'a Mutex<QueueState>,
    armed: bool,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.lock().unwrap_or_else(PoisonError::into_inner).processing = false;
        }
    }
}

/// Splits `items` into groups sharing a batch id and signer, in order of
/// first appearance. Members keep their arrival order.
fn partition(items: Vec<Queued>) -> Vec<(Option<String>, Vec<Queued>)> {
    let mut index: HashMap<(Option<String>, Account), usize> = HashMap::new();
    let mut groups: Vec<(Option<String>, Vec<Queued>)> = Vec::new();
    for queued in items {
        let key = (queued.call.batch_id.clone(), queued.call.signer.clone());
        match index.get(&key) {
            Some(&at) => groups[at].1.push(queued),
            None => {
                index.insert(key, groups.len());
                groups.push((queued.call.batch_id.clone(), vec![queued]));
            }
        }
    }
    groups
}

/// Cuts a group into consecutive chunks. `caps[i]` is the largest chunk
/// member `i` may be part of; a chunk grows while every member's cap admits
/// its new size.
fn plan_chunks(caps: &[usize]) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut cap = usize::MAX;
    for (i, &member_cap) in caps.iter().enumerate() {
        let tighter = cap.min(member_cap.max(1));
        if i > start && i - start + 1 > tighter {
            chunks.push(start..i);
            start = i;
            cap = member_cap.max(1);
        } else {
            cap = tighter;
        }
    }
    if start < caps.len() {
        chunks.push(start..caps.len());
    }
    chunks
}
