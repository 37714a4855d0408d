//! Manual batch sessions.
//!
//! A [`BatchSession`] sits in front of a dispatcher and buffers every call it
//! receives until [`BatchSession::flush`] submits the buffer as one
//! transaction. Calls to entrypoints marked immediate bypass the buffer.
//! [`SessionDispatcher`] owns at most one active session and routes calls
//! through it while it is open.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use courier_primitives::{Account, CallDescriptor, TransactionKind};
use courier_txmgr::{TxError, TxOutcome};

use crate::Dispatch;

#[derive(Debug, Default)]
struct SessionState {
    buffer: Vec<CallDescriptor>,
    immediate: HashSet<String>,
    ended: bool,
}

/// A manual batch bound to one signer.
pub struct BatchSession<D> {
    signer: Account,
    dispatcher: D,
    state: Mutex<SessionState>,
}

impl<D> std::fmt::Debug for BatchSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("BatchSession")
            .field("signer", &self.signer)
            .field("buffered", &state.buffer.len())
            .field("immediate", &state.immediate)
            .field("ended", &state.ended)
            .finish_non_exhaustive()
    }
}

impl<D> BatchSession<D> {
    /// Opens a session for `signer`. Calls to any of `immediate` are never
    /// buffered.
    pub fn new<I, S>(dispatcher: D, signer: Account, immediate: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = SessionState {
            immediate: immediate.into_iter().map(Into::into).collect(),
            ..SessionState::default()
        };
        Self { signer, dispatcher, state: Mutex::new(state) }
    }

    /// Returns the signer buffered calls are submitted under.
    pub const fn signer(&self) -> &Account {
        &self.signer
    }

    /// Returns `true` until the session is ended.
    pub fn is_batching(&self) -> bool {
        !self.lock().ended
    }

    /// Returns a copy of the buffered calls, in arrival order.
    pub fn queued_calls(&self) -> Vec<CallDescriptor> {
        self.lock().buffer.clone()
    }

    /// Returns `true` if `entrypoint` bypasses the buffer.
    pub fn is_immediate(&self, entrypoint: &str) -> bool {
        self.lock().immediate.contains(entrypoint)
    }

    /// Adds entrypoints to the immediate set. No-op once ended.
    pub fn mark_immediate_entrypoints<I, S>(&self, entrypoints: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.lock();
        if state.ended {
            return;
        }
        state.immediate.extend(entrypoints.into_iter().map(Into::into));
    }

    /// Removes entrypoints from the immediate set, or clears it when
    /// `entrypoints` is `None`. No-op once ended.
    pub fn unmark_immediate_entrypoints<I, S>(&self, entrypoints: Option<I>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.lock();
        if state.ended {
            return;
        }
        match entrypoints {
            Some(entrypoints) => {
                for entrypoint in entrypoints {
                    state.immediate.remove(entrypoint.as_ref());
                }
            }
            None => state.immediate.clear(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: Dispatch> BatchSession<D> {
    /// Submits everything buffered as one transaction under the session
    /// signer. Returns `Ok(None)` without submitting when the buffer is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's error. The buffered calls are dropped either
    /// way.
    pub async fn flush(&self) -> Result<Option<TxOutcome>, TxError> {
        let calls = std::mem::take(&mut self.lock().buffer);
        if calls.is_empty() {
            return Ok(None);
        }
        tracing::debug!(signer = %self.signer.address, calls = calls.len(), "flushing batch session");
        self.dispatcher.dispatch(&self.signer, calls).await.map(Some)
    }

    /// Ends the session, flushing first when `flush` is set. Later calls
    /// through this session go straight to the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns the flush error. The session is ended regardless.
    pub async fn end(&self, flush: bool) -> Result<Option<TxOutcome>, TxError> {
        let calls = {
            let mut state = self.lock();
            state.ended = true;
            state.immediate.clear();
            std::mem::take(&mut state.buffer)
        };
        if !flush {
            if !calls.is_empty() {
                tracing::debug!(discarded = calls.len(), "batch session ended without flushing");
            }
            return Ok(None);
        }
        if calls.is_empty() {
            return Ok(None);
        }
        self.dispatcher.dispatch(&self.signer, calls).await.map(Some)
    }
}

#[async_trait]
impl<D: Dispatch> Dispatch for BatchSession<D> {
    async fn dispatch(
        &self,
        account: &Account,
        calls: Vec<CallDescriptor>,
    ) -> Result<TxOutcome, TxError> {
        {
            let mut state = self.lock();
            let passthrough = state.ended
                || calls.iter().any(|call| state.immediate.contains(&call.entrypoint));
            if !passthrough {
                if *account != self.signer {
                    return Err(TxError::SignerMismatch);
                }
                tracing::trace!(calls = calls.len(), "buffering calls");
                state.buffer.extend(calls);
                return Ok(TxOutcome::Queued);
            }
        }
        self.dispatcher.dispatch(account, calls).await
    }

    fn transaction_kind(&self, calls: &[CallDescriptor]) -> Option<TransactionKind> {
        self.dispatcher.transaction_kind(calls)
    }
}

/// A dispatcher that can open and close a manual batch session in front of
/// the one it wraps.
pub struct SessionDispatcher<D> {
    inner: Arc<D>,
    active: Mutex<Option<Arc<BatchSession<Arc<D>>>>>,
}

impl<D> std::fmt::Debug for SessionDispatcher<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionDispatcher")
            .field("active", &self.active_session())
            .finish_non_exhaustive()
    }
}

impl<D> SessionDispatcher<D> {
    /// Wraps `dispatcher`.
    pub fn new(dispatcher: D) -> Self {
        Self::from_arc(Arc::new(dispatcher))
    }

    /// Wraps an already shared dispatcher.
    pub const fn from_arc(dispatcher: Arc<D>) -> Self {
        Self { inner: dispatcher, active: Mutex::new(None) }
    }

    /// Returns the wrapped dispatcher.
    pub const fn inner(&self) -> &Arc<D> {
        &self.inner
    }

    /// Opens a session for `signer`. If one is already open it is returned
    /// unchanged and the arguments are ignored.
    pub fn begin_batch<I, S>(&self, signer: Account, immediate: I) -> Arc<BatchSession<Arc<D>>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut active = self.lock();
        if let Some(session) = active.as_ref() {
            tracing::debug!("batch session already active");
            return Arc::clone(session);
        }
        let session = Arc::new(BatchSession::new(Arc::clone(&self.inner), signer, immediate));
        *active = Some(Arc::clone(&session));
        session
    }

    /// Returns the open session, if any.
    pub fn active_session(&self) -> Option<Arc<BatchSession<Arc<D>>>> {
        self.lock().clone()
    }

    /// Returns `true` while a session is open.
    pub fn is_batching(&self) -> bool {
        self.lock().is_some()
    }

    /// Adds entrypoints to the open session's immediate set. No-op without a
    /// session.
    pub fn mark_immediate_entrypoints<I, S>(&self, entrypoints: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(session) = self.active_session() {
            session.mark_immediate_entrypoints(entrypoints);
        }
    }

    /// Removes entrypoints from the open session's immediate set, or clears
    /// it when `entrypoints` is `None`. No-op without a session.
    pub fn unmark_immediate_entrypoints<I, S>(&self, entrypoints: Option<I>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(session) = self.active_session() {
            session.unmark_immediate_entrypoints(entrypoints);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<BatchSession<Arc<D>>>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: Dispatch> SessionDispatcher<D> {
    /// Flushes the open session. Returns `Ok(None)` without a session or
    /// with an empty buffer.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's error.
    pub async fn flush_batch(&self) -> Result<Option<TxOutcome>, TxError> {
        match self.active_session() {
            Some(session) => session.flush().await,
            None => Ok(None),
        }
    }

    /// Closes the open session, flushing first when `flush` is set.
    ///
    /// # Errors
    ///
    /// Returns the flush error. The session is closed regardless.
    pub async fn end_batch(&self, flush: bool) -> Result<Option<TxOutcome>, TxError> {
        let Some(session) = self.lock().take() else {
            return Ok(None);
        };
        session.end(flush).await
    }
}

#[async_trait]
impl<D: Dispatch> Dispatch for SessionDispatcher<D> {
    async fn dispatch(
        &self,
        account: &Account,
        calls: Vec<CallDescriptor>,
    ) -> Result<TxOutcome, TxError> {
        match self.active_session() {
            Some(session) => session.dispatch(account, calls).await,
            None => self.inner.dispatch(account, calls).await,
        }
    }

    fn transaction_kind(&self, calls: &[CallDescriptor]) -> Option<TransactionKind> {
        self.inner.transaction_kind(calls)
    }
}
