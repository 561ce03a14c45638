//! A native I/O object guarded so that closing the handle aborts whatever
//! operation is in flight on it.

use std::future::Future;

use hostio_core::{BridgeError, BridgeResult};
use hostio_lifecycle::{HandleState, ResourceKind};
use tokio::sync::{Mutex, MutexGuard};

/// Native object `T` plus the handle state that governs it.
///
/// Operations lock the object, then race the native future against the
/// close token. A close during an operation makes that operation return
/// `Aborted`; the native object is dropped by `close` when idle, or by the
/// operation itself once it unwinds.
#[derive(Debug)]
pub struct AbortableIo<T> {
    state: HandleState,
    native: Mutex<Option<T>>,
}

impl<T> AbortableIo<T> {
    /// Wrap `native` in an unmanaged (never keep-alive) handle.
    pub fn new(kind: ResourceKind, native: T) -> Self {
        Self::with_state(HandleState::unmanaged(kind), native)
    }

    pub fn with_state(state: HandleState, native: T) -> Self {
        Self {
            state,
            native: Mutex::new(Some(native)),
        }
    }

    pub fn state(&self) -> &HandleState {
        &self.state
    }

    /// Lock the native object for one operation.
    pub async fn acquire(&self) -> BridgeResult<NativeGuard<'_, T>> {
        self.state.ensure_open()?;
        let guard = self.native.lock().await;
        NativeGuard::new(&self.state, guard)
    }

    /// Lock without waiting, for blocking twins. Fails with an I/O error
    /// while an async operation holds the object.
    pub fn try_acquire(&self, op: &str) -> BridgeResult<NativeGuard<'_, T>> {
        self.state.ensure_open()?;
        let guard = self
            .native
            .try_lock()
            .map_err(|_| BridgeError::io(op, "resource is busy"))?;
        NativeGuard::new(&self.state, guard)
    }

    /// Race `fut` against the close token.
    pub async fn abortable<R>(
        &self,
        op: &str,
        fut: impl Future<Output = std::io::Result<R>>,
    ) -> BridgeResult<R> {
        let closed = self.state.close_token();
        tokio::select! {
            biased;
            _ = closed.aborted() => Err(BridgeError::aborted(op)),
            outcome = fut => outcome.map_err(|e| BridgeError::from_io(op, e)),
        }
    }

    /// Drop the native object if the handle closed while an operation held it.
    pub async fn reap(&self) {
        if self.state.is_closed() && self.native.lock().await.take().is_some() {
            tracing::debug!(resource = %self.state.label(), "native released after in-flight op");
        }
    }

    /// Native half of close: drop the object unless an operation holds it.
    pub fn release_native(&self) {
        if let Ok(mut guard) = self.native.try_lock() {
            guard.take();
        }
    }
}

/// Exclusive access to a native object that has not been released.
pub struct NativeGuard<'a, T> {
    state: &'a HandleState,
    guard: MutexGuard<'a, Option<T>>,
}

impl<'a, T> NativeGuard<'a, T> {
    fn new(state: &'a HandleState, guard: MutexGuard<'a, Option<T>>) -> BridgeResult<Self> {
        if guard.is_none() {
            return Err(BridgeError::already_closed(state.label()));
        }
        Ok(Self { state, guard })
    }

    pub fn native(&mut self) -> BridgeResult<&mut T> {
        match self.guard.as_mut() {
            Some(native) => Ok(native),
            None => Err(BridgeError::already_closed(self.state.label())),
        }
    }
}
