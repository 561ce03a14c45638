//! Cooperative cancellation token.

use std::sync::Arc;

use tokio::sync::watch;

/// Anything that can be asked to stop.
pub trait Cancellable {
    /// Check if cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Request cancellation. Idempotent.
    fn cancel(&self);
}

/// Observable state of a [`CancellationToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationState {
    Active,
    Aborted,
}

#[derive(Debug)]
struct TokenInner {
    aborted: watch::Sender<bool>,
}

impl Default for TokenInner {
    fn default() -> Self {
        Self {
            aborted: watch::Sender::new(false),
        }
    }
}

/// Cooperative cancellation token over a `watch` flag.
///
/// `Aborted` is terminal. Clones share state, so a pump and the handle that
/// owns it observe the same transition.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

impl CancellationToken {
    /// Create a new token in the `Active` state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CancellationState {
        if self.is_cancelled() {
            CancellationState::Aborted
        } else {
            CancellationState::Active
        }
    }

    /// Resolves once the token is aborted. Returns immediately if it already is.
    pub async fn aborted(&self) {
        let mut rx = self.inner.aborted.subscribe();
        loop {
            let aborted = *rx.borrow_and_update();
            if aborted || rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// The opaque stop capability handed to callers.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            token: self.clone(),
        }
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        *self.inner.aborted.borrow()
    }

    fn cancel(&self) {
        self.inner.aborted.send_if_modified(|aborted| !std::mem::replace(aborted, true));
    }
}

/// Stop capability returned when a pump is attached.
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    /// Abort the pump. Calling it again is a no-op.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}
