//! Single-settlement terminal outcome of a long-lived resource.

use std::sync::Arc;

use hostio_core::{BridgeError, BridgeResult};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::channel::ErrorChannel;

type Slot<T> = watch::Sender<Option<BridgeResult<T>>>;

/// Write side of a completion. Held by the resource's driver task.
#[derive(Debug)]
pub struct CompletionCell<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for CompletionCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for CompletionCell<T> {
    fn default() -> Self {
        Self {
            slot: Arc::new(watch::Sender::new(None)),
        }
    }
}

impl<T> CompletionCell<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the outcome. Returns `false` if the cell was already settled,
    /// in which case `outcome` is discarded.
    pub fn settle(&self, outcome: BridgeResult<T>) -> bool {
        self.slot.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
            true
        })
    }

    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    pub fn reject(&self, err: BridgeError) -> bool {
        self.settle(Err(err))
    }

    /// Settle with `Aborted` if nothing else has.
    pub fn abandon(&self, op: &str) -> bool {
        self.settle(Err(BridgeError::aborted(op)))
    }

    pub fn is_settled(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Read side for subscribers.
    pub fn future(&self) -> CompletionFuture<T> {
        CompletionFuture {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// Read-only view of a [`CompletionCell`].
///
/// Any number of subscribers may wait; those arriving after settlement get
/// the stored outcome without waiting.
#[derive(Debug)]
pub struct CompletionFuture<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for CompletionFuture<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Clone> CompletionFuture<T> {
    pub async fn wait(&self) -> BridgeResult<T> {
        let mut rx = self.slot.subscribe();
        loop {
            let settled = rx.borrow_and_update().clone();
            if let Some(outcome) = settled {
                return outcome;
            }
            // The sender lives in `self.slot`, so the channel never closes here.
            if rx.changed().await.is_err() {
                return Err(BridgeError::aborted("completion"));
            }
        }
    }

    /// The outcome if already settled.
    pub fn peek(&self) -> Option<BridgeResult<T>> {
        self.slot.borrow().clone()
    }

    pub fn is_settled(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

impl<T: Clone + Send + Sync + 'static> CompletionFuture<T> {
    /// Deliver the settlement to `channel` on a runtime task.
    ///
    /// Outside a runtime the channel fires with an I/O failure instead.
    pub fn subscribe(&self, channel: ErrorChannel<T>) {
        let Ok(handle) = Handle::try_current() else {
            channel.fail(BridgeError::io("subscribe", "no async runtime is running"));
            return;
        };
        let future = self.clone();
        handle.spawn(async move {
            let outcome = future.wait().await;
            channel.complete(outcome);
        });
    }
}
