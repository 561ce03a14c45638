//! Two-sink completion contract used by every asynchronous operation.

use std::future::Future;

use hostio_core::{BridgeError, BridgeResult};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

type SuccessSink<T> = Box<dyn FnOnce(T) + Send + 'static>;
type ErrorSink = Box<dyn FnOnce(BridgeError) + Send + 'static>;

/// Success and error continuations of one asynchronous call.
///
/// Exactly one sink fires, exactly once. Completing consumes the channel;
/// dropping it without completing fires the error sink with `Aborted`, so a
/// cancelled task or a shutting-down runtime never leaves a caller hanging.
pub struct ErrorChannel<T> {
    op: String,
    sinks: Option<(SuccessSink<T>, ErrorSink)>,
}

impl<T> ErrorChannel<T> {
    pub fn new<S, E>(on_success: S, on_error: E) -> Self
    where
        S: FnOnce(T) + Send + 'static,
        E: FnOnce(BridgeError) + Send + 'static,
    {
        Self {
            op: "operation".to_string(),
            sinks: Some((Box::new(on_success), Box::new(on_error))),
        }
    }

    /// Name the operation, used in the `Aborted` error on drop.
    pub fn for_op(mut self, op: impl Into<String>) -> Self {
        self.op = op.into();
        self
    }

    pub fn op(&self) -> &str {
        &self.op
    }

    /// Deliver the outcome to the matching sink.
    pub fn complete(mut self, outcome: BridgeResult<T>) {
        if let Some((on_success, on_error)) = self.sinks.take() {
            match outcome {
                Ok(value) => on_success(value),
                Err(err) => on_error(err),
            }
        }
    }

    pub fn succeed(self, value: T) {
        self.complete(Ok(value));
    }

    pub fn fail(self, err: BridgeError) {
        self.complete(Err(err));
    }
}

impl<T: Send + 'static> ErrorChannel<T> {
    /// A channel whose two sinks feed a oneshot receiver.
    pub fn oneshot() -> (Self, oneshot::Receiver<BridgeResult<T>>) {
        let (tx, rx) = oneshot::channel();
        let (ok_tx, err_tx) = split_sender(tx);
        let channel = Self::new(
            move |value| {
                if let Some(tx) = take(&ok_tx) {
                    let _ = tx.send(Ok(value));
                }
            },
            move |err| {
                if let Some(tx) = take(&err_tx) {
                    let _ = tx.send(Err(err));
                }
            },
        );
        (channel, rx)
    }
}

type SharedSender<T> = std::sync::Arc<std::sync::Mutex<Option<oneshot::Sender<BridgeResult<T>>>>>;

fn split_sender<T>(tx: oneshot::Sender<BridgeResult<T>>) -> (SharedSender<T>, SharedSender<T>) {
    let shared = std::sync::Arc::new(std::sync::Mutex::new(Some(tx)));
    (shared.clone(), shared)
}

fn take<T>(shared: &SharedSender<T>) -> Option<oneshot::Sender<BridgeResult<T>>> {
    shared
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take()
}

impl<T> Drop for ErrorChannel<T> {
    fn drop(&mut self) {
        if let Some((_, on_error)) = self.sinks.take() {
            tracing::debug!(op = %self.op, "error channel dropped before completion");
            on_error(BridgeError::aborted(self.op.clone()));
        }
    }
}

impl<T> std::fmt::Debug for ErrorChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("op", &self.op)
            .field("pending", &self.sinks.is_some())
            .finish()
    }
}

/// Run `fut` on `handle` and route its outcome into `channel`.
///
/// Continuations always run on a runtime task, never on the caller's stack.
/// Aborting the returned handle delivers `Aborted`; a panic inside the
/// operation delivers an I/O failure.
pub fn dispatch<T, F>(handle: &Handle, op: &str, fut: F, channel: ErrorChannel<T>) -> AbortHandle
where
    T: Send + 'static,
    F: Future<Output = BridgeResult<T>> + Send + 'static,
{
    let channel = channel.for_op(op);
    let op = op.to_string();
    let task = handle.spawn(fut);
    let abort = task.abort_handle();
    handle.spawn(async move {
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(join_err) if join_err.is_panic() => {
                tracing::error!(op = %op, "operation panicked");
                Err(BridgeError::io(op, "operation panicked"))
            }
            Err(_) => Err(BridgeError::aborted(op)),
        };
        channel.complete(outcome);
    });
    abort
}

/// Blocking twin of [`dispatch`]: runs `f` on the calling thread.
pub fn run_sync<T, F>(op: &str, f: F, channel: ErrorChannel<T>)
where
    F: FnOnce() -> BridgeResult<T>,
{
    channel.for_op(op).complete(f());
}
