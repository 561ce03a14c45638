//! Drains an asynchronous event source into a per-event handler.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use hostio_core::{BridgeError, BridgeResult};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::cancellation::{Cancellable, CancellationToken, StopHandle};
use crate::completion::{CompletionCell, CompletionFuture};
use crate::diagnostics::DiagnosticSink;

/// An unbounded sequence of events from a native resource.
///
/// `None` means the source is exhausted. An `Err` item is a failure of the
/// source itself, not of any one event.
pub trait EventSource: Send + 'static {
    type Event: Send + 'static;

    fn next_event(&mut self) -> impl Future<Output = Option<BridgeResult<Self::Event>>> + Send;
}

impl<E: Send + 'static> EventSource for mpsc::Receiver<BridgeResult<E>> {
    type Event = E;

    async fn next_event(&mut self) -> Option<BridgeResult<E>> {
        self.recv().await
    }
}

impl<E: Send + 'static> EventSource for mpsc::UnboundedReceiver<BridgeResult<E>> {
    type Event = E;

    async fn next_event(&mut self) -> Option<BridgeResult<E>> {
        self.recv().await
    }
}

/// What the pump does after reporting a non-abort source failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PumpPolicy {
    #[default]
    StopOnError,
    ContinueOnError,
}

impl PumpPolicy {
    pub fn from_continue_flag(continue_on_error: bool) -> Self {
        if continue_on_error {
            Self::ContinueOnError
        } else {
            Self::StopOnError
        }
    }
}

/// Why a pump ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    /// The stop capability was used or the owning handle closed.
    Stopped,
    /// The source ran out of events.
    Exhausted,
    /// The source failed and the policy was to stop.
    Failed(BridgeError),
}

/// Returned by [`EventStreamPump::attach`].
#[derive(Debug, Clone)]
pub struct Subscription {
    stop: StopHandle,
    finished: CompletionFuture<PumpExit>,
}

impl Subscription {
    /// Stop delivering events. Idempotent.
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Settles when the pump loop has exited.
    pub fn finished(&self) -> CompletionFuture<PumpExit> {
        self.finished.clone()
    }

    /// Stop and wait for the loop to exit.
    pub async fn stop_and_wait(&self) -> BridgeResult<PumpExit> {
        self.stop();
        self.finished.wait().await
    }
}

/// Pump slot of one resource. At most one pump is active at a time.
///
/// The source is parked here between attaches: a pump that is stopped hands
/// it back so the resource can be pumped again, an exhausted or failed
/// source is dropped.
pub struct EventStreamPump<S: EventSource> {
    resource: String,
    source: Arc<Mutex<Option<S>>>,
    active: Arc<AtomicBool>,
    closed: CancellationToken,
    policy: PumpPolicy,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl<S: EventSource> EventStreamPump<S> {
    /// `closed` is the owning handle's close token.
    pub fn new(
        resource: impl Into<String>,
        source: S,
        closed: CancellationToken,
        policy: PumpPolicy,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            resource: resource.into(),
            source: Arc::new(Mutex::new(Some(source))),
            active: Arc::new(AtomicBool::new(false)),
            closed,
            policy,
            diagnostics,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Start pumping into `handler` on the current runtime.
    ///
    /// Fails with `AlreadyAttached` while another pump is active, and with
    /// `AlreadyClosed` once the handle is closed or the source is spent.
    pub fn attach<H>(&self, handler: H) -> BridgeResult<Subscription>
    where
        H: FnMut(S::Event) + Send + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|_| BridgeError::io("attach", "no async runtime is running"))?;
        if self.closed.is_cancelled() {
            return Err(BridgeError::already_closed(self.resource.clone()));
        }
        if self.active.swap(true, Ordering::AcqRel) {
            return Err(BridgeError::already_attached(self.resource.clone()));
        }
        let Some(source) = lock(&self.source).take() else {
            self.active.store(false, Ordering::Release);
            return Err(BridgeError::already_closed(self.resource.clone()));
        };

        let token = CancellationToken::new();
        let finished = CompletionCell::new();
        let subscription = Subscription {
            stop: token.stop_handle(),
            finished: finished.future(),
        };

        let run = PumpRun {
            resource: self.resource.clone(),
            token,
            closed: self.closed.clone(),
            policy: self.policy,
            diagnostics: Arc::clone(&self.diagnostics),
        };
        let slot = Arc::clone(&self.source);
        let active = Arc::clone(&self.active);
        tracing::debug!(resource = %self.resource, "pump attached");

        runtime.spawn(async move {
            let guard = PumpGuard {
                resource: run.resource.clone(),
                active,
                finished,
            };
            let (exit, source) = run.drive(source, handler).await;
            if let Some(source) = source {
                *lock(&slot) = Some(source);
            }
            guard.active.store(false, Ordering::Release);
            tracing::debug!(resource = %run.resource, exit = ?exit, "pump finished");
            guard.finished.resolve(exit);
        });

        Ok(subscription)
    }
}

/// Clears the attach flag when the pump task ends. A handler panic unwinds
/// through here and settles the subscription as aborted.
struct PumpGuard {
    resource: String,
    active: Arc<AtomicBool>,
    finished: CompletionCell<PumpExit>,
}

impl Drop for PumpGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        if self.finished.abandon(&self.resource) {
            tracing::warn!(resource = %self.resource, "pump ended without an exit");
        }
    }
}

struct PumpRun {
    resource: String,
    token: CancellationToken,
    closed: CancellationToken,
    policy: PumpPolicy,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl PumpRun {
    fn should_stop(&self) -> bool {
        self.token.is_cancelled() || self.closed.is_cancelled()
    }

    /// Returns the exit reason and, when the source is reusable, the source.
    async fn drive<S, H>(&self, mut source: S, mut handler: H) -> (PumpExit, Option<S>)
    where
        S: EventSource,
        H: FnMut(S::Event),
    {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.token.aborted() => None,
                _ = self.closed.aborted() => None,
                next = source.next_event() => Some(next),
            };
            let Some(next) = next else {
                return self.stopped(source);
            };
            match next {
                None => return (PumpExit::Exhausted, None),
                Some(Ok(event)) => {
                    // An event retrieved after the stop is dropped unhandled.
                    if self.should_stop() {
                        return self.stopped(source);
                    }
                    handler(event);
                }
                Some(Err(err)) if err.is_aborted() && self.should_stop() => {
                    return self.stopped(source);
                }
                Some(Err(err)) => {
                    self.diagnostics.report(&self.resource, &err);
                    if self.policy == PumpPolicy::StopOnError {
                        return (PumpExit::Failed(err), None);
                    }
                }
            }
        }
    }

    fn stopped<S>(&self, source: S) -> (PumpExit, Option<S>) {
        if self.closed.is_cancelled() {
            (PumpExit::Stopped, None)
        } else {
            (PumpExit::Stopped, Some(source))
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
