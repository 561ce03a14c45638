//! # hostio-lifecycle
//!
//! The asynchronous resource lifecycle shared by every long-lived native
//! resource the bridge exposes.
//!
//! - [`ErrorChannel`]: two-sink completion contract, exactly one outcome.
//! - [`CancellationToken`]: monotonic `Active -> Aborted` signal.
//! - [`EventStreamPump`]: drains an event source into a handler until stopped.
//! - [`KeepAliveRef`]: ref/unref accounting against a [`KeepAliveRegistry`].
//! - [`CompletionFuture`]: single-settlement terminal outcome.
//! - [`ResourceHandle`]: closeable resource tying the above together.

pub mod cancellation;
pub mod channel;
pub mod completion;
pub mod context;
pub mod diagnostics;
pub mod handle;
pub mod keepalive;
pub mod pump;
pub mod table;

pub use cancellation::{Cancellable, CancellationState, CancellationToken, StopHandle};
pub use channel::{dispatch, run_sync, ErrorChannel};
pub use completion::{CompletionCell, CompletionFuture};
pub use context::ProcessContext;
pub use diagnostics::{CollectingDiagnostics, Diagnostic, DiagnosticSink, TracingDiagnostics};
pub use handle::{HandleState, ResourceHandle, ResourceId, ResourceKind};
pub use keepalive::{KeepAliveRef, KeepAliveRegistry};
pub use pump::{EventSource, EventStreamPump, PumpExit, PumpPolicy, Subscription};
pub use table::ResourceTable;
