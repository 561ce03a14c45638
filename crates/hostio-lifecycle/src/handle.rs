//! The resource handle abstraction and its shared state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{OnceLock, Weak};

use hostio_core::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cancellation::{Cancellable, CancellationToken};
use crate::keepalive::{KeepAliveRef, KeepAliveRegistry};
use crate::table::Entries;

/// Opaque identity of one native resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(Uuid);

impl ResourceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl std::str::FromStr for ResourceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Watcher,
    Server,
    ChildProcess,
    Stream,
    File,
    Timer,
    SignalListener,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Watcher => "watcher",
            Self::Server => "server",
            Self::ChildProcess => "child_process",
            Self::Stream => "stream",
            Self::File => "file",
            Self::Timer => "timer",
            Self::SignalListener => "signal_listener",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Back-reference to the table a handle is registered in.
#[derive(Default)]
struct TableLink(OnceLock<Weak<Entries>>);

impl fmt::Debug for TableLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.get().is_some() { "registered" } else { "unregistered" })
    }
}

/// State every handle carries: identity, the monotonic `closed` flag, the
/// close token observed by pumps and in-flight operations, and the
/// keep-alive reference.
#[derive(Debug)]
pub struct HandleState {
    id: ResourceId,
    kind: ResourceKind,
    closed: AtomicBool,
    close_token: CancellationToken,
    keep_alive: Option<KeepAliveRef>,
    table: TableLink,
}

impl HandleState {
    /// State for a long-lived resource, ref'd against `registry` from the start.
    pub fn new(kind: ResourceKind, registry: &KeepAliveRegistry) -> Self {
        Self::with_keep_alive(kind, Some(registry.acquire(true)))
    }

    /// State for a resource that never holds the process open (files, streams).
    pub fn unmanaged(kind: ResourceKind) -> Self {
        Self::with_keep_alive(kind, None)
    }

    fn with_keep_alive(kind: ResourceKind, keep_alive: Option<KeepAliveRef>) -> Self {
        let state = Self {
            id: ResourceId::new(),
            kind,
            closed: AtomicBool::new(false),
            close_token: CancellationToken::new(),
            keep_alive,
            table: TableLink::default(),
        };
        tracing::debug!(resource = %state.label(), "resource acquired");
        state
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// `kind#id`, used in errors and logs.
    pub fn label(&self) -> String {
        format!("{}#{}", self.kind, self.id)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Token cancelled when the handle closes.
    pub fn close_token(&self) -> CancellationToken {
        self.close_token.clone()
    }

    /// `AlreadyClosed` once the handle is closed.
    pub fn ensure_open(&self) -> BridgeResult<()> {
        if self.is_closed() {
            Err(BridgeError::already_closed(self.label()))
        } else {
            Ok(())
        }
    }

    /// Flip to closed. Returns `true` for the caller that performed the
    /// transition; every later call returns `false`.
    pub fn begin_close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.close_token.cancel();
        if let Some(keep_alive) = &self.keep_alive {
            keep_alive.release();
        }
        if let Some(entries) = self.table.0.get().and_then(Weak::upgrade) {
            entries.remove(&self.id);
        }
        tracing::debug!(resource = %self.label(), "resource closed");
        true
    }

    /// Remember the table this handle lives in, so closing (explicitly or
    /// because the resource ended on its own) drops the entry. First binding wins.
    pub(crate) fn bind_table(&self, entries: Weak<Entries>) {
        let _ = self.table.0.set(entries);
    }

    pub fn ref_(&self) {
        if let Some(keep_alive) = &self.keep_alive {
            keep_alive.ref_();
            tracing::debug!(resource = %self.label(), "ref");
        }
    }

    pub fn unref(&self) {
        if let Some(keep_alive) = &self.keep_alive {
            keep_alive.unref();
            tracing::debug!(resource = %self.label(), "unref");
        }
    }

    pub fn has_ref(&self) -> bool {
        self.keep_alive.as_ref().is_some_and(KeepAliveRef::has_ref)
    }
}

/// A native resource the caller may close and ref/unref.
///
/// Implementors supply [`state`](Self::state) and
/// [`close_native`](Self::close_native); the provided `close` runs the
/// native close at most once and absorbs `AlreadyClosed`, so calling it
/// twice is a no-op even when the native call is not idempotent.
pub trait ResourceHandle: Send + Sync {
    fn state(&self) -> &HandleState;

    /// Release the native resource. Called at most once.
    fn close_native(&self) -> BridgeResult<()>;

    fn id(&self) -> ResourceId {
        self.state().id()
    }

    fn kind(&self) -> ResourceKind {
        self.state().kind()
    }

    fn is_closed(&self) -> bool {
        self.state().is_closed()
    }

    fn ref_(&self) {
        self.state().ref_();
    }

    fn unref(&self) {
        self.state().unref();
    }

    fn has_ref(&self) -> bool {
        self.state().has_ref()
    }

    fn close(&self) -> BridgeResult<()> {
        if !self.state().begin_close() {
            return Ok(());
        }
        match self.close_native() {
            Err(err) if err.is_already_closed() => Ok(()),
            other => other,
        }
    }
}
