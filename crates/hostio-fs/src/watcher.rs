//! Filesystem change watcher: a `notify` watcher feeding an event pump.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use hostio_core::{BridgeError, BridgeResult};
use hostio_lifecycle::{
    EventStreamPump, HandleState, ProcessContext, ResourceHandle, ResourceKind, Subscription,
};
use notify::event::{Flag, ModifyKind};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Coarse kind of a filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FsEventKind {
    Any,
    Access,
    Create,
    Modify,
    Rename,
    Remove,
    Other,
}

impl FsEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Access => "access",
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Rename => "rename",
            Self::Remove => "remove",
            Self::Other => "other",
        }
    }
}

impl From<&EventKind> for FsEventKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Any => Self::Any,
            EventKind::Access(_) => Self::Access,
            EventKind::Create(_) => Self::Create,
            EventKind::Modify(ModifyKind::Name(_)) => Self::Rename,
            EventKind::Modify(_) => Self::Modify,
            EventKind::Remove(_) => Self::Remove,
            EventKind::Other => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FsEventFlag {
    /// Events were missed; the watched tree should be rescanned.
    Rescan,
}

/// One change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsEvent {
    pub kind: FsEventKind,
    pub paths: Vec<PathBuf>,
    pub flag: Option<FsEventFlag>,
}

impl From<notify::Event> for FsEvent {
    fn from(event: notify::Event) -> Self {
        let flag = match event.flag() {
            Some(Flag::Rescan) => Some(FsEventFlag::Rescan),
            _ => None,
        };
        Self {
            kind: FsEventKind::from(&event.kind),
            paths: event.paths,
            flag,
        }
    }
}

fn watch_error(op: &str, err: notify::Error) -> BridgeError {
    match err.kind {
        notify::ErrorKind::Io(io) => BridgeError::from_io(op, io),
        notify::ErrorKind::PathNotFound => BridgeError::NotFound {
            op: op.to_string(),
            message: format!("path not found: {:?}", err.paths),
        },
        notify::ErrorKind::InvalidConfig(config) => {
            BridgeError::invalid_argument(op, format!("invalid watcher config: {config:?}"))
        }
        other => BridgeError::io(op, format!("{other:?}")),
    }
}

type EventQueue = mpsc::Receiver<BridgeResult<FsEvent>>;

/// Drop accounting for a full event queue. A queue that stays full (no
/// pump draining it) is one overflow, reported once.
#[derive(Debug, Default)]
struct Overflow {
    dropped: AtomicU64,
    overflowing: AtomicBool,
}

impl Overflow {
    /// Count a dropped event. `true` when it starts a new overflow.
    fn record_drop(&self) -> bool {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        !self.overflowing.swap(true, Ordering::AcqRel)
    }

    /// An event got through. `true` when that ends an overflow.
    fn record_delivery(&self) -> bool {
        self.overflowing.load(Ordering::Acquire) && self.overflowing.swap(false, Ordering::AcqRel)
    }

    fn total(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// A live watch over one or more paths.
///
/// Ref'd by default. `watch` attaches the single event pump; `close`
/// drops the native watcher and stops any attached pump.
pub struct FsWatcher {
    state: HandleState,
    native: Mutex<Option<RecommendedWatcher>>,
    pump: EventStreamPump<EventQueue>,
    paths: Vec<PathBuf>,
    overflow: Arc<Overflow>,
}

/// Start watching `paths`. `recursive` falls back to `watch.recursive`.
pub fn watch_fs<P: AsRef<Path>>(
    ctx: &ProcessContext,
    paths: &[P],
    recursive: Option<bool>,
) -> BridgeResult<FsWatcher> {
    if paths.is_empty() {
        return Err(BridgeError::invalid_argument("watch_fs", "no paths given"));
    }
    let config = &ctx.config().watch;
    let mode = if recursive.unwrap_or_else(|| config.effective_recursive()) {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    let (tx, rx) = mpsc::channel(config.effective_event_buffer());

    let overflow = Arc::new(Overflow::default());
    let native_overflow = Arc::clone(&overflow);
    let mut native = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let item = res
            .map(FsEvent::from)
            .map_err(|e| watch_error("watch_fs", e));
        match tx.try_send(item) {
            Ok(()) => {
                if native_overflow.record_delivery() {
                    tracing::debug!(
                        event.name = "watch.buffer_recovered",
                        dropped = native_overflow.total(),
                        "watch event buffer draining again"
                    );
                }
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                if native_overflow.record_drop() {
                    tracing::warn!(
                        event.name = "watch.buffer_full",
                        "watch event buffer full, dropping events until it drains"
                    );
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(event.name = "watch.queue_closed", "watcher queue closed");
            }
        }
    })
    .map_err(|e| watch_error("watch_fs", e))?;

    let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
    for path in &paths {
        native
            .watch(path, mode)
            .map_err(|e| watch_error("watch_fs", e))?;
    }

    let state = HandleState::new(ResourceKind::Watcher, ctx.keep_alive());
    let pump = EventStreamPump::new(
        state.label(),
        rx,
        state.close_token(),
        ctx.pump_policy(),
        ctx.diagnostics(),
    );
    tracing::debug!(resource = %state.label(), paths = ?paths, "watching");
    Ok(FsWatcher {
        state,
        native: Mutex::new(Some(native)),
        pump,
        paths,
        overflow,
    })
}

impl FsWatcher {
    /// Pump change events into `handler` until stopped or closed.
    pub fn watch<H>(&self, handler: H) -> BridgeResult<Subscription>
    where
        H: FnMut(FsEvent) + Send + 'static,
    {
        self.state.ensure_open()?;
        self.pump.attach(handler)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_watching(&self) -> bool {
        self.pump.is_attached()
    }

    /// Events dropped so far because the queue was full.
    pub fn dropped_events(&self) -> u64 {
        self.overflow.total()
    }
}

impl ResourceHandle for FsWatcher {
    fn state(&self) -> &HandleState {
        &self.state
    }

    fn close_native(&self) -> BridgeResult<()> {
        let native = self
            .native
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match native {
            Some(watcher) => {
                drop(watcher);
                Ok(())
            }
            None => Err(BridgeError::already_closed(self.state.label())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Overflow;

    #[test]
    fn a_sustained_overflow_is_reported_once() {
        let overflow = Overflow::default();
        assert!(overflow.record_drop());
        assert!(!overflow.record_drop());
        assert!(!overflow.record_drop());
        assert_eq!(overflow.total(), 3);

        assert!(overflow.record_delivery());
        assert!(!overflow.record_delivery());
        assert!(overflow.record_drop());
        assert_eq!(overflow.total(), 4);
    }
}
