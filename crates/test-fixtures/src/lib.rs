//! Shared helpers for hostio tests: temp workspaces, recording handlers,
//! and bounded polling.
//!
//! Helpers panic on setup failure; they are for tests only.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A temporary directory that is removed when dropped.
pub struct TempWorkspace {
    dir: tempfile::TempDir,
}

impl TempWorkspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the workspace.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Canonical form of the workspace root. On macOS temp dirs sit behind
    /// a `/private` symlink and watchers report the resolved path.
    pub fn canonical(&self) -> PathBuf {
        std::fs::canonicalize(self.dir.path()).expect("canonicalize temp dir")
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects every value passed to the handler it hands out.
#[derive(Clone)]
pub struct Recorder<T> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handler that appends to this recorder.
    pub fn handler(&self) -> impl FnMut(T) + Send + 'static {
        let items = Arc::clone(&self.items);
        move |item| items.lock().expect("recorder lock").push(item)
    }

    pub fn items(&self) -> Vec<T> {
        self.items.lock().expect("recorder lock").clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().expect("recorder lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + 'static> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll `condition` every 10ms until it holds or `timeout` elapses.
/// Returns whether it held.
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Generous bound for OS-driven events in tests.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Quiet period used to assert that nothing more arrives.
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);
