//! Out-of-band reporting for failures with no error continuation.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use hostio_core::{BridgeError, HostErrorCode};

/// Receives failures that no caller-supplied sink can take, such as a pump
/// source failing mid-stream.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, source: &str, error: &BridgeError);
}

/// Logs every report at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, source: &str, error: &BridgeError) {
        tracing::error!(
            source,
            code = error.error_code(),
            kind = %error.kind(),
            "{error}"
        );
    }
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub source: String,
    pub error: BridgeError,
    pub reported_at: DateTime<Utc>,
}

/// Bounded in-memory ring of diagnostics. Oldest entries are evicted first.
#[derive(Debug)]
pub struct CollectingDiagnostics {
    capacity: usize,
    entries: Mutex<VecDeque<Diagnostic>>,
    total: AtomicU64,
}

impl CollectingDiagnostics {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            total: AtomicU64::new(0),
        }
    }

    /// Entries currently retained, oldest first.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Reports received since creation, including evicted ones.
    pub fn total_reported(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Diagnostic>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DiagnosticSink for CollectingDiagnostics {
    fn report(&self, source: &str, error: &BridgeError) {
        tracing::warn!(source, code = error.error_code(), "{error}");
        self.total.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(Diagnostic {
            source: source.to_string(),
            error: error.clone(),
            reported_at: Utc::now(),
        });
    }
}
