//! ProcessContext: the explicit stand-in for process-wide state.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use hostio_core::HostioConfig;

use crate::diagnostics::{DiagnosticSink, TracingDiagnostics};
use crate::handle::{ResourceHandle, ResourceId};
use crate::keepalive::KeepAliveRegistry;
use crate::pump::PumpPolicy;
use crate::table::ResourceTable;

/// Keep-alive registry, diagnostic sink, live resources, exit code and
/// config for one host process. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ProcessContext {
    config: Arc<HostioConfig>,
    keep_alive: KeepAliveRegistry,
    diagnostics: Arc<dyn DiagnosticSink>,
    resources: ResourceTable,
    exit_code: Arc<AtomicI32>,
}

impl ProcessContext {
    /// Context that reports diagnostics through `tracing`.
    pub fn new(config: HostioConfig) -> Self {
        Self::with_diagnostics(config, Arc::new(TracingDiagnostics))
    }

    pub fn with_diagnostics(config: HostioConfig, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            config: Arc::new(config),
            keep_alive: KeepAliveRegistry::new(),
            diagnostics,
            resources: ResourceTable::new(),
            exit_code: Arc::new(AtomicI32::new(0)),
        }
    }

    pub fn config(&self) -> &HostioConfig {
        &self.config
    }

    pub fn keep_alive(&self) -> &KeepAliveRegistry {
        &self.keep_alive
    }

    pub fn diagnostics(&self) -> Arc<dyn DiagnosticSink> {
        Arc::clone(&self.diagnostics)
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    /// Pump failure policy from `watch.continue_on_error`.
    pub fn pump_policy(&self) -> PumpPolicy {
        PumpPolicy::from_continue_flag(self.config.watch.effective_continue_on_error())
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code.load(Ordering::Relaxed)
    }

    pub fn set_exit_code(&self, code: i32) {
        self.exit_code.store(code, Ordering::Relaxed);
    }

    /// Track a handle so `close_all` reaches it.
    pub fn register(&self, handle: Arc<dyn ResourceHandle>) -> ResourceId {
        self.resources.insert(handle)
    }

    /// Resolves once no ref'd resource remains.
    pub async fn wait_until_idle(&self) {
        self.keep_alive.wait_idle().await;
    }

    /// Close every registered handle. Failures go to the diagnostic sink.
    /// Returns the number of handles visited.
    pub fn close_all(&self) -> usize {
        let count = self.resources.len();
        for (id, err) in self.resources.close_all() {
            self.diagnostics.report(&format!("close {id}"), &err);
        }
        tracing::debug!(count, "closed all resources");
        count
    }
}

impl std::fmt::Debug for ProcessContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessContext")
            .field("resources", &self.resources)
            .field("keep_alive", &self.keep_alive.active_count())
            .field("exit_code", &self.exit_code())
            .finish()
    }
}
