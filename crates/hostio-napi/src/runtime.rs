//! HostRuntime: singleton via `OnceLock`, lock-free after initialization.
//!
//! Owns the tokio runtime every resource runs on and the `ProcessContext`
//! they register with. Initialized once via `initialize()` and accessed via
//! `get()` for the lifetime of the process.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use hostio_core::{BridgeError, BridgeResult, HostioConfig};
use hostio_lifecycle::{dispatch, CollectingDiagnostics, ErrorChannel, ProcessContext};
use tokio::runtime::EnterGuard;

use crate::conversions::error_codes;

static RUNTIME: OnceLock<Arc<HostRuntime>> = OnceLock::new();

pub struct HostRuntime {
    tokio: tokio::runtime::Runtime,
    pub ctx: ProcessContext,
    pub diagnostics: Arc<CollectingDiagnostics>,
}

/// Options for initializing the runtime.
#[derive(Default)]
pub struct RuntimeOptions {
    /// Root searched for `hostio.toml`. If None, the current directory.
    pub project_root: Option<PathBuf>,
    /// TOML configuration string. Takes precedence over files when set.
    pub config_toml: Option<String>,
}

impl HostRuntime {
    fn new(opts: RuntimeOptions) -> napi::Result<Self> {
        let config = match &opts.config_toml {
            Some(toml_str) => {
                HostioConfig::from_toml(toml_str).map_err(error_codes::to_napi_error)?
            }
            None => {
                let root = opts.project_root.unwrap_or_else(|| PathBuf::from("."));
                HostioConfig::load(&root, None).map_err(error_codes::to_napi_error)?
            }
        };

        let tokio = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("hostio-worker")
            .build()
            .map_err(|e| error_codes::to_napi_error(BridgeError::from_io("initialize", e)))?;

        let diagnostics = Arc::new(CollectingDiagnostics::new(
            config.diagnostics.effective_capacity(),
        ));
        let ctx = ProcessContext::with_diagnostics(config, diagnostics.clone());
        Ok(Self {
            tokio,
            ctx,
            diagnostics,
        })
    }

    /// Enter the runtime so synchronous bindings can create resources.
    pub fn enter(&self) -> EnterGuard<'_> {
        self.tokio.enter()
    }

    /// Run `fut` on the bridge runtime and await its outcome through an
    /// error channel, whichever runtime the caller is on.
    pub async fn run<T, F>(&self, op: &str, fut: F) -> napi::Result<T>
    where
        T: Send + 'static,
        F: Future<Output = BridgeResult<T>> + Send + 'static,
    {
        let (channel, rx) = ErrorChannel::oneshot();
        dispatch(self.tokio.handle(), op, fut, channel);
        match rx.await {
            Ok(outcome) => outcome.map_err(error_codes::to_napi_error),
            Err(_) => Err(error_codes::to_napi_error(BridgeError::aborted(op))),
        }
    }
}

/// Initialize the global HostRuntime singleton.
///
/// Returns an error if already initialized or if initialization fails.
pub fn initialize(opts: RuntimeOptions) -> napi::Result<()> {
    hostio_core::tracing::init_tracing();
    if is_initialized() {
        return Err(error_codes::already_initialized());
    }
    let runtime = HostRuntime::new(opts)?;
    RUNTIME
        .set(Arc::new(runtime))
        .map_err(|_| error_codes::already_initialized())?;
    tracing::info!("hostio runtime initialized");
    Ok(())
}

/// Get a reference to the global HostRuntime.
pub fn get() -> napi::Result<Arc<HostRuntime>> {
    RUNTIME
        .get()
        .cloned()
        .ok_or_else(error_codes::runtime_not_initialized)
}

pub fn is_initialized() -> bool {
    RUNTIME.get().is_some()
}
