//! Runtime bindings: environment, host identity, exit, timers and signal
//! listeners.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use hostio_core::BridgeError;
use hostio_lifecycle::{ResourceHandle, ResourceId};
use hostio_process::Signal;
use hostio_runtime::{self as host, Env, Interval, SignalListener, Timer};
use napi::threadsafe_function::{ErrorStrategy, ThreadsafeFunction, ThreadsafeFunctionCallMode};
use napi_derive::napi;

use crate::bindings::subscription::SubscriptionHandle;
use crate::conversions::error_codes::to_napi_error;
use crate::conversions::to_json;
use crate::runtime;

fn path_string(path: std::path::PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

// ---- env ----

#[napi]
pub fn env_get(key: String) -> napi::Result<Option<String>> {
    Env.get(&key).map_err(to_napi_error)
}

#[napi]
pub fn env_set(key: String, value: String) -> napi::Result<()> {
    Env.set(&key, &value).map_err(to_napi_error)
}

#[napi]
pub fn env_delete(key: String) -> napi::Result<()> {
    Env.delete(&key).map_err(to_napi_error)
}

#[napi]
pub fn env_has(key: String) -> napi::Result<bool> {
    Env.has(&key).map_err(to_napi_error)
}

#[napi]
pub fn env_to_object() -> HashMap<String, String> {
    Env.to_object().into_iter().collect()
}

// ---- host and process identity ----

#[napi]
pub fn runtime_cwd() -> napi::Result<String> {
    host::cwd().map(path_string).map_err(to_napi_error)
}

#[napi]
pub fn runtime_chdir(path: String) -> napi::Result<()> {
    host::chdir(path).map_err(to_napi_error)
}

#[napi]
pub fn runtime_exec_path() -> napi::Result<String> {
    host::exec_path().map(path_string).map_err(to_napi_error)
}

#[napi]
pub fn runtime_hostname() -> napi::Result<String> {
    host::hostname().map_err(to_napi_error)
}

#[napi]
pub fn runtime_os_release() -> napi::Result<String> {
    host::os_release().map_err(to_napi_error)
}

#[napi]
pub fn runtime_pid() -> u32 {
    host::pid()
}

#[napi]
pub fn runtime_ppid() -> u32 {
    host::ppid()
}

#[napi]
pub fn runtime_uid() -> Option<u32> {
    host::uid()
}

#[napi]
pub fn runtime_gid() -> Option<u32> {
    host::gid()
}

#[napi]
pub fn runtime_args() -> Vec<String> {
    host::args()
}

#[napi]
pub fn runtime_build() -> napi::Result<serde_json::Value> {
    to_json("build", &host::build())
}

#[napi]
pub fn runtime_no_color() -> bool {
    host::no_color()
}

/// Close every resource and exit with `code`, or the stored exit code.
#[napi]
pub fn runtime_exit(code: Option<i32>) -> napi::Result<()> {
    let rt = runtime::get()?;
    host::exit(&rt.ctx, code)
}

// ---- timers ----

#[napi]
pub struct TimerHandle {
    inner: Arc<Timer>,
}

/// Fire once after `delay_ms`. Resolve `completion()` to wait for it.
#[napi]
pub fn runtime_set_timeout(delay_ms: u32) -> napi::Result<TimerHandle> {
    let rt = runtime::get()?;
    let _guard = rt.enter();
    let inner = host::set_timeout(&rt.ctx, Duration::from_millis(u64::from(delay_ms)))
        .map_err(to_napi_error)?;
    Ok(TimerHandle { inner })
}

#[napi]
impl TimerHandle {
    #[napi(getter)]
    pub fn id(&self) -> String {
        self.inner.id().to_string()
    }

    /// Resolves with `"fired"`, or `"cleared"` when cleared first.
    #[napi]
    pub async fn completion(&self) -> napi::Result<String> {
        let rt = runtime::get()?;
        let ended = self.inner.completion();
        let exit = rt.run("timeout", async move { ended.wait().await }).await?;
        Ok(exit.as_str().to_string())
    }

    /// Cancel a pending timer. Idempotent.
    #[napi]
    pub fn clear(&self) -> napi::Result<()> {
        self.inner.close().map_err(to_napi_error)
    }
}

#[napi]
pub struct IntervalHandle {
    inner: Arc<Interval>,
}

#[napi]
pub fn runtime_set_interval(period_ms: u32) -> napi::Result<IntervalHandle> {
    let rt = runtime::get()?;
    let _guard = rt.enter();
    let inner = host::set_interval(&rt.ctx, Duration::from_millis(u64::from(period_ms)))
        .map_err(to_napi_error)?;
    Ok(IntervalHandle { inner })
}

#[napi]
impl IntervalHandle {
    #[napi(getter)]
    pub fn id(&self) -> String {
        self.inner.id().to_string()
    }

    /// Call `handler` with the tick number, starting at 1.
    #[napi]
    pub fn on_tick(
        &self,
        handler: ThreadsafeFunction<u32, ErrorStrategy::Fatal>,
    ) -> napi::Result<SubscriptionHandle> {
        let rt = runtime::get()?;
        let _guard = rt.enter();
        let subscription = self
            .inner
            .on_tick(move |tick| {
                let tick = u32::try_from(tick).unwrap_or(u32::MAX);
                handler.call(tick, ThreadsafeFunctionCallMode::NonBlocking);
            })
            .map_err(to_napi_error)?;
        Ok(SubscriptionHandle::new(subscription))
    }

    #[napi]
    pub fn clear(&self) -> napi::Result<()> {
        self.inner.close().map_err(to_napi_error)
    }
}

fn timer_id(id: &str) -> napi::Result<ResourceId> {
    ResourceId::from_str(id).map_err(|_| {
        to_napi_error(BridgeError::invalid_argument(
            "timer",
            format!("malformed timer id {id}"),
        ))
    })
}

#[napi]
pub fn runtime_ref_timer(id: String) -> napi::Result<()> {
    let rt = runtime::get()?;
    host::ref_timer(&rt.ctx, timer_id(&id)?).map_err(to_napi_error)
}

#[napi]
pub fn runtime_unref_timer(id: String) -> napi::Result<()> {
    let rt = runtime::get()?;
    host::unref_timer(&rt.ctx, timer_id(&id)?).map_err(to_napi_error)
}

// ---- signals ----

#[napi]
pub struct SignalListenerHandle {
    inner: Arc<SignalListener>,
}

#[napi]
impl SignalListenerHandle {
    #[napi(getter)]
    pub fn id(&self) -> String {
        self.inner.id().to_string()
    }

    #[napi(getter)]
    pub fn signal(&self) -> String {
        self.inner.signal().name().to_string()
    }
}

/// Call `handler` with the signal name on every delivery of `signal`
/// (`SIGINT`, `INT` and `sigint` are all accepted).
#[napi]
pub fn runtime_add_signal_listener(
    signal: String,
    handler: ThreadsafeFunction<String, ErrorStrategy::Fatal>,
) -> napi::Result<SignalListenerHandle> {
    let rt = runtime::get()?;
    let signal = Signal::parse("add_signal_listener", &signal).map_err(to_napi_error)?;
    let _guard = rt.enter();
    let inner = host::add_signal_listener(&rt.ctx, signal, move |delivered| {
        handler.call(
            delivered.name().to_string(),
            ThreadsafeFunctionCallMode::NonBlocking,
        );
    })
    .map_err(to_napi_error)?;
    Ok(SignalListenerHandle { inner })
}

#[napi]
pub fn runtime_remove_signal_listener(listener: &SignalListenerHandle) -> napi::Result<()> {
    let rt = runtime::get()?;
    host::remove_signal_listener(&rt.ctx, &listener.inner).map_err(to_napi_error)
}
