//! Lifecycle bindings: initialize, shutdown, idle wait, and the generic
//! close/ref/unref every registered resource answers to.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use hostio_core::BridgeError;
use hostio_lifecycle::{ResourceHandle, ResourceId};
use hostio_runtime::OperationTable;
use napi_derive::napi;

use crate::conversions::error_codes::to_napi_error;
use crate::conversions::types::{JsDiagnostic, JsOperation};
use crate::runtime::{self, RuntimeOptions};

/// Initialize the hostio runtime. Must be called before any other function.
#[napi]
pub fn hostio_initialize(
    project_root: Option<String>,
    config_toml: Option<String>,
) -> napi::Result<()> {
    runtime::initialize(RuntimeOptions {
        project_root: project_root.map(PathBuf::from),
        config_toml,
    })
}

#[napi]
pub fn hostio_is_initialized() -> bool {
    runtime::is_initialized()
}

/// Close every registered resource. Returns how many were closed.
#[napi]
pub fn hostio_shutdown() -> napi::Result<u32> {
    let rt = runtime::get()?;
    let closed = rt.ctx.close_all();
    Ok(u32::try_from(closed).unwrap_or(u32::MAX))
}

/// Resolves once no ref'd resource remains.
#[napi]
pub async fn hostio_wait_until_idle() -> napi::Result<()> {
    let rt = runtime::get()?;
    let ctx = rt.ctx.clone();
    rt.run("wait_until_idle", async move {
        ctx.wait_until_idle().await;
        Ok(())
    })
    .await
}

/// The current configuration as JSON.
#[napi]
pub fn hostio_config() -> napi::Result<serde_json::Value> {
    let rt = runtime::get()?;
    serde_json::to_value(rt.ctx.config())
        .map_err(|e| to_napi_error(BridgeError::io("config", e.to_string())))
}

/// Failures reported by pumps and background closes.
#[napi]
pub fn hostio_diagnostics() -> napi::Result<Vec<JsDiagnostic>> {
    let rt = runtime::get()?;
    Ok(rt
        .diagnostics
        .snapshot()
        .into_iter()
        .map(JsDiagnostic::from)
        .collect())
}

/// Every operation the bridge exposes.
#[napi]
pub fn hostio_operations() -> Vec<JsOperation> {
    OperationTable::new().iter().map(JsOperation::from).collect()
}

fn parse_id(id: &str) -> napi::Result<ResourceId> {
    ResourceId::from_str(id).map_err(|_| {
        to_napi_error(BridgeError::invalid_argument(
            "resource",
            format!("malformed resource id {id}"),
        ))
    })
}

/// The live resource with `id`. Closed resources have left the table.
fn lookup(id: &str) -> napi::Result<Option<Arc<dyn ResourceHandle>>> {
    let rt = runtime::get()?;
    Ok(rt.ctx.resources().get(&parse_id(id)?))
}

fn registered(id: &str) -> napi::Result<Arc<dyn ResourceHandle>> {
    lookup(id)?.ok_or_else(|| {
        to_napi_error(BridgeError::invalid_argument(
            "resource",
            format!("no live resource with id {id}"),
        ))
    })
}

/// Close a resource by id. Closing an id that already closed is a no-op.
#[napi]
pub fn resource_close(id: String) -> napi::Result<()> {
    match lookup(&id)? {
        Some(handle) => handle.close().map_err(to_napi_error),
        None => Ok(()),
    }
}

#[napi(js_name = "resourceRef")]
pub fn resource_ref(id: String) -> napi::Result<()> {
    registered(&id)?.ref_();
    Ok(())
}

#[napi]
pub fn resource_unref(id: String) -> napi::Result<()> {
    registered(&id)?.unref();
    Ok(())
}

#[napi]
pub fn resource_has_ref(id: String) -> napi::Result<bool> {
    Ok(lookup(&id)?.is_some_and(|handle| handle.has_ref()))
}

#[napi]
pub fn hostio_exit_code() -> napi::Result<i32> {
    Ok(runtime::get()?.ctx.exit_code())
}

#[napi]
pub fn hostio_set_exit_code(code: i32) -> napi::Result<()> {
    runtime::get()?.ctx.set_exit_code(code);
    Ok(())
}
