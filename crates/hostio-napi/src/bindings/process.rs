//! Subprocess bindings.

use std::sync::Arc;

use hostio_lifecycle::ResourceId;
use hostio_process::{ChildProcess, Command, CommandOptions, Signal};
use napi_derive::napi;

use crate::conversions::error_codes::to_napi_error;
use crate::conversions::from_json;
use crate::conversions::types::{JsCommandOutput, JsCommandStatus};
use crate::runtime;

fn command(program: String, options: Option<serde_json::Value>) -> napi::Result<Command> {
    let options: CommandOptions = from_json("command options", options)?;
    Ok(Command::new(program, options))
}

fn parse_signal(op: &str, signal: Option<String>) -> napi::Result<Option<Signal>> {
    signal
        .map(|name| Signal::parse(op, &name).map_err(to_napi_error))
        .transpose()
}

/// Run to completion, collecting stdout and stderr.
#[napi]
pub async fn process_output(
    program: String,
    options: Option<serde_json::Value>,
) -> napi::Result<JsCommandOutput> {
    let rt = runtime::get()?;
    let command = command(program, options)?;
    let output = rt
        .run("output", async move { command.output().await })
        .await?;
    Ok(output.into())
}

#[napi]
pub fn process_output_sync(
    program: String,
    options: Option<serde_json::Value>,
) -> napi::Result<JsCommandOutput> {
    let output = command(program, options)?
        .output_sync()
        .map_err(to_napi_error)?;
    Ok(output.into())
}

#[napi]
pub struct ChildProcessHandle {
    inner: Arc<ChildProcess>,
    id: ResourceId,
}

/// Spawn `program`. The child holds the process open until it exits or is
/// unref'd.
#[napi]
pub fn process_spawn(
    program: String,
    options: Option<serde_json::Value>,
) -> napi::Result<ChildProcessHandle> {
    let rt = runtime::get()?;
    let command = command(program, options)?;
    let _guard = rt.enter();
    let inner = Arc::new(command.spawn(&rt.ctx).map_err(to_napi_error)?);
    let id = rt.ctx.register(inner.clone());
    Ok(ChildProcessHandle { inner, id })
}

#[napi]
impl ChildProcessHandle {
    #[napi(getter)]
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    #[napi(getter)]
    pub fn pid(&self) -> u32 {
        self.inner.pid()
    }

    /// Resolves with the exit status once the child has exited.
    #[napi]
    pub async fn status(&self) -> napi::Result<JsCommandStatus> {
        let rt = runtime::get()?;
        let status = self.inner.status();
        let status = rt
            .run("status", async move { status.wait().await })
            .await?;
        Ok(status.into())
    }

    /// Wait for exit and collect the piped streams.
    #[napi]
    pub async fn output(&self) -> napi::Result<JsCommandOutput> {
        let rt = runtime::get()?;
        let child = self.inner.clone();
        let output = rt
            .run("output", async move { child.output().await })
            .await?;
        Ok(output.into())
    }

    /// Close the child (killing it if still running) and resolve with its
    /// exit status once reaped.
    #[napi]
    pub async fn kill_and_wait(&self) -> napi::Result<JsCommandStatus> {
        let rt = runtime::get()?;
        let child = self.inner.clone();
        let status = rt
            .run("kill_and_wait", async move { child.kill_and_wait().await })
            .await?;
        Ok(status.into())
    }

    /// Send `signal` (default: the configured kill signal). No-op once exited.
    #[napi]
    pub fn kill(&self, signal: Option<String>) -> napi::Result<()> {
        let signal = parse_signal("kill", signal)?;
        self.inner.kill(signal).map_err(to_napi_error)
    }
}
