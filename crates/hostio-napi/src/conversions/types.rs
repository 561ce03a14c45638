//! Object shapes handed to and from JavaScript.

use hostio_fs::FsEvent;
use hostio_lifecycle::{Diagnostic, PumpExit};
use hostio_process::{CommandOutput, CommandStatus};
use hostio_runtime::OperationSpec;
use napi::bindgen_prelude::Buffer;
use napi_derive::napi;
use serde::Serialize;

#[napi(object)]
#[derive(Debug, Clone, Serialize)]
pub struct JsFsEvent {
    pub kind: String,
    pub paths: Vec<String>,
    pub flag: Option<String>,
}

impl From<FsEvent> for JsFsEvent {
    fn from(event: FsEvent) -> Self {
        Self {
            kind: event.kind.as_str().to_string(),
            paths: event
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            flag: event.flag.map(|_| "rescan".to_string()),
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone, Serialize)]
pub struct JsCommandStatus {
    pub success: bool,
    pub code: i32,
    pub signal: Option<String>,
}

impl From<CommandStatus> for JsCommandStatus {
    fn from(status: CommandStatus) -> Self {
        Self {
            success: status.success,
            code: status.code,
            signal: status.signal.map(|s| s.name().to_string()),
        }
    }
}

#[napi(object)]
pub struct JsCommandOutput {
    pub status: JsCommandStatus,
    pub stdout: Buffer,
    pub stderr: Buffer,
}

impl From<CommandOutput> for JsCommandOutput {
    fn from(output: CommandOutput) -> Self {
        Self {
            status: output.status.into(),
            stdout: output.stdout.into(),
            stderr: output.stderr.into(),
        }
    }
}

/// An incoming HTTP request as seen by a JS handler.
#[napi(object)]
#[derive(Debug, Clone, Serialize)]
pub struct JsRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
}

#[napi(object)]
#[derive(Debug, Clone, Serialize)]
pub struct JsOperation {
    pub module: String,
    pub name: String,
    pub args: Vec<String>,
    pub result: String,
    pub variant: String,
}

impl From<&OperationSpec> for JsOperation {
    fn from(spec: &OperationSpec) -> Self {
        Self {
            module: spec.module.to_string(),
            name: spec.name.to_string(),
            args: spec.args.iter().map(|a| a.to_string()).collect(),
            result: spec.result.to_string(),
            variant: format!("{:?}", spec.variant).to_lowercase(),
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone, Serialize)]
pub struct JsDiagnostic {
    pub source: String,
    pub code: String,
    pub message: String,
    pub reported_at: String,
}

impl From<Diagnostic> for JsDiagnostic {
    fn from(diagnostic: Diagnostic) -> Self {
        use hostio_core::HostErrorCode;
        Self {
            source: diagnostic.source,
            code: diagnostic.error.error_code().to_string(),
            message: diagnostic.error.to_string(),
            reported_at: diagnostic.reported_at.to_rfc3339(),
        }
    }
}

/// `stopped`, `exhausted`, or `failed: <error>`.
pub fn pump_exit_label(exit: &PumpExit) -> String {
    match exit {
        PumpExit::Stopped => "stopped".to_string(),
        PumpExit::Exhausted => "exhausted".to_string(),
        PumpExit::Failed(err) => format!("failed: {err}"),
    }
}
