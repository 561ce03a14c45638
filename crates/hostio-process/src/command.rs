//! Command: a program plus options, run to completion or spawned.

use std::ffi::OsString;
use std::process::{ExitStatus, Output};

use hostio_core::{BridgeError, BridgeResult};
use hostio_lifecycle::ProcessContext;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;

use crate::child::ChildProcess;
use crate::options::{CommandOptions, StdioMode};
use crate::signal::Signal;

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStatus {
    pub success: bool,
    /// Exit code, or `128 + signo` when the child was killed by a signal.
    pub code: i32,
    pub signal: Option<Signal>,
}

impl From<ExitStatus> for CommandStatus {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signo) = status.signal() {
                return Self {
                    success: false,
                    code: 128 + signo,
                    signal: Signal::from_number(signo),
                };
            }
        }
        Self {
            success: status.success(),
            code: status.code().unwrap_or(1),
            signal: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: CommandStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            status: output.status.into(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Stdio defaults applied where the options leave a stream unset.
#[derive(Clone, Copy)]
struct StdioDefaults {
    stdin: StdioMode,
    stdout: StdioMode,
    stderr: StdioMode,
}

/// `output` collects both streams and feeds nothing in.
const OUTPUT_DEFAULTS: StdioDefaults = StdioDefaults {
    stdin: StdioMode::Null,
    stdout: StdioMode::Piped,
    stderr: StdioMode::Piped,
};

const SPAWN_DEFAULTS: StdioDefaults = StdioDefaults {
    stdin: StdioMode::Inherit,
    stdout: StdioMode::Inherit,
    stderr: StdioMode::Inherit,
};

/// Resolved stdio wiring of a spawned child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StdioPlan {
    pub stdin: StdioMode,
    pub stdout: StdioMode,
    pub stderr: StdioMode,
}

#[derive(Debug, Clone)]
pub struct Command {
    program: OsString,
    options: CommandOptions,
}

impl Command {
    pub fn new(program: impl Into<OsString>, options: CommandOptions) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    fn plan(&self, defaults: StdioDefaults) -> StdioPlan {
        StdioPlan {
            stdin: self.options.stdin.unwrap_or(defaults.stdin),
            stdout: self.options.stdout.unwrap_or(defaults.stdout),
            stderr: self.options.stderr.unwrap_or(defaults.stderr),
        }
    }

    fn build(&self, plan: StdioPlan) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        if let Some(args) = &self.options.args {
            cmd.args(args);
        }
        if let Some(cwd) = &self.options.cwd {
            cmd.current_dir(cwd);
        }
        if self.options.clear_env == Some(true) {
            cmd.env_clear();
        }
        if let Some(env) = &self.options.env {
            cmd.envs(env);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if let Some(uid) = self.options.uid {
                cmd.uid(uid);
            }
            if let Some(gid) = self.options.gid {
                cmd.gid(gid);
            }
        }
        cmd.stdin(plan.stdin.to_stdio())
            .stdout(plan.stdout.to_stdio())
            .stderr(plan.stderr.to_stdio());
        cmd
    }

    /// Run to completion and collect output. Streams not piped come back empty.
    pub async fn output(&self) -> BridgeResult<CommandOutput> {
        let mut cmd = tokio::process::Command::from(self.build(self.plan(OUTPUT_DEFAULTS)));
        let output = cmd
            .output()
            .await
            .map_err(|e| BridgeError::from_io("output", e))?;
        let output = CommandOutput::from(output);
        tracing::debug!(
            program = ?self.program,
            code = output.status.code,
            "command finished"
        );
        Ok(output)
    }

    /// Blocking twin of [`output`](Self::output).
    pub fn output_sync(&self) -> BridgeResult<CommandOutput> {
        self.build(self.plan(OUTPUT_DEFAULTS))
            .output()
            .map(CommandOutput::from)
            .map_err(|e| BridgeError::from_io("output_sync", e))
    }

    /// Start the program as a ref'd [`ChildProcess`]. Streams default to
    /// inherit.
    pub fn spawn(&self, ctx: &ProcessContext) -> BridgeResult<ChildProcess> {
        Handle::try_current()
            .map_err(|_| BridgeError::io("spawn", "no async runtime is running"))?;
        let kill_signal = Signal::parse("spawn", &ctx.config().process.effective_kill_signal())?;
        let plan = self.plan(SPAWN_DEFAULTS);
        let mut cmd = tokio::process::Command::from(self.build(plan));
        let child = cmd.spawn().map_err(|e| BridgeError::from_io("spawn", e))?;
        ChildProcess::start(ctx, child, plan, kill_signal)
    }
}
