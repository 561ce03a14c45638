//! ChildProcess: a spawned program as a lifecycle resource.

use std::sync::{Arc, Mutex, PoisonError};

use hostio_core::{BridgeError, BridgeResult};
use hostio_io::{InputStream, OutputStream};
use hostio_lifecycle::{
    CompletionCell, CompletionFuture, HandleState, ProcessContext, ResourceHandle, ResourceKind,
};

use crate::command::{CommandOutput, CommandStatus, StdioPlan};
use crate::options::StdioMode;
use crate::signal::Signal;

/// A running (or exited) child process.
///
/// Ref'd by default; the keep-alive is released when the child exits or
/// the handle is closed. [`status`](Self::status) settles exactly once
/// with the exit status.
pub struct ChildProcess {
    state: Arc<HandleState>,
    pid: u32,
    status: CompletionCell<CommandStatus>,
    kill_signal: Signal,
    plan: StdioPlan,
    stdin: Mutex<Option<OutputStream>>,
    stdout: Mutex<Option<InputStream>>,
    stderr: Mutex<Option<InputStream>>,
}

impl ChildProcess {
    pub(crate) fn start(
        ctx: &ProcessContext,
        mut child: tokio::process::Child,
        plan: StdioPlan,
        kill_signal: Signal,
    ) -> BridgeResult<Self> {
        let pid = child
            .id()
            .ok_or_else(|| BridgeError::io("spawn", "child was reaped before it started"))?;
        let chunk_size = ctx.config().io.effective_read_chunk_size();
        let stdin = child.stdin.take().map(OutputStream::new);
        let stdout = child
            .stdout
            .take()
            .map(|out| InputStream::new(out).with_chunk_size(chunk_size));
        let stderr = child
            .stderr
            .take()
            .map(|err| InputStream::new(err).with_chunk_size(chunk_size));

        let state = Arc::new(HandleState::new(ResourceKind::ChildProcess, ctx.keep_alive()));
        let status = CompletionCell::new();
        tracing::debug!(resource = %state.label(), pid, "child spawned");

        let task_state = Arc::clone(&state);
        let task_status = status.clone();
        tokio::spawn(async move {
            let outcome = child
                .wait()
                .await
                .map(CommandStatus::from)
                .map_err(|e| BridgeError::from_io("wait", e));
            match &outcome {
                Ok(exit) => tracing::debug!(
                    resource = %task_state.label(),
                    code = exit.code,
                    signal = ?exit.signal,
                    "child exited"
                ),
                Err(err) => {
                    tracing::error!(resource = %task_state.label(), error = %err, "child wait failed")
                }
            }
            task_status.settle(outcome);
            task_state.begin_close();
        });

        Ok(Self {
            state,
            pid,
            status,
            kill_signal,
            plan,
            stdin: Mutex::new(stdin),
            stdout: Mutex::new(stdout),
            stderr: Mutex::new(stderr),
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Settles with the exit status once the child has been reaped.
    pub fn status(&self) -> CompletionFuture<CommandStatus> {
        self.status.future()
    }

    pub fn has_exited(&self) -> bool {
        self.status.is_settled()
    }

    /// Send `signal` (the configured kill signal when `None`).
    /// A child that has already exited is left alone.
    #[cfg(unix)]
    pub fn kill(&self, signal: Option<Signal>) -> BridgeResult<()> {
        use nix::errno::Errno;
        use nix::unistd::Pid;

        if self.has_exited() {
            return Ok(());
        }
        let signal = signal.unwrap_or(self.kill_signal);
        let pid = i32::try_from(self.pid)
            .map_err(|_| BridgeError::invalid_argument("kill", format!("pid {} out of range", self.pid)))?;
        match nix::sys::signal::kill(Pid::from_raw(pid), signal.to_nix()) {
            Ok(()) => {
                tracing::debug!(resource = %self.state.label(), %signal, "signal sent");
                Ok(())
            }
            // Exited between the check and the send.
            Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(BridgeError::from_io("kill", errno.into())),
        }
    }

    #[cfg(not(unix))]
    pub fn kill(&self, _signal: Option<Signal>) -> BridgeResult<()> {
        Err(BridgeError::invalid_argument(
            "kill",
            "signals are not supported on this platform",
        ))
    }

    /// Close the handle and wait until the child has been reaped.
    ///
    /// Resolves with the exit status, which is settled by the time this
    /// returns. A child that had already exited returns its status.
    pub async fn kill_and_wait(&self) -> BridgeResult<CommandStatus> {
        self.close()?;
        let exit = self.status.future();
        exit.wait().await
    }

    pub fn take_stdin(&self) -> Option<OutputStream> {
        self.stdin
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn take_stdout(&self) -> Option<InputStream> {
        self.stdout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn take_stderr(&self) -> Option<InputStream> {
        self.stderr
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Wait for exit and collect whatever the piped streams produce.
    /// Streams that were not piped come back empty; a piped stream that
    /// was already taken is `InvalidArgument`.
    pub async fn output(&self) -> BridgeResult<CommandOutput> {
        let stdout = self.collectable("stdout", self.plan.stdout, self.take_stdout())?;
        let stderr = self.collectable("stderr", self.plan.stderr, self.take_stderr())?;
        // Nothing else writes to stdin once output is requested.
        drop(self.take_stdin());

        let exit = self.status.future();
        let (stdout, stderr, status) = tokio::join!(drain(stdout), drain(stderr), exit.wait());
        Ok(CommandOutput {
            status: status?,
            stdout: stdout?,
            stderr: stderr?,
        })
    }

    fn collectable(
        &self,
        name: &str,
        mode: StdioMode,
        stream: Option<InputStream>,
    ) -> BridgeResult<Option<InputStream>> {
        match (mode, stream) {
            (StdioMode::Piped, None) => Err(BridgeError::invalid_argument(
                "output",
                format!("{name} of {} was already taken", self.state.label()),
            )),
            (_, stream) => Ok(stream),
        }
    }
}

async fn drain(stream: Option<InputStream>) -> BridgeResult<Vec<u8>> {
    match stream {
        Some(stream) => stream.read_to_end().await,
        None => Ok(Vec::new()),
    }
}

impl ResourceHandle for ChildProcess {
    fn state(&self) -> &HandleState {
        &self.state
    }

    /// Closing a live child kills it with the configured signal.
    fn close_native(&self) -> BridgeResult<()> {
        self.kill(None)
    }
}

impl std::fmt::Debug for ChildProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildProcess")
            .field("resource", &self.state.label())
            .field("pid", &self.pid)
            .field("exited", &self.has_exited())
            .finish()
    }
}
