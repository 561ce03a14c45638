//! Host and process identity, working directory and exit.

use std::path::{Path, PathBuf};

use hostio_core::{BridgeError, BridgeResult};
use hostio_lifecycle::ProcessContext;
use serde::{Deserialize, Serialize};

pub fn cwd() -> BridgeResult<PathBuf> {
    std::env::current_dir().map_err(|e| BridgeError::from_io("cwd", e))
}

pub fn chdir(path: impl AsRef<Path>) -> BridgeResult<()> {
    std::env::set_current_dir(path.as_ref()).map_err(|e| BridgeError::from_io("chdir", e))
}

pub fn exec_path() -> BridgeResult<PathBuf> {
    std::env::current_exe().map_err(|e| BridgeError::from_io("exec_path", e))
}

/// Command-line arguments after the program name. Non-UTF-8 arguments are
/// converted lossily.
pub fn args() -> Vec<String> {
    std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

pub fn pid() -> u32 {
    std::process::id()
}

#[cfg(unix)]
pub fn ppid() -> u32 {
    nix::unistd::getppid().as_raw().unsigned_abs()
}

#[cfg(not(unix))]
pub fn ppid() -> u32 {
    0
}

#[cfg(unix)]
pub fn hostname() -> BridgeResult<String> {
    let name = nix::unistd::gethostname()
        .map_err(|errno| BridgeError::from_io("hostname", errno.into()))?;
    Ok(name.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
pub fn hostname() -> BridgeResult<String> {
    std::env::var("COMPUTERNAME")
        .map_err(|_| BridgeError::io("hostname", "COMPUTERNAME is not set"))
}

/// Kernel release string, e.g. `6.8.0-45-generic`.
#[cfg(unix)]
pub fn os_release() -> BridgeResult<String> {
    let uts = nix::sys::utsname::uname()
        .map_err(|errno| BridgeError::from_io("os_release", errno.into()))?;
    Ok(uts.release().to_string_lossy().into_owned())
}

#[cfg(not(unix))]
pub fn os_release() -> BridgeResult<String> {
    Err(BridgeError::invalid_argument(
        "os_release",
        "not supported on this platform",
    ))
}

/// `None` where the platform has no numeric user ids.
pub fn uid() -> Option<u32> {
    #[cfg(unix)]
    {
        Some(nix::unistd::getuid().as_raw())
    }
    #[cfg(not(unix))]
    {
        None
    }
}

pub fn gid() -> Option<u32> {
    #[cfg(unix)]
    {
        Some(nix::unistd::getgid().as_raw())
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// True when `NO_COLOR` is set to a non-empty value.
pub fn no_color() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
}

/// Target the running binary was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub os: String,
    pub arch: String,
    pub family: String,
}

pub fn build() -> BuildInfo {
    BuildInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        family: std::env::consts::FAMILY.to_string(),
    }
}

/// Close every registered resource and exit with `code`, or with the
/// context's exit code when `None`.
pub fn exit(ctx: &ProcessContext, code: Option<i32>) -> ! {
    let code = code.unwrap_or_else(|| ctx.exit_code());
    let closed = ctx.close_all();
    tracing::info!(code, closed, "exiting");
    std::process::exit(code)
}
