//! # hostio-runtime
//!
//! Process-level surface: environment variables, host and process
//! identity, exit, signal listeners, timers, and the canonical operation
//! table every binding is generated against.

pub mod env;
pub mod operations;
pub mod signals;
pub mod system;
pub mod timer;

pub use env::Env;
pub use operations::{OperationSpec, OperationTable, OperationVariant};
pub use signals::{add_signal_listener, listen_signal, remove_signal_listener, SignalListener};
pub use system::{
    args, build, chdir, cwd, exec_path, exit, gid, hostname, no_color, os_release, pid, ppid, uid,
    BuildInfo,
};
pub use timer::{ref_timer, set_interval, set_timeout, unref_timer, Interval, Timer, TimerExit};
