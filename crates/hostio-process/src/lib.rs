//! # hostio-process
//!
//! Subprocesses: command options, one-shot `output`, spawned child
//! processes as lifecycle resources, and signal names.

pub mod child;
pub mod command;
pub mod options;
pub mod signal;

pub use child::ChildProcess;
pub use command::{Command, CommandOutput, CommandStatus};
pub use options::{CommandOptions, StdioMode};
pub use signal::Signal;
