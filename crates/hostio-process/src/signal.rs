//! POSIX signal names.

use std::fmt;
use std::str::FromStr;

use hostio_core::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Sighup,
    Sigint,
    Sigquit,
    Sigabrt,
    Sigkill,
    Sigusr1,
    Sigusr2,
    Sigpipe,
    Sigalrm,
    Sigterm,
    Sigchld,
    Sigcont,
    Sigstop,
    Sigtstp,
    Sigwinch,
}

impl Signal {
    pub const ALL: [Signal; 15] = [
        Signal::Sighup,
        Signal::Sigint,
        Signal::Sigquit,
        Signal::Sigabrt,
        Signal::Sigkill,
        Signal::Sigusr1,
        Signal::Sigusr2,
        Signal::Sigpipe,
        Signal::Sigalrm,
        Signal::Sigterm,
        Signal::Sigchld,
        Signal::Sigcont,
        Signal::Sigstop,
        Signal::Sigtstp,
        Signal::Sigwinch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sighup => "SIGHUP",
            Self::Sigint => "SIGINT",
            Self::Sigquit => "SIGQUIT",
            Self::Sigabrt => "SIGABRT",
            Self::Sigkill => "SIGKILL",
            Self::Sigusr1 => "SIGUSR1",
            Self::Sigusr2 => "SIGUSR2",
            Self::Sigpipe => "SIGPIPE",
            Self::Sigalrm => "SIGALRM",
            Self::Sigterm => "SIGTERM",
            Self::Sigchld => "SIGCHLD",
            Self::Sigcont => "SIGCONT",
            Self::Sigstop => "SIGSTOP",
            Self::Sigtstp => "SIGTSTP",
            Self::Sigwinch => "SIGWINCH",
        }
    }

    /// Parse a configured signal name, reporting failures as `InvalidArgument`.
    pub fn parse(op: &str, name: &str) -> BridgeResult<Self> {
        name.parse()
            .map_err(|_| BridgeError::invalid_argument(op, format!("unknown signal {name}")))
    }

    #[cfg(unix)]
    pub fn to_nix(self) -> nix::sys::signal::Signal {
        use nix::sys::signal::Signal as Nix;
        match self {
            Self::Sighup => Nix::SIGHUP,
            Self::Sigint => Nix::SIGINT,
            Self::Sigquit => Nix::SIGQUIT,
            Self::Sigabrt => Nix::SIGABRT,
            Self::Sigkill => Nix::SIGKILL,
            Self::Sigusr1 => Nix::SIGUSR1,
            Self::Sigusr2 => Nix::SIGUSR2,
            Self::Sigpipe => Nix::SIGPIPE,
            Self::Sigalrm => Nix::SIGALRM,
            Self::Sigterm => Nix::SIGTERM,
            Self::Sigchld => Nix::SIGCHLD,
            Self::Sigcont => Nix::SIGCONT,
            Self::Sigstop => Nix::SIGSTOP,
            Self::Sigtstp => Nix::SIGTSTP,
            Self::Sigwinch => Nix::SIGWINCH,
        }
    }

    /// Platform signal number.
    #[cfg(unix)]
    pub fn number(self) -> i32 {
        self.to_nix() as i32
    }

    /// Signal for a platform signal number, if it is one we name.
    #[cfg(unix)]
    pub fn from_number(number: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == number)
    }
}

impl FromStr for Signal {
    type Err = String;

    /// Accepts `SIGTERM`, `TERM` and `sigterm` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let full = if upper.starts_with("SIG") {
            upper
        } else {
            format!("SIG{upper}")
        };
        Self::ALL
            .into_iter()
            .find(|signal| signal.name() == full)
            .ok_or_else(|| format!("unknown signal: {s}"))
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
