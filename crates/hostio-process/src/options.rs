//! Command options.
//!
//! Like the filesystem option records every field is optional and
//! `combine` lets the right side win. Environment maps merge key by key.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;

use serde::{Deserialize, Serialize};

/// How a child's standard stream is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdioMode {
    Piped,
    Inherit,
    Null,
}

impl StdioMode {
    pub(crate) fn to_stdio(self) -> Stdio {
        match self {
            Self::Piped => Stdio::piped(),
            Self::Inherit => Stdio::inherit(),
            Self::Null => Stdio::null(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandOptions {
    pub args: Option<Vec<String>>,
    pub cwd: Option<PathBuf>,
    pub clear_env: Option<bool>,
    pub env: Option<BTreeMap<String, String>>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub stdin: Option<StdioMode>,
    pub stdout: Option<StdioMode>,
    pub stderr: Option<StdioMode>,
    /// Only meaningful on Windows; ignored elsewhere.
    pub windows_raw_arguments: Option<bool>,
}

impl CommandOptions {
    pub fn args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: Some(args.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            ..Self::default()
        }
    }

    pub fn clear_env() -> Self {
        Self {
            clear_env: Some(true),
            ..Self::default()
        }
    }

    pub fn env(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            env: Some(BTreeMap::from([(key.into(), value.into())])),
            ..Self::default()
        }
    }

    pub fn uid(uid: u32) -> Self {
        Self {
            uid: Some(uid),
            ..Self::default()
        }
    }

    pub fn gid(gid: u32) -> Self {
        Self {
            gid: Some(gid),
            ..Self::default()
        }
    }

    pub fn stdin(mode: StdioMode) -> Self {
        Self {
            stdin: Some(mode),
            ..Self::default()
        }
    }

    pub fn stdout(mode: StdioMode) -> Self {
        Self {
            stdout: Some(mode),
            ..Self::default()
        }
    }

    pub fn stderr(mode: StdioMode) -> Self {
        Self {
            stderr: Some(mode),
            ..Self::default()
        }
    }

    pub fn windows_raw_arguments() -> Self {
        Self {
            windows_raw_arguments: Some(true),
            ..Self::default()
        }
    }

    pub fn combine(self, other: Self) -> Self {
        let env = match (self.env, other.env) {
            (Some(mut left), Some(right)) => {
                left.extend(right);
                Some(left)
            }
            (left, right) => right.or(left),
        };
        Self {
            args: other.args.or(self.args),
            cwd: other.cwd.or(self.cwd),
            clear_env: other.clear_env.or(self.clear_env),
            env,
            uid: other.uid.or(self.uid),
            gid: other.gid.or(self.gid),
            stdin: other.stdin.or(self.stdin),
            stdout: other.stdout.or(self.stdout),
            stderr: other.stderr.or(self.stderr),
            windows_raw_arguments: other.windows_raw_arguments.or(self.windows_raw_arguments),
        }
    }
}
