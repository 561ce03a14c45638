//! Child process configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProcessConfig {
    /// Signal sent by `kill()` when none is given. Default: "SIGTERM".
    pub kill_signal: Option<String>,
}

impl ProcessConfig {
    pub fn effective_kill_signal(&self) -> String {
        self.kill_signal
            .clone()
            .unwrap_or_else(|| constants::DEFAULT_KILL_SIGNAL.to_string())
    }
}
