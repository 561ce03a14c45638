//! Diagnostic sink configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Number of diagnostics retained in memory. Default: 256.
    pub capacity: Option<usize>,
}

impl DiagnosticsConfig {
    pub fn effective_capacity(&self) -> usize {
        self.capacity
            .unwrap_or(constants::DEFAULT_DIAGNOSTICS_CAPACITY)
    }
}
