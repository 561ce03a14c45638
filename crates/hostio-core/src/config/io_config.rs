//! Byte stream configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IoConfig {
    /// Upper bound for a single read when the caller gives no length. Default: 16 KiB.
    pub read_chunk_size: Option<usize>,
}

impl IoConfig {
    pub fn effective_read_chunk_size(&self) -> usize {
        self.read_chunk_size
            .unwrap_or(constants::DEFAULT_READ_CHUNK_SIZE)
    }
}
