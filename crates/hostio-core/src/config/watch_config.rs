//! Change-watcher configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration for filesystem watchers and their event pumps.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WatchConfig {
    /// Watch directories recursively. Default: true.
    pub recursive: Option<bool>,
    /// Events buffered between the native watcher and the pump. Default: 64.
    pub event_buffer: Option<usize>,
    /// Keep pumping after a non-abort source failure. Default: false.
    pub continue_on_error: Option<bool>,
}

impl WatchConfig {
    pub fn effective_recursive(&self) -> bool {
        self.recursive.unwrap_or(constants::DEFAULT_WATCH_RECURSIVE)
    }

    pub fn effective_event_buffer(&self) -> usize {
        self.event_buffer
            .unwrap_or(constants::DEFAULT_WATCH_EVENT_BUFFER)
    }

    pub fn effective_continue_on_error(&self) -> bool {
        self.continue_on_error
            .unwrap_or(constants::DEFAULT_WATCH_CONTINUE_ON_ERROR)
    }
}
