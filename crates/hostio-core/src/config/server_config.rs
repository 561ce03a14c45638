//! HTTP server configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Defaults applied when a serve call does not name an address.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen hostname. Default: "0.0.0.0".
    pub hostname: Option<String>,
    /// Listen port. Default: 8000.
    pub port: Option<u16>,
}

impl ServerConfig {
    pub fn effective_hostname(&self) -> String {
        self.hostname
            .clone()
            .unwrap_or_else(|| constants::DEFAULT_SERVER_HOSTNAME.to_string())
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(constants::DEFAULT_SERVER_PORT)
    }
}
