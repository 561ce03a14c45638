//! Top-level hostio configuration with 4-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DiagnosticsConfig, IoConfig, ProcessConfig, ServerConfig, WatchConfig};
use crate::constants;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`HOSTIO_*`)
/// 3. Project config (`hostio.toml` in project root)
/// 4. User config (`~/.hostio/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HostioConfig {
    pub watch: WatchConfig,
    pub server: ServerConfig,
    pub process: ProcessConfig,
    pub io: IoConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub server_hostname: Option<String>,
    pub server_port: Option<u16>,
    pub watch_recursive: Option<bool>,
    pub kill_signal: Option<String>,
}

impl HostioConfig {
    /// Load configuration with 4-layer resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(constants::PROJECT_CONFIG_FILENAME);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &HostioConfig) -> Result<(), ConfigError> {
        if config.watch.event_buffer == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "watch.event_buffer".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.io.read_chunk_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "io.read_chunk_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.diagnostics.capacity == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "diagnostics.capacity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(ref hostname) = config.server.hostname {
            if hostname.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "server.hostname".to_string(),
                    message: "must be non-empty".to_string(),
                });
            }
        }
        if let Some(ref signal) = config.process.kill_signal {
            if !signal.starts_with("SIG") {
                return Err(ConfigError::ValidationFailed {
                    field: "process.kill_signal".to_string(),
                    message: format!("expected a signal name like SIGTERM, got {signal}"),
                });
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.hostio/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| {
            h.join(constants::USER_CONFIG_DIRNAME)
                .join(constants::USER_CONFIG_FILENAME)
        })
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut HostioConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: HostioConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut HostioConfig, other: &HostioConfig) {
        // Watch
        if other.watch.recursive.is_some() {
            base.watch.recursive = other.watch.recursive;
        }
        if other.watch.event_buffer.is_some() {
            base.watch.event_buffer = other.watch.event_buffer;
        }
        if other.watch.continue_on_error.is_some() {
            base.watch.continue_on_error = other.watch.continue_on_error;
        }

        // Server
        if other.server.hostname.is_some() {
            base.server.hostname = other.server.hostname.clone();
        }
        if other.server.port.is_some() {
            base.server.port = other.server.port;
        }

        // Process
        if other.process.kill_signal.is_some() {
            base.process.kill_signal = other.process.kill_signal.clone();
        }

        // IO
        if other.io.read_chunk_size.is_some() {
            base.io.read_chunk_size = other.io.read_chunk_size;
        }

        // Diagnostics
        if other.diagnostics.capacity.is_some() {
            base.diagnostics.capacity = other.diagnostics.capacity;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `HOSTIO_SERVER_PORT`, `HOSTIO_WATCH_RECURSIVE`, etc.
    fn apply_env_overrides(config: &mut HostioConfig) {
        if let Ok(val) = std::env::var("HOSTIO_WATCH_RECURSIVE") {
            if let Ok(v) = val.parse::<bool>() {
                config.watch.recursive = Some(v);
            }
        }
        if let Ok(val) = std::env::var("HOSTIO_WATCH_EVENT_BUFFER") {
            if let Ok(v) = val.parse::<usize>() {
                config.watch.event_buffer = Some(v);
            }
        }
        if let Ok(val) = std::env::var("HOSTIO_WATCH_CONTINUE_ON_ERROR") {
            if let Ok(v) = val.parse::<bool>() {
                config.watch.continue_on_error = Some(v);
            }
        }
        if let Ok(val) = std::env::var("HOSTIO_SERVER_HOSTNAME") {
            config.server.hostname = Some(val);
        }
        if let Ok(val) = std::env::var("HOSTIO_SERVER_PORT") {
            if let Ok(v) = val.parse::<u16>() {
                config.server.port = Some(v);
            }
        }
        if let Ok(val) = std::env::var("HOSTIO_PROCESS_KILL_SIGNAL") {
            config.process.kill_signal = Some(val);
        }
        if let Ok(val) = std::env::var("HOSTIO_IO_READ_CHUNK_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.io.read_chunk_size = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut HostioConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.server_hostname {
            config.server.hostname = Some(v.clone());
        }
        if let Some(v) = cli.server_port {
            config.server.port = Some(v);
        }
        if let Some(v) = cli.watch_recursive {
            config.watch.recursive = Some(v);
        }
        if let Some(ref v) = cli.kill_signal {
            config.process.kill_signal = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
