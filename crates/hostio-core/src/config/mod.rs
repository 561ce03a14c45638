//! Configuration system for hostio.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod diagnostics_config;
pub mod hostio_config;
pub mod io_config;
pub mod process_config;
pub mod server_config;
pub mod watch_config;

pub use diagnostics_config::DiagnosticsConfig;
pub use hostio_config::{CliOverrides, HostioConfig};
pub use io_config::IoConfig;
pub use process_config::ProcessConfig;
pub use server_config::ServerConfig;
pub use watch_config::WatchConfig;
