//! # hostio-core
//!
//! Foundation crate for the hostio bridge.
//! Defines the error taxonomy, error codes, configuration, tracing setup,
//! and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;

// Re-export the most commonly used types at the crate root.
pub use config::HostioConfig;
pub use errors::{BridgeError, BridgeResult, ConfigError, ErrorKind, HostErrorCode};
