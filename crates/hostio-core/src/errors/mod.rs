//! Error handling for hostio.
//! One error enum per concern, `thiserror` only, zero `anyhow`.

pub mod bridge_error;
pub mod config_error;
pub mod error_code;
pub mod kind;

pub use bridge_error::{BridgeError, BridgeResult};
pub use config_error::ConfigError;
pub use error_code::HostErrorCode;
pub use kind::ErrorKind;
