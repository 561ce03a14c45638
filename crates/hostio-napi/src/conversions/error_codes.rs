//! Error → napi::Error conversion with `[ERROR_CODE] message` strings.
//!
//! The JS side parses the code from the prefix.

use hostio_core::HostErrorCode;
use napi::Status;

pub use hostio_core::errors::error_code::{
    ABORTED, ALREADY_ATTACHED, ALREADY_CLOSED, ALREADY_EXISTS, ALREADY_INITIALIZED, CONFIG_ERROR,
    INVALID_ARGUMENT, IO_FAILURE, NOT_FOUND, PERMISSION_DENIED, RUNTIME_NOT_INITIALIZED,
};

/// Convert any hostio error to a structured NAPI error.
pub fn to_napi_error(err: impl std::fmt::Display + HostErrorCode) -> napi::Error {
    napi::Error::new(Status::GenericFailure, err.napi_string())
}

pub fn runtime_not_initialized() -> napi::Error {
    napi::Error::new(
        Status::GenericFailure,
        format!("[{RUNTIME_NOT_INITIALIZED}] call hostioInitialize() first"),
    )
}

pub fn already_initialized() -> napi::Error {
    napi::Error::new(
        Status::GenericFailure,
        format!("[{ALREADY_INITIALIZED}] the hostio runtime is already initialized"),
    )
}

/// A JSON argument that does not deserialize into the expected options.
pub fn invalid_json(what: &str, err: serde_json::Error) -> napi::Error {
    napi::Error::new(
        Status::InvalidArg,
        format!("[{INVALID_ARGUMENT}] invalid {what}: {err}"),
    )
}
