//! Rust ↔ JS conversions.

pub mod error_codes;
pub mod types;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Deserialize an optional JSON options argument, defaulting when absent.
pub fn from_json<T: DeserializeOwned + Default>(
    what: &str,
    value: Option<serde_json::Value>,
) -> napi::Result<T> {
    match value {
        Some(value) => serde_json::from_value(value).map_err(|e| error_codes::invalid_json(what, e)),
        None => Ok(T::default()),
    }
}

pub fn to_json<T: Serialize>(what: &str, value: &T) -> napi::Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| {
        error_codes::to_napi_error(hostio_core::BridgeError::io(what, e.to_string()))
    })
}
