//! Stdio bindings.

use hostio_core::BridgeError;
use hostio_io::{write_sync, StdTarget};
use napi::bindgen_prelude::Buffer;
use napi_derive::napi;

use crate::conversions::error_codes::to_napi_error;

fn target(name: &str) -> napi::Result<StdTarget> {
    match name {
        "stdout" => Ok(StdTarget::Stdout),
        "stderr" => Ok(StdTarget::Stderr),
        other => Err(to_napi_error(BridgeError::invalid_argument(
            "write_sync",
            format!("unknown stdio target {other}"),
        ))),
    }
}

/// Write all of `data` to `stdout` or `stderr` on the calling thread.
#[napi]
pub fn io_write_sync(target_name: String, data: Buffer) -> napi::Result<u32> {
    let written = write_sync(target(&target_name)?, &data).map_err(to_napi_error)?;
    Ok(u32::try_from(written).unwrap_or(u32::MAX))
}

#[napi]
pub fn io_is_terminal(target_name: String) -> napi::Result<bool> {
    Ok(target(&target_name)?.is_terminal())
}
