//! # hostio-napi
//!
//! Node-API bindings for JavaScript hosts.
//!
//! - `runtime`: `HostRuntime` singleton held in a `OnceLock`, owning the tokio runtime
//!   resources run on and the `ProcessContext` they register with
//! - `conversions`: error code mapping and JS object shapes
//! - `bindings`: exported functions and resource classes, one module per area

pub mod bindings;
pub mod conversions;
pub mod runtime;
