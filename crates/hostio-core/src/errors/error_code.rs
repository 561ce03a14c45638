//! HostErrorCode trait for the foreign boundary.

/// Trait for converting hostio errors to boundary error codes.
/// Every error enum must implement this to provide a structured
/// error code string for the consuming host language.
pub trait HostErrorCode {
    /// Returns the boundary error code string (e.g., "NOT_FOUND").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted boundary error string: `[ERROR_CODE] message`.
    fn napi_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants for the foreign boundary.
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
pub const IO_FAILURE: &str = "IO_FAILURE";
pub const ABORTED: &str = "ABORTED";
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
pub const ALREADY_CLOSED: &str = "ALREADY_CLOSED";
pub const ALREADY_ATTACHED: &str = "ALREADY_ATTACHED";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const RUNTIME_NOT_INITIALIZED: &str = "RUNTIME_NOT_INITIALIZED";
pub const ALREADY_INITIALIZED: &str = "ALREADY_INITIALIZED";
