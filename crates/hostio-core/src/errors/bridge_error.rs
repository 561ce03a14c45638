//! The single error value routed to every error continuation.

use super::error_code::{self, HostErrorCode};
use super::kind::ErrorKind;

/// Error delivered to an operation's error sink.
///
/// Cloneable so a settled completion can hand the same failure to every
/// subscriber. Native `io::Error`s are flattened to their message; the
/// kind survives as the variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("{op}: not found: {message}")]
    NotFound { op: String, message: String },

    #[error("{op}: permission denied: {message}")]
    PermissionDenied { op: String, message: String },

    #[error("{op}: already exists: {message}")]
    AlreadyExists { op: String, message: String },

    #[error("{op}: I/O failure: {message}")]
    Io { op: String, message: String },

    #[error("{op}: aborted")]
    Aborted { op: String },

    #[error("{op}: invalid argument: {message}")]
    InvalidArgument { op: String, message: String },

    #[error("{resource} is already closed")]
    AlreadyClosed { resource: String },

    #[error("{resource} already has an active event pump")]
    AlreadyAttached { resource: String },
}

/// Result alias used by every bridge operation.
pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    /// Wrap a native I/O failure, keeping its kind.
    pub fn from_io(op: impl Into<String>, err: std::io::Error) -> Self {
        let op = op.into();
        let message = err.to_string();
        match ErrorKind::from_io(err.kind()) {
            ErrorKind::NotFound => Self::NotFound { op, message },
            ErrorKind::PermissionDenied => Self::PermissionDenied { op, message },
            ErrorKind::AlreadyExists => Self::AlreadyExists { op, message },
            ErrorKind::InvalidArgument => Self::InvalidArgument { op, message },
            _ => Self::Io { op, message },
        }
    }

    pub fn aborted(op: impl Into<String>) -> Self {
        Self::Aborted { op: op.into() }
    }

    pub fn already_closed(resource: impl Into<String>) -> Self {
        Self::AlreadyClosed {
            resource: resource.into(),
        }
    }

    pub fn already_attached(resource: impl Into<String>) -> Self {
        Self::AlreadyAttached {
            resource: resource.into(),
        }
    }

    pub fn invalid_argument(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            op: op.into(),
            message: message.into(),
        }
    }

    pub fn io(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            op: op.into(),
            message: message.into(),
        }
    }

    /// Taxonomy kind of this error.
    ///
    /// A double pump attach is a programmer error and reports as
    /// `InvalidArgument`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Io { .. } => ErrorKind::IoFailure,
            Self::Aborted { .. } => ErrorKind::Aborted,
            Self::InvalidArgument { .. } | Self::AlreadyAttached { .. } => {
                ErrorKind::InvalidArgument
            }
            Self::AlreadyClosed { .. } => ErrorKind::AlreadyClosed,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }

    pub fn is_already_closed(&self) -> bool {
        matches!(self, Self::AlreadyClosed { .. })
    }
}

impl HostErrorCode for BridgeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyAttached { .. } => error_code::ALREADY_ATTACHED,
            other => other.kind().code(),
        }
    }
}
