//! The failure taxonomy shared by every operation.

use serde::{Deserialize, Serialize};

use super::error_code;

/// Kind of a native failure, preserved as data across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    IoFailure,
    Aborted,
    InvalidArgument,
    AlreadyClosed,
}

impl ErrorKind {
    /// All kinds, in declaration order.
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::NotFound,
        ErrorKind::PermissionDenied,
        ErrorKind::AlreadyExists,
        ErrorKind::IoFailure,
        ErrorKind::Aborted,
        ErrorKind::InvalidArgument,
        ErrorKind::AlreadyClosed,
    ];

    /// Classify a `std::io::ErrorKind`.
    ///
    /// Anything without a dedicated kind is an `IoFailure`.
    pub fn from_io(kind: std::io::ErrorKind) -> Self {
        use std::io::ErrorKind as Io;
        match kind {
            Io::NotFound => Self::NotFound,
            Io::PermissionDenied => Self::PermissionDenied,
            Io::AlreadyExists => Self::AlreadyExists,
            Io::InvalidInput | Io::InvalidData => Self::InvalidArgument,
            _ => Self::IoFailure,
        }
    }

    /// Boundary error code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => error_code::NOT_FOUND,
            Self::PermissionDenied => error_code::PERMISSION_DENIED,
            Self::AlreadyExists => error_code::ALREADY_EXISTS,
            Self::IoFailure => error_code::IO_FAILURE,
            Self::Aborted => error_code::ABORTED,
            Self::InvalidArgument => error_code::INVALID_ARGUMENT,
            Self::AlreadyClosed => error_code::ALREADY_CLOSED,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::AlreadyExists => "already exists",
            Self::IoFailure => "I/O failure",
            Self::Aborted => "aborted",
            Self::InvalidArgument => "invalid argument",
            Self::AlreadyClosed => "already closed",
        };
        f.write_str(name)
    }
}
