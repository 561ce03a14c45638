//! # hostio-io
//!
//! Byte stream handles whose in-flight operations abort when the handle
//! closes, plus the process stdio handles.

pub mod abortable;
pub mod stdio;
pub mod stream;

pub use abortable::{AbortableIo, NativeGuard};
pub use stdio::{stderr, stdin, stdout, write_sync, StdTarget};
pub use stream::{InputStream, OutputStream};
