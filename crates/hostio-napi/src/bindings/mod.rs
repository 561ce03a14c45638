//! All NAPI-exported functions, grouped by area.

pub mod fs;
pub mod io;
pub mod lifecycle;
pub mod net;
pub mod process;
pub mod runtime;
pub mod subscription;
