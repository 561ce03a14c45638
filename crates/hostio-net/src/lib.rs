//! # hostio-net
//!
//! Address sum type, the HTTP server resource and response helpers.

pub mod addr;
pub mod response;
pub mod server;

pub use addr::{Addr, NetAddr, NetTransport, UnixAddr, UnixTransport, VsockAddr};
pub use response::{json, text};
pub use server::{serve, serve_router, HttpServer, ServeOptions};
