//! Process stdio as stream handles.

use std::io::{IsTerminal, Write};

use hostio_core::{BridgeError, BridgeResult};

use crate::stream::{InputStream, OutputStream};

pub fn stdin() -> InputStream {
    InputStream::new(tokio::io::stdin())
}

pub fn stdout() -> OutputStream {
    OutputStream::new(tokio::io::stdout())
}

pub fn stderr() -> OutputStream {
    OutputStream::new(tokio::io::stderr())
}

/// Target of a blocking stdio write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdTarget {
    Stdout,
    Stderr,
}

impl StdTarget {
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Stdout => std::io::stdout().is_terminal(),
            Self::Stderr => std::io::stderr().is_terminal(),
        }
    }
}

/// Write all of `data` and flush, on the calling thread.
pub fn write_sync(target: StdTarget, data: &[u8]) -> BridgeResult<usize> {
    let op = "write_sync";
    let result = match target {
        StdTarget::Stdout => {
            let mut out = std::io::stdout().lock();
            out.write_all(data).and_then(|()| out.flush())
        }
        StdTarget::Stderr => {
            let mut err = std::io::stderr().lock();
            err.write_all(data).and_then(|()| err.flush())
        }
    };
    result.map_err(|e| BridgeError::from_io(op, e))?;
    Ok(data.len())
}
