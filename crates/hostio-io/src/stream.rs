//! Input and output stream handles over any async reader or writer.

use std::pin::Pin;

use hostio_core::constants::DEFAULT_READ_CHUNK_SIZE;
use hostio_core::BridgeResult;
use hostio_lifecycle::{HandleState, ResourceHandle, ResourceKind};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::abortable::AbortableIo;

type BoxedReader = Pin<Box<dyn AsyncRead + Send>>;
type BoxedWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// Readable byte stream handle.
pub struct InputStream {
    io: AbortableIo<BoxedReader>,
    chunk_size: usize,
}

impl InputStream {
    pub fn new<R: AsyncRead + Send + 'static>(reader: R) -> Self {
        Self {
            io: AbortableIo::new(ResourceKind::Stream, Box::pin(reader)),
            chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }

    /// Size used by [`read_chunk`](Self::read_chunk). Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Read up to `len` bytes. `None` at end of stream.
    pub async fn read(&self, len: usize) -> BridgeResult<Option<Vec<u8>>> {
        let outcome: BridgeResult<_> = async {
            let mut guard = self.io.acquire().await?;
            let reader = guard.native()?;
            let mut buf = vec![0u8; len];
            let n = self.io.abortable("read", reader.read(&mut buf)).await?;
            if n == 0 && len > 0 {
                return Ok(None);
            }
            buf.truncate(n);
            Ok(Some(buf))
        }
        .await;
        self.io.reap().await;
        outcome
    }

    pub async fn read_chunk(&self) -> BridgeResult<Option<Vec<u8>>> {
        self.read(self.chunk_size).await
    }

    /// Read until end of stream.
    pub async fn read_to_end(&self) -> BridgeResult<Vec<u8>> {
        let outcome: BridgeResult<_> = async {
            let mut guard = self.io.acquire().await?;
            let reader = guard.native()?;
            let mut buf = Vec::new();
            self.io
                .abortable("read_to_end", reader.read_to_end(&mut buf))
                .await?;
            Ok(buf)
        }
        .await;
        self.io.reap().await;
        outcome
    }
}

impl ResourceHandle for InputStream {
    fn state(&self) -> &HandleState {
        self.io.state()
    }

    fn close_native(&self) -> BridgeResult<()> {
        self.io.release_native();
        Ok(())
    }
}

/// Writable byte stream handle.
pub struct OutputStream {
    io: AbortableIo<BoxedWriter>,
}

impl OutputStream {
    pub fn new<W: AsyncWrite + Send + 'static>(writer: W) -> Self {
        Self {
            io: AbortableIo::new(ResourceKind::Stream, Box::pin(writer)),
        }
    }

    /// Write some of `data`, returning how many bytes were taken.
    pub async fn write(&self, data: &[u8]) -> BridgeResult<usize> {
        let outcome: BridgeResult<_> = async {
            let mut guard = self.io.acquire().await?;
            let writer = guard.native()?;
            self.io.abortable("write", writer.write(data)).await
        }
        .await;
        self.io.reap().await;
        outcome
    }

    pub async fn write_all(&self, data: &[u8]) -> BridgeResult<()> {
        let outcome: BridgeResult<_> = async {
            let mut guard = self.io.acquire().await?;
            let writer = guard.native()?;
            self.io.abortable("write_all", writer.write_all(data)).await
        }
        .await;
        self.io.reap().await;
        outcome
    }

    pub async fn flush(&self) -> BridgeResult<()> {
        let outcome: BridgeResult<_> = async {
            let mut guard = self.io.acquire().await?;
            let writer = guard.native()?;
            self.io.abortable("flush", writer.flush()).await
        }
        .await;
        self.io.reap().await;
        outcome
    }

    /// Flush, signal end of stream to the peer, then close.
    pub async fn shutdown(&self) -> BridgeResult<()> {
        let outcome: BridgeResult<_> = async {
            let mut guard = self.io.acquire().await?;
            let writer = guard.native()?;
            self.io.abortable("shutdown", writer.shutdown()).await
        }
        .await;
        self.close()?;
        outcome
    }
}

impl ResourceHandle for OutputStream {
    fn state(&self) -> &HandleState {
        self.io.state()
    }

    fn close_native(&self) -> BridgeResult<()> {
        self.io.release_native();
        Ok(())
    }
}
