//! FsFile: an open file as a closeable, abortable resource.

use std::fs::File;
use std::io::{IsTerminal, Read, Seek, SeekFrom, Write};
use std::time::SystemTime;

use hostio_core::{BridgeError, BridgeResult};
use hostio_io::AbortableIo;
use hostio_lifecycle::{HandleState, ResourceHandle, ResourceKind};
use serde::{Deserialize, Serialize};

use crate::info::FileInfo;

/// Origin of a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeekMode {
    Start,
    Current,
    End,
}

fn seek_from(op: &str, offset: i64, mode: SeekMode) -> BridgeResult<SeekFrom> {
    match mode {
        SeekMode::Start => u64::try_from(offset)
            .map(SeekFrom::Start)
            .map_err(|_| BridgeError::invalid_argument(op, "negative offset from start")),
        SeekMode::Current => Ok(SeekFrom::Current(offset)),
        SeekMode::End => Ok(SeekFrom::End(offset)),
    }
}

/// An open file.
///
/// Async operations run on a duplicate of the descriptor on the blocking
/// pool, so they share the file cursor with the blocking twins. Closing
/// the handle aborts an in-flight async operation.
#[derive(Debug)]
pub struct FsFile {
    io: AbortableIo<File>,
}

impl FsFile {
    pub fn from_std(file: File) -> Self {
        Self {
            io: AbortableIo::new(ResourceKind::File, file),
        }
    }

    async fn run<R, F>(&self, op: &'static str, f: F) -> BridgeResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut File) -> std::io::Result<R> + Send + 'static,
    {
        let outcome: BridgeResult<R> = async {
            let mut guard = self.io.acquire().await?;
            let mut dup = guard
                .native()?
                .try_clone()
                .map_err(|e| BridgeError::from_io(op, e))?;
            let work = async move {
                tokio::task::spawn_blocking(move || f(&mut dup))
                    .await
                    .unwrap_or_else(|join_err| Err(std::io::Error::other(join_err)))
            };
            // The guard stays held so operations on one file never interleave.
            let outcome = self.io.abortable(op, work).await;
            drop(guard);
            outcome
        }
        .await;
        self.io.reap().await;
        outcome
    }

    fn run_sync<R>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut File) -> std::io::Result<R>,
    ) -> BridgeResult<R> {
        let mut guard = self.io.try_acquire(op)?;
        f(guard.native()?).map_err(|e| BridgeError::from_io(op, e))
    }

    /// Read up to `len` bytes. `None` at end of file.
    pub async fn read(&self, len: usize) -> BridgeResult<Option<Vec<u8>>> {
        self.run("read", move |file| read_chunk(file, len)).await
    }

    pub fn read_sync(&self, len: usize) -> BridgeResult<Option<Vec<u8>>> {
        self.run_sync("read_sync", |file| read_chunk(file, len))
    }

    /// Write some of `data`, returning the number of bytes written.
    pub async fn write(&self, data: &[u8]) -> BridgeResult<usize> {
        let data = data.to_vec();
        self.run("write", move |file| file.write(&data)).await
    }

    pub fn write_sync(&self, data: &[u8]) -> BridgeResult<usize> {
        self.run_sync("write_sync", |file| file.write(data))
    }

    /// Move the cursor, returning the new absolute position.
    pub async fn seek(&self, offset: i64, mode: SeekMode) -> BridgeResult<u64> {
        let from = seek_from("seek", offset, mode)?;
        self.run("seek", move |file| file.seek(from)).await
    }

    pub fn seek_sync(&self, offset: i64, mode: SeekMode) -> BridgeResult<u64> {
        let from = seek_from("seek_sync", offset, mode)?;
        self.run_sync("seek_sync", |file| file.seek(from))
    }

    pub async fn stat(&self) -> BridgeResult<FileInfo> {
        self.run("stat", |file| file.metadata().map(FileInfo::from))
            .await
    }

    pub fn stat_sync(&self) -> BridgeResult<FileInfo> {
        self.run_sync("stat_sync", |file| file.metadata().map(FileInfo::from))
    }

    /// Truncate or extend to `len` bytes (zero when `None`).
    pub async fn truncate(&self, len: Option<u64>) -> BridgeResult<()> {
        self.run("truncate", move |file| file.set_len(len.unwrap_or(0)))
            .await
    }

    pub fn truncate_sync(&self, len: Option<u64>) -> BridgeResult<()> {
        self.run_sync("truncate_sync", |file| file.set_len(len.unwrap_or(0)))
    }

    /// Flush data and metadata to storage.
    pub async fn sync(&self) -> BridgeResult<()> {
        self.run("sync", |file| file.sync_all()).await
    }

    pub fn sync_sync(&self) -> BridgeResult<()> {
        self.run_sync("sync_sync", |file| file.sync_all())
    }

    /// Flush data (not metadata) to storage.
    pub async fn sync_data(&self) -> BridgeResult<()> {
        self.run("sync_data", |file| file.sync_data()).await
    }

    pub fn sync_data_sync(&self) -> BridgeResult<()> {
        self.run_sync("sync_data_sync", |file| file.sync_data())
    }

    pub async fn utime(&self, atime: SystemTime, mtime: SystemTime) -> BridgeResult<()> {
        self.run("utime", move |file| {
            file.set_times(
                std::fs::FileTimes::new()
                    .set_accessed(atime)
                    .set_modified(mtime),
            )
        })
        .await
    }

    pub fn utime_sync(&self, atime: SystemTime, mtime: SystemTime) -> BridgeResult<()> {
        self.run_sync("utime_sync", |file| {
            file.set_times(
                std::fs::FileTimes::new()
                    .set_accessed(atime)
                    .set_modified(mtime),
            )
        })
    }

    pub fn is_terminal(&self) -> BridgeResult<bool> {
        self.run_sync("is_terminal", |file| Ok(file.is_terminal()))
    }
}

fn read_chunk(file: &mut File, len: usize) -> std::io::Result<Option<Vec<u8>>> {
    let mut buf = vec![0u8; len];
    let n = file.read(&mut buf)?;
    if n == 0 && len > 0 {
        return Ok(None);
    }
    buf.truncate(n);
    Ok(Some(buf))
}

impl ResourceHandle for FsFile {
    fn state(&self) -> &HandleState {
        self.io.state()
    }

    fn close_native(&self) -> BridgeResult<()> {
        self.io.release_native();
        Ok(())
    }
}
