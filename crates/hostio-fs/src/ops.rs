//! Asynchronous filesystem operations.
//!
//! Direct `tokio::fs` counterparts are used where they exist; the rest run
//! their blocking twin on the blocking pool.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use hostio_core::{BridgeError, BridgeResult};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::file::FsFile;
use crate::info::{DirEntry, FileInfo};
use crate::ops_sync;
use crate::options::{MakeTempOptions, MkdirOptions, OpenOptions, WriteFileOptions};

fn io_err(op: &'static str) -> impl Fn(std::io::Error) -> BridgeError {
    move |e| BridgeError::from_io(op, e)
}

/// Run a blocking twin on the blocking pool.
async fn blocking<T, F>(op: &'static str, f: F) -> BridgeResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> BridgeResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(outcome) => outcome,
        Err(join_err) if join_err.is_cancelled() => Err(BridgeError::aborted(op)),
        Err(join_err) => Err(BridgeError::io(op, join_err.to_string())),
    }
}

pub async fn chmod(path: impl AsRef<Path>, mode: u32) -> BridgeResult<()> {
    let path = path.as_ref().to_path_buf();
    blocking("chmod", move || ops_sync::chmod_sync(&path, mode)).await
}

pub async fn chown(path: impl AsRef<Path>, uid: Option<u32>, gid: Option<u32>) -> BridgeResult<()> {
    let path = path.as_ref().to_path_buf();
    blocking("chown", move || ops_sync::chown_sync(&path, uid, gid)).await
}

pub async fn copy_file(from: impl AsRef<Path>, to: impl AsRef<Path>) -> BridgeResult<()> {
    fs::copy(from, to)
        .await
        .map(|_| ())
        .map_err(io_err("copy_file"))
}

pub async fn create(path: impl AsRef<Path>) -> BridgeResult<FsFile> {
    let path = path.as_ref().to_path_buf();
    blocking("create", move || ops_sync::create_sync(&path)).await
}

pub async fn link(old: impl AsRef<Path>, new: impl AsRef<Path>) -> BridgeResult<()> {
    fs::hard_link(old, new).await.map_err(io_err("link"))
}

pub async fn mkdir(path: impl AsRef<Path>, options: &MkdirOptions) -> BridgeResult<()> {
    let path = path.as_ref().to_path_buf();
    let options = options.clone();
    blocking("mkdir", move || ops_sync::mkdir_sync(&path, &options)).await
}

pub async fn open(path: impl AsRef<Path>, options: &OpenOptions) -> BridgeResult<FsFile> {
    let path = path.as_ref().to_path_buf();
    let options = options.clone();
    blocking("open", move || ops_sync::open_sync(&path, &options)).await
}

pub async fn read_file(path: impl AsRef<Path>) -> BridgeResult<Vec<u8>> {
    fs::read(path).await.map_err(io_err("read_file"))
}

pub async fn read_text_file(path: impl AsRef<Path>) -> BridgeResult<String> {
    fs::read_to_string(path)
        .await
        .map_err(io_err("read_text_file"))
}

pub async fn write_file(
    path: impl AsRef<Path>,
    data: &[u8],
    options: &WriteFileOptions,
) -> BridgeResult<()> {
    let std_options = options.to_std();
    let mut file = fs::OpenOptions::from(std_options)
        .open(path)
        .await
        .map_err(io_err("write_file"))?;
    file.write_all(data).await.map_err(io_err("write_file"))?;
    file.flush().await.map_err(io_err("write_file"))
}

pub async fn write_text_file(
    path: impl AsRef<Path>,
    text: &str,
    options: &WriteFileOptions,
) -> BridgeResult<()> {
    write_file(path, text.as_bytes(), options).await
}

pub async fn remove(path: impl AsRef<Path>, recursive: bool) -> BridgeResult<()> {
    let path = path.as_ref().to_path_buf();
    blocking("remove", move || ops_sync::remove_sync(&path, recursive)).await
}

pub async fn rename(old: impl AsRef<Path>, new: impl AsRef<Path>) -> BridgeResult<()> {
    fs::rename(old, new).await.map_err(io_err("rename"))
}

pub async fn symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> BridgeResult<()> {
    let target = target.as_ref().to_path_buf();
    let link = link.as_ref().to_path_buf();
    blocking("symlink", move || ops_sync::symlink_sync(&target, &link)).await
}

pub async fn truncate(path: impl AsRef<Path>, len: Option<u64>) -> BridgeResult<()> {
    let path = path.as_ref().to_path_buf();
    blocking("truncate", move || ops_sync::truncate_sync(&path, len)).await
}

/// Entries of `path`, sorted by name.
pub async fn read_dir(path: impl AsRef<Path>) -> BridgeResult<Vec<DirEntry>> {
    let mut reader = fs::read_dir(path).await.map_err(io_err("read_dir"))?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(io_err("read_dir"))? {
        let file_type = entry.file_type().await.map_err(io_err("read_dir"))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push(DirEntry::new(name, file_type));
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

pub async fn stat(path: impl AsRef<Path>) -> BridgeResult<FileInfo> {
    fs::metadata(path)
        .await
        .map(FileInfo::from)
        .map_err(io_err("stat"))
}

pub async fn lstat(path: impl AsRef<Path>) -> BridgeResult<FileInfo> {
    fs::symlink_metadata(path)
        .await
        .map(FileInfo::from)
        .map_err(io_err("lstat"))
}

pub async fn real_path(path: impl AsRef<Path>) -> BridgeResult<PathBuf> {
    fs::canonicalize(path).await.map_err(io_err("real_path"))
}

pub async fn read_link(path: impl AsRef<Path>) -> BridgeResult<PathBuf> {
    fs::read_link(path).await.map_err(io_err("read_link"))
}

pub async fn make_temp_dir(options: &MakeTempOptions) -> BridgeResult<PathBuf> {
    let options = options.clone();
    blocking("make_temp_dir", move || ops_sync::make_temp_dir_sync(&options)).await
}

pub async fn make_temp_file(options: &MakeTempOptions) -> BridgeResult<PathBuf> {
    let options = options.clone();
    blocking("make_temp_file", move || {
        ops_sync::make_temp_file_sync(&options)
    })
    .await
}

pub async fn utime(path: impl AsRef<Path>, atime: SystemTime, mtime: SystemTime) -> BridgeResult<()> {
    let path = path.as_ref().to_path_buf();
    blocking("utime", move || ops_sync::utime_sync(&path, atime, mtime)).await
}
