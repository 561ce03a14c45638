//! Filesystem bindings: one-shot operations with their blocking twins,
//! file handles, and the change watcher.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hostio_fs::{
    ops, ops_sync, watch_fs, FsFile, FsWatcher, MakeTempOptions, MkdirOptions, OpenOptions,
    SeekMode, WriteFileOptions,
};
use hostio_lifecycle::{ResourceHandle, ResourceId};
use napi::bindgen_prelude::Buffer;
use napi::threadsafe_function::{ErrorStrategy, ThreadsafeFunction, ThreadsafeFunctionCallMode};
use napi_derive::napi;

use crate::bindings::subscription::SubscriptionHandle;
use crate::conversions::error_codes::{invalid_json, to_napi_error};
use crate::conversions::types::JsFsEvent;
use crate::conversions::{from_json, to_json};
use crate::runtime;

fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

// ---- one-shot operations ----

#[napi]
pub async fn fs_read_file(path: String) -> napi::Result<Buffer> {
    let rt = runtime::get()?;
    let bytes = rt.run("read_file", async move { ops::read_file(path).await }).await?;
    Ok(bytes.into())
}

#[napi]
pub fn fs_read_file_sync(path: String) -> napi::Result<Buffer> {
    ops_sync::read_file_sync(Path::new(&path))
        .map(Buffer::from)
        .map_err(to_napi_error)
}

#[napi]
pub async fn fs_read_text_file(path: String) -> napi::Result<String> {
    let rt = runtime::get()?;
    rt.run("read_text_file", async move { ops::read_text_file(path).await })
        .await
}

#[napi]
pub fn fs_read_text_file_sync(path: String) -> napi::Result<String> {
    ops_sync::read_text_file_sync(Path::new(&path)).map_err(to_napi_error)
}

#[napi]
pub async fn fs_write_file(
    path: String,
    data: Buffer,
    options: Option<serde_json::Value>,
) -> napi::Result<()> {
    let rt = runtime::get()?;
    let options: WriteFileOptions = from_json("write options", options)?;
    let data: Vec<u8> = data.into();
    rt.run("write_file", async move {
        ops::write_file(path, &data, &options).await
    })
    .await
}

#[napi]
pub fn fs_write_file_sync(
    path: String,
    data: Buffer,
    options: Option<serde_json::Value>,
) -> napi::Result<()> {
    let options: WriteFileOptions = from_json("write options", options)?;
    ops_sync::write_file_sync(Path::new(&path), &data, &options).map_err(to_napi_error)
}

#[napi]
pub async fn fs_write_text_file(
    path: String,
    text: String,
    options: Option<serde_json::Value>,
) -> napi::Result<()> {
    let rt = runtime::get()?;
    let options: WriteFileOptions = from_json("write options", options)?;
    rt.run("write_text_file", async move {
        ops::write_text_file(path, &text, &options).await
    })
    .await
}

#[napi]
pub fn fs_write_text_file_sync(
    path: String,
    text: String,
    options: Option<serde_json::Value>,
) -> napi::Result<()> {
    let options: WriteFileOptions = from_json("write options", options)?;
    ops_sync::write_text_file_sync(Path::new(&path), &text, &options).map_err(to_napi_error)
}

#[napi]
pub async fn fs_mkdir(path: String, options: Option<serde_json::Value>) -> napi::Result<()> {
    let rt = runtime::get()?;
    let options: MkdirOptions = from_json("mkdir options", options)?;
    rt.run("mkdir", async move { ops::mkdir(path, &options).await })
        .await
}

#[napi]
pub fn fs_mkdir_sync(path: String, options: Option<serde_json::Value>) -> napi::Result<()> {
    let options: MkdirOptions = from_json("mkdir options", options)?;
    ops_sync::mkdir_sync(Path::new(&path), &options).map_err(to_napi_error)
}

#[napi]
pub async fn fs_remove(path: String, recursive: Option<bool>) -> napi::Result<()> {
    let rt = runtime::get()?;
    let recursive = recursive.unwrap_or(false);
    rt.run("remove", async move { ops::remove(path, recursive).await })
        .await
}

#[napi]
pub fn fs_remove_sync(path: String, recursive: Option<bool>) -> napi::Result<()> {
    ops_sync::remove_sync(Path::new(&path), recursive.unwrap_or(false)).map_err(to_napi_error)
}

#[napi]
pub async fn fs_rename(from: String, to: String) -> napi::Result<()> {
    let rt = runtime::get()?;
    rt.run("rename", async move { ops::rename(from, to).await })
        .await
}

#[napi]
pub fn fs_rename_sync(from: String, to: String) -> napi::Result<()> {
    ops_sync::rename_sync(Path::new(&from), Path::new(&to)).map_err(to_napi_error)
}

#[napi]
pub async fn fs_copy_file(from: String, to: String) -> napi::Result<()> {
    let rt = runtime::get()?;
    rt.run("copy_file", async move { ops::copy_file(from, to).await })
        .await
}

#[napi]
pub fn fs_copy_file_sync(from: String, to: String) -> napi::Result<()> {
    ops_sync::copy_file_sync(Path::new(&from), Path::new(&to)).map_err(to_napi_error)
}

#[napi]
pub async fn fs_chmod(path: String, mode: u32) -> napi::Result<()> {
    let rt = runtime::get()?;
    rt.run("chmod", async move { ops::chmod(path, mode).await })
        .await
}

#[napi]
pub fn fs_chmod_sync(path: String, mode: u32) -> napi::Result<()> {
    ops_sync::chmod_sync(Path::new(&path), mode).map_err(to_napi_error)
}

#[napi]
pub async fn fs_symlink(target: String, link: String) -> napi::Result<()> {
    let rt = runtime::get()?;
    rt.run("symlink", async move { ops::symlink(target, link).await })
        .await
}

#[napi]
pub fn fs_symlink_sync(target: String, link: String) -> napi::Result<()> {
    ops_sync::symlink_sync(Path::new(&target), Path::new(&link)).map_err(to_napi_error)
}

/// Entries as `{ name, isFile, isDirectory, isSymlink }`, sorted by name.
#[napi]
pub async fn fs_read_dir(path: String) -> napi::Result<serde_json::Value> {
    let rt = runtime::get()?;
    let entries = rt
        .run("read_dir", async move { ops::read_dir(path).await })
        .await?;
    to_json("read_dir", &entries)
}

#[napi]
pub fn fs_read_dir_sync(path: String) -> napi::Result<serde_json::Value> {
    let entries = ops_sync::read_dir_sync(Path::new(&path)).map_err(to_napi_error)?;
    to_json("read_dir_sync", &entries)
}

#[napi]
pub async fn fs_stat(path: String) -> napi::Result<serde_json::Value> {
    let rt = runtime::get()?;
    let info = rt.run("stat", async move { ops::stat(path).await }).await?;
    to_json("stat", &info)
}

#[napi]
pub fn fs_stat_sync(path: String) -> napi::Result<serde_json::Value> {
    let info = ops_sync::stat_sync(Path::new(&path)).map_err(to_napi_error)?;
    to_json("stat_sync", &info)
}

#[napi]
pub async fn fs_lstat(path: String) -> napi::Result<serde_json::Value> {
    let rt = runtime::get()?;
    let info = rt.run("lstat", async move { ops::lstat(path).await }).await?;
    to_json("lstat", &info)
}

#[napi]
pub fn fs_lstat_sync(path: String) -> napi::Result<serde_json::Value> {
    let info = ops_sync::lstat_sync(Path::new(&path)).map_err(to_napi_error)?;
    to_json("lstat_sync", &info)
}

#[napi]
pub async fn fs_real_path(path: String) -> napi::Result<String> {
    let rt = runtime::get()?;
    let resolved = rt
        .run("real_path", async move { ops::real_path(path).await })
        .await?;
    Ok(path_string(resolved))
}

#[napi]
pub fn fs_real_path_sync(path: String) -> napi::Result<String> {
    ops_sync::real_path_sync(Path::new(&path))
        .map(path_string)
        .map_err(to_napi_error)
}

#[napi]
pub async fn fs_make_temp_dir(options: Option<serde_json::Value>) -> napi::Result<String> {
    let rt = runtime::get()?;
    let options: MakeTempOptions = from_json("temp options", options)?;
    let path = rt
        .run("make_temp_dir", async move { ops::make_temp_dir(&options).await })
        .await?;
    Ok(path_string(path))
}

#[napi]
pub fn fs_make_temp_dir_sync(options: Option<serde_json::Value>) -> napi::Result<String> {
    let options: MakeTempOptions = from_json("temp options", options)?;
    ops_sync::make_temp_dir_sync(&options)
        .map(path_string)
        .map_err(to_napi_error)
}

#[napi]
pub async fn fs_make_temp_file(options: Option<serde_json::Value>) -> napi::Result<String> {
    let rt = runtime::get()?;
    let options: MakeTempOptions = from_json("temp options", options)?;
    let path = rt
        .run("make_temp_file", async move { ops::make_temp_file(&options).await })
        .await?;
    Ok(path_string(path))
}

#[napi]
pub fn fs_make_temp_file_sync(options: Option<serde_json::Value>) -> napi::Result<String> {
    let options: MakeTempOptions = from_json("temp options", options)?;
    ops_sync::make_temp_file_sync(&options)
        .map(path_string)
        .map_err(to_napi_error)
}

// ---- file handles ----

#[napi]
pub struct FsFileHandle {
    inner: Arc<FsFile>,
    id: ResourceId,
}

fn register_file(file: FsFile) -> napi::Result<FsFileHandle> {
    let rt = runtime::get()?;
    let inner = Arc::new(file);
    let id = rt.ctx.register(inner.clone());
    Ok(FsFileHandle { inner, id })
}

#[napi]
pub async fn fs_open(path: String, options: Option<serde_json::Value>) -> napi::Result<FsFileHandle> {
    let rt = runtime::get()?;
    let options: OpenOptions = from_json("open options", options)?;
    let file = rt
        .run("open", async move { ops::open(path, &options).await })
        .await?;
    register_file(file)
}

#[napi]
pub fn fs_open_sync(path: String, options: Option<serde_json::Value>) -> napi::Result<FsFileHandle> {
    let options: OpenOptions = from_json("open options", options)?;
    register_file(ops_sync::open_sync(Path::new(&path), &options).map_err(to_napi_error)?)
}

#[napi]
pub async fn fs_create(path: String) -> napi::Result<FsFileHandle> {
    let rt = runtime::get()?;
    let file = rt.run("create", async move { ops::create(path).await }).await?;
    register_file(file)
}

#[napi]
pub fn fs_create_sync(path: String) -> napi::Result<FsFileHandle> {
    register_file(ops_sync::create_sync(Path::new(&path)).map_err(to_napi_error)?)
}

fn seek_mode(whence: Option<String>) -> napi::Result<SeekMode> {
    let whence = serde_json::Value::String(whence.unwrap_or_else(|| "start".to_string()));
    serde_json::from_value(whence).map_err(|e| invalid_json("seek mode", e))
}

fn to_js_offset(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

#[napi]
impl FsFileHandle {
    #[napi(getter)]
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    /// Up to `len` bytes; `null` at end of file.
    #[napi]
    pub async fn read(&self, len: u32) -> napi::Result<Option<Buffer>> {
        let rt = runtime::get()?;
        let file = self.inner.clone();
        let chunk = rt
            .run("read", async move { file.read(len as usize).await })
            .await?;
        Ok(chunk.map(Buffer::from))
    }

    #[napi]
    pub fn read_sync(&self, len: u32) -> napi::Result<Option<Buffer>> {
        let chunk = self.inner.read_sync(len as usize).map_err(to_napi_error)?;
        Ok(chunk.map(Buffer::from))
    }

    #[napi]
    pub async fn write(&self, data: Buffer) -> napi::Result<u32> {
        let rt = runtime::get()?;
        let file = self.inner.clone();
        let data: Vec<u8> = data.into();
        let written = rt
            .run("write", async move { file.write(&data).await })
            .await?;
        Ok(u32::try_from(written).unwrap_or(u32::MAX))
    }

    #[napi]
    pub fn write_sync(&self, data: Buffer) -> napi::Result<u32> {
        let written = self.inner.write_sync(&data).map_err(to_napi_error)?;
        Ok(u32::try_from(written).unwrap_or(u32::MAX))
    }

    /// `whence` is `start` (default), `current` or `end`.
    #[napi]
    pub async fn seek(&self, offset: i64, whence: Option<String>) -> napi::Result<i64> {
        let rt = runtime::get()?;
        let mode = seek_mode(whence)?;
        let file = self.inner.clone();
        let position = rt
            .run("seek", async move { file.seek(offset, mode).await })
            .await?;
        Ok(to_js_offset(position))
    }

    #[napi]
    pub fn seek_sync(&self, offset: i64, whence: Option<String>) -> napi::Result<i64> {
        let position = self
            .inner
            .seek_sync(offset, seek_mode(whence)?)
            .map_err(to_napi_error)?;
        Ok(to_js_offset(position))
    }

    #[napi]
    pub async fn stat(&self) -> napi::Result<serde_json::Value> {
        let rt = runtime::get()?;
        let file = self.inner.clone();
        let info = rt.run("stat", async move { file.stat().await }).await?;
        to_json("stat", &info)
    }

    #[napi]
    pub fn stat_sync(&self) -> napi::Result<serde_json::Value> {
        let info = self.inner.stat_sync().map_err(to_napi_error)?;
        to_json("stat_sync", &info)
    }

    #[napi]
    pub async fn truncate(&self, len: Option<i64>) -> napi::Result<()> {
        let rt = runtime::get()?;
        let file = self.inner.clone();
        let len = len.map(|l| l.max(0).unsigned_abs());
        rt.run("truncate", async move { file.truncate(len).await })
            .await
    }

    #[napi]
    pub async fn sync(&self) -> napi::Result<()> {
        let rt = runtime::get()?;
        let file = self.inner.clone();
        rt.run("sync", async move { file.sync().await }).await
    }

    #[napi]
    pub fn is_terminal(&self) -> napi::Result<bool> {
        self.inner.is_terminal().map_err(to_napi_error)
    }

    #[napi]
    pub fn close(&self) -> napi::Result<()> {
        self.inner.close().map_err(to_napi_error)
    }
}

// ---- watcher ----

#[napi]
pub struct FsWatcherHandle {
    inner: Arc<FsWatcher>,
    id: ResourceId,
}

/// Start watching `paths`. The watcher holds the process open until it is
/// closed or unref'd.
#[napi]
pub fn fs_watch(paths: Vec<String>, recursive: Option<bool>) -> napi::Result<FsWatcherHandle> {
    let rt = runtime::get()?;
    let _guard = rt.enter();
    let inner = Arc::new(watch_fs(&rt.ctx, &paths, recursive).map_err(to_napi_error)?);
    let id = rt.ctx.register(inner.clone());
    Ok(FsWatcherHandle { inner, id })
}

#[napi]
impl FsWatcherHandle {
    #[napi(getter)]
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    /// Deliver change events to `handler` until the subscription is
    /// stopped or the watcher closes.
    #[napi]
    pub fn watch(
        &self,
        handler: ThreadsafeFunction<JsFsEvent, ErrorStrategy::Fatal>,
    ) -> napi::Result<SubscriptionHandle> {
        let rt = runtime::get()?;
        let _guard = rt.enter();
        let subscription = self
            .inner
            .watch(move |event| {
                handler.call(JsFsEvent::from(event), ThreadsafeFunctionCallMode::NonBlocking);
            })
            .map_err(to_napi_error)?;
        Ok(SubscriptionHandle::new(subscription))
    }

    #[napi]
    pub fn close(&self) -> napi::Result<()> {
        self.inner.close().map_err(to_napi_error)
    }
}
