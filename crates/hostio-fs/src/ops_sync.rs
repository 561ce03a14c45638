//! Blocking filesystem operations. Each runs to completion on the calling
//! thread and maps native failures into the bridge taxonomy.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use hostio_core::{BridgeError, BridgeResult};

use crate::file::FsFile;
use crate::info::{DirEntry, FileInfo};
use crate::options::{MakeTempOptions, MkdirOptions, OpenOptions, WriteFileOptions};

/// Attempts before giving up on finding an unused temp name.
const TEMP_NAME_ATTEMPTS: usize = 16;

fn io_err(op: &'static str) -> impl Fn(std::io::Error) -> BridgeError {
    move |e| BridgeError::from_io(op, e)
}

pub fn chmod_sync(path: &Path, mode: u32) -> BridgeResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(io_err("chmod"))
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
        Err(BridgeError::invalid_argument("chmod", "not supported on this platform"))
    }
}

/// Change ownership. `None` leaves that id unchanged.
pub fn chown_sync(path: &Path, uid: Option<u32>, gid: Option<u32>) -> BridgeResult<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::chown(path, uid, gid).map_err(io_err("chown"))
    }
    #[cfg(not(unix))]
    {
        let _ = (path, uid, gid);
        Err(BridgeError::invalid_argument("chown", "not supported on this platform"))
    }
}

pub fn copy_file_sync(from: &Path, to: &Path) -> BridgeResult<()> {
    fs::copy(from, to).map(|_| ()).map_err(io_err("copy_file"))
}

/// Create (or truncate) a file opened for reading and writing.
pub fn create_sync(path: &Path) -> BridgeResult<FsFile> {
    let options = OpenOptions::read()
        .combine(OpenOptions::write())
        .combine(OpenOptions::create())
        .combine(OpenOptions::truncate());
    open_sync(path, &options)
}

pub fn link_sync(old: &Path, new: &Path) -> BridgeResult<()> {
    fs::hard_link(old, new).map_err(io_err("link"))
}

pub fn mkdir_sync(path: &Path, options: &MkdirOptions) -> BridgeResult<()> {
    options.to_std().create(path).map_err(io_err("mkdir"))
}

pub fn open_sync(path: &Path, options: &OpenOptions) -> BridgeResult<FsFile> {
    let file = options.to_std().open(path).map_err(io_err("open"))?;
    Ok(FsFile::from_std(file))
}

pub fn read_file_sync(path: &Path) -> BridgeResult<Vec<u8>> {
    fs::read(path).map_err(io_err("read_file"))
}

pub fn read_text_file_sync(path: &Path) -> BridgeResult<String> {
    fs::read_to_string(path).map_err(io_err("read_text_file"))
}

pub fn write_file_sync(path: &Path, data: &[u8], options: &WriteFileOptions) -> BridgeResult<()> {
    let mut file = options.to_std().open(path).map_err(io_err("write_file"))?;
    file.write_all(data).map_err(io_err("write_file"))
}

pub fn write_text_file_sync(path: &Path, text: &str, options: &WriteFileOptions) -> BridgeResult<()> {
    write_file_sync(path, text.as_bytes(), options)
}

/// Remove a file, symlink or directory. Non-empty directories need `recursive`.
pub fn remove_sync(path: &Path, recursive: bool) -> BridgeResult<()> {
    let meta = fs::symlink_metadata(path).map_err(io_err("remove"))?;
    let result = if meta.is_dir() {
        if recursive {
            fs::remove_dir_all(path)
        } else {
            fs::remove_dir(path)
        }
    } else {
        fs::remove_file(path)
    };
    result.map_err(io_err("remove"))
}

pub fn rename_sync(old: &Path, new: &Path) -> BridgeResult<()> {
    fs::rename(old, new).map_err(io_err("rename"))
}

pub fn symlink_sync(target: &Path, link: &Path) -> BridgeResult<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).map_err(io_err("symlink"))
    }
    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.map_err(io_err("symlink"))
    }
}

/// Truncate or extend to `len` bytes (zero when `None`).
pub fn truncate_sync(path: &Path, len: Option<u64>) -> BridgeResult<()> {
    let file = fs::OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(io_err("truncate"))?;
    file.set_len(len.unwrap_or(0)).map_err(io_err("truncate"))
}

/// Entries of `path`, sorted by name.
pub fn read_dir_sync(path: &Path) -> BridgeResult<Vec<DirEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path).map_err(io_err("read_dir"))? {
        let entry = entry.map_err(io_err("read_dir"))?;
        let file_type = entry.file_type().map_err(io_err("read_dir"))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push(DirEntry::new(name, file_type));
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

pub fn stat_sync(path: &Path) -> BridgeResult<FileInfo> {
    fs::metadata(path).map(FileInfo::from).map_err(io_err("stat"))
}

pub fn lstat_sync(path: &Path) -> BridgeResult<FileInfo> {
    fs::symlink_metadata(path)
        .map(FileInfo::from)
        .map_err(io_err("lstat"))
}

pub fn real_path_sync(path: &Path) -> BridgeResult<PathBuf> {
    fs::canonicalize(path).map_err(io_err("real_path"))
}

pub fn read_link_sync(path: &Path) -> BridgeResult<PathBuf> {
    fs::read_link(path).map_err(io_err("read_link"))
}

/// Create a new uniquely named directory and return its path.
pub fn make_temp_dir_sync(options: &MakeTempOptions) -> BridgeResult<PathBuf> {
    for _ in 0..TEMP_NAME_ATTEMPTS {
        let path = options.next_path();
        match fs::create_dir(&path) {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(BridgeError::from_io("make_temp_dir", e)),
        }
    }
    Err(BridgeError::io("make_temp_dir", "no unused temp name found"))
}

/// Create a new empty uniquely named file and return its path.
pub fn make_temp_file_sync(options: &MakeTempOptions) -> BridgeResult<PathBuf> {
    for _ in 0..TEMP_NAME_ATTEMPTS {
        let path = options.next_path();
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(BridgeError::from_io("make_temp_file", e)),
        }
    }
    Err(BridgeError::io("make_temp_file", "no unused temp name found"))
}

/// Set access and modification times.
pub fn utime_sync(path: &Path, atime: SystemTime, mtime: SystemTime) -> BridgeResult<()> {
    let file = fs::OpenOptions::new()
        .write(true)
        .open(path)
        .or_else(|_| fs::File::open(path))
        .map_err(io_err("utime"))?;
    let times = fs::FileTimes::new().set_accessed(atime).set_modified(mtime);
    file.set_times(times).map_err(io_err("utime"))
}
