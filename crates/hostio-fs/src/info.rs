//! File metadata and directory entries as plain data.

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata snapshot of a path or open file.
///
/// Times are `None` where the platform does not report them. The unix
/// fields are `None` off unix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub is_file: bool,
    pub is_directory: bool,
    pub is_symlink: bool,
    pub size: u64,
    pub mtime: Option<DateTime<Utc>>,
    pub atime: Option<DateTime<Utc>>,
    pub birthtime: Option<DateTime<Utc>>,
    pub ctime: Option<DateTime<Utc>>,
    pub dev: Option<u64>,
    pub ino: Option<u64>,
    pub mode: Option<u32>,
    pub nlink: Option<u64>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub rdev: Option<u64>,
    pub blksize: Option<u64>,
    pub blocks: Option<u64>,
}

fn to_utc(time: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}

impl From<std::fs::Metadata> for FileInfo {
    fn from(meta: std::fs::Metadata) -> Self {
        let file_type = meta.file_type();
        let mut info = Self {
            is_file: file_type.is_file(),
            is_directory: file_type.is_dir(),
            is_symlink: file_type.is_symlink(),
            size: meta.len(),
            mtime: to_utc(meta.modified()),
            atime: to_utc(meta.accessed()),
            birthtime: to_utc(meta.created()),
            ctime: None,
            dev: None,
            ino: None,
            mode: None,
            nlink: None,
            uid: None,
            gid: None,
            rdev: None,
            blksize: None,
            blocks: None,
        };
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            info.ctime = DateTime::from_timestamp(meta.ctime(), meta.ctime_nsec() as u32);
            info.dev = Some(meta.dev());
            info.ino = Some(meta.ino());
            info.mode = Some(meta.mode());
            info.nlink = Some(meta.nlink());
            info.uid = Some(meta.uid());
            info.gid = Some(meta.gid());
            info.rdev = Some(meta.rdev());
            info.blksize = Some(meta.blksize());
            info.blocks = Some(meta.blocks());
        }
        info
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    pub name: String,
    pub is_file: bool,
    pub is_directory: bool,
    pub is_symlink: bool,
}

impl DirEntry {
    pub fn new(name: String, file_type: std::fs::FileType) -> Self {
        Self {
            name,
            is_file: file_type.is_file(),
            is_directory: file_type.is_dir(),
            is_symlink: file_type.is_symlink(),
        }
    }
}
