//! # hostio-fs
//!
//! Filesystem surface of the bridge: the change watcher (an event-pumped
//! resource), the file handle, and the one-shot operations with their
//! blocking twins.

pub mod file;
pub mod info;
pub mod ops;
pub mod ops_sync;
pub mod options;
pub mod watcher;

pub use file::{FsFile, SeekMode};
pub use info::{DirEntry, FileInfo};
pub use options::{MakeTempOptions, MkdirOptions, OpenOptions, WriteFileOptions};
pub use watcher::{watch_fs, FsEvent, FsEventFlag, FsEventKind, FsWatcher};
