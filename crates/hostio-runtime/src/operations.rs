//! The canonical operation table.
//!
//! One entry per operation the bridge exposes: its qualified name, the
//! shape of its arguments and result, and whether it completes through an
//! error channel (`Async`) or returns on the calling thread (`Sync`).
//! Blocking twins are named `<name>_sync`.

use std::collections::HashMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationVariant {
    Async,
    Sync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationSpec {
    pub module: &'static str,
    pub name: &'static str,
    pub args: &'static [&'static str],
    pub result: &'static str,
    pub variant: OperationVariant,
}

impl OperationSpec {
    /// `module.name`, the key bindings are exported under.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }
}

const fn op(
    module: &'static str,
    name: &'static str,
    args: &'static [&'static str],
    result: &'static str,
    variant: OperationVariant,
) -> OperationSpec {
    OperationSpec {
        module,
        name,
        args,
        result,
        variant,
    }
}

const ASYNC: OperationVariant = OperationVariant::Async;
const SYNC: OperationVariant = OperationVariant::Sync;

pub static OPERATIONS: &[OperationSpec] = &[
    // fs
    op("fs", "chmod", &["path", "mode: u32"], "unit", ASYNC),
    op("fs", "chmod_sync", &["path", "mode: u32"], "unit", SYNC),
    op("fs", "chown", &["path", "uid: u32?", "gid: u32?"], "unit", ASYNC),
    op("fs", "chown_sync", &["path", "uid: u32?", "gid: u32?"], "unit", SYNC),
    op("fs", "copy_file", &["from: path", "to: path"], "unit", ASYNC),
    op("fs", "copy_file_sync", &["from: path", "to: path"], "unit", SYNC),
    op("fs", "create", &["path"], "FsFile", ASYNC),
    op("fs", "create_sync", &["path"], "FsFile", SYNC),
    op("fs", "link", &["original: path", "link: path"], "unit", ASYNC),
    op("fs", "link_sync", &["original: path", "link: path"], "unit", SYNC),
    op("fs", "mkdir", &["path", "options: MkdirOptions"], "unit", ASYNC),
    op("fs", "mkdir_sync", &["path", "options: MkdirOptions"], "unit", SYNC),
    op("fs", "open", &["path", "options: OpenOptions"], "FsFile", ASYNC),
    op("fs", "open_sync", &["path", "options: OpenOptions"], "FsFile", SYNC),
    op("fs", "read_file", &["path"], "bytes", ASYNC),
    op("fs", "read_file_sync", &["path"], "bytes", SYNC),
    op("fs", "read_text_file", &["path"], "string", ASYNC),
    op("fs", "read_text_file_sync", &["path"], "string", SYNC),
    op("fs", "write_file", &["path", "data: bytes", "options: WriteFileOptions"], "unit", ASYNC),
    op("fs", "write_file_sync", &["path", "data: bytes", "options: WriteFileOptions"], "unit", SYNC),
    op("fs", "write_text_file", &["path", "data: string", "options: WriteFileOptions"], "unit", ASYNC),
    op("fs", "write_text_file_sync", &["path", "data: string", "options: WriteFileOptions"], "unit", SYNC),
    op("fs", "remove", &["path", "recursive: bool"], "unit", ASYNC),
    op("fs", "remove_sync", &["path", "recursive: bool"], "unit", SYNC),
    op("fs", "rename", &["from: path", "to: path"], "unit", ASYNC),
    op("fs", "rename_sync", &["from: path", "to: path"], "unit", SYNC),
    op("fs", "symlink", &["target: path", "link: path"], "unit", ASYNC),
    op("fs", "symlink_sync", &["target: path", "link: path"], "unit", SYNC),
    op("fs", "truncate", &["path", "len: u64?"], "unit", ASYNC),
    op("fs", "truncate_sync", &["path", "len: u64?"], "unit", SYNC),
    op("fs", "read_dir", &["path"], "DirEntry[]", ASYNC),
    op("fs", "read_dir_sync", &["path"], "DirEntry[]", SYNC),
    op("fs", "stat", &["path"], "FileInfo", ASYNC),
    op("fs", "stat_sync", &["path"], "FileInfo", SYNC),
    op("fs", "lstat", &["path"], "FileInfo", ASYNC),
    op("fs", "lstat_sync", &["path"], "FileInfo", SYNC),
    op("fs", "real_path", &["path"], "path", ASYNC),
    op("fs", "real_path_sync", &["path"], "path", SYNC),
    op("fs", "read_link", &["path"], "path", ASYNC),
    op("fs", "read_link_sync", &["path"], "path", SYNC),
    op("fs", "make_temp_dir", &["options: MakeTempOptions"], "path", ASYNC),
    op("fs", "make_temp_dir_sync", &["options: MakeTempOptions"], "path", SYNC),
    op("fs", "make_temp_file", &["options: MakeTempOptions"], "path", ASYNC),
    op("fs", "make_temp_file_sync", &["options: MakeTempOptions"], "path", SYNC),
    op("fs", "utime", &["path", "atime: time", "mtime: time"], "unit", ASYNC),
    op("fs", "utime_sync", &["path", "atime: time", "mtime: time"], "unit", SYNC),
    op("fs", "watch_fs", &["paths: path[]", "recursive: bool?"], "FsWatcher", SYNC),
    op("fs", "watcher.watch", &["watcher: FsWatcher", "handler: FsEvent -> unit"], "Subscription", SYNC),
    // file handles
    op("file", "read", &["file: FsFile", "len: usize"], "bytes?", ASYNC),
    op("file", "read_sync", &["file: FsFile", "len: usize"], "bytes?", SYNC),
    op("file", "write", &["file: FsFile", "data: bytes"], "usize", ASYNC),
    op("file", "write_sync", &["file: FsFile", "data: bytes"], "usize", SYNC),
    op("file", "seek", &["file: FsFile", "offset: i64", "whence: SeekMode"], "u64", ASYNC),
    op("file", "seek_sync", &["file: FsFile", "offset: i64", "whence: SeekMode"], "u64", SYNC),
    op("file", "stat", &["file: FsFile"], "FileInfo", ASYNC),
    op("file", "stat_sync", &["file: FsFile"], "FileInfo", SYNC),
    op("file", "truncate", &["file: FsFile", "len: u64?"], "unit", ASYNC),
    op("file", "truncate_sync", &["file: FsFile", "len: u64?"], "unit", SYNC),
    op("file", "sync", &["file: FsFile"], "unit", ASYNC),
    op("file", "sync_sync", &["file: FsFile"], "unit", SYNC),
    op("file", "sync_data", &["file: FsFile"], "unit", ASYNC),
    op("file", "sync_data_sync", &["file: FsFile"], "unit", SYNC),
    op("file", "utime", &["file: FsFile", "atime: time", "mtime: time"], "unit", ASYNC),
    op("file", "utime_sync", &["file: FsFile", "atime: time", "mtime: time"], "unit", SYNC),
    op("file", "is_terminal", &["file: FsFile"], "bool", SYNC),
    // io
    op("io", "stdin", &[], "InputStream", SYNC),
    op("io", "stdout", &[], "OutputStream", SYNC),
    op("io", "stderr", &[], "OutputStream", SYNC),
    op("io", "read", &["stream: InputStream", "len: usize"], "bytes?", ASYNC),
    op("io", "write", &["stream: OutputStream", "data: bytes"], "usize", ASYNC),
    op("io", "write_sync", &["target: StdTarget", "data: bytes"], "usize", SYNC),
    op("io", "flush", &["stream: OutputStream"], "unit", ASYNC),
    // process
    op("process", "output", &["command: string", "options: CommandOptions"], "CommandOutput", ASYNC),
    op("process", "output_sync", &["command: string", "options: CommandOptions"], "CommandOutput", SYNC),
    op("process", "spawn", &["command: string", "options: CommandOptions"], "ChildProcess", SYNC),
    op("process", "child.status", &["child: ChildProcess"], "CommandStatus", ASYNC),
    op("process", "child.output", &["child: ChildProcess"], "CommandOutput", ASYNC),
    op("process", "child.kill", &["child: ChildProcess", "signal: Signal?"], "unit", SYNC),
    op("process", "child.kill_and_wait", &["child: ChildProcess"], "CommandStatus", ASYNC),
    // net
    op("net", "serve", &["options: ServeOptions", "handler: Request -> Response"], "HttpServer", ASYNC),
    op("net", "server.finished", &["server: HttpServer"], "unit", ASYNC),
    op("net", "server.shutdown", &["server: HttpServer"], "unit", ASYNC),
    // runtime
    op("runtime", "env.get", &["key: string"], "string?", SYNC),
    op("runtime", "env.set", &["key: string", "value: string"], "unit", SYNC),
    op("runtime", "env.delete", &["key: string"], "unit", SYNC),
    op("runtime", "env.has", &["key: string"], "bool", SYNC),
    op("runtime", "env.to_object", &[], "map<string, string>", SYNC),
    op("runtime", "cwd", &[], "path", SYNC),
    op("runtime", "chdir", &["path"], "unit", SYNC),
    op("runtime", "exec_path", &[], "path", SYNC),
    op("runtime", "hostname", &[], "string", SYNC),
    op("runtime", "pid", &[], "u32", SYNC),
    op("runtime", "ppid", &[], "u32", SYNC),
    op("runtime", "os_release", &[], "string", SYNC),
    op("runtime", "uid", &[], "u32?", SYNC),
    op("runtime", "gid", &[], "u32?", SYNC),
    op("runtime", "args", &[], "string[]", SYNC),
    op("runtime", "build", &[], "BuildInfo", SYNC),
    op("runtime", "no_color", &[], "bool", SYNC),
    op("runtime", "exit", &["code: i32?"], "never", SYNC),
    op("runtime", "exit_code", &[], "i32", SYNC),
    op("runtime", "set_exit_code", &["code: i32"], "unit", SYNC),
    op("runtime", "add_signal_listener", &["signal: Signal", "handler: Signal -> unit"], "SignalListener", SYNC),
    op("runtime", "remove_signal_listener", &["listener: SignalListener"], "unit", SYNC),
    op("runtime", "set_interval", &["period: duration"], "Interval", SYNC),
    op("runtime", "ref_timer", &["id: ResourceId"], "unit", SYNC),
    op("runtime", "unref_timer", &["id: ResourceId"], "unit", SYNC),
    op("runtime", "set_timeout", &["delay: duration"], "TimerExit", ASYNC),
    // any resource
    op("resource", "close", &["resource: ResourceHandle"], "unit", SYNC),
    op("resource", "ref", &["resource: ResourceHandle"], "unit", SYNC),
    op("resource", "unref", &["resource: ResourceHandle"], "unit", SYNC),
];

/// Name index over [`OPERATIONS`].
#[derive(Debug, Clone)]
pub struct OperationTable {
    index: HashMap<String, &'static OperationSpec>,
}

impl OperationTable {
    pub fn new() -> Self {
        let index = OPERATIONS
            .iter()
            .map(|spec| (spec.qualified_name(), spec))
            .collect();
        Self { index }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Look up by qualified name, e.g. `fs.read_file`.
    pub fn lookup(&self, qualified_name: &str) -> Option<&'static OperationSpec> {
        self.index.get(qualified_name).copied()
    }

    /// The blocking twin of an async operation.
    pub fn sync_counterpart(&self, qualified_name: &str) -> Option<&'static OperationSpec> {
        let spec = self.lookup(qualified_name)?;
        if spec.variant != ASYNC {
            return None;
        }
        self.lookup(&format!("{qualified_name}_sync"))
    }

    /// The async operation a `_sync` entry blocks on.
    pub fn async_counterpart(&self, qualified_name: &str) -> Option<&'static OperationSpec> {
        let base = qualified_name.strip_suffix("_sync")?;
        self.lookup(base).filter(|spec| spec.variant == ASYNC)
    }

    pub fn module(&self, module: &str) -> Vec<&'static OperationSpec> {
        OPERATIONS.iter().filter(|spec| spec.module == module).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static OperationSpec> {
        OPERATIONS.iter()
    }
}

impl Default for OperationTable {
    fn default() -> Self {
        Self::new()
    }
}
