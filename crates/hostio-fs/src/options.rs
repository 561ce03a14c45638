//! Option records for open, mkdir, write and temp-file calls.
//!
//! Every field is optional; `combine` merges two records with the right
//! side winning where it sets a field.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn pick<T>(left: Option<T>, right: Option<T>) -> Option<T> {
    right.or(left)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenOptions {
    pub read: Option<bool>,
    pub write: Option<bool>,
    pub append: Option<bool>,
    pub truncate: Option<bool>,
    pub create: Option<bool>,
    pub create_new: Option<bool>,
    pub mode: Option<u32>,
}

impl OpenOptions {
    pub fn read() -> Self {
        Self {
            read: Some(true),
            ..Self::default()
        }
    }

    pub fn write() -> Self {
        Self {
            write: Some(true),
            ..Self::default()
        }
    }

    pub fn append() -> Self {
        Self {
            append: Some(true),
            ..Self::default()
        }
    }

    pub fn truncate() -> Self {
        Self {
            truncate: Some(true),
            ..Self::default()
        }
    }

    pub fn create() -> Self {
        Self {
            create: Some(true),
            ..Self::default()
        }
    }

    pub fn create_new() -> Self {
        Self {
            create_new: Some(true),
            ..Self::default()
        }
    }

    pub fn mode(mode: u32) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            read: pick(self.read, other.read),
            write: pick(self.write, other.write),
            append: pick(self.append, other.append),
            truncate: pick(self.truncate, other.truncate),
            create: pick(self.create, other.create),
            create_new: pick(self.create_new, other.create_new),
            mode: pick(self.mode, other.mode),
        }
    }

    /// Native options. With nothing set the file opens read-only.
    pub fn to_std(&self) -> std::fs::OpenOptions {
        let write = self.write.unwrap_or(false);
        let append = self.append.unwrap_or(false);
        let read = self.read.unwrap_or(!write && !append);
        let mut options = std::fs::OpenOptions::new();
        options
            .read(read)
            .write(write)
            .append(append)
            .truncate(self.truncate.unwrap_or(false))
            .create(self.create.unwrap_or(false))
            .create_new(self.create_new.unwrap_or(false));
        #[cfg(unix)]
        if let Some(mode) = self.mode {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        options
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MkdirOptions {
    pub recursive: Option<bool>,
    pub mode: Option<u32>,
}

impl MkdirOptions {
    pub fn recursive() -> Self {
        Self {
            recursive: Some(true),
            ..Self::default()
        }
    }

    pub fn mode(mode: u32) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            recursive: pick(self.recursive, other.recursive),
            mode: pick(self.mode, other.mode),
        }
    }

    pub fn to_std(&self) -> std::fs::DirBuilder {
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(self.recursive.unwrap_or(false));
        #[cfg(unix)]
        if let Some(mode) = self.mode {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        builder
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WriteFileOptions {
    pub append: Option<bool>,
    pub create: Option<bool>,
    pub create_new: Option<bool>,
    pub mode: Option<u32>,
}

impl WriteFileOptions {
    pub fn append() -> Self {
        Self {
            append: Some(true),
            ..Self::default()
        }
    }

    /// `false` makes writing to a missing file fail.
    pub fn create(create: bool) -> Self {
        Self {
            create: Some(create),
            ..Self::default()
        }
    }

    pub fn create_new() -> Self {
        Self {
            create_new: Some(true),
            ..Self::default()
        }
    }

    pub fn mode(mode: u32) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            append: pick(self.append, other.append),
            create: pick(self.create, other.create),
            create_new: pick(self.create_new, other.create_new),
            mode: pick(self.mode, other.mode),
        }
    }

    /// Native options: create by default, truncate unless appending.
    pub fn to_std(&self) -> std::fs::OpenOptions {
        let append = self.append.unwrap_or(false);
        let open = OpenOptions {
            write: Some(!append),
            append: Some(append),
            truncate: Some(!append),
            create: Some(self.create.unwrap_or(true)),
            create_new: self.create_new,
            mode: self.mode,
            ..OpenOptions::default()
        };
        open.to_std()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MakeTempOptions {
    pub dir: Option<PathBuf>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl MakeTempOptions {
    pub fn dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: Some(suffix.into()),
            ..Self::default()
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            dir: pick(self.dir, other.dir),
            prefix: pick(self.prefix, other.prefix),
            suffix: pick(self.suffix, other.suffix),
        }
    }

    /// A fresh path for a temp entry: `dir/prefix<uuid>suffix`.
    pub fn next_path(&self) -> PathBuf {
        let dir = self.dir.clone().unwrap_or_else(std::env::temp_dir);
        let name = format!(
            "{}{}{}",
            self.prefix.as_deref().unwrap_or(""),
            uuid::Uuid::new_v4().simple(),
            self.suffix.as_deref().unwrap_or("")
        );
        dir.join(name)
    }
}
