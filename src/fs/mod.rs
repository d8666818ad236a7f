//! Filesystem providers
//!
//! A [`FileSystem`] is one independent namespace with its own path syntax and
//! its own entries. Copies run between two instances, so every path carries
//! the handle of the instance it belongs to (see [`FsPath`]).

mod dir;
mod memory;
mod path;

pub use dir::DirFs;
pub use memory::{in_memory_dir, MemoryFs, MemoryFsConfig};
pub use path::{FsPath, Location, PathStyle};

use crate::error::Result;
use std::fmt;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared handle to a filesystem instance
pub type FsHandle = Arc<dyn FileSystem>;

/// Process-unique identity of a filesystem instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FsId(u64);

impl FsId {
    /// Allocate a fresh identity
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fs#{}", self.0)
    }
}

/// Kind of an existing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link (never followed)
    Symlink,
    /// Device, socket, fifo or anything else
    Other,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::File => "regular file",
            Self::Directory => "directory",
            Self::Symlink => "symbolic link",
            Self::Other => "special file",
        };
        f.write_str(name)
    }
}

/// Operations a filesystem instance provides to the copy engine.
///
/// Paths handed to an implementation always belong to it; relative paths are
/// interpreted against [`FileSystem::working_dir`].
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Identity of this instance
    fn id(&self) -> FsId;

    /// Path syntax of this instance
    fn style(&self) -> PathStyle;

    /// Directory relative paths are resolved against
    fn working_dir(&self) -> Location;

    /// Kind of the entry at `path`, `None` if nothing exists there
    fn entry_kind(&self, path: &FsPath) -> Result<Option<EntryKind>>;

    /// Create one directory. Fails if the parent is missing or `path` exists.
    fn create_dir(&self, path: &FsPath) -> Result<()>;

    /// Open an existing regular file for reading
    fn open_read(&self, path: &FsPath) -> Result<Box<dyn Read + Send>>;

    /// Create a new regular file for writing. Fails if the parent is missing
    /// or `path` exists.
    fn create_new(&self, path: &FsPath) -> Result<Box<dyn Write + Send>>;

    /// Direct children of a directory, sorted by name
    fn read_dir(&self, path: &FsPath) -> Result<Vec<FsPath>>;

    /// `root` and all its descendants, each directory before its contents
    fn enumerate_tree(&self, root: &FsPath) -> Result<Vec<FsPath>> {
        let mut entries = Vec::new();
        let mut pending = vec![root.clone()];
        while let Some(path) = pending.pop() {
            if self.entry_kind(&path)? == Some(EntryKind::Directory) {
                let children = self.read_dir(&path)?;
                pending.extend(children.into_iter().rev());
            }
            entries.push(path);
        }
        Ok(entries)
    }

    /// Whether a directory exists at `path`
    fn is_dir(&self, path: &FsPath) -> bool {
        matches!(self.entry_kind(path), Ok(Some(EntryKind::Directory)))
    }

    /// Whether a regular file exists at `path`
    fn is_regular_file(&self, path: &FsPath) -> bool {
        matches!(self.entry_kind(path), Ok(Some(EntryKind::File)))
    }

    /// Whether anything exists at `path`
    fn exists(&self, path: &FsPath) -> bool {
        matches!(self.entry_kind(path), Ok(Some(_)))
    }
}
