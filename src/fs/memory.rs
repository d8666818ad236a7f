//! In-memory filesystem
//!
//! Entries live in a sorted map keyed by absolute [`Location`], so a
//! directory's descendants form one contiguous range. Every instance is its
//! own namespace with its own [`FsId`].

use crate::error::{CrossFsError, Result};
use crate::fs::{EntryKind, FileSystem, FsHandle, FsId, FsPath, Location, PathStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Configuration of an in-memory filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryFsConfig {
    /// Path syntax
    pub style: PathStyle,
    /// Absolute working directory, created together with the filesystem
    pub working_dir: String,
}

impl MemoryFsConfig {
    /// `/` separated, working directory `/work`
    pub fn unix() -> Self {
        Self {
            style: PathStyle::Unix,
            working_dir: "/work".to_string(),
        }
    }

    /// `\` separated, working directory `C:\work`
    pub fn windows() -> Self {
        Self {
            style: PathStyle::Windows,
            working_dir: "C:\\work".to_string(),
        }
    }
}

impl Default for MemoryFsConfig {
    fn default() -> Self {
        Self::unix()
    }
}

#[derive(Debug)]
enum Node {
    Directory,
    File(Vec<u8>),
}

type Store = Arc<RwLock<BTreeMap<Location, Node>>>;

/// Filesystem held entirely in process memory
#[derive(Debug)]
pub struct MemoryFs {
    id: FsId,
    style: PathStyle,
    working_dir: Location,
    store: Store,
}

impl MemoryFs {
    /// Create a filesystem from `config`
    pub fn new(config: MemoryFsConfig) -> Result<FsHandle> {
        let (root, segments) = config.style.parse(&config.working_dir);
        let root = root.ok_or_else(|| {
            CrossFsError::config(format!(
                "working directory must be absolute: {}",
                config.working_dir
            ))
        })?;
        Ok(Self::create(config.style, Location::new(root, segments)))
    }

    /// Unix-style filesystem with working directory `/work`
    pub fn unix() -> FsHandle {
        Self::create(PathStyle::Unix, Location::new("/", vec!["work".to_string()]))
    }

    /// Windows-style filesystem with working directory `C:\work`
    pub fn windows() -> FsHandle {
        Self::create(
            PathStyle::Windows,
            Location::new("C:\\", vec!["work".to_string()]),
        )
    }

    fn create(style: PathStyle, working_dir: Location) -> FsHandle {
        let mut entries = BTreeMap::new();
        let mut cursor = Location::new(working_dir.root.clone(), Vec::new());
        entries.insert(cursor.clone(), Node::Directory);
        for segment in &working_dir.segments {
            cursor.segments.push(segment.clone());
            entries.insert(cursor.clone(), Node::Directory);
        }
        Arc::new(Self {
            id: FsId::next(),
            style,
            working_dir,
            store: Arc::new(RwLock::new(entries)),
        })
    }

    fn read_store(&self) -> RwLockReadGuard<'_, BTreeMap<Location, Node>> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, BTreeMap<Location, Node>> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert `node` at `path` if its parent is a directory and nothing is there yet
    fn insert_new(&self, path: &FsPath, node: Node) -> Result<Location> {
        let location = path.to_location();
        let mut entries = self.write_store();
        if entries.contains_key(&location) {
            return Err(CrossFsError::io(
                path,
                io::Error::new(io::ErrorKind::AlreadyExists, "entry already exists"),
            ));
        }
        let parent_is_dir = location
            .parent()
            .is_some_and(|parent| matches!(entries.get(&parent), Some(Node::Directory)));
        if !parent_is_dir {
            return Err(CrossFsError::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "parent directory does not exist"),
            ));
        }
        entries.insert(location.clone(), node);
        Ok(location)
    }
}

impl FileSystem for MemoryFs {
    fn id(&self) -> FsId {
        self.id
    }

    fn style(&self) -> PathStyle {
        self.style
    }

    fn working_dir(&self) -> Location {
        self.working_dir.clone()
    }

    fn entry_kind(&self, path: &FsPath) -> Result<Option<EntryKind>> {
        let kind = self.read_store().get(&path.to_location()).map(|node| match node {
            Node::Directory => EntryKind::Directory,
            Node::File(_) => EntryKind::File,
        });
        Ok(kind)
    }

    fn create_dir(&self, path: &FsPath) -> Result<()> {
        self.insert_new(path, Node::Directory).map(|_| ())
    }

    fn open_read(&self, path: &FsPath) -> Result<Box<dyn Read + Send>> {
        match self.read_store().get(&path.to_location()) {
            Some(Node::File(bytes)) => Ok(Box::new(Cursor::new(bytes.clone()))),
            Some(Node::Directory) => Err(CrossFsError::io(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "is a directory"),
            )),
            None => Err(CrossFsError::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "no such file"),
            )),
        }
    }

    fn create_new(&self, path: &FsPath) -> Result<Box<dyn Write + Send>> {
        let location = self.insert_new(path, Node::File(Vec::new()))?;
        Ok(Box::new(MemoryFileWriter {
            store: Arc::clone(&self.store),
            location,
        }))
    }

    fn read_dir(&self, path: &FsPath) -> Result<Vec<FsPath>> {
        let location = path.to_location();
        let entries = self.read_store();
        if !matches!(entries.get(&location), Some(Node::Directory)) {
            return Err(CrossFsError::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            ));
        }
        let children = entries
            .range(location.clone()..)
            .skip(1)
            .take_while(|(key, _)| {
                key.root == location.root && key.segments.starts_with(&location.segments)
            })
            .filter(|(key, _)| key.is_child_of(&location))
            .filter_map(|(key, _)| key.segments.last())
            .map(|name| path.join(name))
            .collect();
        Ok(children)
    }
}

/// Appends straight into the file node it was created for
struct MemoryFileWriter {
    store: Store,
    location: Location,
}

impl Write for MemoryFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut entries = self.store.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(&self.location) {
            Some(Node::File(bytes)) => {
                bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "file vanished while writing",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Build a fresh Unix in-memory filesystem holding `files` (relative name to
/// contents) under its working directory, and return that directory.
pub fn in_memory_dir<I, K, V>(files: I) -> Result<FsPath>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<[u8]>,
{
    let fs = MemoryFs::unix();
    let working_dir = FsPath::from_location(&fs, fs.working_dir());
    for (name, contents) in files {
        working_dir.resolve(name.as_ref()).write_new(contents.as_ref())?;
    }
    Ok(working_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_dir_exists_on_creation() {
        let fs = MemoryFs::unix();
        assert!(FsPath::new(&fs, "/").is_dir());
        assert!(FsPath::new(&fs, "/work").is_dir());
        assert!(!FsPath::new(&fs, "/other").exists());

        let fs = MemoryFs::windows();
        assert!(FsPath::new(&fs, "C:\\work").is_dir());
    }

    #[test]
    fn test_create_dir_requires_parent_and_absence() {
        let fs = MemoryFs::unix();
        let dir = FsPath::new(&fs, "/work/a");
        dir.create_dir().unwrap();
        assert!(dir.is_dir());

        let again = dir.create_dir().unwrap_err();
        assert!(matches!(again, CrossFsError::Io { ref source, .. }
            if source.kind() == io::ErrorKind::AlreadyExists));

        let orphan = FsPath::new(&fs, "/work/missing/child").create_dir().unwrap_err();
        assert!(matches!(orphan, CrossFsError::Io { ref source, .. }
            if source.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn test_create_new_never_overwrites() {
        let fs = MemoryFs::unix();
        let file = FsPath::new(&fs, "/work/data.bin");
        file.write_new(&[1, 2, 3]).unwrap();
        assert!(fs.create_new(&file).is_err());
        assert_eq!(file.read_bytes().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_relative_paths_resolve_against_working_dir() {
        let fs = MemoryFs::unix();
        FsPath::new(&fs, "dest").create_dir().unwrap();
        assert!(FsPath::new(&fs, "/work/dest").is_dir());
    }

    #[test]
    fn test_read_dir_lists_direct_children_sorted() {
        let dir = in_memory_dir([("b.txt", "b"), ("a/nested.txt", "n"), ("c/d/e.txt", "e")])
            .unwrap();
        let names: Vec<String> = dir
            .read_dir()
            .unwrap()
            .iter()
            .filter_map(|p| p.file_name().map(str::to_string))
            .collect();
        assert_eq!(names, vec!["a", "b.txt", "c"]);
    }

    #[test]
    fn test_read_dir_on_file_fails() {
        let dir = in_memory_dir([("a.txt", "a")]).unwrap();
        assert!(dir.join("a.txt").read_dir().is_err());
    }

    #[test]
    fn test_open_read_directory_fails() {
        let dir = in_memory_dir([("a.txt", "a")]).unwrap();
        assert!(dir.read_bytes().is_err());
    }

    #[test]
    fn test_new_rejects_relative_working_dir() {
        let config = MemoryFsConfig {
            style: PathStyle::Unix,
            working_dir: "work".to_string(),
        };
        let err = MemoryFs::new(config).unwrap_err();
        assert!(matches!(err, CrossFsError::Config(_)));
    }

    #[test]
    fn test_config_from_json() {
        let config: MemoryFsConfig =
            serde_json::from_str(r#"{"style":"windows","working_dir":"d:\\data"}"#).unwrap();
        let fs = MemoryFs::new(config).unwrap();
        assert_eq!(fs.working_dir().root, "D:\\");
        assert!(FsPath::new(&fs, "D:\\data").is_dir());
        assert!(FsPath::new(&fs, "d:/data").is_dir());
    }
}
