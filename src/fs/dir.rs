//! Host directory exposed as a filesystem instance
//!
//! A [`DirFs`] maps its virtual root onto one directory of the host. Every
//! instance is distinct even when two of them point at the same place, so a
//! host tree can be copied into another host tree through two instances.

use crate::error::{CrossFsError, IoResultExt, Result, Violation};
use crate::fs::{EntryKind, FileSystem, FsId, FsPath, Location, PathStyle};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Host directory as its own namespace
#[derive(Debug)]
pub struct DirFs {
    id: FsId,
    style: PathStyle,
    base: PathBuf,
}

impl DirFs {
    /// Expose the existing directory `base`
    pub fn new(base: impl AsRef<Path>) -> Result<Arc<Self>> {
        let requested = base.as_ref();
        let base = fs::canonicalize(requested).with_path(requested.display())?;
        if !base.is_dir() {
            return Err(Violation::NotADirectory(base.display().to_string()).into());
        }
        Ok(Arc::new(Self {
            id: FsId::next(),
            style: PathStyle::host(),
            base,
        }))
    }

    /// Canonical host directory behind the virtual root
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn virtual_root(&self) -> &'static str {
        match self.style {
            PathStyle::Unix => "/",
            PathStyle::Windows => "\\",
        }
    }

    /// Host location of `path`. Only the virtual root maps onto the base
    /// directory; any other root (such as a drive) is rejected.
    pub fn host_path(&self, path: &FsPath) -> Result<PathBuf> {
        let location = path.to_location();
        if location.root != self.virtual_root() {
            return Err(CrossFsError::InvalidPath(format!(
                "{path} is outside the root of {}",
                self.base.display()
            )));
        }
        let mut host = self.base.clone();
        for segment in &location.segments {
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) => host.push(segment),
                _ => {
                    return Err(CrossFsError::InvalidPath(format!(
                        "segment '{segment}' of {path} does not name a host entry"
                    )))
                }
            }
        }
        Ok(host)
    }

    fn entry_name(host: &Path, name: &std::ffi::OsStr) -> Result<String> {
        name.to_str().map(str::to_string).ok_or_else(|| {
            CrossFsError::InvalidPath(format!("non UTF-8 name under {}", host.display()))
        })
    }
}

impl FileSystem for DirFs {
    fn id(&self) -> FsId {
        self.id
    }

    fn style(&self) -> PathStyle {
        self.style
    }

    fn working_dir(&self) -> Location {
        Location::new(self.virtual_root(), Vec::new())
    }

    fn entry_kind(&self, path: &FsPath) -> Result<Option<EntryKind>> {
        let host = self.host_path(path)?;
        let metadata = match fs::symlink_metadata(&host) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CrossFsError::io(path, e)),
        };
        let file_type = metadata.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        Ok(Some(kind))
    }

    fn create_dir(&self, path: &FsPath) -> Result<()> {
        let host = self.host_path(path)?;
        fs::create_dir(&host).with_path(path)
    }

    fn open_read(&self, path: &FsPath) -> Result<Box<dyn Read + Send>> {
        let host = self.host_path(path)?;
        let file = File::open(&host).with_path(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn create_new(&self, path: &FsPath) -> Result<Box<dyn Write + Send>> {
        let host = self.host_path(path)?;
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&host)
            .with_path(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn read_dir(&self, path: &FsPath) -> Result<Vec<FsPath>> {
        let host = self.host_path(path)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&host).with_path(path)? {
            let entry = entry.with_path(path)?;
            names.push(Self::entry_name(&host, &entry.file_name())?);
        }
        names.sort();
        Ok(names.iter().map(|name| path.join(name)).collect())
    }

    fn enumerate_tree(&self, root: &FsPath) -> Result<Vec<FsPath>> {
        let host_root = self.host_path(root)?;
        let walker = WalkDir::new(&host_root)
            .follow_links(false)
            .sort_by_file_name();

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| CrossFsError::io(root, io::Error::from(e)))?;
            let relative = entry
                .path()
                .strip_prefix(&host_root)
                .map_err(|_| CrossFsError::InvalidPath(entry.path().display().to_string()))?;
            let mut path = root.clone();
            for component in relative.components() {
                path = path.join(&Self::entry_name(&host_root, component.as_os_str())?);
            }
            entries.push(path);
        }
        Ok(entries)
    }
}
