//! Filesystem-bound paths
//!
//! An [`FsPath`] is a root plus a sequence of segments, owned by exactly one
//! filesystem instance. Rendering and parsing follow the owning filesystem's
//! [`PathStyle`], so the same segments print as `/work/dir` on one instance
//! and `C:\work\dir` on another.

use crate::error::{CrossFsError, Result, Violation};
use crate::fs::{EntryKind, FileSystem, FsHandle, FsId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};
use std::sync::Arc;

/// Path syntax of a filesystem instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// `/` separated, single root `/`
    Unix,
    /// `\` separated (`/` accepted on input), roots `X:\` or `\`
    Windows,
}

impl PathStyle {
    /// Style of the operating system this binary runs on
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Separator used when rendering paths
    pub fn separator(self) -> char {
        match self {
            Self::Unix => '/',
            Self::Windows => '\\',
        }
    }

    /// Whether `c` splits segments when parsing
    pub fn is_separator(self, c: char) -> bool {
        match self {
            Self::Unix => c == '/',
            Self::Windows => c == '\\' || c == '/',
        }
    }

    /// Root used for absolute paths that do not name one
    pub fn default_root(self) -> &'static str {
        match self {
            Self::Unix => "/",
            Self::Windows => "C:\\",
        }
    }

    /// Split raw text into an optional root and normalized segments
    pub fn parse(self, raw: &str) -> (Option<String>, Vec<String>) {
        let (root, rest) = self.split_root(raw);
        let segments = normalize(root.is_some(), rest.split(|c: char| self.is_separator(c)));
        (root, segments)
    }

    /// Render a root and segments in this style
    pub fn render(self, root: Option<&str>, segments: &[String]) -> String {
        let joined = segments.join(&self.separator().to_string());
        match root {
            Some(root) => format!("{root}{joined}"),
            None => joined,
        }
    }

    fn split_root(self, raw: &str) -> (Option<String>, &str) {
        match self {
            Self::Unix => match raw.strip_prefix('/') {
                Some(rest) => (Some("/".to_string()), rest),
                None => (None, raw),
            },
            Self::Windows => {
                let mut chars = raw.chars();
                if let (Some(drive), Some(':')) = (chars.next(), chars.next()) {
                    if drive.is_ascii_alphabetic() {
                        let rest = &raw[2..];
                        let root = format!("{}:\\", drive.to_ascii_uppercase());
                        let rest = rest.strip_prefix(|c: char| self.is_separator(c)).unwrap_or(rest);
                        return (Some(root), rest);
                    }
                }
                match raw.strip_prefix(|c: char| self.is_separator(c)) {
                    Some(rest) => (Some("\\".to_string()), rest),
                    None => (None, raw),
                }
            }
        }
    }
}

fn normalize<'a>(absolute: bool, parts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for part in parts {
        match part {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..".to_string());
                }
            }
            _ => segments.push(part.to_string()),
        }
    }
    segments
}

/// Absolute position inside one filesystem: a root and the segments below it
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Root name in the owning style (`/`, `C:\`)
    pub root: String,
    /// Segments below the root
    pub segments: Vec<String>,
}

impl Location {
    /// Build a location under `root`
    pub fn new(root: impl Into<String>, segments: Vec<String>) -> Self {
        Self {
            root: root.into(),
            segments,
        }
    }

    /// Location one level up, `None` at the root
    pub fn parent(&self) -> Option<Location> {
        let (_, init) = self.segments.split_last()?;
        Some(Location::new(self.root.clone(), init.to_vec()))
    }

    /// Whether `self` is a direct child of `dir`
    pub fn is_child_of(&self, dir: &Location) -> bool {
        self.parent().as_ref() == Some(dir)
    }
}

/// A path value bound to the filesystem instance that owns it
#[derive(Clone)]
pub struct FsPath {
    fs: FsHandle,
    root: Option<String>,
    segments: Vec<String>,
}

impl FsPath {
    /// Parse `raw` in the style of `fs`
    pub fn new(fs: &FsHandle, raw: &str) -> Self {
        let (root, segments) = fs.style().parse(raw);
        Self {
            fs: Arc::clone(fs),
            root,
            segments,
        }
    }

    /// Absolute path for `location` on `fs`
    pub fn from_location(fs: &FsHandle, location: Location) -> Self {
        Self {
            fs: Arc::clone(fs),
            root: Some(location.root),
            segments: location.segments,
        }
    }

    /// Filesystem owning this path
    pub fn file_system(&self) -> &FsHandle {
        &self.fs
    }

    /// Identity of the owning filesystem
    pub fn fs_id(&self) -> FsId {
        self.fs.id()
    }

    /// Root name, `None` for relative paths
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Whether the path carries a root
    pub fn is_absolute(&self) -> bool {
        self.root.is_some()
    }

    /// Normalized segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Path without its last segment; `None` for roots and empty relative paths
    pub fn parent(&self) -> Option<FsPath> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            fs: Arc::clone(&self.fs),
            root: self.root.clone(),
            segments: init.to_vec(),
        })
    }

    /// Append one segment verbatim
    pub fn join(&self, segment: &str) -> FsPath {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self {
            fs: Arc::clone(&self.fs),
            root: self.root.clone(),
            segments,
        }
    }

    /// Resolve `raw` (parsed in the owning style) against this path.
    ///
    /// An absolute `raw` replaces this path; an empty one yields this path.
    pub fn resolve(&self, raw: &str) -> FsPath {
        let (root, tail) = self.fs.style().parse(raw);
        if root.is_some() {
            return Self {
                fs: Arc::clone(&self.fs),
                root,
                segments: tail,
            };
        }
        let combined = self
            .segments
            .iter()
            .chain(tail.iter())
            .map(String::as_str);
        Self {
            fs: Arc::clone(&self.fs),
            root: self.root.clone(),
            segments: normalize(self.root.is_some(), combined),
        }
    }

    /// Absolute location, resolving relative paths against the working directory
    pub fn to_location(&self) -> Location {
        match &self.root {
            Some(root) => Location::new(root.clone(), self.segments.clone()),
            None => {
                let cwd = self.fs.working_dir();
                let combined = cwd
                    .segments
                    .iter()
                    .chain(self.segments.iter())
                    .map(String::as_str);
                Location::new(cwd.root, normalize(true, combined))
            }
        }
    }

    /// Segments leading from `base` to this path.
    ///
    /// Empty when both are equal, `None` when this path is not inside `base`
    /// or lives on another filesystem.
    pub fn relative_segments(&self, base: &FsPath) -> Option<Vec<String>> {
        if self.fs_id() != base.fs_id() {
            return None;
        }
        let here = self.to_location();
        let base = base.to_location();
        if here.root != base.root || !here.segments.starts_with(&base.segments) {
            return None;
        }
        Some(here.segments[base.segments.len()..].to_vec())
    }

    /// Kind of entry at this path, `None` when nothing exists there
    pub fn entry_kind(&self) -> Result<Option<EntryKind>> {
        self.fs.entry_kind(self)
    }

    /// Whether a directory exists here
    pub fn is_dir(&self) -> bool {
        self.fs.is_dir(self)
    }

    /// Whether a regular file exists here
    pub fn is_regular_file(&self) -> bool {
        self.fs.is_regular_file(self)
    }

    /// Whether anything exists here
    pub fn exists(&self) -> bool {
        self.fs.exists(self)
    }

    /// Create this directory; the parent must exist
    pub fn create_dir(&self) -> Result<()> {
        self.fs.create_dir(self)
    }

    /// Create this directory and any missing ancestors
    pub fn create_dir_all(&self) -> Result<()> {
        let location = self.to_location();
        let mut cursor = Location::new(location.root.clone(), Vec::new());
        for segment in location.segments {
            cursor.segments.push(segment);
            let dir = FsPath::from_location(&self.fs, cursor.clone());
            match dir.entry_kind()? {
                Some(EntryKind::Directory) => {}
                Some(_) => return Err(Violation::NotADirectory(dir.to_string()).into()),
                None => dir.create_dir()?,
            }
        }
        Ok(())
    }

    /// Write `bytes` into a new file, creating missing parent directories
    pub fn write_new(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.parent() {
            parent.create_dir_all()?;
        }
        let mut writer = self.fs.create_new(self)?;
        writer
            .write_all(bytes)
            .and_then(|_| writer.flush())
            .map_err(|e| CrossFsError::io(self, e))
    }

    /// Read the whole file
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        let mut reader = self.fs.open_read(self)?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| CrossFsError::io(self, e))?;
        Ok(bytes)
    }

    /// Read the whole file as UTF-8 text
    pub fn read_to_string(&self) -> Result<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|e| {
            CrossFsError::io(
                self,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Children of this directory, sorted by name
    pub fn read_dir(&self) -> Result<Vec<FsPath>> {
        self.fs.read_dir(self)
    }

    /// Regular files directly inside this directory
    pub fn files(&self) -> Result<Vec<FsPath>> {
        let mut files = Vec::new();
        for child in self.read_dir()? {
            if child.is_regular_file() {
                files.push(child);
            }
        }
        Ok(files)
    }

    /// Resolve `name` against this directory and require a directory there
    pub fn resolve_dir(&self, name: &str) -> Result<FsPath> {
        self.resolve_checked(name, EntryKind::Directory)
    }

    /// Resolve `name` against this directory and require a regular file there
    pub fn resolve_regular_file(&self, name: &str) -> Result<FsPath> {
        self.resolve_checked(name, EntryKind::File)
    }

    fn resolve_checked(&self, name: &str, expected: EntryKind) -> Result<FsPath> {
        if !self.is_dir() {
            return Err(Violation::NotADirectory(self.to_string()).into());
        }
        if name.is_empty() {
            return Err(CrossFsError::InvalidPath(format!(
                "empty name resolved against {self}"
            )));
        }
        let resolved = self.resolve(name);
        if resolved.entry_kind()? != Some(expected) {
            let shown = resolved.to_string();
            return Err(match expected {
                EntryKind::Directory => Violation::NotADirectory(shown),
                _ => Violation::NotARegularFile(shown),
            }
            .into());
        }
        Ok(resolved)
    }
}

impl PartialEq for FsPath {
    fn eq(&self, other: &Self) -> bool {
        self.fs_id() == other.fs_id() && self.root == other.root && self.segments == other.segments
    }
}

impl Eq for FsPath {}

impl Hash for FsPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fs_id().hash(state);
        self.root.hash(state);
        self.segments.hash(state);
    }
}

impl fmt::Display for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.fs.style().render(self.root.as_deref(), &self.segments);
        if rendered.is_empty() {
            write!(f, ".")
        } else {
            write!(f, "{rendered}")
        }
    }
}

impl fmt::Debug for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FsPath({}:{})", self.fs_id(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;

    #[test]
    fn test_unix_parse_normalizes() {
        let (root, segments) = PathStyle::Unix.parse("/work//./dir/../other/");
        assert_eq!(root.as_deref(), Some("/"));
        assert_eq!(segments, vec!["work", "other"]);

        let (root, segments) = PathStyle::Unix.parse("../a/./b");
        assert_eq!(root, None);
        assert_eq!(segments, vec!["..", "a", "b"]);

        let (_, segments) = PathStyle::Unix.parse("/../x");
        assert_eq!(segments, vec!["x"]);
    }

    #[test]
    fn test_windows_parse_roots_and_separators() {
        let (root, segments) = PathStyle::Windows.parse("c:\\work/dir\\file.txt");
        assert_eq!(root.as_deref(), Some("C:\\"));
        assert_eq!(segments, vec!["work", "dir", "file.txt"]);

        let (root, segments) = PathStyle::Windows.parse("\\top");
        assert_eq!(root.as_deref(), Some("\\"));
        assert_eq!(segments, vec!["top"]);

        let (root, segments) = PathStyle::Windows.parse("rel\\path");
        assert_eq!(root, None);
        assert_eq!(segments, vec!["rel", "path"]);
    }

    #[test]
    fn test_render_uses_style_separator() {
        let segments = vec!["a".to_string(), "b".to_string()];
        assert_eq!(PathStyle::Unix.render(Some("/"), &segments), "/a/b");
        assert_eq!(PathStyle::Windows.render(Some("C:\\"), &segments), "C:\\a\\b");
        assert_eq!(PathStyle::Windows.render(None, &segments), "a\\b");
    }

    #[test]
    fn test_parent_join_and_file_name() {
        let fs = MemoryFs::unix();
        let path = FsPath::new(&fs, "/work/dir/data.txt");
        assert_eq!(path.file_name(), Some("data.txt"));
        assert_eq!(path.parent().unwrap(), FsPath::new(&fs, "/work/dir"));
        assert_eq!(path.parent().unwrap().join("data.txt"), path);
        assert!(FsPath::new(&fs, "/").parent().is_none());
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let fs = MemoryFs::unix();
        let base = FsPath::new(&fs, "/work/dest");
        assert_eq!(base.resolve("dir/x"), FsPath::new(&fs, "/work/dest/dir/x"));
        assert_eq!(base.resolve(""), base);
        assert_eq!(base.resolve("../y"), FsPath::new(&fs, "/work/y"));
        assert_eq!(base.resolve("/abs"), FsPath::new(&fs, "/abs"));
    }

    #[test]
    fn test_paths_on_different_filesystems_differ() {
        let a = MemoryFs::unix();
        let b = MemoryFs::unix();
        assert_ne!(FsPath::new(&a, "/work"), FsPath::new(&b, "/work"));
        assert!(FsPath::new(&a, "/work/x")
            .relative_segments(&FsPath::new(&b, "/work"))
            .is_none());
    }

    #[test]
    fn test_relative_segments_uses_working_dir() {
        let fs = MemoryFs::unix();
        let base = FsPath::new(&fs, "/work");
        let rel = FsPath::new(&fs, "dir/a.txt");
        assert_eq!(
            rel.relative_segments(&base),
            Some(vec!["dir".to_string(), "a.txt".to_string()])
        );
        assert_eq!(base.relative_segments(&base), Some(Vec::new()));
        assert_eq!(FsPath::new(&fs, "/other").relative_segments(&base), None);
    }

    #[test]
    fn test_display_in_owning_style() {
        let fs = MemoryFs::windows();
        let path = FsPath::new(&fs, "C:/work/dir");
        assert_eq!(path.to_string(), "C:\\work\\dir");
        assert_eq!(FsPath::new(&fs, "").to_string(), ".");
    }

    #[test]
    fn test_write_read_and_checked_resolution() {
        let fs = MemoryFs::unix();
        let work = FsPath::new(&fs, "/work");
        work.resolve("a/b/c.txt").write_new(b"abc").unwrap();

        let dir = work.resolve_dir("a/b").unwrap();
        let file = dir.resolve_regular_file("c.txt").unwrap();
        assert_eq!(file.read_to_string().unwrap(), "abc");
        assert_eq!(dir.files().unwrap(), vec![file]);

        let err = work.resolve_dir("a/b/c.txt").unwrap_err();
        assert!(err.is_precondition_violation());
        let err = work.resolve_regular_file("a").unwrap_err();
        assert!(err.is_precondition_violation());
    }

    #[test]
    fn test_create_dir_all_rejects_file_in_the_way() {
        let fs = MemoryFs::unix();
        let file = FsPath::new(&fs, "/work/blocker");
        file.write_new(b"x").unwrap();
        let err = file.join("below").create_dir_all().unwrap_err();
        assert!(err.is_precondition_violation());
    }
}
