//! Error types for crossfs
//!
//! Every failure of a copy surfaces immediately to the caller. Nothing is
//! retried and nothing already materialized is rolled back.

use thiserror::Error;

/// A precondition a caller failed to satisfy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Path was expected to be an existing directory
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Path was expected to be an existing regular file
    #[error("not a regular file: {0}")]
    NotARegularFile(String),

    /// Source and destination live in the same filesystem instance
    #[error("source '{source_path}' and destination '{destination}' share filesystem {fs}")]
    SameFileSystem {
        source_path: String,
        destination: String,
        fs: String,
    },

    /// Path has no parent (it is a filesystem root)
    #[error("path has no parent directory: {0}")]
    MissingParent(String),

    /// Copies never overwrite
    #[error("destination already exists: {0}")]
    DestinationExists(String),
}

/// Main error type for crossfs operations
#[derive(Error, Debug)]
pub enum CrossFsError {
    /// Inputs did not satisfy a stated precondition
    #[error("Precondition violated: {0}")]
    Precondition(#[from] Violation),

    /// A path is not equal to or below the relativization root
    #[error("'{path}' is not inside relativization root '{root}'")]
    InvalidRelativePath { path: String, root: String },

    /// A source segment contains a separator of the destination style
    #[error("segment '{segment}' of '{path}' cannot be represented on the destination filesystem")]
    UnrepresentableSegment { segment: String, path: String },

    /// A walked entry is neither a regular file nor a directory
    #[error("unsupported entry kind at '{path}': {kind}")]
    UnsupportedEntryKind { path: String, kind: String },

    /// I/O error reported by a filesystem provider
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid path format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CrossFsError {
    /// Create an I/O error with path context
    pub fn io(path: impl ToString, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this error reports a caller mistake rather than a provider failure
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Io { path, .. }
            | Self::InvalidRelativePath { path, .. }
            | Self::UnrepresentableSegment { path, .. }
            | Self::UnsupportedEntryKind { path, .. } => Some(path),
            Self::Precondition(violation) => match violation {
                Violation::NotADirectory(path)
                | Violation::NotARegularFile(path)
                | Violation::MissingParent(path)
                | Violation::DestinationExists(path) => Some(path),
                Violation::SameFileSystem { source_path, .. } => Some(source_path),
            },
            Self::InvalidPath(_) | Self::Config(_) => None,
        }
    }
}

/// Result type alias for crossfs operations
pub type Result<T> = std::result::Result<T, CrossFsError>;

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl ToString) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl ToString) -> Result<T> {
        self.map_err(|e| CrossFsError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CrossFsError::io("/test/path", io_err);
        assert_eq!(err.path(), Some("/test/path"));
        assert!(!err.is_precondition_violation());
    }

    #[test]
    fn test_violation_converts_and_keeps_path() {
        let err: CrossFsError = Violation::DestinationExists("/dest/dir".to_string()).into();
        assert!(err.is_precondition_violation());
        assert_eq!(err.path(), Some("/dest/dir"));
        assert_eq!(
            err.to_string(),
            "Precondition violated: destination already exists: /dest/dir"
        );
    }

    #[test]
    fn test_with_path_attaches_context() {
        let res: std::io::Result<()> = Err(std::io::Error::other("boom"));
        let err = res.with_path("/a/b").unwrap_err();
        assert!(matches!(err, CrossFsError::Io { ref path, .. } if path == "/a/b"));
    }
}
