//! # crossfs - Tree Copies Between Filesystem Instances
//!
//! crossfs copies directory trees and file lists from one filesystem instance
//! into another: an in-memory filesystem, a host directory, or anything else
//! implementing [`fs::FileSystem`]. The two sides may use different path
//! syntax, so destination paths are rebuilt from name segments instead of
//! being reused.
//!
//! ## Features
//!
//! - **Three copy modes**: a directory with its name, only its contents, or a
//!   flat list of files
//! - **Cross-syntax mapping**: Unix-style and Windows-style instances
//! - **No overwrites**: every destination entry must be new
//! - **Up-front validation**: precondition failures leave the destination untouched
//!
//! ## Quick Start
//!
//! ```no_run
//! use crossfs::core::TreeCopyEngine;
//! use crossfs::fs::{in_memory_dir, FsPath, MemoryFs};
//!
//! let source = in_memory_dir([("dir/data1.txt", "123"), ("dir/subdir/data2.txt", "abc")]).unwrap();
//! let dest_fs = MemoryFs::windows();
//! let dest = FsPath::new(&dest_fs, "C:\\backup");
//! dest.create_dir().unwrap();
//!
//! let summary = TreeCopyEngine::new()
//!     .copy_dir_recursively(Some(&source.join("dir")), Some(&dest))
//!     .unwrap();
//!
//! println!("Copied {} files ({} bytes)", summary.files_copied, summary.bytes_copied);
//! ```
//!
//! ## Host Directories
//!
//! ```no_run
//! use crossfs::core::TreeCopyEngine;
//! use crossfs::fs::{DirFs, FileSystem, FsHandle, FsPath, MemoryFs};
//!
//! let host: FsHandle = DirFs::new("/srv/data").unwrap();
//! let source = FsPath::from_location(&host, host.working_dir());
//!
//! let memory = MemoryFs::unix();
//! let dest = FsPath::new(&memory, "/work");
//!
//! TreeCopyEngine::new()
//!     .copy_dir_contents_recursively(Some(&source), Some(&dest))
//!     .unwrap()
//!     .print_summary();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;

// Re-export commonly used types
pub use config::CopyConfig;
pub use core::{map_to_destination, CopySummary, TreeCopyEngine};
pub use error::{CrossFsError, Result, Violation};
pub use fs::{FileSystem, FsHandle, FsPath};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use crossfs::prelude::*;
    //! ```

    pub use crate::config::{CopyConfig, CopyMode};
    pub use crate::core::{copy_host_paths, map_to_destination, CopySummary, TreeCopyEngine};
    pub use crate::error::{CrossFsError, Result, Violation};
    pub use crate::fs::{
        in_memory_dir, DirFs, EntryKind, FileSystem, FsHandle, FsPath, MemoryFs, MemoryFsConfig,
        PathStyle,
    };
}
