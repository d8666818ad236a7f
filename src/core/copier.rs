//! Tree copy engine
//!
//! Reconstructs a source tree (or a flat list of files) under a destination
//! directory on another filesystem. All three public operations run the same
//! walk-map-materialize loop and differ only in which directory relative
//! paths are computed from.

use crate::core::map_to_destination;
use crate::error::{CrossFsError, Result, Violation};
use crate::fs::{EntryKind, FsPath};
use serde::Serialize;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Copy operation result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopySummary {
    /// Directories created on the destination
    pub directories_created: u64,
    /// Regular files copied
    pub files_copied: u64,
    /// Bytes written into copied files
    pub bytes_copied: u64,
    /// Total duration
    pub duration: Duration,
}

impl CopySummary {
    /// Whether nothing was materialized
    pub fn is_empty(&self) -> bool {
        self.directories_created == 0 && self.files_copied == 0
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("\n=== Copy Summary ===");
        println!("Directories:     {}", self.directories_created);
        println!("Files copied:    {}", self.files_copied);
        println!(
            "Bytes copied:    {}",
            humansize::format_size(self.bytes_copied, humansize::BINARY)
        );
        println!("Duration:        {:.2?}", self.duration);
    }
}

/// Directory each walked entry is made relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelativizationRoot {
    /// The source directory's parent: the directory itself reappears under the destination
    SourceParent,
    /// The source directory: only its contents reappear
    Source,
}

/// Copies trees and file lists between filesystem instances.
///
/// Synchronous and single-pass: an operation returns once every entry is
/// materialized or at the first failure, leaving already copied entries in
/// place. Destinations are never overwritten.
///
/// An absent source or destination (`None`) is a request for nothing and
/// returns an empty [`CopySummary`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeCopyEngine;

impl TreeCopyEngine {
    /// Create a new copy engine
    pub fn new() -> Self {
        Self
    }

    /// Copy `source_dir` with everything below it into `dest_dir`, so that
    /// `dest_dir/<name of source_dir>` mirrors the source.
    pub fn copy_dir_recursively(
        &self,
        source_dir: Option<&FsPath>,
        dest_dir: Option<&FsPath>,
    ) -> Result<CopySummary> {
        let (Some(source_dir), Some(dest_dir)) = (source_dir, dest_dir) else {
            tracing::debug!("copy_dir_recursively: nothing requested");
            return Ok(CopySummary::default());
        };
        self.copy_tree(source_dir, dest_dir, RelativizationRoot::SourceParent)
    }

    /// Copy everything below `source_dir` directly into `dest_dir`.
    pub fn copy_dir_contents_recursively(
        &self,
        source_dir: Option<&FsPath>,
        dest_dir: Option<&FsPath>,
    ) -> Result<CopySummary> {
        let (Some(source_dir), Some(dest_dir)) = (source_dir, dest_dir) else {
            tracing::debug!("copy_dir_contents_recursively: nothing requested");
            return Ok(CopySummary::default());
        };
        self.copy_tree(source_dir, dest_dir, RelativizationRoot::Source)
    }

    /// Copy each file into `dest_dir` under its own name, dropping any
    /// directory structure. Every file is validated before the first copy.
    pub fn copy_files(
        &self,
        files: Option<&[FsPath]>,
        dest_dir: Option<&FsPath>,
    ) -> Result<CopySummary> {
        let (Some(files), Some(dest_dir)) = (files, dest_dir) else {
            tracing::debug!("copy_files: nothing requested");
            return Ok(CopySummary::default());
        };

        ensure_directory(dest_dir)?;
        let mut parents = Vec::with_capacity(files.len());
        for file in files {
            ensure_regular_file(file)?;
            let parent = file
                .parent()
                .ok_or_else(|| Violation::MissingParent(file.to_string()))?;
            ensure_directory(&parent)?;
            ensure_different_file_systems(file, dest_dir)?;
            parents.push(parent);
        }

        let started = Instant::now();
        let mut summary = CopySummary::default();
        for (file, parent) in files.iter().zip(&parents) {
            materialize(file, parent, dest_dir, &mut summary)?;
        }
        summary.duration = started.elapsed();

        tracing::info!(
            files = summary.files_copied,
            bytes = summary.bytes_copied,
            destination = %dest_dir,
            "copied file list"
        );
        Ok(summary)
    }

    fn copy_tree(
        &self,
        source_dir: &FsPath,
        dest_dir: &FsPath,
        relativization: RelativizationRoot,
    ) -> Result<CopySummary> {
        ensure_directory(source_dir)?;
        ensure_directory(dest_dir)?;
        ensure_different_file_systems(source_dir, dest_dir)?;

        let base = match relativization {
            RelativizationRoot::SourceParent => source_dir
                .parent()
                .ok_or_else(|| Violation::MissingParent(source_dir.to_string()))?,
            RelativizationRoot::Source => source_dir.clone(),
        };

        let started = Instant::now();
        let entries = source_dir.file_system().enumerate_tree(source_dir)?;
        tracing::debug!(
            source = %source_dir,
            entries = entries.len(),
            ?relativization,
            "enumerated source tree"
        );

        let mut summary = CopySummary::default();
        for entry in &entries {
            materialize(entry, &base, dest_dir, &mut summary)?;
        }
        summary.duration = started.elapsed();

        tracing::info!(
            directories = summary.directories_created,
            files = summary.files_copied,
            bytes = summary.bytes_copied,
            source = %source_dir,
            destination = %dest_dir,
            "copied tree"
        );
        Ok(summary)
    }
}

/// Reproduce one source entry at its mapped destination
fn materialize(
    entry: &FsPath,
    relativization_root: &FsPath,
    dest_root: &FsPath,
    summary: &mut CopySummary,
) -> Result<()> {
    let target = map_to_destination(entry, relativization_root, dest_root)?;
    if &target == dest_root {
        return Ok(());
    }

    if target.entry_kind()?.is_some() {
        return Err(Violation::DestinationExists(target.to_string()).into());
    }

    match entry.entry_kind()? {
        Some(EntryKind::Directory) => {
            target.create_dir()?;
            summary.directories_created += 1;
            tracing::debug!(source = %entry, destination = %target, "created directory");
        }
        Some(EntryKind::File) => {
            let bytes = copy_file_bytes(entry, &target)?;
            summary.files_copied += 1;
            summary.bytes_copied += bytes;
            tracing::debug!(source = %entry, destination = %target, bytes, "copied file");
        }
        other => {
            return Err(CrossFsError::UnsupportedEntryKind {
                path: entry.to_string(),
                kind: other.map_or_else(|| "missing".to_string(), |kind| kind.to_string()),
            });
        }
    }
    Ok(())
}

/// Stream bytes between two possibly different providers
fn copy_file_bytes(source: &FsPath, target: &FsPath) -> Result<u64> {
    let mut reader = source.file_system().open_read(source)?;
    let mut writer = target.file_system().create_new(target)?;
    let bytes = io::copy(&mut reader, &mut writer)
        .map_err(|e| CrossFsError::io(format!("{source} -> {target}"), e))?;
    writer.flush().map_err(|e| CrossFsError::io(target, e))?;
    Ok(bytes)
}

fn ensure_directory(path: &FsPath) -> Result<()> {
    if path.entry_kind()? == Some(EntryKind::Directory) {
        Ok(())
    } else {
        Err(Violation::NotADirectory(path.to_string()).into())
    }
}

fn ensure_regular_file(path: &FsPath) -> Result<()> {
    if path.entry_kind()? == Some(EntryKind::File) {
        Ok(())
    } else {
        Err(Violation::NotARegularFile(path.to_string()).into())
    }
}

fn ensure_different_file_systems(source: &FsPath, destination: &FsPath) -> Result<()> {
    if source.fs_id() == destination.fs_id() {
        return Err(Violation::SameFileSystem {
            source_path: source.to_string(),
            destination: destination.to_string(),
            fs: source.fs_id().to_string(),
        }
        .into());
    }
    Ok(())
}
