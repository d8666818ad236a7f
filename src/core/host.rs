//! Host copies driven by a [`CopyConfig`]
//!
//! Each side of a host copy is opened as its own [`DirFs`] instance, so the
//! engine sees two different filesystems even on one disk.

use crate::config::{CopyConfig, CopyMode};
use crate::core::{CopySummary, TreeCopyEngine};
use crate::error::{CrossFsError, Result, Violation};
use crate::fs::{DirFs, FileSystem, FsHandle, FsPath};
use std::path::Path;

/// Run the copy described by `config` with `engine`.
///
/// Host paths are expected to be resolved already
/// (see [`CopyConfig::resolve_host_paths`]).
pub fn copy_host_paths(engine: &TreeCopyEngine, config: &CopyConfig) -> Result<CopySummary> {
    let destination = open_dir(&config.destination)?;

    match config.mode {
        CopyMode::Tree => {
            let source = open_in_parent(single_source(config)?)?;
            engine.copy_dir_recursively(Some(&source), Some(&destination))
        }
        CopyMode::Contents => {
            let source = single_source(config)?;
            let source = if source.file_name().is_some() {
                open_in_parent(source)?
            } else {
                open_dir(source)?
            };
            engine.copy_dir_contents_recursively(Some(&source), Some(&destination))
        }
        CopyMode::Files => {
            let files = config
                .sources
                .iter()
                .map(|file| open_in_parent(file))
                .collect::<Result<Vec<_>>>()?;
            engine.copy_files(Some(&files), Some(&destination))
        }
    }
}

fn single_source(config: &CopyConfig) -> Result<&Path> {
    match config.sources.as_slice() {
        [source] => Ok(source.as_path()),
        _ => Err(CrossFsError::config(format!(
            "{:?} copies take exactly one source directory",
            config.mode
        ))),
    }
}

/// `host` as the root of a fresh instance
fn open_dir(host: &Path) -> Result<FsPath> {
    let fs: FsHandle = DirFs::new(host)?;
    tracing::debug!(fs = %fs.id(), host = %host.display(), "opened host directory");
    Ok(FsPath::from_location(&fs, fs.working_dir()))
}

/// `host` as a child of a fresh instance rooted at its parent.
///
/// The last component is not resolved, so a symbolic link stays a link.
fn open_in_parent(host: &Path) -> Result<FsPath> {
    let parent = host
        .parent()
        .ok_or_else(|| Violation::MissingParent(host.display().to_string()))?;
    let name = host
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CrossFsError::InvalidPath(host.display().to_string()))?;
    Ok(open_dir(parent)?.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("project");
        fs::create_dir_all(src.join("subdir")).unwrap();
        fs::write(src.join("data1.txt"), "123").unwrap();
        fs::write(src.join("subdir/data2.txt"), "abc").unwrap();
        let dst = tmp.path().join("backup");
        fs::create_dir(&dst).unwrap();
        (tmp, src, dst)
    }

    fn config(mode: CopyMode, sources: Vec<PathBuf>, destination: PathBuf) -> CopyConfig {
        CopyConfig {
            mode,
            sources,
            destination,
            output_format: OutputFormat::Text,
            quiet: true,
        }
        .resolve_host_paths()
        .unwrap()
    }

    #[test]
    fn test_tree_keeps_directory_name() {
        let (_tmp, src, dst) = setup();
        let summary = copy_host_paths(
            &TreeCopyEngine::new(),
            &config(CopyMode::Tree, vec![src], dst.clone()),
        )
        .unwrap();
        assert_eq!(fs::read_to_string(dst.join("project/data1.txt")).unwrap(), "123");
        assert_eq!(
            fs::read_to_string(dst.join("project/subdir/data2.txt")).unwrap(),
            "abc"
        );
        assert_eq!(summary.files_copied, 2);
    }

    #[test]
    fn test_contents_drops_directory_name() {
        let (_tmp, src, dst) = setup();
        copy_host_paths(
            &TreeCopyEngine::new(),
            &config(CopyMode::Contents, vec![src], dst.clone()),
        )
        .unwrap();
        assert!(dst.join("data1.txt").is_file());
        assert!(dst.join("subdir/data2.txt").is_file());
        assert!(!dst.join("project").exists());
    }

    #[test]
    fn test_files_are_flattened() {
        let (_tmp, src, dst) = setup();
        copy_host_paths(
            &TreeCopyEngine::new(),
            &config(
                CopyMode::Files,
                vec![src.join("data1.txt"), src.join("subdir/data2.txt")],
                dst.clone(),
            ),
        )
        .unwrap();
        assert!(dst.join("data1.txt").is_file());
        assert!(dst.join("data2.txt").is_file());
    }

    #[test]
    fn test_existing_destination_entry_is_not_overwritten() {
        let (_tmp, src, dst) = setup();
        fs::write(dst.join("data1.txt"), "keep").unwrap();
        let err = copy_host_paths(
            &TreeCopyEngine::new(),
            &config(CopyMode::Contents, vec![src], dst.clone()),
        )
        .unwrap_err();
        assert!(err.is_precondition_violation());
        assert_eq!(fs::read_to_string(dst.join("data1.txt")).unwrap(), "keep");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_sources_are_not_followed() {
        let (tmp, src, dst) = setup();
        let real = tmp.path().join("real");
        fs::create_dir(&real).unwrap();
        fs::write(real.join("target.txt"), "t").unwrap();
        std::os::unix::fs::symlink(real.join("target.txt"), src.join("link.txt")).unwrap();
        std::os::unix::fs::symlink(&real, tmp.path().join("linkdir")).unwrap();
        let engine = TreeCopyEngine::new();

        let err = copy_host_paths(
            &engine,
            &config(CopyMode::Files, vec![src.join("link.txt")], dst.clone()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CrossFsError::Precondition(Violation::NotARegularFile(_))
        ));

        for mode in [CopyMode::Tree, CopyMode::Contents] {
            let err = copy_host_paths(
                &engine,
                &config(mode, vec![tmp.path().join("linkdir")], dst.clone()),
            )
            .unwrap_err();
            assert!(matches!(
                err,
                CrossFsError::Precondition(Violation::NotADirectory(_))
            ));
        }

        assert_eq!(fs::read_dir(&dst).unwrap().count(), 0);
    }
}
