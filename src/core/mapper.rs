//! Source-to-destination path mapping
//!
//! Paths are never reused across filesystems: the source path is reduced to
//! its segments below the relativization root, and each segment is appended
//! to the destination root once the destination's syntax is known to read it
//! back as a single ordinary name.

use crate::error::{CrossFsError, Result};
use crate::fs::{FsPath, PathStyle};

/// Map `path` (inside `relativization_root`) to its counterpart under
/// `destination_root`.
///
/// Pure: no filesystem is touched. Returns `destination_root` itself when
/// `path == relativization_root`.
pub fn map_to_destination(
    path: &FsPath,
    relativization_root: &FsPath,
    destination_root: &FsPath,
) -> Result<FsPath> {
    let segments = path.relative_segments(relativization_root).ok_or_else(|| {
        CrossFsError::InvalidRelativePath {
            path: path.to_string(),
            root: relativization_root.to_string(),
        }
    })?;

    let style = destination_root.file_system().style();
    let mut mapped = destination_root.clone();
    for segment in &segments {
        if !is_plain_segment(style, segment) {
            return Err(CrossFsError::UnrepresentableSegment {
                segment: segment.clone(),
                path: path.to_string(),
            });
        }
        mapped = mapped.join(segment);
    }
    Ok(mapped)
}

/// Whether `segment` reads back as exactly one ordinary name in `style`
fn is_plain_segment(style: PathStyle, segment: &str) -> bool {
    if segment.is_empty() || segment == "." || segment == ".." {
        return false;
    }
    if segment.chars().any(|c| style.is_separator(c)) {
        return false;
    }
    let (root, parsed) = style.parse(segment);
    root.is_none() && parsed.len() == 1 && parsed[0] == segment
}
