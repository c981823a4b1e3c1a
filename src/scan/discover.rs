//! Discover stage - non-recursive directory listing
//!
//! Lists replay candidates directly inside one save directory. The game
//! never nests replays, so sub-directories are not descended into.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::types::{ScanError, ScanResult};

/// List files in `dir` whose extension matches `extension` (no dot,
/// case-insensitive).
///
/// An unreadable `dir` is an error; an unreadable entry inside it is logged
/// and skipped.
pub fn replay_files(dir: &Path, extension: &str) -> ScanResult<Vec<PathBuf>> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(ScanError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(ScanError::DirectoryRead {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::DirectoryRead {
                    path: dir.to_path_buf(),
                    source: e.into(),
                });
            }
            Err(e) => {
                tracing::warn!("[scan] skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        if has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }

    crate::debug_event!("scan", "discovered", "{} replays in {}", files.len(), dir.display());
    Ok(files)
}

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
