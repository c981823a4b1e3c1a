//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module. Shared setup (directory
//! selection, scanner construction) lives here.

pub mod extract;
pub mod init;
pub mod players;
pub mod scan;
pub mod watch;

use std::path::PathBuf;

use anyhow::bail;

use crate::Settings;
use crate::scan::{ScanConfig, Scanner};

/// Directories from the command line, else from `scan.directories`.
pub(crate) fn resolve_dirs(dirs: &[PathBuf], settings: &Settings) -> anyhow::Result<Vec<PathBuf>> {
    let dirs = if dirs.is_empty() {
        settings.scan.directories.clone()
    } else {
        dirs.to_vec()
    };

    if dirs.is_empty() {
        bail!("No save directories given. Pass them as arguments or set `scan.directories`.");
    }
    Ok(dirs)
}

/// Scanner for the CLI. A cache that cannot be opened degrades to an
/// uncached scan.
pub(crate) fn build_scanner(settings: &Settings, no_cache: bool) -> Scanner {
    if no_cache {
        return Scanner::new(ScanConfig::from_settings(settings));
    }

    match Scanner::from_settings(settings) {
        Ok(scanner) => scanner,
        Err(e) => {
            tracing::warn!("[cli] scanning without cache: {e}");
            Scanner::new(ScanConfig::from_settings(settings))
        }
    }
}
