//! Cache root resolution.
//!
//! Resolved once at startup and passed to [`CacheStore::open`]; nothing in
//! the cache reads the environment on its own.
//!
//! [`CacheStore::open`]: super::CacheStore::open

use std::path::{Path, PathBuf};

use super::error::{CacheError, CacheResult};
use crate::config::APP_DIR;

/// Version partition of the running build.
pub const CACHE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve the versioned cache root.
///
/// `configured` is the optional `cache.root` setting. Without it, the root is
/// `<local data dir>/warno-replays/cache`. Either way the crate version is
/// appended so entries from other releases are never read.
pub fn resolve_cache_root(configured: Option<&Path>) -> CacheResult<PathBuf> {
    let base = match configured {
        Some(path) => path.to_path_buf(),
        None => dirs::data_local_dir()
            .ok_or(CacheError::RootUnresolved)?
            .join(APP_DIR)
            .join("cache"),
    };

    Ok(versioned(&base))
}

/// Append the version partition to a base directory.
pub fn versioned(base: &Path) -> PathBuf {
    base.join(format!("v{CACHE_VERSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_root_is_versioned() {
        let root = resolve_cache_root(Some(Path::new("/tmp/wr-cache"))).unwrap();
        assert_eq!(
            root,
            PathBuf::from("/tmp/wr-cache").join(format!("v{CACHE_VERSION}"))
        );
    }

    #[test]
    fn test_default_root_lives_under_app_dir() {
        // Only meaningful where the platform reports a data directory.
        if let Ok(root) = resolve_cache_root(None) {
            assert!(root.ends_with(Path::new(APP_DIR).join("cache").join(format!("v{CACHE_VERSION}"))));
        }
    }
}
