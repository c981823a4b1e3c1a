//! Per-file parse cache.
//!
//! Every replay gets one JSON file under the versioned cache root, named
//! after the replay's base name. An entry is valid only when both the
//! modification time and the size recorded in it match the replay on disk.
//!
//! ```text
//! <root>/v<version>/
//!   replay_2025-03-16_13-40-49.rpl3.json   {"modTime":…,"size":…,"data":{…}}
//!   replay_2025-03-17_20-01-12.rpl3.json   {"modTime":…,"size":…,"data":null}
//! ```
//!
//! `data: null` is a cached rejection: the replay was read and is not a
//! qualifying match, so it is not parsed again until it changes.

mod error;
pub mod root;

pub use error::{CacheError, CacheResult};
pub use root::resolve_cache_root;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::types::MatchRecord;

const ENTRY_SUFFIX: &str = ".json";

/// Cheap stand-in for "content unchanged".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    /// Nanoseconds since the Unix epoch, negative before it.
    pub mod_time: i64,
    pub size: u64,
}

impl FileIdentity {
    pub fn new(mod_time: i64, size: u64) -> Self {
        Self { mod_time, size }
    }

    pub fn from_metadata(metadata: &fs::Metadata) -> std::io::Result<Self> {
        Ok(Self::from_modified(metadata.modified()?, metadata.len()))
    }

    pub fn from_modified(modified: SystemTime, size: u64) -> Self {
        Self {
            mod_time: unix_nanos(modified),
            size,
        }
    }
}

fn unix_nanos(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_nanos())
            .map(|n| -n)
            .unwrap_or(i64::MIN),
    }
}

/// A persisted parse outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub mod_time: i64,
    pub size: u64,
    /// `None` for a confirmed rejection.
    pub data: Option<MatchRecord>,
}

impl CacheEntry {
    pub fn identity(&self) -> FileIdentity {
        FileIdentity::new(self.mod_time, self.size)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntryRef<'a> {
    mod_time: i64,
    size: u64,
    data: Option<&'a MatchRecord>,
}

/// Cache entries for one software version.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Open (and create if needed) the cache at an already-resolved root.
    pub fn open(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| CacheError::CreateDir {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the entry for `source` lives.
    pub fn entry_path(&self, source: &Path) -> CacheResult<PathBuf> {
        let name = source
            .file_name()
            .ok_or_else(|| CacheError::NoFileName(source.to_path_buf()))?;

        let mut file_name = name.to_os_string();
        file_name.push(ENTRY_SUFFIX);
        Ok(self.root.join(file_name))
    }

    /// Return the entry for `source` if it matches `identity` exactly.
    ///
    /// Missing, empty, undecodable and stale entries are all misses.
    pub fn lookup(&self, source: &Path, identity: FileIdentity) -> Option<CacheEntry> {
        let entry_path = self.entry_path(source).ok()?;

        let bytes = match fs::read(&entry_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("[cache] failed to read {}: {e}", entry_path.display());
                return None;
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            crate::debug_event!("cache", "empty entry", "{}", entry_path.display());
            return None;
        }

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                crate::debug_event!("cache", "undecodable entry", "{}: {e}", entry_path.display());
                return None;
            }
        };

        if entry.identity() != identity {
            crate::debug_event!("cache", "stale", "{}", source.display());
            return None;
        }

        Some(entry)
    }

    /// Replace the entry for `source`.
    ///
    /// The entry is written to a temporary file in the cache root and renamed
    /// into place, so a reader never sees a half-written entry.
    pub fn store(
        &self,
        source: &Path,
        identity: FileIdentity,
        record: Option<&MatchRecord>,
    ) -> CacheResult<()> {
        let entry_path = self.entry_path(source)?;

        let json = serde_json::to_vec(&CacheEntryRef {
            mod_time: identity.mod_time,
            size: identity.size,
            data: record,
        })
        .map_err(|source| CacheError::Serialization {
            path: entry_path.clone(),
            source,
        })?;

        let write_err = |source| CacheError::Write {
            path: entry_path.clone(),
            source,
        };

        let mut temp = tempfile::NamedTempFile::new_in(&self.root).map_err(write_err)?;
        temp.write_all(&json).map_err(write_err)?;
        temp.persist(&entry_path)
            .map_err(|e| write_err(e.error))?;

        Ok(())
    }
}
