//! Per-file work: cache lookup, extraction, cache write-back.

use std::fs;
use std::path::Path;

use crate::cache::{CacheStore, FileIdentity};
use crate::extract::{self, Extraction, RejectReason, SourceFile};

use super::types::{FileOutcome, ScanCounters, ScanError};

/// Process one replay.
///
/// Only definitive outcomes are written back: a record or a confirmed
/// rejection. Malformed content is left uncached.
pub(crate) fn process_file(
    path: &Path,
    cache: Option<&CacheStore>,
    counters: &ScanCounters,
) -> FileOutcome {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(source) => {
            return FileOutcome::Failed(ScanError::Metadata {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let modified = match metadata.modified() {
        Ok(modified) => modified,
        Err(source) => {
            return FileOutcome::Failed(ScanError::Metadata {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let identity = FileIdentity::from_modified(modified, metadata.len());

    if let Some(entry) = cache.and_then(|cache| cache.lookup(path, identity)) {
        ScanCounters::bump(&counters.cache_hits);
        return match entry.data {
            Some(record) => FileOutcome::Matched(Box::new(record)),
            None => FileOutcome::Rejected(RejectReason::PreviouslyRejected),
        };
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(source) => {
            return FileOutcome::Failed(ScanError::FileRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    ScanCounters::bump(&counters.files_parsed);

    let content = String::from_utf8_lossy(&bytes);
    let extraction = match extract::extract(&content, &SourceFile::new(path, modified)) {
        Ok(extraction) => extraction,
        Err(source) => {
            return FileOutcome::Failed(ScanError::Malformed {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let outcome = match extraction {
        Extraction::Record(record) => FileOutcome::Matched(record),
        Extraction::Rejected(reason) => FileOutcome::Rejected(reason),
    };

    if let Some(cache) = cache {
        if let Err(e) = cache.store(path, identity, outcome.record()) {
            ScanCounters::bump(&counters.cache_write_failures);
            tracing::warn!("[scan] {e}");
        }
    }

    outcome
}
