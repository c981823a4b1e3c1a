//! Types flowing out of a scan.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use thiserror::Error;

use crate::extract::{ExtractError, RejectReason};
use crate::types::MatchRecord;

/// Per-file and per-directory scan failures.
///
/// None of these abort a scan; they are logged and recorded against the file
/// or directory that caused them.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to resolve absolute path for {path}: {source}")]
    Absolutize {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to stat {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed replay {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: ExtractError,
    },
}

pub type ScanResult<T> = Result<T, ScanError>;

/// What a worker concluded about one dispatched file.
#[derive(Debug)]
pub enum FileOutcome {
    Matched(Box<MatchRecord>),
    Rejected(RejectReason),
    Failed(ScanError),
}

impl FileOutcome {
    pub fn record(&self) -> Option<&MatchRecord> {
        match self {
            FileOutcome::Matched(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<MatchRecord> {
        match self {
            FileOutcome::Matched(record) => Some(*record),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed(_))
    }
}

/// Counters for one scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub directories_scanned: usize,
    pub directories_skipped: usize,
    pub files_dispatched: usize,
    pub cache_hits: usize,
    pub files_parsed: usize,
    pub records: usize,
    pub rejected: usize,
    pub failed: usize,
    pub cache_write_failures: usize,
    pub elapsed: Duration,
}

/// Shared counters bumped by workers.
#[derive(Debug, Default)]
pub(crate) struct ScanCounters {
    pub cache_hits: AtomicUsize,
    pub files_parsed: AtomicUsize,
    pub records: AtomicUsize,
    pub rejected: AtomicUsize,
    pub failed: AtomicUsize,
    pub cache_write_failures: AtomicUsize,
}

impl ScanCounters {
    pub fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Matched(_) => Self::bump(&self.records),
            FileOutcome::Rejected(_) => Self::bump(&self.rejected),
            FileOutcome::Failed(_) => Self::bump(&self.failed),
        }
    }

    pub fn fill(&self, stats: &mut ScanStats) {
        stats.cache_hits = self.cache_hits.load(Ordering::Relaxed);
        stats.files_parsed = self.files_parsed.load(Ordering::Relaxed);
        stats.records = self.records.load(Ordering::Relaxed);
        stats.rejected = self.rejected.load(Ordering::Relaxed);
        stats.failed = self.failed.load(Ordering::Relaxed);
        stats.cache_write_failures = self.cache_write_failures.load(Ordering::Relaxed);
    }
}
