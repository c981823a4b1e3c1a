//! Parallel replay scan
//!
//! Walks a set of save directories and runs every replay through a fixed
//! pool of worker threads.
//!
//! ## Architecture
//!
//! ```text
//! DISCOVER ──► [bounded path queue] ──► WORKER × N ──► DashMap<path, outcome>
//!  (caller)                             cache → extract → cache
//! ```
//!
//! Discovery runs on the calling thread and blocks when the queue is full.
//! `scan` returns only after every worker has drained the queue, so the
//! report holds exactly one outcome per dispatched file.
//!
//! ## Usage
//!
//! ```ignore
//! use warno_replays::scan::{ScanConfig, Scanner};
//!
//! let scanner = Scanner::new(ScanConfig::default()).with_cache(store);
//! let report = scanner.scan(&["/saves/a", "/saves/b"]);
//! let records = report.into_records();
//! ```

mod config;
pub mod discover;
mod types;
mod worker;

pub use config::ScanConfig;
pub use types::{FileOutcome, ScanError, ScanResult, ScanStats};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Sender, bounded};
use dashmap::DashMap;

use crate::Settings;
use crate::cache::{CacheResult, CacheStore, resolve_cache_root};
use crate::types::MatchRecord;
use types::ScanCounters;

/// Coordinates discovery and the worker pool.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
    cache: Option<CacheStore>,
}

impl Scanner {
    /// Scanner without a cache; every file is parsed.
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }

    /// Attach a cache store.
    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build from settings, opening the cache when `cache.enabled` is set.
    pub fn from_settings(settings: &Settings) -> CacheResult<Self> {
        let scanner = Self::new(ScanConfig::from_settings(settings));
        if !settings.cache.enabled {
            return Ok(scanner);
        }

        let root = resolve_cache_root(settings.cache.root.as_deref())?;
        Ok(scanner.with_cache(CacheStore::open(root)?))
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&CacheStore> {
        self.cache.as_ref()
    }

    /// Scan `dirs` and block until every discovered replay is processed.
    ///
    /// Unreadable directories are skipped and reported in
    /// [`ScanReport::directory_errors`]. A directory listed twice is
    /// scanned once.
    pub fn scan<P: AsRef<Path>>(&self, dirs: &[P]) -> ScanReport {
        let start = Instant::now();
        let counters = ScanCounters::default();
        let outcomes: DashMap<PathBuf, FileOutcome> = DashMap::new();
        let mut stats = ScanStats::default();
        let mut directory_errors = Vec::new();

        let (path_tx, path_rx) = bounded::<PathBuf>(self.config.queue_size);

        thread::scope(|scope| {
            for _ in 0..self.config.workers {
                let receiver = path_rx.clone();
                let counters = &counters;
                let outcomes = &outcomes;
                let cache = self.cache.as_ref();

                scope.spawn(move || {
                    for path in receiver {
                        let outcome = worker::process_file(&path, cache, counters);
                        counters.record_outcome(&outcome);
                        if let FileOutcome::Failed(e) = &outcome {
                            tracing::warn!("[scan] {e}");
                        }
                        outcomes.insert(path, outcome);
                    }
                });
            }
            drop(path_rx);

            self.dispatch(dirs, &path_tx, &mut stats, &mut directory_errors);
            // Closing the queue lets workers exit once drained
            drop(path_tx);
        });

        counters.fill(&mut stats);
        stats.elapsed = start.elapsed();

        crate::log_event!(
            "scan",
            "complete",
            "{} dirs ({} skipped), {} files, {} cached, {} parsed, {} records, {} rejected, {} failed in {:?}",
            stats.directories_scanned,
            stats.directories_skipped,
            stats.files_dispatched,
            stats.cache_hits,
            stats.files_parsed,
            stats.records,
            stats.rejected,
            stats.failed,
            stats.elapsed
        );

        ScanReport {
            outcomes: outcomes.into_iter().collect(),
            directory_errors,
            stats,
        }
    }

    /// Enumerate each directory and feed its replays to the queue.
    fn dispatch<P: AsRef<Path>>(
        &self,
        dirs: &[P],
        sender: &Sender<PathBuf>,
        stats: &mut ScanStats,
        errors: &mut Vec<ScanError>,
    ) {
        let mut seen = HashSet::new();

        for dir in dirs {
            let dir = dir.as_ref();
            let absolute = match std::path::absolute(dir) {
                Ok(path) => path,
                Err(source) => {
                    let e = ScanError::Absolutize {
                        path: dir.to_path_buf(),
                        source,
                    };
                    tracing::warn!("[scan] {e}");
                    stats.directories_skipped += 1;
                    errors.push(e);
                    continue;
                }
            };

            if !seen.insert(absolute.clone()) {
                crate::debug_event!("scan", "duplicate directory", "{}", absolute.display());
                continue;
            }

            let files = match discover::replay_files(&absolute, &self.config.extension) {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!("[scan] skipping directory: {e}");
                    stats.directories_skipped += 1;
                    errors.push(e);
                    continue;
                }
            };
            stats.directories_scanned += 1;

            for path in files {
                if sender.send(path).is_err() {
                    // All workers gone
                    return;
                }
                stats.files_dispatched += 1;
            }
        }
    }
}

/// Result of one scan pass.
#[derive(Debug)]
pub struct ScanReport {
    outcomes: HashMap<PathBuf, FileOutcome>,
    directory_errors: Vec<ScanError>,
    stats: ScanStats,
}

impl ScanReport {
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// One outcome per dispatched file, keyed by absolute path.
    pub fn outcomes(&self) -> &HashMap<PathBuf, FileOutcome> {
        &self.outcomes
    }

    /// Directories that could not be enumerated.
    pub fn directory_errors(&self) -> &[ScanError] {
        &self.directory_errors
    }

    pub fn records(&self) -> impl Iterator<Item = &MatchRecord> {
        self.outcomes.values().filter_map(FileOutcome::record)
    }

    /// Matched records in unspecified order.
    pub fn into_records(self) -> Vec<MatchRecord> {
        self.outcomes
            .into_values()
            .filter_map(FileOutcome::into_record)
            .collect()
    }
}
