//! Scan configuration
//!
//! Worker count and queue capacity for the scan pool. Reads from Settings.

use crate::Settings;

/// Configuration for the scan worker pool.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of parser workers (default: available parallelism)
    pub workers: usize,

    /// Capacity of the bounded path queue between discovery and workers
    pub queue_size: usize,

    /// Replay file extension, without the dot, compared case-insensitively
    pub extension: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            queue_size: 100,
            extension: "rpl3".to_string(),
        }
    }
}

impl ScanConfig {
    /// Create config from Settings.
    ///
    /// - `scan.workers` -> workers
    /// - `scan.queue_size` -> queue_size
    /// - `scan.extension` -> extension
    pub fn from_settings(settings: &Settings) -> Self {
        let scan = &settings.scan;
        Self {
            workers: scan.workers.max(1),
            queue_size: scan.queue_size.max(1),
            extension: scan.extension.trim_start_matches('.').to_string(),
        }
    }

    /// Set worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set queue capacity
    pub fn with_queue_size(mut self, size: usize) -> Self {
        self.queue_size = size.max(1);
        self
    }

    /// Set replay extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }
}
