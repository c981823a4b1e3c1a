//! Settling window for newly added replays.
//!
//! The client creates a replay and keeps writing it for a while. A path is
//! handed out only after it has gone quiet for the configured window, so a
//! rescan never reads a half-written file.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Quiet-period tracker keyed by path.
#[derive(Debug)]
pub struct Debouncer {
    /// path -> last time it was seen
    pending: HashMap<PathBuf, Instant>,
    window: Duration,
}

impl Debouncer {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            pending: HashMap::new(),
            window: Duration::from_millis(debounce_ms),
        }
    }

    /// Note activity on `path`, restarting its window.
    pub fn record(&mut self, path: PathBuf) {
        self.record_at(path, Instant::now());
    }

    pub fn record_at(&mut self, path: PathBuf, at: Instant) {
        self.pending.insert(path, at);
    }

    /// Drain every path that has been quiet for the full window.
    pub fn take_ready(&mut self) -> Vec<PathBuf> {
        self.take_ready_at(Instant::now())
    }

    pub fn take_ready_at(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut ready = Vec::new();
        self.pending.retain(|path, seen| {
            if now.saturating_duration_since(*seen) >= self.window {
                ready.push(path.clone());
                false
            } else {
                true
            }
        });
        ready.sort();
        ready
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
