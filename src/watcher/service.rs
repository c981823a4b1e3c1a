//! Directory watches that announce new replays.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::notifications::{NotificationBroadcaster, ReplayEvent};

use super::error::{WatchError, WatchResult};

/// Capacity of the per-watch queue between notify and the event loop.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// One live directory watch.
#[derive(Debug)]
struct DirectoryWatch {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Watches directories for file creation and broadcasts
/// [`ReplayEvent::FileAdded`] for each created path.
///
/// A path is watched at most once per service; there is no unwatch. Call
/// [`WatchService::shutdown`] to stop every watch.
#[derive(Debug)]
pub struct WatchService {
    broadcaster: NotificationBroadcaster,
    channel_capacity: usize,
    root: CancellationToken,
    watches: Mutex<HashMap<PathBuf, DirectoryWatch>>,
}

impl WatchService {
    pub fn new(broadcaster: NotificationBroadcaster) -> Self {
        Self {
            broadcaster,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            root: CancellationToken::new(),
            watches: Mutex::new(HashMap::new()),
        }
    }

    /// Set the notify-to-loop queue capacity for watches created afterwards.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReplayEvent> {
        self.broadcaster.subscribe()
    }

    /// Start watching `dir`.
    ///
    /// Returns `Ok(true)` when a watch was created and `Ok(false)` when the
    /// directory was already being watched.
    pub fn watch(&self, dir: impl AsRef<Path>) -> WatchResult<bool> {
        if self.root.is_cancelled() {
            return Err(WatchError::ShutDown);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| WatchError::NoRuntime)?;

        let dir = dir.as_ref();
        let dir = std::path::absolute(dir).map_err(|e| WatchError::PathWatchFailed {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut watches = self.watches.lock();
        if watches.contains_key(&dir) {
            crate::debug_event!("watcher", "already watching", "{}", dir.display());
            return Ok(false);
        }

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: dir.clone(),
                reason: e.to_string(),
            })?;

        let token = self.root.child_token();
        let task = runtime.spawn(run_watch(
            dir.clone(),
            watcher,
            rx,
            self.broadcaster.clone(),
            token.clone(),
        ));

        crate::log_event!("watcher", "watching", "{}", dir.display());
        watches.insert(dir, DirectoryWatch { token, task });
        Ok(true)
    }

    pub fn is_watching(&self, dir: &Path) -> bool {
        std::path::absolute(dir)
            .map(|dir| self.watches.lock().contains_key(&dir))
            .unwrap_or(false)
    }

    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.watches.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Cancel every watch and wait for its loop to exit.
    pub async fn shutdown(&self) {
        self.root.cancel();
        let watches = std::mem::take(&mut *self.watches.lock());

        for (dir, watch) in watches {
            watch.token.cancel();
            if let Err(e) = watch.task.await {
                tracing::error!("[watcher] watch task for {} failed: {e}", dir.display());
            }
        }
        crate::debug_event!("watcher", "shut down");
    }
}

/// Event loop for one directory.
///
/// Owns the notify watcher so the OS watch lives exactly as long as the loop.
async fn run_watch(
    dir: PathBuf,
    _watcher: RecommendedWatcher,
    mut events: mpsc::Receiver<notify::Result<Event>>,
    broadcaster: NotificationBroadcaster,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,

            received = events.recv() => match received {
                Some(Ok(event)) => announce_created(event, &broadcaster),
                Some(Err(e)) => {
                    tracing::error!("[watcher] watch error in {}: {e}", dir.display());
                }
                None => {
                    tracing::error!("[watcher] event stream closed for {}", dir.display());
                    break;
                }
            }
        }
    }

    crate::debug_event!("watcher", "stopped", "{}", dir.display());
}

fn announce_created(event: Event, broadcaster: &NotificationBroadcaster) {
    if !matches!(event.kind, EventKind::Create(_)) {
        return;
    }

    for path in event.paths {
        crate::debug_event!("watcher", "created", "{}", path.display());
        broadcaster.send(ReplayEvent::FileAdded { path });
    }
}
