//! Error types for directory watches.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watch operations.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch path {path}: {reason}")]
    PathWatchFailed { path: PathBuf, reason: String },

    #[error("Watch service must run inside a tokio runtime")]
    NoRuntime,

    #[error("Watch service has been shut down")]
    ShutDown,
}

pub type WatchResult<T> = Result<T, WatchError>;

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
