use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cannot resolve a per-user data directory for the cache root")]
    RootUnresolved,

    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write cache entry {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize cache entry for {path}: {source}")]
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("source path {0} has no file name")]
    NoFileName(PathBuf),
}

pub type CacheResult<T> = Result<T, CacheError>;
