pub mod cache;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod extract;
pub mod logging;
pub mod notifications;
pub mod scan;
pub mod types;
pub mod watcher;

pub use cache::{CacheEntry, CacheError, CacheStore, FileIdentity, resolve_cache_root};
pub use config::Settings;
pub use dataset::{PlayerAlias, RecordFilter, local_player_aliases, sort_newest_first};
pub use extract::{ExtractError, Extraction, RejectReason, SourceFile, extract, extract_file};
pub use notifications::{NotificationBroadcaster, REPLAY_FILE_ADDED, ReplayEvent};
pub use scan::{FileOutcome, ScanConfig, ScanError, ScanReport, ScanStats, Scanner};
pub use types::{GameConfig, GameRecord, MatchRecord, MatchResult, ParticipantRecord};
pub use watcher::{Debouncer, WatchError, WatchService};
