//! Live directory watches for new replays.
//!
//! # Architecture
//!
//! ```text
//! WatchService
//!   - one notify::RecommendedWatcher per directory
//!   - one tokio task per directory, cancelled through a child token
//!         |
//!   NotificationBroadcaster  --ReplayEvent::FileAdded-->  subscribers
//! ```
//!
//! Subscribers decide what a new file means; the CLI debounces paths with
//! [`Debouncer`] and runs another scan pass.

mod debouncer;
mod error;
mod service;

pub use debouncer::Debouncer;
pub use error::{WatchError, WatchResult};
pub use service::WatchService;
