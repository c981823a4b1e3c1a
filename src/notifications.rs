//! Notification broadcasting for replay watchers
//!
//! One broadcast channel shared by every directory watch and every
//! subscriber (CLI rescan loop, tests, any embedding application).

use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

/// Event name consumers subscribe to for new replays.
pub const REPLAY_FILE_ADDED: &str = "replay-file-added";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayEvent {
    /// A file was created inside a watched directory.
    FileAdded { path: PathBuf },
}

impl ReplayEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ReplayEvent::FileAdded { .. } => REPLAY_FILE_ADDED,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ReplayEvent::FileAdded { path } => path,
        }
    }
}

/// Fans watcher events out to any number of subscribers
#[derive(Debug, Clone)]
pub struct NotificationBroadcaster {
    sender: broadcast::Sender<ReplayEvent>,
}

impl NotificationBroadcaster {
    /// Create a new broadcaster with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Send an event to all current subscribers
    pub fn send(&self, event: ReplayEvent) {
        match self.sender.send(event) {
            Ok(count) => {
                crate::debug_event!("broadcast", "sent", "to {count} subscribers");
            }
            Err(broadcast::error::SendError(event)) => {
                // No receivers
                crate::debug_event!("broadcast", "dropped", "no subscribers for {event:?}");
            }
        }
    }

    /// Subscribe to receive events sent from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ReplayEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_subscriber_receives_event() {
        let broadcaster = NotificationBroadcaster::new(8);
        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        let event = ReplayEvent::FileAdded {
            path: PathBuf::from("/saves/a.rpl3"),
        };
        broadcaster.send(event.clone());

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
        assert_eq!(event.name(), "replay-file-added");
        assert_eq!(event.path(), Path::new("/saves/a.rpl3"));
    }

    #[test]
    fn test_send_without_subscribers_is_silent() {
        let broadcaster = NotificationBroadcaster::new(0);
        broadcaster.send(ReplayEvent::FileAdded {
            path: PathBuf::from("/saves/a.rpl3"),
        });
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}
