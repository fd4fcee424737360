//! Rotation-completed notifications.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationEvent {
    /// The detail view advanced to the next wallpaper.
    Rotated { at: DateTime<Utc> },
}

/// Publish side of the rotation channel. Cheap to clone; every clone feeds
/// the same set of subscribers.
#[derive(Debug, Clone)]
pub struct RotationEvents {
    tx: broadcast::Sender<RotationEvent>,
}

impl RotationEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RotationEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: RotationEvent) {
        // no receivers is fine
        let receivers = self.tx.send(event).unwrap_or(0);
        trace!(receivers, "rotation event published");
    }

    pub fn rotated(&self) {
        self.publish(RotationEvent::Rotated { at: Utc::now() });
    }
}

impl Default for RotationEvents {
    fn default() -> Self {
        Self::new(16)
    }
}
