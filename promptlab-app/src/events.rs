//! Entity change notifications
//!
//! Mutations publish `EntityChanged` after they succeed; views that cache
//! reads subscribe and refetch the affected entity.

use serde::Serialize;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum EntityChanged {
    Organization { id: String },
}

#[derive(Debug, Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<EntityChanged>,
}

impl InvalidationBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EntityChanged> {
        self.sender.subscribe()
    }

    /// Returns how many subscribers received the event
    pub fn publish(&self, event: EntityChanged) -> usize {
        tracing::debug!(?event, "entity changed");
        // No subscribers is fine: nothing is cached yet.
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new()
    }
}
