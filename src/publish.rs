//! Broadcasting of rebuilt score trees.
//!
//! Every rebuild goes out as a whole tree. Subscribers that fall behind
//! only lose intermediate trees; the next one they receive is complete.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::score::ScoreTree;

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A full rebuild of the score tree.
    TreeUpdated(Arc<ScoreTree>),
    /// An entity could not be read or applied.
    Failed { entity: String, message: String },
}

/// Fans session events out to any number of subscribers.
#[derive(Clone)]
pub struct TreeBroadcaster {
    sender: broadcast::Sender<SessionEvent>,
}

impl TreeBroadcaster {
    /// Create a new broadcaster with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish_tree(&self, tree: ScoreTree) {
        let cards = tree.card_count();
        match self.sender.send(SessionEvent::TreeUpdated(Arc::new(tree))) {
            Ok(count) => {
                crate::debug_event!("publish", "tree", "{cards} cards to {count} subscribers");
            }
            Err(_) => {
                crate::debug_event!("publish", "dropped", "no subscribers for tree");
            }
        }
    }

    pub fn publish_failure(&self, entity: &str, message: String) {
        let event = SessionEvent::Failed {
            entity: entity.to_string(),
            message,
        };
        if self.sender.send(event).is_err() {
            crate::debug_event!("publish", "dropped", "no subscribers for failure of {entity}");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}
