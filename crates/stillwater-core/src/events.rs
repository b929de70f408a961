use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::entry::UserId;

/// Every mutation that can make cached dashboard state stale produces an Event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    EntrySubmitted {
        entry_id: String,
        user_id: UserId,
        at: DateTime<Utc>,
    },
    EvaluationCompleted {
        evaluation_id: String,
        maturity_score: f64,
        at: DateTime<Utc>,
    },
    /// Signed-in identity changed; `None` means signed out.
    UserChanged {
        user_id: Option<UserId>,
        at: DateTime<Utc>,
    },
    /// Stats were recomputed and these achievements unlocked.
    AchievementsUnlocked {
        ids: Vec<String>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether this event invalidates the dashboard cache.
    pub fn invalidates_dashboard(&self) -> bool {
        !matches!(self, Event::AchievementsUnlocked { .. })
    }
}

const DEFAULT_CAPACITY: usize = 64;

/// Typed in-process event bus.
///
/// Cloning shares the same channel. Publishing with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: Event) -> usize {
        tracing::trace!(?event, "publishing event");
        self.sender.send(event).unwrap_or(0)
    }
}
