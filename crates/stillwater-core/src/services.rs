//! Collaborator contracts.
//!
//! The aggregation code only ever sees snapshots; these traits are how the
//! dashboard loader and stats logic obtain them. [`crate::storage::Database`]
//! implements the storage-backed ones, [`crate::chat::OpenAiChatClient`] the
//! chat one. Tests substitute in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::achievements::{GameStats, UsageCounters};
use crate::entry::{EvaluationRecord, JournalEntry, UserId};
use crate::error::{ChatError, Result};

/// Journal entry storage.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Most recent entries first, at most `limit`.
    async fn recent_entries(&self, user: &UserId, limit: usize) -> Result<Vec<JournalEntry>>;

    /// The signed-in user, if one has been established.
    async fn current_user(&self) -> Result<Option<UserId>>;
}

/// AI journal analysis results.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Refresh the analysis snapshot with `user`'s evaluations.
    async fn load_evaluations(&self, user: &UserId) -> Result<()>;

    /// Snapshot taken by the last [`AnalysisService::load_evaluations`].
    fn analyses(&self) -> Vec<EvaluationRecord>;
}

/// Cumulative gamification stats.
#[async_trait]
pub trait StatsService: Send + Sync {
    /// Last computed snapshot for `user`; empty stats if none was computed.
    fn game_stats(&self, user: &UserId) -> GameStats;

    /// Recompute `user`'s totals and streak from stored entries, unlocking
    /// whatever is now earned. Returns the ids unlocked by this call.
    async fn recalculate_stats_from_entries(&self, user: &UserId) -> Result<Vec<String>>;
}

/// Flat integer counters in key-value storage.
pub trait CounterStore: Send + Sync {
    fn usage_counters(&self) -> Result<UsageCounters>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }
}

/// Chat completion endpoint.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(
        &self,
        text: &str,
        history: &[ChatMessage],
        system_prompt: &str,
    ) -> Result<String, ChatError>;
}
