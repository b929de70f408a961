//! # Stillwater Core Library
//!
//! This library provides the core logic for the Stillwater journaling
//! companion. Everything the home screen and progress views display is
//! derived here from plain snapshots, so the same rules back the CLI and any
//! other front end.
//!
//! ## Architecture
//!
//! - **Aggregation**: pure functions over fetched snapshots: the seven-day
//!   mood rhythm, energy state, reflection progress, achievement progress and
//!   the activity heatmap
//! - **Services**: async collaborator traits with a SQLite-backed
//!   implementation and an OpenAI-compatible chat client
//! - **Dashboard**: fetch-then-aggregate loader with a cache invalidated by
//!   typed events
//!
//! ## Key Components
//!
//! - [`RhythmAggregator`]: per-day score resolution
//! - [`EnergyClassifier`]: rhythm mean to [`EnergyState`]
//! - [`AchievementProgressEvaluator`]: per-requirement progress ratios
//! - [`Stillwater`]: explicitly wired services for front ends

pub mod achievements;
pub mod app;
pub mod chat;
pub mod dashboard;
pub mod energy;
pub mod entry;
pub mod error;
pub mod events;
pub mod format;
pub mod heatmap;
pub mod reflection;
pub mod rhythm;
pub mod services;
pub mod session;
pub mod stats;
pub mod storage;

pub use achievements::{
    Achievement, AchievementCategory, AchievementProgressEvaluator, AchievementRequirement,
    AchievementStatus, CategoryCounts, GameStats, UsageCounters,
};
pub use app::Stillwater;
pub use chat::{ChatCompanion, OpenAiChatClient, FALLBACK_REPLY};
pub use dashboard::{DashboardCache, DashboardLoader, DashboardSnapshot};
pub use energy::{EnergyClassifier, EnergyState};
pub use entry::{EvaluationRecord, JournalEntry, UserId};
pub use error::{ChatError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{Event, EventBus};
pub use heatmap::{ActivityHeatmap, ActivityRecord, GridCell};
pub use reflection::{ProgressUpdate, ReflectionProgressTracker};
pub use rhythm::{DailyStatPoint, RhythmAggregator, RhythmSeries, ScoreSource};
pub use session::{SessionState, UserSession};
pub use storage::{Config, Database};
