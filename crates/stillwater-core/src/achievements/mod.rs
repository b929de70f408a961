//! Achievements and progress evaluation.
//!
//! The catalog is static data. Progress is recomputed from a stats snapshot
//! every time it is asked for; nothing here caches.

pub mod catalog;
mod evaluator;
mod requirement;

pub use catalog::{catalog, find};
pub use evaluator::{
    AchievementCategory, AchievementProgressEvaluator, AchievementStatus, CategoryCounts, GameStats,
    UsageCounters,
};
pub use requirement::{Achievement, AchievementRequirement};
