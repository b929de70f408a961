//! Achievement definitions.

use serde::{Deserialize, Serialize};

/// What must happen for an achievement to unlock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AchievementRequirement {
    FirstEntry,
    Streak { days: u32 },
    TotalEntries { count: u32 },
    MoodImprovement,
    GratitudePractice,
    ReflectionDepth,
    Consistency,
    /// Entries written between `start_hour` and `end_hour`.
    TimeOfDay { start_hour: u8, end_hour: u8, count: u32 },
    WeekendConsistency { weeks: u32 },
    VoiceUsage { count: u32 },
    MoodTracking { count: u32 },
    PositiveMood { count: u32 },
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub requirement: AchievementRequirement,
}

impl Achievement {
    pub fn new(
        id: &str,
        title: &str,
        description: &str,
        requirement: AchievementRequirement,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            requirement,
        }
    }
}
