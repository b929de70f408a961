//! Built-in achievement catalog.
//!
//! Ids are stable: they are what gets persisted in the unlocked set.

use super::requirement::{Achievement, AchievementRequirement as Req};

pub const FIRST_ENTRY: &str = "first_entry";
pub const STREAK_3: &str = "streak_3";
pub const STREAK_7: &str = "streak_7";
pub const STREAK_30: &str = "streak_30";
pub const ENTRIES_10: &str = "entries_10";
pub const ENTRIES_50: &str = "entries_50";
pub const ENTRIES_100: &str = "entries_100";
pub const MOOD_LIFT: &str = "mood_lift";
pub const GRATEFUL_HEART: &str = "grateful_heart";
pub const DEEP_DIVER: &str = "deep_diver";
pub const STEADY_HAND: &str = "steady_hand";
pub const EARLY_BIRD: &str = "early_bird";
pub const NIGHT_OWL: &str = "night_owl";
pub const WEEKEND_WARRIOR: &str = "weekend_warrior";
pub const VOICE_OF_CALM: &str = "voice_of_calm";
pub const MOOD_MAPPER: &str = "mood_mapper";
pub const SUNNY_DAYS: &str = "sunny_days";

/// All achievements, in display order.
pub fn catalog() -> Vec<Achievement> {
    vec![
        Achievement::new(FIRST_ENTRY, "First Step", "Write your first journal entry.", Req::FirstEntry),
        Achievement::new(STREAK_3, "Warming Up", "Journal three days in a row.", Req::Streak { days: 3 }),
        Achievement::new(STREAK_7, "One Full Week", "Journal seven days in a row.", Req::Streak { days: 7 }),
        Achievement::new(STREAK_30, "Rooted", "Journal thirty days in a row.", Req::Streak { days: 30 }),
        Achievement::new(ENTRIES_10, "Finding Words", "Write 10 entries.", Req::TotalEntries { count: 10 }),
        Achievement::new(ENTRIES_50, "Storyteller", "Write 50 entries.", Req::TotalEntries { count: 50 }),
        Achievement::new(ENTRIES_100, "Open Book", "Write 100 entries.", Req::TotalEntries { count: 100 }),
        Achievement::new(MOOD_LIFT, "Rising Tide", "See your mood improve over a week.", Req::MoodImprovement),
        Achievement::new(GRATEFUL_HEART, "Grateful Heart", "Practice gratitude regularly.", Req::GratitudePractice),
        Achievement::new(DEEP_DIVER, "Deep Diver", "Write a long, reflective entry.", Req::ReflectionDepth),
        Achievement::new(STEADY_HAND, "Steady Hand", "Journal consistently for a month.", Req::Consistency),
        Achievement::new(
            EARLY_BIRD,
            "Early Bird",
            "Write 5 entries before 9 AM.",
            Req::TimeOfDay { start_hour: 5, end_hour: 9, count: 5 },
        ),
        Achievement::new(
            NIGHT_OWL,
            "Night Owl",
            "Write 5 entries after 10 PM.",
            Req::TimeOfDay { start_hour: 22, end_hour: 4, count: 5 },
        ),
        Achievement::new(
            WEEKEND_WARRIOR,
            "Weekend Warrior",
            "Journal on four weekends in a row.",
            Req::WeekendConsistency { weeks: 4 },
        ),
        Achievement::new(VOICE_OF_CALM, "Voice of Calm", "Dictate 5 entries.", Req::VoiceUsage { count: 5 }),
        Achievement::new(MOOD_MAPPER, "Mood Mapper", "Log your mood 20 times.", Req::MoodTracking { count: 20 }),
        Achievement::new(SUNNY_DAYS, "Sunny Days", "Record 10 positive moods.", Req::PositiveMood { count: 10 }),
    ]
}

/// Look up a catalog entry by id.
pub fn find(id: &str) -> Option<Achievement> {
    catalog().into_iter().find(|a| a.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let all = catalog();
        let ids: HashSet<_> = all.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find(STREAK_7).unwrap().requirement, Req::Streak { days: 7 });
        assert!(find("nope").is_none());
    }
}
