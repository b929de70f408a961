//! Streak and total computation over stored entries.

use chrono::{Duration, NaiveDate};
use std::collections::{BTreeSet, HashSet};

use crate::achievements::GameStats;
use crate::entry::JournalEntry;

/// Consecutive days with at least one entry, counted back from `today`.
///
/// A streak still counts when today has no entry yet but yesterday does.
pub fn current_streak(days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let start = if days.contains(&today) {
        today
    } else {
        let yesterday = today - Duration::days(1);
        if !days.contains(&yesterday) {
            return 0;
        }
        yesterday
    };

    let mut streak = 0;
    let mut cursor = start;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

/// Build a stats snapshot from the user's entries and already-unlocked ids.
pub fn compute_game_stats(
    entries: &[JournalEntry],
    unlocked: BTreeSet<String>,
    today: NaiveDate,
) -> GameStats {
    let days: HashSet<NaiveDate> = entries.iter().map(JournalEntry::local_date).collect();
    GameStats {
        total_entries: entries.len() as u32,
        current_streak: current_streak(&days, today),
        unlocked_achievement_ids: unlocked,
    }
}
