//! Achievement progress evaluation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::requirement::{Achievement, AchievementRequirement};

/// Progress reported by the time-of-day approximation once enough entries exist.
const TIME_OF_DAY_PARTIAL: f64 = 0.6;
/// Entries needed before the time-of-day approximation reports progress.
const TIME_OF_DAY_MIN_ENTRIES: u32 = 5;
/// Progress reported by the weekend approximation once the streak is long enough.
const WEEKEND_PARTIAL: f64 = 0.8;
const WEEKEND_MIN_STREAK: u32 = 4;
/// Positive-mood progress never reaches completion through its formula.
const POSITIVE_MOOD_CAP: f64 = 0.8;

/// Snapshot of the user's cumulative stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub total_entries: u32,
    pub current_streak: u32,
    pub unlocked_achievement_ids: BTreeSet<String>,
}

impl GameStats {
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked_achievement_ids.contains(id)
    }
}

/// Flat counters kept in key-value storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounters {
    pub voice_usage: u32,
    pub mood_tracking: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementCategory {
    Unlocked,
    /// Formula reports completion but the unlock has not been recorded yet.
    PendingUnlock,
    InProgress,
    Locked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub unlocked: usize,
    pub pending_unlock: usize,
    pub in_progress: usize,
    pub locked: usize,
}

/// One achievement with its evaluated progress and category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub progress: f64,
    pub category: AchievementCategory,
}

/// Computes progress ratios against one stats snapshot.
#[derive(Debug, Clone)]
pub struct AchievementProgressEvaluator<'a> {
    stats: &'a GameStats,
    counters: UsageCounters,
}

fn clamped_ratio(value: u32, target: u32, cap: f64) -> f64 {
    if target == 0 {
        return cap;
    }
    (f64::from(value) / f64::from(target)).min(cap)
}

impl<'a> AchievementProgressEvaluator<'a> {
    pub fn new(stats: &'a GameStats, counters: UsageCounters) -> Self {
        Self { stats, counters }
    }

    /// Progress in `[0.0, 1.0]`. Already unlocked achievements report `1.0`.
    pub fn progress(&self, achievement: &Achievement) -> f64 {
        if self.stats.is_unlocked(&achievement.id) {
            return 1.0;
        }
        self.requirement_progress(&achievement.requirement)
    }

    /// Formula progress for a requirement, ignoring the unlocked set.
    pub fn requirement_progress(&self, requirement: &AchievementRequirement) -> f64 {
        let stats = self.stats;
        match requirement {
            AchievementRequirement::FirstEntry => {
                if stats.total_entries > 0 {
                    1.0
                } else {
                    0.0
                }
            }
            AchievementRequirement::Streak { days } => {
                clamped_ratio(stats.current_streak, *days, 1.0)
            }
            AchievementRequirement::TotalEntries { count } => {
                clamped_ratio(stats.total_entries, *count, 1.0)
            }
            // No formula exists for these yet; they stay locked until unlocked explicitly.
            AchievementRequirement::MoodImprovement
            | AchievementRequirement::GratitudePractice
            | AchievementRequirement::ReflectionDepth
            | AchievementRequirement::Consistency => 0.0,
            // Coarse: entry timestamps are not inspected.
            AchievementRequirement::TimeOfDay { .. } => {
                if stats.total_entries >= TIME_OF_DAY_MIN_ENTRIES {
                    TIME_OF_DAY_PARTIAL
                } else {
                    0.0
                }
            }
            AchievementRequirement::WeekendConsistency { .. } => {
                if stats.current_streak >= WEEKEND_MIN_STREAK {
                    WEEKEND_PARTIAL
                } else {
                    0.0
                }
            }
            AchievementRequirement::VoiceUsage { count } => {
                clamped_ratio(self.counters.voice_usage, *count, 1.0)
            }
            AchievementRequirement::MoodTracking { count } => {
                clamped_ratio(self.counters.mood_tracking, *count, 1.0)
            }
            AchievementRequirement::PositiveMood { count } => {
                clamped_ratio(self.counters.mood_tracking, *count, POSITIVE_MOOD_CAP)
            }
        }
    }

    pub fn category(&self, achievement: &Achievement) -> AchievementCategory {
        if self.stats.is_unlocked(&achievement.id) {
            return AchievementCategory::Unlocked;
        }
        let progress = self.requirement_progress(&achievement.requirement);
        if progress >= 1.0 {
            AchievementCategory::PendingUnlock
        } else if progress > 0.0 {
            AchievementCategory::InProgress
        } else {
            AchievementCategory::Locked
        }
    }

    /// Re-evaluates every achievement in `achievements`.
    pub fn category_counts(&self, achievements: &[Achievement]) -> CategoryCounts {
        achievements
            .iter()
            .fold(CategoryCounts::default(), |mut counts, a| {
                match self.category(a) {
                    AchievementCategory::Unlocked => counts.unlocked += 1,
                    AchievementCategory::PendingUnlock => counts.pending_unlock += 1,
                    AchievementCategory::InProgress => counts.in_progress += 1,
                    AchievementCategory::Locked => counts.locked += 1,
                }
                counts
            })
    }

    pub fn report(&self, achievements: &[Achievement]) -> Vec<AchievementStatus> {
        achievements
            .iter()
            .map(|a| AchievementStatus {
                achievement: a.clone(),
                progress: self.progress(a),
                category: self.category(a),
            })
            .collect()
    }

    /// Achievements whose formula reports completion but are not yet unlocked.
    pub fn newly_earned<'c>(&self, achievements: &'c [Achievement]) -> Vec<&'c Achievement> {
        achievements
            .iter()
            .filter(|a| !self.stats.is_unlocked(&a.id))
            .filter(|a| self.requirement_progress(&a.requirement) >= 1.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::catalog;
    use proptest::prelude::*;

    fn achievement(id: &str, requirement: AchievementRequirement) -> Achievement {
        Achievement::new(id, id, "", requirement)
    }

    fn stats(total_entries: u32, current_streak: u32) -> GameStats {
        GameStats {
            total_entries,
            current_streak,
            unlocked_achievement_ids: BTreeSet::new(),
        }
    }

    #[test]
    fn streak_progress() {
        let a = achievement("s7", AchievementRequirement::Streak { days: 7 });
        let counters = UsageCounters::default();

        let s = stats(0, 7);
        assert_eq!(AchievementProgressEvaluator::new(&s, counters).progress(&a), 1.0);

        let s = stats(0, 3);
        let p = AchievementProgressEvaluator::new(&s, counters).progress(&a);
        assert!((p - 0.4286).abs() < 1e-4);

        let s = stats(0, 10);
        assert_eq!(AchievementProgressEvaluator::new(&s, counters).progress(&a), 1.0);
    }

    #[test]
    fn positive_mood_is_capped_below_completion() {
        let a = achievement("pm", AchievementRequirement::PositiveMood { count: 10 });
        let s = stats(0, 0);
        let counters = UsageCounters { voice_usage: 0, mood_tracking: 10 };
        let eval = AchievementProgressEvaluator::new(&s, counters);
        assert_eq!(eval.progress(&a), 0.8);

        let counters = UsageCounters { voice_usage: 0, mood_tracking: 50 };
        assert_eq!(AchievementProgressEvaluator::new(&s, counters).progress(&a), 0.8);
    }

    #[test]
    fn unlocked_short_circuits_every_variant() {
        let mut s = stats(0, 0);
        s.unlocked_achievement_ids.insert("gp".into());
        let a = achievement("gp", AchievementRequirement::GratitudePractice);
        let eval = AchievementProgressEvaluator::new(&s, UsageCounters::default());
        assert_eq!(eval.progress(&a), 1.0);
        assert_eq!(eval.category(&a), AchievementCategory::Unlocked);
    }

    #[test]
    fn completed_but_not_unlocked_is_pending() {
        let a = achievement("s3", AchievementRequirement::Streak { days: 3 });
        let s = stats(0, 3);
        let eval = AchievementProgressEvaluator::new(&s, UsageCounters::default());
        assert_eq!(eval.progress(&a), 1.0);
        assert_eq!(eval.category(&a), AchievementCategory::PendingUnlock);

        let counts = eval.category_counts(&[a]);
        assert_eq!(counts.in_progress, 0);
        assert_eq!(counts.pending_unlock, 1);

        let s = stats(0, 2);
        let eval = AchievementProgressEvaluator::new(&s, UsageCounters::default());
        let a = achievement("s3", AchievementRequirement::Streak { days: 3 });
        assert_eq!(eval.category(&a), AchievementCategory::InProgress);
    }

    #[test]
    fn unimplemented_variants_stay_at_zero() {
        let s = stats(500, 365);
        let counters = UsageCounters { voice_usage: 100, mood_tracking: 100 };
        let eval = AchievementProgressEvaluator::new(&s, counters);
        for req in [
            AchievementRequirement::MoodImprovement,
            AchievementRequirement::GratitudePractice,
            AchievementRequirement::ReflectionDepth,
            AchievementRequirement::Consistency,
        ] {
            assert_eq!(eval.requirement_progress(&req), 0.0, "{req:?}");
        }
    }

    #[test]
    fn approximations_jump_to_fixed_partials() {
        let counters = UsageCounters::default();
        let tod = AchievementRequirement::TimeOfDay { start_hour: 5, end_hour: 9, count: 5 };
        let weekend = AchievementRequirement::WeekendConsistency { weeks: 4 };

        let s = stats(4, 3);
        let eval = AchievementProgressEvaluator::new(&s, counters);
        assert_eq!(eval.requirement_progress(&tod), 0.0);
        assert_eq!(eval.requirement_progress(&weekend), 0.0);

        let s = stats(5, 4);
        let eval = AchievementProgressEvaluator::new(&s, counters);
        assert_eq!(eval.requirement_progress(&tod), 0.6);
        assert_eq!(eval.requirement_progress(&weekend), 0.8);
    }

    #[test]
    fn first_entry_and_counters() {
        let counters = UsageCounters { voice_usage: 2, mood_tracking: 5 };
        let s = stats(1, 0);
        let eval = AchievementProgressEvaluator::new(&s, counters);
        assert_eq!(eval.requirement_progress(&AchievementRequirement::FirstEntry), 1.0);
        assert_eq!(
            eval.requirement_progress(&AchievementRequirement::VoiceUsage { count: 4 }),
            0.5
        );
        assert_eq!(
            eval.requirement_progress(&AchievementRequirement::MoodTracking { count: 20 }),
            0.25
        );
        assert_eq!(
            eval.requirement_progress(&AchievementRequirement::TotalEntries { count: 0 }),
            1.0
        );
    }

    #[test]
    fn categories_over_catalog() {
        let mut s = stats(1, 1);
        s.unlocked_achievement_ids.insert(catalog::FIRST_ENTRY.into());
        let eval = AchievementProgressEvaluator::new(&s, UsageCounters::default());
        let all = catalog::catalog();
        let counts = eval.category_counts(&all);

        assert_eq!(counts.unlocked, 1);
        // streaks (3) + total entries (3)
        assert_eq!(counts.in_progress, 6);
        assert_eq!(
            counts.unlocked + counts.pending_unlock + counts.in_progress + counts.locked,
            all.len()
        );
    }

    #[test]
    fn newly_earned_skips_already_unlocked() {
        let mut s = stats(10, 3);
        s.unlocked_achievement_ids.insert(catalog::FIRST_ENTRY.into());
        let eval = AchievementProgressEvaluator::new(&s, UsageCounters::default());
        let all = catalog::catalog();
        let ids: Vec<_> = eval.newly_earned(&all).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec![catalog::STREAK_3, catalog::ENTRIES_10]);
    }

    proptest! {
        #[test]
        fn progress_stays_in_unit_interval(
            total in 0u32..1000,
            streak in 0u32..400,
            voice in 0u32..100,
            mood in 0u32..100,
        ) {
            let s = stats(total, streak);
            let eval = AchievementProgressEvaluator::new(
                &s,
                UsageCounters { voice_usage: voice, mood_tracking: mood },
            );
            for a in catalog::catalog() {
                let p = eval.progress(&a);
                prop_assert!((0.0..=1.0).contains(&p), "{} -> {}", a.id, p);
            }
        }

        #[test]
        fn streak_progress_is_monotonic(a in 0u32..60, b in 0u32..60, days in 1u32..40) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let req = AchievementRequirement::Streak { days };
            let lo_stats = stats(0, lo);
            let hi_stats = stats(0, hi);
            let p_lo = AchievementProgressEvaluator::new(&lo_stats, UsageCounters::default())
                .requirement_progress(&req);
            let p_hi = AchievementProgressEvaluator::new(&hi_stats, UsageCounters::default())
                .requirement_progress(&req);
            prop_assert!(p_lo <= p_hi);
        }
    }
}
