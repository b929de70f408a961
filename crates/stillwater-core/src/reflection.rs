//! Daily reflection progress.
//!
//! Tracks how many entries were written today against a small daily target
//! and decides when the progress bar should visibly move.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::entry::JournalEntry;

/// Entries per day that fill the bar.
pub const DEFAULT_DAILY_TARGET: u32 = 4;

/// Ratio changes at or below this are not animated.
pub const ANIMATION_THRESHOLD: f64 = 0.01;

/// Length of the bar transition; the feedback pulse fires once it ends.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(800);

/// Number of entries written on `today` (local calendar).
pub fn count_today(entries: &[JournalEntry], today: NaiveDate) -> u32 {
    entries.iter().filter(|e| e.local_date() == today).count() as u32
}

/// Tactile pulse to play after the bar transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPulse {
    pub after: Duration,
}

/// Outcome of feeding a new count to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub count: u32,
    pub ratio: f64,
    /// Bar should transition to `ratio`.
    pub animate: bool,
    pub pulse: Option<FeedbackPulse>,
}

/// Holds the currently displayed ratio between reloads.
#[derive(Debug, Clone)]
pub struct ReflectionProgressTracker {
    daily_target: u32,
    displayed_ratio: f64,
}

impl Default for ReflectionProgressTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DAILY_TARGET)
    }
}

impl ReflectionProgressTracker {
    pub fn new(daily_target: u32) -> Self {
        Self {
            daily_target,
            displayed_ratio: 0.0,
        }
    }

    pub fn daily_target(&self) -> u32 {
        self.daily_target
    }

    pub fn displayed_ratio(&self) -> f64 {
        self.displayed_ratio
    }

    /// `min(count / target, 1.0)`. A zero target counts as already met.
    pub fn ratio(count: u32, target: u32) -> f64 {
        if target == 0 {
            return 1.0;
        }
        (f64::from(count) / f64::from(target)).min(1.0)
    }

    /// Feed today's count and decide whether the bar moves.
    pub fn update(&mut self, count: u32) -> ProgressUpdate {
        let ratio = Self::ratio(count, self.daily_target);
        let changed = (ratio - self.displayed_ratio).abs() > ANIMATION_THRESHOLD;

        if changed {
            self.displayed_ratio = ratio;
        }

        let pulse = (changed && count > 0).then_some(FeedbackPulse {
            after: TRANSITION_DURATION,
        });

        ProgressUpdate {
            count,
            ratio,
            animate: changed,
            pulse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{local_noon, UserId};

    #[test]
    fn ratio_against_default_target() {
        let t = DEFAULT_DAILY_TARGET;
        assert_eq!(ReflectionProgressTracker::ratio(0, t), 0.0);
        assert_eq!(ReflectionProgressTracker::ratio(2, t), 0.5);
        assert_eq!(ReflectionProgressTracker::ratio(4, t), 1.0);
        assert_eq!(ReflectionProgressTracker::ratio(8, t), 1.0);
    }

    #[test]
    fn repeated_count_does_not_reanimate() {
        let mut tracker = ReflectionProgressTracker::default();
        let first = tracker.update(1);
        assert!(first.animate);
        assert_eq!(first.pulse, Some(FeedbackPulse { after: TRANSITION_DURATION }));

        let second = tracker.update(1);
        assert!(!second.animate);
        assert!(second.pulse.is_none());
        assert_eq!(tracker.displayed_ratio(), 0.25);
    }

    #[test]
    fn zero_count_on_fresh_tracker_is_a_no_op() {
        let mut tracker = ReflectionProgressTracker::default();
        let update = tracker.update(0);
        assert!(!update.animate);
        assert!(update.pulse.is_none());
    }

    #[test]
    fn dropping_to_zero_animates_without_pulse() {
        let mut tracker = ReflectionProgressTracker::default();
        tracker.update(3);
        let update = tracker.update(0);
        assert!(update.animate);
        assert!(update.pulse.is_none());
    }

    #[test]
    fn counts_only_todays_entries() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut entries = Vec::new();
        for date in [today, today, yesterday] {
            let mut e = JournalEntry::new(UserId::new("u"), "x", None);
            e.created_at = local_noon(date);
            entries.push(e);
        }
        assert_eq!(count_today(&entries, today), 2);
        assert_eq!(count_today(&[], today), 0);
    }
}
