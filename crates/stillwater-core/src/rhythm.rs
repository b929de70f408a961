//! Seven-day mood rhythm.
//!
//! Reduces evaluations and raw journal entries into one score per calendar
//! day, oldest first, ending today. Each day resolves through a fixed
//! fallback chain; see [`RhythmAggregator::aggregate`].

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::entry::{EvaluationRecord, JournalEntry};

/// Score used for a day that has entries but no mood on any of them.
pub const PLACEHOLDER_SCORE: f64 = 5.0;

/// Default number of days in a rhythm series.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

/// Where a day's score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Evaluation,
    Mood,
    Placeholder,
    NoData,
}

/// One day of the rhythm series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStatPoint {
    pub date: NaiveDate,
    /// 0-10; `0.0` together with [`ScoreSource::NoData`] means nothing was recorded.
    pub score: f64,
    pub source: ScoreSource,
}

impl DailyStatPoint {
    pub fn has_data(&self) -> bool {
        self.source != ScoreSource::NoData
    }
}

/// Ordered daily scores, oldest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RhythmSeries {
    pub points: Vec<DailyStatPoint>,
}

impl RhythmSeries {
    /// Raw scores, zeros included.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.score).collect()
    }

    pub fn is_empty_of_data(&self) -> bool {
        self.points.iter().all(|p| p.score == 0.0)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Values to chart: the raw series, or a flat placeholder line when every
/// day is zero.
pub fn display_values(values: &[f64]) -> Vec<f64> {
    if values.iter().all(|v| *v == 0.0) {
        vec![PLACEHOLDER_SCORE; values.len()]
    } else {
        values.to_vec()
    }
}

/// Builds [`RhythmSeries`] from evaluation and entry snapshots.
#[derive(Debug, Clone)]
pub struct RhythmAggregator {
    pub lookback_days: u32,
}

impl Default for RhythmAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK_DAYS)
    }
}

impl RhythmAggregator {
    pub fn new(lookback_days: u32) -> Self {
        Self { lookback_days }
    }

    /// Aggregate one score per day for the window ending on `today`.
    ///
    /// Resolution order per day, first match wins:
    /// 1. an evaluation dated that day (its maturity score);
    /// 2. the first entry that day carrying a mood;
    /// 3. any entry that day ([`PLACEHOLDER_SCORE`]);
    /// 4. `0.0`.
    ///
    /// Zeros are returned as-is. Use [`display_values`] for charting.
    pub fn aggregate(
        &self,
        today: NaiveDate,
        evaluations: &[EvaluationRecord],
        entries: &[JournalEntry],
    ) -> RhythmSeries {
        let points = (0..self.lookback_days)
            .rev()
            .map(|offset| {
                let date = today - Duration::days(i64::from(offset));
                self.resolve_day(date, evaluations, entries)
            })
            .collect();

        RhythmSeries { points }
    }

    fn resolve_day(
        &self,
        date: NaiveDate,
        evaluations: &[EvaluationRecord],
        entries: &[JournalEntry],
    ) -> DailyStatPoint {
        if let Some(eval) = evaluations.iter().find(|e| e.local_date() == date) {
            return DailyStatPoint {
                date,
                score: eval.maturity_score,
                source: ScoreSource::Evaluation,
            };
        }

        let mut day_entries = entries.iter().filter(|e| e.local_date() == date).peekable();
        if day_entries.peek().is_none() {
            return DailyStatPoint {
                date,
                score: 0.0,
                source: ScoreSource::NoData,
            };
        }

        match day_entries.find_map(|e| e.mood) {
            Some(mood) => DailyStatPoint {
                date,
                score: f64::from(mood),
                source: ScoreSource::Mood,
            },
            None => DailyStatPoint {
                date,
                score: PLACEHOLDER_SCORE,
                source: ScoreSource::Placeholder,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{local_noon, UserId};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn entry(date: NaiveDate, mood: Option<u8>) -> JournalEntry {
        let mut e = JournalEntry::new(UserId::new("u"), "note", mood);
        e.created_at = local_noon(date);
        e
    }

    fn eval(date: NaiveDate, score: f64) -> EvaluationRecord {
        EvaluationRecord::new(local_noon(date), score)
    }

    #[test]
    fn series_is_oldest_first_and_ends_today() {
        let series = RhythmAggregator::default().aggregate(day(10), &[], &[]);
        assert_eq!(series.len(), 7);
        assert_eq!(series.points[0].date, day(4));
        assert_eq!(series.points[6].date, day(10));
    }

    #[test]
    fn evaluation_beats_raw_mood() {
        let today = day(10);
        let target = day(7);
        let series = RhythmAggregator::default().aggregate(
            today,
            &[eval(target, 7.0)],
            &[entry(target, Some(3))],
        );
        let point = series.points.iter().find(|p| p.date == target).unwrap();
        assert_eq!(point.score, 7.0);
        assert_eq!(point.source, ScoreSource::Evaluation);
    }

    #[test]
    fn first_mood_entry_wins_over_later_ones() {
        let today = day(10);
        let entries = vec![entry(today, None), entry(today, Some(8)), entry(today, Some(2))];
        let series = RhythmAggregator::default().aggregate(today, &[], &entries);
        assert_eq!(series.points[6].score, 8.0);
        assert_eq!(series.points[6].source, ScoreSource::Mood);
    }

    #[test]
    fn moodless_entries_use_placeholder() {
        let today = day(10);
        let series = RhythmAggregator::default().aggregate(today, &[], &[entry(day(9), None)]);
        assert_eq!(series.points[5].score, PLACEHOLDER_SCORE);
        assert_eq!(series.points[5].source, ScoreSource::Placeholder);
        assert_eq!(series.points[6].score, 0.0);
        assert!(!series.points[6].has_data());
    }

    #[test]
    fn records_outside_window_are_ignored() {
        let today = day(10);
        let series = RhythmAggregator::default().aggregate(
            today,
            &[eval(day(1), 9.0)],
            &[entry(day(2), Some(9))],
        );
        assert!(series.is_empty_of_data());
        assert_eq!(series.values(), vec![0.0; 7]);
    }

    #[test]
    fn all_zero_series_displays_as_flat_placeholder() {
        assert_eq!(display_values(&[0.0; 7]), vec![5.0; 7]);
        let mixed = [0.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(display_values(&mixed), mixed.to_vec());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let today = day(10);
        let evals = vec![eval(day(6), 6.5)];
        let entries = vec![entry(day(8), Some(4)), entry(day(9), None)];
        let aggregator = RhythmAggregator::default();
        let first = aggregator.aggregate(today, &evals, &entries);
        let second = aggregator.aggregate(today, &evals, &entries);
        assert_eq!(first, second);
    }
}
