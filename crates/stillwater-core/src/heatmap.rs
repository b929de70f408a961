//! Activity heatmap.
//!
//! A five-week by seven-day grid of journaling activity. Week 0 is the most
//! recent week. Within a row the day column is inverted (`6 - day`), so the
//! last column of week 0 is today.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entry::JournalEntry;
use crate::error::ValidationError;

pub const WEEKS: usize = 5;
pub const DAYS_PER_WEEK: usize = 7;
pub const MAX_LEVEL: u8 = 4;

/// A validated (week, day) coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    week: usize,
    day: usize,
}

impl GridCell {
    pub fn new(week: usize, day: usize) -> Result<Self, ValidationError> {
        if week >= WEEKS {
            return Err(ValidationError::OutOfBounds {
                collection: "heatmap weeks".into(),
                index: week,
                len: WEEKS,
            });
        }
        if day >= DAYS_PER_WEEK {
            return Err(ValidationError::OutOfBounds {
                collection: "heatmap days".into(),
                index: day,
                len: DAYS_PER_WEEK,
            });
        }
        Ok(Self { week, day })
    }

    pub fn week(&self) -> usize {
        self.week
    }

    pub fn day(&self) -> usize {
        self.day
    }

    /// Days before today this cell represents.
    pub fn days_ago(&self) -> i64 {
        (self.week * DAYS_PER_WEEK + (DAYS_PER_WEEK - 1 - self.day)) as i64
    }

    pub fn date(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.days_ago())
    }
}

/// Activity level recorded for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub date: NaiveDate,
    /// 0-4.
    pub level: u8,
}

/// Daily activity levels from entries: one level per entry, capped at [`MAX_LEVEL`].
pub fn activity_from_entries(entries: &[JournalEntry]) -> Vec<ActivityRecord> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for entry in entries {
        *per_day.entry(entry.local_date()).or_default() += 1;
    }
    per_day
        .into_iter()
        .map(|(date, count)| ActivityRecord {
            date,
            level: count.min(MAX_LEVEL as usize) as u8,
        })
        .collect()
}

/// Lookup over historical activity records anchored at `today`.
#[derive(Debug, Clone)]
pub struct ActivityHeatmap {
    today: NaiveDate,
    records: Vec<ActivityRecord>,
}

impl ActivityHeatmap {
    pub fn new(today: NaiveDate, records: Vec<ActivityRecord>) -> Self {
        Self { today, records }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Level on the cell's date, or 0 when nothing was recorded.
    pub fn level_at(&self, cell: GridCell) -> u8 {
        let date = cell.date(self.today);
        self.records
            .iter()
            .find(|r| r.date == date)
            .map(|r| r.level)
            .unwrap_or(0)
    }

    /// Full grid, `grid()[week][day]`.
    pub fn grid(&self) -> [[u8; DAYS_PER_WEEK]; WEEKS] {
        let mut grid = [[0u8; DAYS_PER_WEEK]; WEEKS];
        for (week, row) in grid.iter_mut().enumerate() {
            for (day, level) in row.iter_mut().enumerate() {
                *level = self.level_at(GridCell { week, day });
            }
        }
        grid
    }

    /// Text rendering, most recent week at the top.
    pub fn render_ascii(&self) -> String {
        const SHADES: [char; 5] = ['·', '░', '▒', '▓', '█'];
        let mut output = String::new();
        for (week, row) in self.grid().iter().enumerate() {
            output.push_str(&format!("w{week} "));
            for level in row {
                output.push(SHADES[usize::from((*level).min(MAX_LEVEL))]);
                output.push(' ');
            }
            output.push('\n');
        }
        output
    }
}
