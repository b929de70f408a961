//! Journal entries, evaluations and user identity.
//!
//! These are the snapshots the storage and analysis collaborators hand to the
//! aggregation code. Every "which day is this" question is answered in the
//! local calendar.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    /// Self-reported mood, 1-10.
    pub mood: Option<u8>,
    pub text: String,
    /// Entry was dictated rather than typed.
    #[serde(default)]
    pub via_voice: bool,
}

impl JournalEntry {
    /// Create an entry stamped now with a fresh id.
    pub fn new(user_id: UserId, text: impl Into<String>, mood: Option<u8>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            created_at: Utc::now(),
            mood,
            text: text.into(),
            via_voice: false,
        }
    }

    /// Calendar day the entry was written on, local time.
    pub fn local_date(&self) -> NaiveDate {
        self.created_at.with_timezone(&Local).date_naive()
    }
}

/// Result of an AI journal analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Wellness score on a 0-10 scale.
    pub maturity_score: f64,
}

impl EvaluationRecord {
    pub fn new(created_at: DateTime<Utc>, maturity_score: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at,
            maturity_score,
        }
    }

    pub fn local_date(&self) -> NaiveDate {
        self.created_at.with_timezone(&Local).date_naive()
    }
}

/// Noon local time on `date`, as UTC.
///
/// Used when a record is known only by its calendar day; noon keeps the
/// local date stable across any UTC offset.
pub fn local_noon(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_hms_opt(12, 0, 0).unwrap_or_default();
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
