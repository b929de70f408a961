//! SQLite-based journal storage.
//!
//! Provides persistent storage for:
//! - Local users
//! - Journal entries and AI evaluations
//! - Unlocked achievement ids
//! - Key-value store for flat counters
//!
//! The database also holds the in-memory analysis and stats snapshots that
//! the collaborator traits in [`crate::services`] expose.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, RwLock};

use super::data_dir;
use crate::achievements::{self, AchievementProgressEvaluator, GameStats, UsageCounters};
use crate::entry::{EvaluationRecord, JournalEntry, UserId};
use crate::error::{DatabaseError, Result};
use crate::heatmap::{self, ActivityRecord};
use crate::services::{AnalysisService, CounterStore, EntryStore, StatsService};
use crate::stats;

pub const VOICE_USAGE_KEY: &str = "voice_usage_count";
pub const MOOD_TRACKING_KEY: &str = "mood_tracking_count";

/// Upper bound on entries read when recomputing stats.
const STATS_SCAN_LIMIT: usize = 10_000;

fn parse_timestamp(table: &str, raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptRow {
            table: table.to_string(),
            message: format!("bad timestamp '{raw}': {e}"),
        })
}

/// SQLite database for journal storage.
pub struct Database {
    conn: Mutex<Connection>,
    analyses: RwLock<Vec<EvaluationRecord>>,
    stats: RwLock<HashMap<UserId, GameStats>>,
}

impl Database {
    /// Open the database at `~/.config/stillwater/stillwater.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("stillwater.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
            analyses: RwLock::new(Vec::new()),
            stats: RwLock::new(HashMap::new()),
        };
        db.migrate()?;
        if let Some(user) = db.current_user_id()? {
            db.refresh_stats(&user, Local::now().date_naive())?;
        }
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave SQLite half-written.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        let conn = self.conn();
        // Unlocks were once shared by all users; they are re-derived from
        // entries on the next recalculation.
        let legacy_unlocks: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'unlocked_achievements'
             AND NOT EXISTS (SELECT 1 FROM pragma_table_info('unlocked_achievements') WHERE name = 'user_id')",
            [],
            |row| row.get(0),
        )?;
        if legacy_unlocks {
            tracing::info!("dropping unscoped achievement unlocks");
            conn.execute_batch("DROP TABLE unlocked_achievements;")?;
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id          TEXT PRIMARY KEY,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entries (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                mood        INTEGER,
                text        TEXT NOT NULL DEFAULT '',
                via_voice   INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS evaluations (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                maturity_score  REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS unlocked_achievements (
                user_id      TEXT NOT NULL,
                id           TEXT NOT NULL,
                unlocked_at  TEXT NOT NULL,
                PRIMARY KEY (user_id, id)
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_user_created ON entries(user_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_evaluations_user_created ON evaluations(user_id, created_at);",
        )?;
        Ok(())
    }

    // ── users ───────────────────────────────────────────────────────────

    /// Register a new local user; it becomes the current user.
    pub fn register_user(&self) -> Result<UserId> {
        let id = UserId::new(uuid::Uuid::new_v4().to_string());
        self.conn().execute(
            "INSERT INTO users (id, created_at) VALUES (?1, ?2)",
            params![id.as_str(), Utc::now().to_rfc3339()],
        )?;
        Ok(id)
    }

    /// Most recently registered user.
    pub fn current_user_id(&self) -> Result<Option<UserId>> {
        let id = self
            .conn()
            .query_row(
                "SELECT id FROM users ORDER BY created_at DESC, rowid DESC LIMIT 1",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(id.map(UserId))
    }

    // ── entries ─────────────────────────────────────────────────────────

    /// Store an entry and bump the usage counters it contributes to.
    pub fn insert_entry(&self, entry: &JournalEntry) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO entries (id, user_id, created_at, mood, text, via_voice)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.id,
                entry.user_id.as_str(),
                entry.created_at.to_rfc3339(),
                entry.mood,
                entry.text,
                entry.via_voice,
            ],
        )?;
        if entry.mood.is_some() {
            Self::kv_increment(&conn, MOOD_TRACKING_KEY)?;
        }
        if entry.via_voice {
            Self::kv_increment(&conn, VOICE_USAGE_KEY)?;
        }
        Ok(())
    }

    /// Entries for `user`, newest first.
    pub fn entries_for(&self, user: &UserId, limit: usize) -> Result<Vec<JournalEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, created_at, mood, text, via_voice
             FROM entries
             WHERE user_id = ?1
             ORDER BY created_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user.as_str(), limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<u8>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, bool>(5)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, user_id, created_at, mood, text, via_voice) = row?;
            entries.push(JournalEntry {
                id,
                user_id: UserId(user_id),
                created_at: parse_timestamp("entries", &created_at)?,
                mood,
                text,
                via_voice,
            });
        }
        Ok(entries)
    }

    /// Per-day activity levels for `user`.
    pub fn activity_history(&self, user: &UserId) -> Result<Vec<ActivityRecord>> {
        let entries = self.entries_for(user, STATS_SCAN_LIMIT)?;
        Ok(heatmap::activity_from_entries(&entries))
    }

    // ── evaluations ─────────────────────────────────────────────────────

    pub fn insert_evaluation(&self, user: &UserId, evaluation: &EvaluationRecord) -> Result<()> {
        self.conn().execute(
            "INSERT INTO evaluations (id, user_id, created_at, maturity_score)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                evaluation.id,
                user.as_str(),
                evaluation.created_at.to_rfc3339(),
                evaluation.maturity_score,
            ],
        )?;
        Ok(())
    }

    pub fn evaluations_for(&self, user: &UserId) -> Result<Vec<EvaluationRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, created_at, maturity_score
             FROM evaluations
             WHERE user_id = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;

        let mut evaluations = Vec::new();
        for row in rows {
            let (id, created_at, maturity_score) = row?;
            evaluations.push(EvaluationRecord {
                id,
                created_at: parse_timestamp("evaluations", &created_at)?,
                maturity_score,
            });
        }
        Ok(evaluations)
    }

    // ── achievements ────────────────────────────────────────────────────

    pub fn unlocked_ids(&self, user: &UserId) -> Result<BTreeSet<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id FROM unlocked_achievements WHERE user_id = ?1")?;
        let ids = stmt
            .query_map(params![user.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(ids)
    }

    /// Mark an achievement unlocked for `user`. Unlocking twice is a no-op.
    pub fn unlock(&self, user: &UserId, id: &str) -> Result<bool> {
        let changed = self.conn().execute(
            "INSERT OR IGNORE INTO unlocked_achievements (user_id, id, unlocked_at)
             VALUES (?1, ?2, ?3)",
            params![user.as_str(), id, Utc::now().to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    /// Recompute `user`'s stats snapshot as of `today`, unlocking newly
    /// earned achievements. Returns the ids unlocked.
    pub fn recalculate_stats(&self, user: &UserId, today: NaiveDate) -> Result<Vec<String>> {
        let stats = self.refresh_stats(user, today)?;
        let counters = self.usage_counters()?;
        let catalog = achievements::catalog();
        let earned: Vec<String> = AchievementProgressEvaluator::new(&stats, counters)
            .newly_earned(&catalog)
            .into_iter()
            .map(|a| a.id.clone())
            .collect();

        if earned.is_empty() {
            return Ok(earned);
        }

        for id in &earned {
            self.unlock(user, id)?;
            tracing::info!(user = %user, achievement = %id, "achievement unlocked");
        }
        self.refresh_stats(user, today)?;
        Ok(earned)
    }

    /// Rebuild `user`'s cached stats snapshot from stored entries without unlocking.
    pub fn refresh_stats(&self, user: &UserId, today: NaiveDate) -> Result<GameStats> {
        let unlocked = self.unlocked_ids(user)?;
        let entries = self.entries_for(user, STATS_SCAN_LIMIT)?;
        let snapshot = stats::compute_game_stats(&entries, unlocked, today);
        self.stats
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(user.clone(), snapshot.clone());
        Ok(snapshot)
    }

    // ── key-value ───────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn kv_counter(&self, key: &str) -> Result<u32> {
        Ok(self
            .kv_get(key)?
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0))
    }

    fn kv_increment(conn: &Connection, key: &str) -> Result<(), rusqlite::Error> {
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, '1')
             ON CONFLICT(key) DO UPDATE SET value = CAST(CAST(value AS INTEGER) + 1 AS TEXT)",
            params![key],
        )?;
        Ok(())
    }
}

#[async_trait]
impl EntryStore for Database {
    async fn recent_entries(&self, user: &UserId, limit: usize) -> Result<Vec<JournalEntry>> {
        self.entries_for(user, limit)
    }

    async fn current_user(&self) -> Result<Option<UserId>> {
        self.current_user_id()
    }
}

#[async_trait]
impl AnalysisService for Database {
    async fn load_evaluations(&self, user: &UserId) -> Result<()> {
        let evaluations = self.evaluations_for(user)?;
        *self.analyses.write().unwrap_or_else(|p| p.into_inner()) = evaluations;
        Ok(())
    }

    fn analyses(&self) -> Vec<EvaluationRecord> {
        self.analyses.read().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl StatsService for Database {
    fn game_stats(&self, user: &UserId) -> GameStats {
        self.stats
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(user)
            .cloned()
            .unwrap_or_default()
    }

    async fn recalculate_stats_from_entries(&self, user: &UserId) -> Result<Vec<String>> {
        self.recalculate_stats(user, Local::now().date_naive())
    }
}

impl CounterStore for Database {
    fn usage_counters(&self) -> Result<UsageCounters> {
        Ok(UsageCounters {
            voice_usage: self.kv_counter(VOICE_USAGE_KEY)?,
            mood_tracking: self.kv_counter(MOOD_TRACKING_KEY)?,
        })
    }
}
