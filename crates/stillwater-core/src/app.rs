//! Explicitly wired application services.
//!
//! [`Stillwater`] owns one database, event bus, user session and dashboard
//! cache, and exposes the mutations that must publish events.

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::{Arc, Mutex};

use crate::achievements::{
    self, AchievementProgressEvaluator, AchievementStatus, CategoryCounts, GameStats,
};
use crate::dashboard::{DashboardCache, DashboardLoader, DashboardSnapshot};
use crate::entry::{EvaluationRecord, JournalEntry, UserId};
use crate::error::{CoreError, Result};
use crate::events::{Event, EventBus};
use crate::heatmap::ActivityHeatmap;
use crate::reflection::{ProgressUpdate, ReflectionProgressTracker};
use crate::services::{CounterStore, StatsService};
use crate::session::UserSession;
use crate::storage::{Config, Database};

pub struct Stillwater {
    db: Arc<Database>,
    bus: EventBus,
    session: UserSession,
    loader: Arc<DashboardLoader>,
    tracker: Mutex<ReflectionProgressTracker>,
}

impl Stillwater {
    pub fn new(db: Database, config: &Config) -> Self {
        let db = Arc::new(db);
        let bus = EventBus::new();
        let session = UserSession::new();
        let cache = Arc::new(DashboardCache::new());
        let loader = Arc::new(DashboardLoader::new(
            db.clone(),
            db.clone(),
            session.clone(),
            cache,
            config,
        ));
        Self {
            db,
            bus,
            session,
            loader,
            tracker: Mutex::new(ReflectionProgressTracker::new(config.reflection.daily_target)),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub fn dashboard_cache(&self) -> &Arc<DashboardCache> {
        self.loader.cache()
    }

    /// Make `user` the signed-in user.
    pub fn sign_in(&self, user: UserId) {
        self.session.set_ready(user.clone());
        self.bus.publish(Event::UserChanged {
            user_id: Some(user),
            at: Utc::now(),
        });
    }

    fn require_user(&self) -> Result<UserId> {
        if let Some(user) = self.session.current_user() {
            return Ok(user);
        }
        let user = self
            .db
            .current_user_id()?
            .ok_or_else(|| CoreError::Custom("no user registered; run `stillwater-cli user init`".into()))?;
        self.session.set_ready(user.clone());
        Ok(user)
    }

    /// Store an entry, publish it, and recompute stats.
    pub async fn submit_entry(
        &self,
        text: &str,
        mood: Option<u8>,
        via_voice: bool,
    ) -> Result<JournalEntry> {
        if let Some(m) = mood {
            if !(1..=10).contains(&m) {
                return Err(crate::error::ValidationError::InvalidValue {
                    field: "mood".into(),
                    message: format!("{m} is outside 1-10"),
                }
                .into());
            }
        }
        let user = self.require_user()?;
        let mut entry = JournalEntry::new(user.clone(), text, mood);
        entry.via_voice = via_voice;
        self.db.insert_entry(&entry)?;

        self.bus.publish(Event::EntrySubmitted {
            entry_id: entry.id.clone(),
            user_id: user,
            at: entry.created_at,
        });
        self.recalculate_stats().await?;
        Ok(entry)
    }

    /// Record an analysis result for the current user.
    pub fn record_evaluation(&self, maturity_score: f64, at: DateTime<Utc>) -> Result<EvaluationRecord> {
        if !(0.0..=10.0).contains(&maturity_score) {
            return Err(crate::error::ValidationError::InvalidValue {
                field: "maturity_score".into(),
                message: format!("{maturity_score} is outside 0-10"),
            }
            .into());
        }
        let user = self.require_user()?;
        let evaluation = EvaluationRecord::new(at, maturity_score);
        self.db.insert_evaluation(&user, &evaluation)?;
        self.bus.publish(Event::EvaluationCompleted {
            evaluation_id: evaluation.id.clone(),
            maturity_score,
            at,
        });
        Ok(evaluation)
    }

    /// Recompute stats and publish any unlocks.
    pub async fn recalculate_stats(&self) -> Result<Vec<String>> {
        let user = self.require_user()?;
        let unlocked = self.db.recalculate_stats_from_entries(&user).await?;
        if !unlocked.is_empty() {
            self.bus.publish(Event::AchievementsUnlocked {
                ids: unlocked.clone(),
                at: Utc::now(),
            });
        }
        Ok(unlocked)
    }

    /// Current user's stats rebuilt from storage as of today.
    pub fn current_stats(&self) -> Result<GameStats> {
        let user = self.require_user()?;
        self.db.refresh_stats(&user, Local::now().date_naive())
    }

    /// Progress for each catalog achievement, in catalog order.
    pub fn achievement_progress(&self) -> Result<Vec<AchievementStatus>> {
        let stats = self.current_stats()?;
        let counters = self.db.usage_counters()?;
        Ok(AchievementProgressEvaluator::new(&stats, counters).report(&achievements::catalog()))
    }

    pub fn achievement_counts(&self) -> Result<CategoryCounts> {
        let stats = self.current_stats()?;
        let counters = self.db.usage_counters()?;
        Ok(AchievementProgressEvaluator::new(&stats, counters).category_counts(&achievements::catalog()))
    }

    /// Dashboard for today, cache first.
    pub async fn dashboard(&self) -> Option<DashboardSnapshot> {
        self.dashboard_for(Local::now().date_naive()).await
    }

    /// Render-now dashboard: stale snapshots come back immediately and are
    /// refreshed in the background.
    pub async fn dashboard_for(&self, today: NaiveDate) -> Option<DashboardSnapshot> {
        self.loader.load(today).await
    }

    /// Recompute the dashboard now and overwrite the cache.
    pub async fn refresh_dashboard(&self, today: NaiveDate) -> Result<Option<DashboardSnapshot>> {
        self.loader.refresh(today).await
    }

    /// Feed a reflection count through the progress-bar debounce.
    pub fn reflection_update(&self, count: u32) -> ProgressUpdate {
        self.tracker
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .update(count)
    }

    pub fn heatmap(&self, today: NaiveDate) -> Result<ActivityHeatmap> {
        let user = self.require_user()?;
        Ok(ActivityHeatmap::new(today, self.db.activity_history(&user)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> Stillwater {
        let db = Database::open_memory().unwrap();
        let user = db.register_user().unwrap();
        let app = Stillwater::new(db, &Config::default());
        app.sign_in(user);
        app
    }

    #[tokio::test]
    async fn submit_entry_publishes_and_unlocks() {
        let app = app();
        let mut rx = app.events().subscribe();

        app.submit_entry("first words", Some(6), false).await.unwrap();

        assert!(matches!(rx.recv().await.unwrap(), Event::EntrySubmitted { .. }));
        match rx.recv().await.unwrap() {
            Event::AchievementsUnlocked { ids, .. } => {
                assert_eq!(ids, vec![achievements::catalog::FIRST_ENTRY.to_string()])
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(app.current_stats().unwrap().total_entries, 1);

        let report = app.achievement_progress().unwrap();
        let first = report
            .iter()
            .find(|s| s.achievement.id == achievements::catalog::FIRST_ENTRY)
            .unwrap();
        assert_eq!(first.progress, 1.0);
        assert_eq!(first.category, achievements::AchievementCategory::Unlocked);
        assert_eq!(app.achievement_counts().unwrap().unlocked, 1);
    }

    #[tokio::test]
    async fn invalid_mood_is_rejected() {
        let app = app();
        assert!(app.submit_entry("x", Some(11), false).await.is_err());
        assert!(app.submit_entry("x", Some(0), false).await.is_err());
    }

    #[tokio::test]
    async fn dashboard_reflects_new_entries_after_invalidation() {
        let app = app();
        let handle = app.dashboard_cache().spawn_invalidator(app.events());
        let today = Local::now().date_naive();

        let first = app.dashboard_for(today).await.unwrap();
        assert_eq!(first.reflection_count, 0);

        app.submit_entry("one", Some(9), false).await.unwrap();
        app.dashboard_cache().mark_stale();

        // The stale snapshot renders at once; the refresh lands afterwards.
        let stale = app.dashboard_for(today).await.unwrap();
        assert_eq!(stale.reflection_count, 0);
        for _ in 0..100 {
            if !app.dashboard_cache().needs_refresh() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        let second = app.dashboard_cache().snapshot().unwrap();
        assert_eq!(second.reflection_count, 1);
        assert_eq!(second.energy, crate::energy::EnergyState::Calm);

        let fresh = app.refresh_dashboard(today).await.unwrap().unwrap();
        assert_eq!(fresh.reflection_count, 1);
        handle.abort();
    }

    #[test]
    fn evaluation_score_is_validated() {
        let app = app();
        assert!(app.record_evaluation(10.5, Utc::now()).is_err());
        assert!(app.record_evaluation(7.0, Utc::now()).is_ok());
    }
}
