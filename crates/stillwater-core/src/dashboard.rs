//! Home dashboard state.
//!
//! [`DashboardLoader`] fetches entries and evaluations, then runs the pure
//! aggregators over the fetched copies. [`DashboardCache`] keeps the last
//! result for instant rendering and a needs-refresh flag that mutation events
//! set.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::energy::{EnergyClassifier, EnergyState};
use crate::entry::UserId;
use crate::error::Result;
use crate::events::{Event, EventBus};
use crate::reflection::{self, ReflectionProgressTracker};
use crate::rhythm::{RhythmAggregator, RhythmSeries};
use crate::services::{AnalysisService, EntryStore};
use crate::session::UserSession;
use crate::storage::Config;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub energy: EnergyState,
    pub rhythm: RhythmSeries,
    pub reflection_count: u32,
    pub reflection_ratio: f64,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug)]
struct CacheState {
    snapshot: Option<DashboardSnapshot>,
    needs_refresh: bool,
    generation: u64,
}

/// Last computed dashboard plus a staleness flag.
#[derive(Debug)]
pub struct DashboardCache {
    state: Mutex<CacheState>,
}

impl Default for DashboardCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardCache {
    /// Empty cache; the first read triggers a refresh.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState {
                snapshot: None,
                needs_refresh: true,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn snapshot(&self) -> Option<DashboardSnapshot> {
        self.lock().snapshot.clone()
    }

    pub fn needs_refresh(&self) -> bool {
        self.lock().needs_refresh
    }

    /// Generation counter, bumped on every invalidation.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn mark_stale(&self) {
        let mut state = self.lock();
        state.needs_refresh = true;
        state.generation += 1;
    }

    /// Store a result computed from data fetched at `generation`.
    ///
    /// The snapshot always replaces the old one, but the flag only clears if
    /// nothing invalidated the cache while the refresh was running.
    pub fn store(&self, snapshot: DashboardSnapshot, generation: u64) {
        let mut state = self.lock();
        state.snapshot = Some(snapshot);
        if state.generation == generation {
            state.needs_refresh = false;
        }
    }

    pub fn observe(&self, event: &Event) {
        if event.invalidates_dashboard() {
            tracing::debug!(?event, "dashboard cache invalidated");
            self.mark_stale();
        }
    }

    /// Invalidate on bus events until the bus is dropped.
    pub fn spawn_invalidator(self: &Arc<Self>, bus: &EventBus) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => cache.observe(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "invalidator lagged");
                        cache.mark_stale();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

/// Fetch-then-aggregate pipeline for the dashboard.
pub struct DashboardLoader {
    entries: Arc<dyn EntryStore>,
    analysis: Arc<dyn AnalysisService>,
    session: UserSession,
    cache: Arc<DashboardCache>,
    aggregator: RhythmAggregator,
    classifier: EnergyClassifier,
    daily_target: u32,
    entry_limit: usize,
    user_grace: Duration,
    refreshing: AtomicBool,
}

impl DashboardLoader {
    pub fn new(
        entries: Arc<dyn EntryStore>,
        analysis: Arc<dyn AnalysisService>,
        session: UserSession,
        cache: Arc<DashboardCache>,
        config: &Config,
    ) -> Self {
        Self {
            entries,
            analysis,
            session,
            cache,
            aggregator: RhythmAggregator::new(config.rhythm.lookback_days),
            classifier: EnergyClassifier::new(),
            daily_target: config.reflection.daily_target,
            entry_limit: config.dashboard.recent_entry_limit,
            user_grace: Duration::from_millis(config.dashboard.user_retry_delay_ms),
            refreshing: AtomicBool::new(false),
        }
    }

    pub fn cache(&self) -> &Arc<DashboardCache> {
        &self.cache
    }

    /// Resolve the current user, tolerating the startup race once.
    async fn resolve_user(&self) -> Result<Option<UserId>> {
        if let Some(user) = self.session.current_user() {
            return Ok(Some(user));
        }
        if let Some(user) = self.entries.current_user().await? {
            self.session.set_ready(user.clone());
            return Ok(Some(user));
        }
        if let Some(user) = self.session.wait_ready(self.user_grace).await {
            return Ok(Some(user));
        }
        let user = self.entries.current_user().await?;
        if let Some(user) = &user {
            self.session.set_ready(user.clone());
        }
        Ok(user)
    }

    /// Fetch fresh data, aggregate it, and overwrite the cache.
    ///
    /// `Ok(None)` when no user is available yet; the cache is left untouched.
    pub async fn refresh(&self, today: NaiveDate) -> Result<Option<DashboardSnapshot>> {
        let generation = self.cache.generation();

        let Some(user) = self.resolve_user().await? else {
            tracing::debug!("no user yet; skipping dashboard refresh");
            return Ok(None);
        };

        self.analysis.load_evaluations(&user).await?;
        let evaluations = self.analysis.analyses();
        let entries = self.entries.recent_entries(&user, self.entry_limit).await?;

        let rhythm = self.aggregator.aggregate(today, &evaluations, &entries);
        let energy = self.classifier.classify(&rhythm.values());
        let reflection_count = reflection::count_today(&entries, today);
        let snapshot = DashboardSnapshot {
            energy,
            rhythm,
            reflection_count,
            reflection_ratio: ReflectionProgressTracker::ratio(reflection_count, self.daily_target),
            computed_at: Utc::now(),
        };

        self.cache.store(snapshot.clone(), generation);
        tracing::info!(
            energy = %snapshot.energy,
            reflections = snapshot.reflection_count,
            "dashboard refreshed"
        );
        Ok(Some(snapshot))
    }

    /// Snapshot to render now.
    ///
    /// A fresh cache is returned as is. A stale cache is also returned at once
    /// while a background task refreshes it. Only a cold cache waits for the
    /// refresh, and refresh failures fall back to whatever is cached.
    pub async fn load(self: &Arc<Self>, today: NaiveDate) -> Option<DashboardSnapshot> {
        if let Some(snapshot) = self.cache.snapshot() {
            if self.cache.needs_refresh() {
                self.spawn_refresh(today);
            }
            return Some(snapshot);
        }
        match self.refresh(today).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "dashboard refresh failed; serving cached state");
                self.cache.snapshot()
            }
        }
    }

    /// Refresh in the background unless a background refresh is already running.
    pub fn spawn_refresh(self: &Arc<Self>, today: NaiveDate) -> Option<JoinHandle<()>> {
        if self.refreshing.swap(true, Ordering::AcqRel) {
            return None;
        }
        let loader = Arc::clone(self);
        Some(tokio::spawn(async move {
            if let Err(e) = loader.refresh(today).await {
                tracing::warn!(error = %e, "background dashboard refresh failed");
            }
            loader.refreshing.store(false, Ordering::Release);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(count: u32) -> DashboardSnapshot {
        DashboardSnapshot {
            energy: EnergyState::Elevated,
            rhythm: RhythmSeries::default(),
            reflection_count: count,
            reflection_ratio: 0.0,
            computed_at: Utc::now(),
        }
    }

    #[test]
    fn new_cache_needs_refresh() {
        let cache = DashboardCache::new();
        assert!(cache.needs_refresh());
        assert!(cache.snapshot().is_none());
    }

    #[test]
    fn store_clears_flag_for_current_generation() {
        let cache = DashboardCache::new();
        let generation = cache.generation();
        cache.store(snapshot(1), generation);
        assert!(!cache.needs_refresh());
        assert_eq!(cache.snapshot().unwrap().reflection_count, 1);
    }

    #[test]
    fn invalidation_during_refresh_keeps_flag() {
        let cache = DashboardCache::new();
        let generation = cache.generation();
        cache.observe(&Event::EntrySubmitted {
            entry_id: "e".into(),
            user_id: UserId::new("u"),
            at: Utc::now(),
        });
        cache.store(snapshot(2), generation);
        assert!(cache.needs_refresh());
        assert_eq!(cache.snapshot().unwrap().reflection_count, 2);
    }

    #[test]
    fn unlock_events_do_not_invalidate() {
        let cache = DashboardCache::new();
        cache.store(snapshot(0), cache.generation());
        cache.observe(&Event::AchievementsUnlocked { ids: vec!["x".into()], at: Utc::now() });
        assert!(!cache.needs_refresh());
    }

    #[tokio::test]
    async fn invalidator_marks_cache_stale_from_bus() {
        let bus = EventBus::new();
        let cache = Arc::new(DashboardCache::new());
        cache.store(snapshot(0), cache.generation());
        let handle = cache.spawn_invalidator(&bus);

        bus.publish(Event::UserChanged { user_id: None, at: Utc::now() });
        for _ in 0..50 {
            if cache.needs_refresh() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(cache.needs_refresh());

        drop(bus);
        handle.await.unwrap();
    }
}
