//! Progress persistence boundary and the tracker service built on it.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::scheduler::Sm2;
use crate::types::{
    Bucket, ItemId, LearningItem, ProgressRecord, ProgressSummary, SessionSettings, SessionStats,
    SessionSummary,
};

/// Sessions kept in the statistics history.
const HISTORY_LIMIT: usize = 10;

/// Durable key-value surface the core reads and writes through.
///
/// Implementations own retries and failure recovery; the core propagates
/// any [`crate::error::StoreError`] upward untouched and never retries.
pub trait ProgressStore {
    fn load_progress(&self) -> Result<HashMap<ItemId, ProgressRecord>>;
    fn save_progress(&self, progress: &HashMap<ItemId, ProgressRecord>) -> Result<()>;

    fn load_stats(&self) -> Result<SessionStats>;
    fn save_stats(&self, stats: &SessionStats) -> Result<()>;

    fn load_settings(&self) -> Result<SessionSettings>;
    fn save_settings(&self, settings: &SessionSettings) -> Result<()>;
}

/// In-memory store for embedding and tests. Infallible.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    progress: HashMap<ItemId, ProgressRecord>,
    stats: SessionStats,
    settings: SessionSettings,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn load_progress(&self) -> Result<HashMap<ItemId, ProgressRecord>> {
        Ok(self.inner.lock().expect("store lock").progress.clone())
    }

    fn save_progress(&self, progress: &HashMap<ItemId, ProgressRecord>) -> Result<()> {
        self.inner.lock().expect("store lock").progress = progress.clone();
        Ok(())
    }

    fn load_stats(&self) -> Result<SessionStats> {
        Ok(self.inner.lock().expect("store lock").stats.clone())
    }

    fn save_stats(&self, stats: &SessionStats) -> Result<()> {
        self.inner.lock().expect("store lock").stats = stats.clone();
        Ok(())
    }

    fn load_settings(&self) -> Result<SessionSettings> {
        Ok(self.inner.lock().expect("store lock").settings.clone())
    }

    fn save_settings(&self, settings: &SessionSettings) -> Result<()> {
        self.inner.lock().expect("store lock").settings = settings.clone();
        Ok(())
    }
}

/// Service that wires the scheduler to a progress store.
///
/// One logical learner drives one session at a time; the store is treated
/// as synchronously consistent, so every read sees the preceding write.
pub struct ProgressTracker<S: ProgressStore> {
    store: S,
    scheduler: Sm2,
}

impl<S: ProgressStore> ProgressTracker<S> {
    pub fn new(store: S) -> Self {
        Self::with_scheduler(store, Sm2::default())
    }

    pub fn with_scheduler(store: S, scheduler: Sm2) -> Self {
        Self { store, scheduler }
    }

    /// Record one answer outcome, creating the item's record lazily on
    /// first exposure. Returns the updated record.
    pub fn record_answer(
        &self,
        item_id: &str,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord> {
        let mut progress = self.store.load_progress()?;
        let current = progress
            .get(item_id)
            .cloned()
            .unwrap_or_else(|| self.scheduler.initial_record());

        let updated = self.scheduler.record_outcome(&current, correct, now);
        debug!(
            item_id,
            correct,
            interval = updated.interval_days,
            bucket = ?updated.bucket,
            "recorded outcome"
        );

        progress.insert(item_id.to_string(), updated.clone());
        self.store.save_progress(&progress)?;
        Ok(updated)
    }

    /// Snapshot of the full progress map.
    pub fn progress(&self) -> Result<HashMap<ItemId, ProgressRecord>> {
        self.store.load_progress()
    }

    /// Record for one item; `None` means never seen, which is meaningful
    /// data, not a fault.
    pub fn record_for(&self, item_id: &str) -> Result<Option<ProgressRecord>> {
        Ok(self.store.load_progress()?.get(item_id).cloned())
    }

    /// Fold a finished session into the cumulative statistics.
    pub fn finish_session(&self, summary: SessionSummary) -> Result<SessionStats> {
        let mut stats = self.store.load_stats()?;
        stats.total_sessions += 1;
        stats.total_correct += summary.correct_count;
        stats.total_incorrect += summary.incorrect_count;
        if summary.best_streak > stats.best_streak {
            stats.best_streak = summary.best_streak;
        }
        stats.session_history.insert(0, summary);
        stats.session_history.truncate(HISTORY_LIMIT);

        self.store.save_stats(&stats)?;
        Ok(stats)
    }

    pub fn stats(&self) -> Result<SessionStats> {
        self.store.load_stats()
    }

    pub fn settings(&self) -> Result<SessionSettings> {
        self.store.load_settings()
    }

    pub fn save_settings(&self, settings: &SessionSettings) -> Result<()> {
        self.store.save_settings(settings)
    }

    /// Wipe progress and statistics in bulk. Settings survive a reset;
    /// per-item deletion does not exist.
    pub fn reset(&self) -> Result<()> {
        debug!("resetting progress and statistics");
        self.store.save_progress(&HashMap::new())?;
        self.store.save_stats(&SessionStats::default())
    }

    /// Per-bucket counts and lifetime accuracy across the catalog.
    pub fn progress_summary(&self, items: &[LearningItem]) -> Result<ProgressSummary> {
        let progress = self.store.load_progress()?;

        let mut summary = ProgressSummary {
            total_items: items.len(),
            ..ProgressSummary::default()
        };
        for item in items {
            let bucket = progress
                .get(&item.id)
                .map(|record| record.bucket)
                .unwrap_or(Bucket::New);
            match bucket {
                Bucket::New => summary.new_count += 1,
                Bucket::Learning => summary.learning_count += 1,
                Bucket::Review => summary.review_count += 1,
                Bucket::Mastered => summary.mastered_count += 1,
            }
        }

        let (correct, shown) = progress.values().fold((0u32, 0u32), |(c, s), record| {
            (c + record.correct_count, s + record.times_shown)
        });
        summary.accuracy = if shown == 0 {
            0.0
        } else {
            f64::from(correct) / f64::from(shown)
        };

        Ok(summary)
    }
}
