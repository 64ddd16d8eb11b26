//! Session question selection.
//!
//! Three batch builders, all pure given a snapshot of the catalog and the
//! progress map: the standard session mixes due reviews with new items,
//! practice surfaces the hardest attempted items, and improve surfaces the
//! most-missed ones. All randomness flows through the caller's `Rng` so
//! shuffle-dependent behavior is deterministic under test.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::types::{
    Bucket, ItemId, LearningItem, PresentationMode, ProgressRecord, RegionFilter, SessionQuestion,
};

/// Share of a standard session drawn from already-seen items.
const REVIEW_SHARE: f64 = 0.7;

/// Urgency multiplier for items still early in their correct streak.
const EARLY_STREAK_BOOST: f64 = 1.5;
const EARLY_STREAK_LIMIT: u32 = 3;

/// Build a standard session: due reviews ordered by urgency blended with
/// randomly drawn new items, roughly 70/30.
///
/// When one pool cannot fill its share the other tops up, extending the
/// new pool first and the review pool only once new items run out. The
/// combined batch is shuffled so presentation order carries no signal
/// about selection priority.
pub fn select_session_batch(
    items: &[LearningItem],
    progress: &HashMap<ItemId, ProgressRecord>,
    count: usize,
    mode: PresentationMode,
    region: &RegionFilter,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Vec<SessionQuestion> {
    let mut review_pool: Vec<(&LearningItem, &ProgressRecord, f64)> = Vec::new();
    let mut new_pool: Vec<&LearningItem> = Vec::new();

    for item in items.iter().filter(|i| region.accepts(&i.region)) {
        match progress.get(&item.id) {
            Some(record) if record.times_shown > 0 => {
                review_pool.push((item, record, urgency(record, now)));
            }
            _ => new_pool.push(item),
        }
    }

    review_pool.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
    new_pool.shuffle(rng);

    let review_target = ((count as f64) * REVIEW_SHARE).ceil() as usize;
    let review_planned = review_target.min(review_pool.len()).min(count);
    let new_take = count
        .saturating_sub(review_planned)
        .min(new_pool.len());
    // Top up from the review pool only for what new items could not cover
    let review_take = (count - new_take).min(review_pool.len());

    let mut batch: Vec<SessionQuestion> = review_pool[..review_take]
        .iter()
        .map(|(item, record, _)| SessionQuestion {
            item: (*item).clone(),
            mode,
            bucket: record.bucket,
        })
        .collect();
    batch.extend(new_pool[..new_take].iter().map(|item| SessionQuestion {
        item: (*item).clone(),
        mode,
        bucket: Bucket::New,
    }));
    batch.shuffle(rng);

    debug!(
        requested = count,
        review = review_take,
        new = new_take,
        "built session batch"
    );
    batch
}

/// Build a practice batch from the hardest attempted items.
///
/// Difficulty is `ease × accuracy`, ascending: low ease and low accuracy
/// both push an item toward the front. Items never shown are excluded, so
/// an empty result means the mode is unavailable, not an error.
pub fn select_practice_batch(
    items: &[LearningItem],
    progress: &HashMap<ItemId, ProgressRecord>,
    count: usize,
    mode: PresentationMode,
    rng: &mut impl Rng,
) -> Vec<SessionQuestion> {
    let mut attempted: Vec<(&LearningItem, &ProgressRecord, f64)> = items
        .iter()
        .filter_map(|item| progress.get(&item.id).map(|record| (item, record)))
        .filter(|(_, record)| record.times_shown > 0)
        .map(|(item, record)| {
            let accuracy = f64::from(record.correct_count) / f64::from(record.times_shown);
            (item, record, record.ease_factor * accuracy)
        })
        .collect();

    attempted.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal));
    attempted.truncate(count);

    finish_batch(attempted, mode, rng)
}

/// Build an improvement batch from the most-missed items.
///
/// Ordered by raw miss count, then by miss rate. Same empty-result
/// contract as practice.
pub fn select_improve_batch(
    items: &[LearningItem],
    progress: &HashMap<ItemId, ProgressRecord>,
    count: usize,
    mode: PresentationMode,
    rng: &mut impl Rng,
) -> Vec<SessionQuestion> {
    let mut missed: Vec<(&LearningItem, &ProgressRecord, f64)> = items
        .iter()
        .filter_map(|item| progress.get(&item.id).map(|record| (item, record)))
        .filter(|(_, record)| record.incorrect_count > 0)
        .map(|(item, record)| {
            let miss_rate = f64::from(record.incorrect_count) / f64::from(record.times_shown);
            (item, record, miss_rate)
        })
        .collect();

    missed.sort_by(|a, b| {
        b.1.incorrect_count
            .cmp(&a.1.incorrect_count)
            .then(b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal))
    });
    missed.truncate(count);

    finish_batch(missed, mode, rng)
}

/// Distinct region tags in the catalog, sorted.
pub fn available_regions(items: &[LearningItem]) -> Vec<String> {
    let mut regions: Vec<String> = items.iter().map(|i| i.region.clone()).collect();
    regions.sort();
    regions.dedup();
    regions
}

fn finish_batch(
    selected: Vec<(&LearningItem, &ProgressRecord, f64)>,
    mode: PresentationMode,
    rng: &mut impl Rng,
) -> Vec<SessionQuestion> {
    let mut batch: Vec<SessionQuestion> = selected
        .into_iter()
        .map(|(item, record, _)| SessionQuestion {
            item: item.clone(),
            mode,
            bucket: record.bucket,
        })
        .collect();
    batch.shuffle(rng);
    batch
}

/// Review priority: overdue-ness weighted by item difficulty, boosted for
/// short streaks.
fn urgency(record: &ProgressRecord, now: DateTime<Utc>) -> f64 {
    let days_overdue = record
        .next_review
        .map(|due| (now - due).num_days().max(0) as f64)
        .unwrap_or(0.0);

    let mut score = days_overdue * (3.0 - record.ease_factor);
    if record.repetitions < EARLY_STREAK_LIMIT {
        score *= EARLY_STREAK_BOOST;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::bucket_for;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn item(id: &str, region: &str) -> LearningItem {
        LearningItem {
            id: id.into(),
            primary_term: id.to_uppercase(),
            primary_alternatives: vec![],
            secondary_term: format!("{id} city"),
            secondary_alternatives: vec![],
            region: region.into(),
            has_multiple_valid_primaries: false,
        }
    }

    fn record(
        times_shown: u32,
        correct: u32,
        ease: f64,
        interval: i64,
        repetitions: u32,
        overdue_days: i64,
        now: DateTime<Utc>,
    ) -> ProgressRecord {
        ProgressRecord {
            times_shown,
            correct_count: correct,
            incorrect_count: times_shown - correct,
            ease_factor: ease,
            interval_days: interval,
            repetitions,
            last_shown: Some(now - Duration::days(overdue_days + interval)),
            next_review: Some(now - Duration::days(overdue_days)),
            bucket: bucket_for(times_shown, interval),
        }
    }

    fn ids(batch: &[SessionQuestion]) -> Vec<&str> {
        batch.iter().map(|q| q.item.id.as_str()).collect()
    }

    #[test]
    fn session_batch_never_exceeds_count_or_repeats_items() {
        let now = Utc::now();
        let items: Vec<LearningItem> = (0..30).map(|i| item(&format!("i{i}"), "Europe")).collect();
        let mut progress = HashMap::new();
        for i in 0..15 {
            progress.insert(format!("i{i}"), record(3, 2, 2.5, 6, 2, 1, now));
        }

        let batch = select_session_batch(
            &items,
            &progress,
            10,
            PresentationMode::Forward,
            &RegionFilter::World,
            now,
            &mut rng(),
        );

        assert_eq!(batch.len(), 10);
        let unique: HashSet<&str> = ids(&batch).into_iter().collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn session_batch_mixes_seventy_thirty() {
        let now = Utc::now();
        let items: Vec<LearningItem> = (0..40).map(|i| item(&format!("i{i}"), "Asia")).collect();
        let mut progress = HashMap::new();
        for i in 0..20 {
            progress.insert(format!("i{i}"), record(4, 3, 2.3, 6, 2, 2, now));
        }

        let batch = select_session_batch(
            &items,
            &progress,
            10,
            PresentationMode::Forward,
            &RegionFilter::World,
            now,
            &mut rng(),
        );

        let review = batch.iter().filter(|q| q.bucket != Bucket::New).count();
        let new = batch.iter().filter(|q| q.bucket == Bucket::New).count();
        assert_eq!(review, 7);
        assert_eq!(new, 3);
    }

    #[test]
    fn short_review_pool_tops_up_from_new() {
        let now = Utc::now();
        let items: Vec<LearningItem> = (0..20).map(|i| item(&format!("i{i}"), "Africa")).collect();
        let mut progress = HashMap::new();
        progress.insert("i0".to_string(), record(2, 1, 2.5, 3, 1, 1, now));

        let batch = select_session_batch(
            &items,
            &progress,
            10,
            PresentationMode::Forward,
            &RegionFilter::World,
            now,
            &mut rng(),
        );

        assert_eq!(batch.len(), 10);
        assert_eq!(batch.iter().filter(|q| q.bucket != Bucket::New).count(), 1);
        assert_eq!(batch.iter().filter(|q| q.bucket == Bucket::New).count(), 9);
    }

    #[test]
    fn exhausted_new_pool_tops_up_from_review() {
        let now = Utc::now();
        let items: Vec<LearningItem> = (0..12).map(|i| item(&format!("i{i}"), "Africa")).collect();
        let mut progress = HashMap::new();
        for i in 0..11 {
            progress.insert(format!("i{i}"), record(3, 2, 2.4, 6, 2, 1, now));
        }

        let batch = select_session_batch(
            &items,
            &progress,
            10,
            PresentationMode::Forward,
            &RegionFilter::World,
            now,
            &mut rng(),
        );

        // one new item exists; the other nine slots extend the review pool
        assert_eq!(batch.len(), 10);
        assert_eq!(batch.iter().filter(|q| q.bucket == Bucket::New).count(), 1);
        assert_eq!(batch.iter().filter(|q| q.bucket != Bucket::New).count(), 9);
    }

    #[test]
    fn most_urgent_reviews_win_limited_slots() {
        let now = Utc::now();
        let items = vec![item("calm", "Europe"), item("urgent", "Europe")];
        let mut progress = HashMap::new();
        // not overdue at all
        progress.insert("calm".to_string(), record(5, 5, 2.8, 10, 5, 0, now));
        // ten days overdue, low ease, short streak
        progress.insert("urgent".to_string(), record(5, 2, 1.6, 3, 1, 10, now));

        let batch = select_session_batch(
            &items,
            &progress,
            1,
            PresentationMode::Forward,
            &RegionFilter::World,
            now,
            &mut rng(),
        );

        assert_eq!(ids(&batch), vec!["urgent"]);
    }

    #[test]
    fn region_filter_restricts_the_pool() {
        let now = Utc::now();
        let items = vec![
            item("fr", "Europe"),
            item("de", "Europe"),
            item("jp", "Asia"),
        ];

        let batch = select_session_batch(
            &items,
            &HashMap::new(),
            10,
            PresentationMode::Forward,
            &RegionFilter::Region("Europe".into()),
            now,
            &mut rng(),
        );

        let chosen: HashSet<&str> = ids(&batch).into_iter().collect();
        assert_eq!(chosen, HashSet::from(["fr", "de"]));
    }

    #[test]
    fn batch_mode_is_uniform() {
        let now = Utc::now();
        let items: Vec<LearningItem> = (0..5).map(|i| item(&format!("i{i}"), "Asia")).collect();

        let batch = select_session_batch(
            &items,
            &HashMap::new(),
            5,
            PresentationMode::Reverse,
            &RegionFilter::World,
            now,
            &mut rng(),
        );

        assert!(batch.iter().all(|q| q.mode == PresentationMode::Reverse));
    }

    #[test]
    fn practice_batch_excludes_unseen_items() {
        let now = Utc::now();
        let items: Vec<LearningItem> = (0..5).map(|i| item(&format!("i{i}"), "Europe")).collect();
        let mut progress = HashMap::new();
        progress.insert("i0".to_string(), record(4, 2, 2.1, 3, 0, 0, now));
        progress.insert("i3".to_string(), record(2, 2, 2.5, 6, 2, 0, now));

        let batch =
            select_practice_batch(&items, &progress, 10, PresentationMode::Forward, &mut rng());

        let chosen: HashSet<&str> = ids(&batch).into_iter().collect();
        assert_eq!(chosen, HashSet::from(["i0", "i3"]));
    }

    #[test]
    fn practice_batch_keeps_lowest_difficulty_scores() {
        let now = Utc::now();
        let items: Vec<LearningItem> = (0..4).map(|i| item(&format!("i{i}"), "Europe")).collect();
        let mut progress = HashMap::new();
        // ease * accuracy: i0 = 2.5, i1 = 0.65, i2 = 2.8, i3 = 0.9
        progress.insert("i0".to_string(), record(4, 4, 2.5, 6, 4, 0, now));
        progress.insert("i1".to_string(), record(4, 2, 1.3, 1, 0, 0, now));
        progress.insert("i2".to_string(), record(4, 4, 2.8, 15, 4, 0, now));
        progress.insert("i3".to_string(), record(4, 2, 1.8, 1, 0, 0, now));

        let batch =
            select_practice_batch(&items, &progress, 2, PresentationMode::Forward, &mut rng());

        let chosen: HashSet<&str> = ids(&batch).into_iter().collect();
        assert_eq!(chosen, HashSet::from(["i1", "i3"]));
    }

    #[test]
    fn practice_batch_empty_without_history() {
        let items: Vec<LearningItem> = (0..5).map(|i| item(&format!("i{i}"), "Europe")).collect();
        let batch = select_practice_batch(
            &items,
            &HashMap::new(),
            10,
            PresentationMode::Forward,
            &mut rng(),
        );
        assert!(batch.is_empty());
    }

    #[test]
    fn improve_batch_prioritizes_miss_count_then_rate() {
        let now = Utc::now();
        let items: Vec<LearningItem> = (0..4).map(|i| item(&format!("i{i}"), "Europe")).collect();
        let mut progress = HashMap::new();
        // i0: 3 misses; i1: 2 misses out of 2 (rate 1.0); i2: 2 misses out
        // of 8 (rate 0.25); i3: never missed
        progress.insert("i0".to_string(), record(6, 3, 2.0, 3, 1, 0, now));
        progress.insert("i1".to_string(), record(2, 0, 2.1, 1, 0, 0, now));
        progress.insert("i2".to_string(), record(8, 6, 2.4, 6, 2, 0, now));
        progress.insert("i3".to_string(), record(5, 5, 2.6, 15, 5, 0, now));

        let batch =
            select_improve_batch(&items, &progress, 2, PresentationMode::Forward, &mut rng());

        let chosen: HashSet<&str> = ids(&batch).into_iter().collect();
        assert_eq!(chosen, HashSet::from(["i0", "i1"]));
    }

    #[test]
    fn improve_batch_empty_without_misses() {
        let now = Utc::now();
        let items = vec![item("i0", "Europe")];
        let mut progress = HashMap::new();
        progress.insert("i0".to_string(), record(3, 3, 2.5, 6, 3, 0, now));

        let batch =
            select_improve_batch(&items, &progress, 5, PresentationMode::Forward, &mut rng());
        assert!(batch.is_empty());
    }

    #[test]
    fn available_regions_sorted_and_deduplicated() {
        let items = vec![
            item("a", "Europe"),
            item("b", "Asia"),
            item("c", "Europe"),
            item("d", "Africa"),
        ];
        assert_eq!(available_regions(&items), vec!["Africa", "Asia", "Europe"]);
    }

    #[test]
    fn same_seed_builds_the_same_batch() {
        let now = Utc::now();
        let items: Vec<LearningItem> = (0..25).map(|i| item(&format!("i{i}"), "Asia")).collect();

        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let first = select_session_batch(
            &items,
            &HashMap::new(),
            8,
            PresentationMode::Forward,
            &RegionFilter::World,
            now,
            &mut a,
        );
        let second = select_session_batch(
            &items,
            &HashMap::new(),
            8,
            PresentationMode::Forward,
            &RegionFilter::World,
            now,
            &mut b,
        );

        assert_eq!(ids(&first), ids(&second));
    }
}
