//! SM-2 derived spaced repetition scheduling.
//!
//! Based on SuperMemo 2, simplified for a binary correct/incorrect
//! outcome: every correct answer is scored at a fixed "good recall"
//! quality, while a miss takes a flat ease penalty and resets the streak.

use crate::types::{Bucket, ProgressRecord};
use chrono::{DateTime, Duration, Utc};

/// Interval thresholds (days) separating the mastery buckets.
const LEARNING_THRESHOLD_DAYS: i64 = 7;
const REVIEW_THRESHOLD_DAYS: i64 = 21;

/// SM-2 variant with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Quality value reported for every correct answer; the UI does not
    /// collect a graded rating.
    pub correct_quality: u8,
    /// Flat ease deduction on a miss. Intentionally simpler than the
    /// quality formula used on success.
    pub failure_penalty: f64,
    pub first_interval: i64,
    pub second_interval: i64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            correct_quality: 4,
            failure_penalty: 0.2,
            first_interval: 1,
            second_interval: 6,
        }
    }
}

impl Sm2 {
    /// Fresh record for an item that has never been shown.
    pub fn initial_record(&self) -> ProgressRecord {
        ProgressRecord {
            ease_factor: self.initial_ease,
            ..ProgressRecord::default()
        }
    }

    /// Apply one answer outcome to a record.
    ///
    /// Pure transform: counters, interval, ease, streak, timestamps, and
    /// bucket are all recomputed on the returned record; the caller is
    /// responsible for storing it.
    pub fn record_outcome(
        &self,
        record: &ProgressRecord,
        correct: bool,
        now: DateTime<Utc>,
    ) -> ProgressRecord {
        let mut next = record.clone();
        next.times_shown += 1;
        next.last_shown = Some(now);

        if correct {
            next.correct_count += 1;
            next.interval_days = match next.repetitions {
                0 => self.first_interval,
                1 => self.second_interval,
                _ => (record.interval_days as f64 * record.ease_factor).round() as i64,
            };
            next.repetitions += 1;
            let q = f64::from(self.correct_quality);
            next.ease_factor += 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
        } else {
            next.incorrect_count += 1;
            next.repetitions = 0;
            next.interval_days = 1;
            next.ease_factor -= self.failure_penalty;
        }

        next.ease_factor = next.ease_factor.max(self.minimum_ease);
        next.next_review = Some(now + Duration::days(next.interval_days));
        next.bucket = bucket_for(next.times_shown, next.interval_days);
        next
    }
}

/// Classify mastery from exposure count and interval length.
///
/// The bucket is always derived from these two fields, never tracked
/// independently of them.
pub fn bucket_for(times_shown: u32, interval_days: i64) -> Bucket {
    if times_shown == 0 {
        Bucket::New
    } else if interval_days < LEARNING_THRESHOLD_DAYS {
        Bucket::Learning
    } else if interval_days < REVIEW_THRESHOLD_DAYS {
        Bucket::Review
    } else {
        Bucket::Mastered
    }
}
