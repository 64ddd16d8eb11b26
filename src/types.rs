//! Core types for the quiz engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a learning item.
pub type ItemId = String;

/// Coarse mastery classification derived from review interval length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    New,
    Learning,
    Review,
    Mastered,
}

impl Default for Bucket {
    fn default() -> Self {
        Self::New
    }
}

/// Which term a question shows as the prompt.
///
/// `Forward` prompts with the primary term and expects the secondary
/// (country → capital); `Reverse` is the other direction. Chosen once per
/// batch, never per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationMode {
    Forward,
    Reverse,
}

impl Default for PresentationMode {
    fn default() -> Self {
        Self::Forward
    }
}

/// Region scope for standard session selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionFilter {
    World,
    Region(String),
}

impl RegionFilter {
    /// Whether an item tagged with `region` falls inside this scope.
    pub fn accepts(&self, region: &str) -> bool {
        match self {
            Self::World => true,
            Self::Region(name) => name == region,
        }
    }
}

impl Default for RegionFilter {
    fn default() -> Self {
        Self::World
    }
}

/// Static quiz content for one item. Immutable reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningItem {
    pub id: ItemId,
    pub primary_term: String,
    pub primary_alternatives: Vec<String>,
    pub secondary_term: String,
    pub secondary_alternatives: Vec<String>,
    pub region: String,
    /// Some countries have more than one valid capital; display-level flag.
    pub has_multiple_valid_primaries: bool,
}

/// Per-item learning record, created lazily on first exposure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub times_shown: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    /// SM-2 ease factor, clamped to a 1.3 floor.
    pub ease_factor: f64,
    /// Days until the next scheduled review.
    pub interval_days: i64,
    /// Consecutive-correct counter; resets to 0 on any miss.
    pub repetitions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_shown: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
    /// Derived from `(times_shown, interval_days)` after every update.
    pub bucket: Bucket,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            times_shown: 0,
            correct_count: 0,
            incorrect_count: 0,
            ease_factor: 2.5,
            interval_days: 1,
            repetitions: 0,
            last_shown: None,
            next_review: None,
            bucket: Bucket::New,
        }
    }
}

/// A display-ready question: item content, presentation direction, and the
/// bucket snapshotted at selection time. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionQuestion {
    pub item: LearningItem,
    pub mode: PresentationMode,
    pub bucket: Bucket,
}

impl SessionQuestion {
    /// The term shown to the learner.
    pub fn prompt(&self) -> &str {
        match self.mode {
            PresentationMode::Forward => &self.item.primary_term,
            PresentationMode::Reverse => &self.item.secondary_term,
        }
    }

    /// Every literal accepted as a correct answer, primary term first.
    pub fn accepted_answers(&self) -> Vec<&str> {
        let (term, alternatives) = match self.mode {
            PresentationMode::Forward => {
                (&self.item.secondary_term, &self.item.secondary_alternatives)
            }
            PresentationMode::Reverse => {
                (&self.item.primary_term, &self.item.primary_alternatives)
            }
        };
        std::iter::once(term.as_str())
            .chain(alternatives.iter().map(String::as_str))
            .collect()
    }
}

/// Learner preferences persisted between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub last_region: RegionFilter,
    pub last_mode: PresentationMode,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            last_region: RegionFilter::World,
            last_mode: PresentationMode::Forward,
        }
    }
}

/// Outcome of one finished session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub best_streak: u32,
    pub finished_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Fraction answered correctly; 0.0 for an empty session.
    pub fn accuracy(&self) -> f64 {
        let total = self.correct_count + self.incorrect_count;
        if total == 0 {
            0.0
        } else {
            f64::from(self.correct_count) / f64::from(total)
        }
    }
}

/// Cumulative statistics across all sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub best_streak: u32,
    pub total_sessions: u32,
    pub total_correct: u32,
    pub total_incorrect: u32,
    /// Most recent sessions first, capped at ten entries.
    pub session_history: Vec<SessionSummary>,
}

/// Point-in-time view of overall mastery across the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total_items: usize,
    pub new_count: usize,
    pub learning_count: usize,
    pub review_count: usize,
    pub mastered_count: usize,
    /// Lifetime correct answers over lifetime exposures.
    pub accuracy: f64,
}
