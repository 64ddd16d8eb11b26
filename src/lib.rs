//! Adaptive learning core for a geography quiz.
//!
//! Provides:
//! - SM-2 derived spaced repetition scheduling per learning item
//! - Session question selection blending due reviews, urgency, and new items
//! - Fuzzy validation of free-text answers (aliases, transliteration,
//!   adaptive Levenshtein tolerance)
//! - A storage seam ([`ProgressStore`]) with an in-memory implementation

pub mod error;
pub mod matching;
pub mod normalize;
pub mod scheduler;
pub mod selector;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use matching::{levenshtein_distance, matches_any};
pub use normalize::normalize;
pub use scheduler::{bucket_for, Sm2};
pub use selector::{
    available_regions, select_improve_batch, select_practice_batch, select_session_batch,
};
pub use store::{MemoryStore, ProgressStore, ProgressTracker};
pub use types::{
    Bucket, ItemId, LearningItem, PresentationMode, ProgressRecord, ProgressSummary, RegionFilter,
    SessionQuestion, SessionSettings, SessionStats, SessionSummary,
};
