//! Error types for geoquiz-core.

use thiserror::Error;

/// Result type alias using StoreError.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures surfaced by a [`crate::store::ProgressStore`] collaborator.
///
/// The core itself performs no I/O; these exist so real storage backends
/// can report their failures through a single typed surface. The core
/// propagates them upward without retrying.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read progress data: {0}")]
    Read(String),

    #[error("failed to write progress data: {0}")]
    Write(String),

    #[error("corrupt record for item {item_id}: {reason}")]
    CorruptRecord { item_id: String, reason: String },
}
