//! Repository error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("video not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, RepositoryError::Database(_))
    }
}

/// Outcome of a conditional `updateVideo`. `StaleUpdate` is a first-class
/// success variant, not an error: it means another writer already moved the
/// aggregate past the state this caller expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    StaleUpdate,
}
