//! Event bus error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("event bus unavailable: {0}")]
    Unavailable(String),

    #[error("event bus rejected the event: {0}")]
    Rejected(String),

    #[error("failed to serialize event: {0}")]
    Serialization(String),
}

impl EventBusError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, EventBusError::Unavailable(_))
    }
}
