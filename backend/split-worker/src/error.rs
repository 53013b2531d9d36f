//! Split-worker error taxonomy and its mapping onto the consumer runtime's
//! retryable/non-retryable classification.

use queue_runtime::HandlerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitWorkerError {
    #[error("malformed event payload: {0}")]
    MalformedEvent(String),

    #[error("source object not found: {0}")]
    SourceNotFound(String),

    #[error("object store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("segmenter failed: {0}")]
    Segmenter(String),

    #[error("event bus unavailable: {0}")]
    EventBusUnavailable(String),

    #[error(transparent)]
    Service(#[from] error_handling::ServiceError),
}

/// Patterns that mark a failure as permanent regardless of the specific
/// variant, matching the consumer runtime's pattern-based classification.
const NON_RETRYABLE_PATTERNS: &[&str] = &["404", "does not exist", "nosuchkey", "invalid", "not found"];

impl SplitWorkerError {
    pub fn into_handler_error(self) -> HandlerError {
        let message = self.to_string();
        if self.is_non_retryable() {
            HandlerError::NonRetryable(message)
        } else {
            HandlerError::Retryable(message)
        }
    }

    fn is_non_retryable(&self) -> bool {
        match self {
            SplitWorkerError::MalformedEvent(_) | SplitWorkerError::SourceNotFound(_) => true,
            SplitWorkerError::StoreUnavailable(_)
            | SplitWorkerError::Segmenter(_)
            | SplitWorkerError::EventBusUnavailable(_)
            | SplitWorkerError::Service(_) => {
                let lower = self.to_string().to_lowercase();
                NON_RETRYABLE_PATTERNS.iter().any(|p| lower.contains(p))
            }
        }
    }
}

impl From<object_store::ObjectStoreError> for SplitWorkerError {
    fn from(err: object_store::ObjectStoreError) -> Self {
        use object_store::ObjectStoreError::*;
        match err {
            NotFound(msg) => SplitWorkerError::SourceNotFound(msg),
            StoreUnavailable(msg) => SplitWorkerError::StoreUnavailable(msg),
            StoreRejected(msg) | Internal(msg) => SplitWorkerError::StoreUnavailable(msg),
        }
    }
}

impl From<event_bus::EventBusError> for SplitWorkerError {
    fn from(err: event_bus::EventBusError) -> Self {
        SplitWorkerError::EventBusUnavailable(err.to_string())
    }
}
