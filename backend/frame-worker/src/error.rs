//! Frame-worker error taxonomy and its mapping onto the consumer runtime's
//! retryable/non-retryable classification.

use queue_runtime::HandlerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameWorkerError {
    #[error("malformed event payload: {0}")]
    MalformedEvent(String),

    #[error("segment not found: {0}")]
    SegmentNotFound(String),

    #[error("object store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("frame extractor failed: {0}")]
    Extractor(String),

    #[error("event bus unavailable: {0}")]
    EventBusUnavailable(String),

    #[error(transparent)]
    Service(#[from] error_handling::ServiceError),
}

const NON_RETRYABLE_PATTERNS: &[&str] = &["404", "does not exist", "nosuchkey", "invalid", "not found"];

impl FrameWorkerError {
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
            FrameWorkerError::MalformedEvent(_) | FrameWorkerError::SegmentNotFound(_) => true,
            FrameWorkerError::StoreUnavailable(_)
            | FrameWorkerError::Extractor(_)
            | FrameWorkerError::EventBusUnavailable(_)
            | FrameWorkerError::Service(_) => {
                let lower = self.to_string().to_lowercase();
                NON_RETRYABLE_PATTERNS.iter().any(|p| lower.contains(p))
            }
        }
    }
}

impl From<object_store::ObjectStoreError> for FrameWorkerError {
    fn from(err: object_store::ObjectStoreError) -> Self {
        use object_store::ObjectStoreError::*;
        match err {
            NotFound(msg) => FrameWorkerError::SegmentNotFound(msg),
            StoreUnavailable(msg) => FrameWorkerError::StoreUnavailable(msg),
            StoreRejected(msg) | Internal(msg) => FrameWorkerError::StoreUnavailable(msg),
        }
    }
}

impl From<event_bus::EventBusError> for FrameWorkerError {
    fn from(err: event_bus::EventBusError) -> Self {
        FrameWorkerError::EventBusUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_event_is_non_retryable() {
        let err = FrameWorkerError::MalformedEvent("bad path".into());
        assert!(matches!(err.into_handler_error(), HandlerError::NonRetryable(_)));
    }

    #[test]
    fn segment_not_found_is_non_retryable() {
        let err = FrameWorkerError::SegmentNotFound("no such key".into());
        assert!(matches!(err.into_handler_error(), HandlerError::NonRetryable(_)));
    }

    #[test]
    fn store_unavailable_is_retryable_by_default() {
        let err = FrameWorkerError::StoreUnavailable("connection reset".into());
        assert!(matches!(err.into_handler_error(), HandlerError::Retryable(_)));
    }
}
