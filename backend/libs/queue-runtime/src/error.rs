//! Classification of handler outcomes the consumer loop acts on.

use thiserror::Error;

/// What a handler's failure means for message disposition.
///
/// `Retryable` leaves the message alone so visibility expires and SQS
/// redelivers it; `NonRetryable` ("poison") acknowledges (deletes) the
/// message so it never blocks the queue, logging at error level instead.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("retryable: {0}")]
    Retryable(String),

    #[error("non-retryable: {0}")]
    NonRetryable(String),
}

impl HandlerError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, HandlerError::Retryable(_))
    }
}

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("queue unavailable: {0}")]
    QueueUnavailable(String),
}
