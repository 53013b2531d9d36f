//! Object store error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("object store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("object store rejected the request: {0}")]
    StoreRejected(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ObjectStoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ObjectStoreError::StoreUnavailable(_))
    }
}

impl<E> From<aws_sdk_s3::error::SdkError<E, aws_smithy_runtime_api::http::Response>> for ObjectStoreError
where
    E: std::fmt::Display,
{
    fn from(err: aws_sdk_s3::error::SdkError<E, aws_smithy_runtime_api::http::Response>) -> Self {
        match &err {
            aws_sdk_s3::error::SdkError::TimeoutError(_)
            | aws_sdk_s3::error::SdkError::DispatchFailure(_) => {
                ObjectStoreError::StoreUnavailable(err.to_string())
            }
            aws_sdk_s3::error::SdkError::ServiceError(svc) => {
                ObjectStoreError::StoreRejected(svc.err().to_string())
            }
            _ => ObjectStoreError::Internal(err.to_string()),
        }
    }
}
