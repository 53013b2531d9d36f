//! HTTP-facing error taxonomy for the upload coordinator.
//!
//! Maps domain errors to the response shapes the HTTP layer promises:
//! `Validation`/`PolicyViolation` -> 422, `NotFound` -> 404,
//! `InvalidStatusTransition` -> 400, `StoreUnavailable` -> 503, else 500.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use error_types::{error_codes, ErrorResponse};
use thiserror::Error;
use video_core::{PartSizeError, VideoCoreError};
use video_repository::RepositoryError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("policy violation: {0}")]
    PolicyViolation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid status transition: {0}")]
    InvalidStatusTransition(String),

    #[error("object store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => error_codes::VALIDATION,
            AppError::PolicyViolation(_) => error_codes::POLICY_VIOLATION,
            AppError::NotFound(_) => error_codes::NOT_FOUND,
            AppError::InvalidStatusTransition(_) => error_codes::INVALID_STATUS_TRANSITION,
            AppError::StoreUnavailable(_) => error_codes::STORE_UNAVAILABLE,
            AppError::Internal(_) => error_codes::INTERNAL,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::PolicyViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidStatusTransition(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = ErrorResponse::new(
            self.code(),
            self.to_string(),
            self.status_code().as_u16(),
            self.code(),
        );
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<VideoCoreError> for AppError {
    fn from(err: VideoCoreError) -> Self {
        match err {
            VideoCoreError::InvalidStatusTransition { .. } => {
                AppError::InvalidStatusTransition(err.to_string())
            }
            VideoCoreError::PartNotFound(_) => AppError::NotFound(err.to_string()),
            VideoCoreError::TerminalState(_) => AppError::PolicyViolation(err.to_string()),
            VideoCoreError::IncompleteUpload { .. } => AppError::PolicyViolation(err.to_string()),
        }
    }
}

impl From<PartSizeError> for AppError {
    fn from(err: PartSizeError) -> Self {
        AppError::PolicyViolation(err.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::NotFound("video not found".to_string()),
            RepositoryError::Database(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<object_store::ObjectStoreError> for AppError {
    fn from(err: object_store::ObjectStoreError) -> Self {
        use object_store::ObjectStoreError::*;
        match err {
            NotFound(msg) => AppError::NotFound(msg),
            StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            StoreRejected(msg) => AppError::Validation(msg),
            Internal(msg) => AppError::Internal(msg),
        }
    }
}
