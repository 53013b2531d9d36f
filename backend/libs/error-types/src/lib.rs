//! Wire-level error types shared by every service's HTTP boundary.
//!
//! `error-handling` owns the `ServiceError` taxonomy and its mapping rules;
//! this crate owns the stable, serializable shape that taxonomy is rendered
//! into, plus the string codes consumers are allowed to match on.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Response body for any failed request across the pipeline's services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
    pub error_type: String,
    pub code: String,
    pub details: Option<String>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: impl Into<String>, status: u16, code: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.into(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Stable string codes, matched against by error-taxonomy tests and
/// clients that need to branch on error category rather than HTTP status.
pub mod error_codes {
    pub const VALIDATION: &str = "VALIDATION_ERROR";
    pub const POLICY_VIOLATION: &str = "POLICY_VIOLATION";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INVALID_STATUS_TRANSITION: &str = "INVALID_STATUS_TRANSITION";
    pub const STALE_UPDATE: &str = "STALE_UPDATE";
    pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
    pub const STORE_REJECTED: &str = "STORE_REJECTED";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const NON_RETRYABLE: &str = "NON_RETRYABLE";
    pub const INTERNAL: &str = "INTERNAL_ERROR";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_response_with_timestamp() {
        let resp = ErrorResponse::new("NotFoundError", "video not found", 404, error_codes::NOT_FOUND);
        assert_eq!(resp.status, 404);
        assert_eq!(resp.code, "NOT_FOUND");
        assert!(resp.details.is_none());
        assert!(!resp.timestamp.is_empty());
    }

    #[test]
    fn with_details_sets_field() {
        let resp = ErrorResponse::new("ValidationError", "bad size", 422, error_codes::VALIDATION)
            .with_details("totalSize must be positive");
        assert_eq!(resp.details.as_deref(), Some("totalSize must be positive"));
    }
}
