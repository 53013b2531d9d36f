//! Object store configuration shared across services.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    /// Endpoint the server itself uses to reach the object store.
    pub internal_endpoint: Option<String>,
    /// Endpoint clients should use; presigned URLs are rewritten to this origin.
    pub public_endpoint: Option<String>,
    pub path_style: bool,
    pub presigned_url_expiration_secs: u64,
}

impl ObjectStoreConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            bucket: std::env::var("VIDEO_BUCKET").unwrap_or_else(|_| "video-pipeline".to_string()),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            internal_endpoint: std::env::var("AWS_ENDPOINT").ok(),
            public_endpoint: std::env::var("AWS_PUBLIC_ENDPOINT").ok(),
            path_style: std::env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            presigned_url_expiration_secs: std::env::var("S3_PRESIGNED_URL_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_falls_back_to_defaults() {
        std::env::remove_var("VIDEO_BUCKET");
        std::env::remove_var("AWS_REGION");
        let config = ObjectStoreConfig::from_env().unwrap();
        assert_eq!(config.region, "us-east-1");
        assert!(config.presigned_url_expiration_secs > 0);
    }
}
