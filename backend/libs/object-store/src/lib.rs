//! Object-store adapter: multipart upload primitives plus dual-endpoint
//! presigned URL rewriting, wrapping `aws-sdk-s3` behind the `resilience`
//! timeout/retry presets used across this pipeline's outbound calls.

pub mod config;
pub mod error;
pub mod multipart;
pub mod operations;
pub mod url_rewrite;

pub use config::ObjectStoreConfig;
pub use error::ObjectStoreError;
pub use multipart::{CompletedUpload, MultipartUpload, PartETag};
pub use operations::{ObjectMetadata, ObjectOperations};

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use resilience::{presets, with_retry, with_timeout_result, RetryError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

#[async_trait]
pub trait ObjectStoreAdapter: Send + Sync {
    async fn initiate_multipart(&self, key: &str) -> Result<MultipartUpload, ObjectStoreError>;

    async fn presign_part_url(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        ttl: Duration,
    ) -> Result<String, ObjectStoreError>;

    async fn complete_multipart(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[PartETag],
    ) -> Result<CompletedUpload, ObjectStoreError>;

    async fn abort_multipart(&self, key: &str, upload_id: &str) -> Result<(), ObjectStoreError>;
}

/// AWS S3 (or S3-compatible) implementation of [`ObjectStoreAdapter`].
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Arc<Client>,
    config: ObjectStoreConfig,
}

impl S3ObjectStore {
    pub async fn new(config: ObjectStoreConfig) -> Result<Self, ObjectStoreError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(config.region.clone()));
        if let Some(endpoint) = &config.internal_endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let shared_config = loader.load().await;

        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if config.path_style {
            s3_builder = s3_builder.force_path_style(true);
        }

        Ok(Self {
            client: Arc::new(Client::from_conf(s3_builder.build())),
            config,
        })
    }

    pub fn config(&self) -> &ObjectStoreConfig {
        &self.config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Plain get/put/delete/head operations for workers moving video bytes
    /// in and out of scoped temp workspaces.
    pub fn operations(&self) -> ObjectOperations {
        ObjectOperations::new(self.client.clone(), self.config.clone())
    }
}

#[async_trait]
impl ObjectStoreAdapter for S3ObjectStore {
    async fn initiate_multipart(&self, key: &str) -> Result<MultipartUpload, ObjectStoreError> {
        let service_config = presets::object_storage_config();
        let retry_config = service_config.retry.unwrap_or_default();
        let timeout_duration = service_config.timeout.duration;
        let client = self.client.clone();
        let bucket = self.config.bucket.clone();
        let key_owned = key.to_string();

        let outcome = with_retry(retry_config, move || {
            let client = client.clone();
            let bucket = bucket.clone();
            let key = key_owned.clone();
            async move {
                with_timeout_result(timeout_duration, async move {
                    client
                        .create_multipart_upload()
                        .bucket(&bucket)
                        .key(&key)
                        .send()
                        .await
                        .map_err(ObjectStoreError::from)
                })
                .await
                .map_err(|e| ObjectStoreError::StoreUnavailable(e.to_string()))
            }
        })
        .await;

        let response = match outcome {
            Ok(response) => response,
            Err(RetryError::MaxRetriesExceeded(n)) => {
                return Err(ObjectStoreError::StoreUnavailable(format!(
                    "initiate_multipart gave up after {n} retries"
                )))
            }
            Err(RetryError::OperationFailed(e)) => return Err(e),
        };

        let upload_id = response
            .upload_id()
            .ok_or_else(|| ObjectStoreError::Internal("missing upload_id in response".into()))?
            .to_string();

        debug!(key = %key, upload_id = %upload_id, "multipart upload initiated");

        Ok(MultipartUpload {
            upload_id,
            key: key.to_string(),
        })
    }

    async fn presign_part_url(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        ttl: Duration,
    ) -> Result<String, ObjectStoreError> {
        let presign_config = PresigningConfig::expires_in(ttl)
            .map_err(|e| ObjectStoreError::Internal(e.to_string()))?;

        let request = self
            .client
            .upload_part()
            .bucket(&self.config.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number as i32)
            .presigned(presign_config)
            .await
            .map_err(ObjectStoreError::from)?;

        Ok(url_rewrite::rewrite_to_public_endpoint(
            &request.uri().to_string(),
            self.config.public_endpoint.as_deref(),
        ))
    }

    async fn complete_multipart(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[PartETag],
    ) -> Result<CompletedUpload, ObjectStoreError> {
        let completed_parts: Vec<CompletedPart> = parts
            .iter()
            .map(|p| {
                CompletedPart::builder()
                    .part_number(p.part_number as i32)
                    .e_tag(&p.etag)
                    .build()
            })
            .collect();

        let result = self
            .client
            .complete_multipart_upload()
            .bucket(&self.config.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed_parts))
                    .build(),
            )
            .send()
            .await
            .map_err(ObjectStoreError::from)?;

        Ok(CompletedUpload {
            location: result.location().unwrap_or_default().to_string(),
            etag: result.e_tag().unwrap_or_default().to_string(),
        })
    }

    async fn abort_multipart(&self, key: &str, upload_id: &str) -> Result<(), ObjectStoreError> {
        match self
            .client
            .abort_multipart_upload()
            .bucket(&self.config.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(key = %key, upload_id = %upload_id, error = %e, "abort_multipart failed");
                Err(ObjectStoreError::from(e))
            }
        }
    }
}

/// Test double recording multipart calls in memory: no network, no AWS.
#[derive(Default)]
pub struct InMemoryObjectStore {
    next_upload_id: Mutex<u64>,
    aborted: Mutex<Vec<String>>,
    completed: Mutex<HashMap<String, Vec<PartETag>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aborted_uploads(&self) -> Vec<String> {
        self.aborted.lock().unwrap().clone()
    }

    pub fn completed_uploads(&self) -> HashMap<String, Vec<PartETag>> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStoreAdapter for InMemoryObjectStore {
    async fn initiate_multipart(&self, key: &str) -> Result<MultipartUpload, ObjectStoreError> {
        let mut next = self.next_upload_id.lock().unwrap();
        *next += 1;
        Ok(MultipartUpload {
            upload_id: format!("in-memory-upload-{next}"),
            key: key.to_string(),
        })
    }

    async fn presign_part_url(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        _ttl: Duration,
    ) -> Result<String, ObjectStoreError> {
        Ok(format!("https://in-memory.test/{key}?uploadId={upload_id}&partNumber={part_number}"))
    }

    async fn complete_multipart(
        &self,
        key: &str,
        _upload_id: &str,
        parts: &[PartETag],
    ) -> Result<CompletedUpload, ObjectStoreError> {
        self.completed.lock().unwrap().insert(key.to_string(), parts.to_vec());
        Ok(CompletedUpload {
            location: format!("https://in-memory.test/{key}"),
            etag: "in-memory-etag".to_string(),
        })
    }

    async fn abort_multipart(&self, key: &str, _upload_id: &str) -> Result<(), ObjectStoreError> {
        self.aborted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
