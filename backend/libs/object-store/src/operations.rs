//! Plain object operations used by the split and frame workers: pulling the
//! source video down to a scoped workspace, and pushing segments/frames back up.

use crate::config::ObjectStoreConfig;
use crate::error::ObjectStoreError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use futures::TryStreamExt;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

#[derive(Clone)]
pub struct ObjectOperations {
    client: Arc<Client>,
    config: ObjectStoreConfig,
}

impl ObjectOperations {
    pub fn new(client: Arc<Client>, config: ObjectStoreConfig) -> Self {
        Self { client, config }
    }

    /// Streams an object straight to a local file, for workers pulling a
    /// source video into their scoped temp workspace.
    pub async fn download_to_file(&self, key: &str, dest: &Path) -> Result<(), ObjectStoreError> {
        let mut response = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(ObjectStoreError::from)?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| ObjectStoreError::Internal(e.to_string()))?;

        while let Some(chunk) = response
            .body
            .try_next()
            .await
            .map_err(|e| ObjectStoreError::Internal(e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| ObjectStoreError::Internal(e.to_string()))?;
        }

        Ok(())
    }

    /// Uploads a local file (a split segment or extracted frame) under `key`.
    pub async fn upload_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| ObjectStoreError::Internal(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(ObjectStoreError::from)?;

        Ok(())
    }

    pub async fn delete_object(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(ObjectStoreError::from)?;

        Ok(())
    }

    pub async fn object_exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        match self
            .client
            .head_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("404") {
                    Ok(false)
                } else {
                    Err(ObjectStoreError::from(e))
                }
            }
        }
    }

    pub async fn object_metadata(&self, key: &str) -> Result<ObjectMetadata, ObjectStoreError> {
        let response = self
            .client
            .head_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(ObjectStoreError::from)?;

        Ok(ObjectMetadata {
            size: response.content_length().unwrap_or(0) as u64,
            content_type: response.content_type().map(|s| s.to_string()),
            etag: response.e_tag().map(|s| s.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    pub size: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}
