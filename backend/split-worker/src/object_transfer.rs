//! Thin trait boundary around the plain object get/put the split-worker
//! needs, so handler tests never touch a real object-store client.

use async_trait::async_trait;
use object_store::ObjectStoreError;
use std::path::Path;

#[async_trait]
pub trait ObjectTransfer: Send + Sync {
    async fn download_to_file(&self, key: &str, dest: &Path) -> Result<(), ObjectStoreError>;
    async fn upload_file(&self, key: &str, path: &Path, content_type: &str) -> Result<(), ObjectStoreError>;
}

#[async_trait]
impl ObjectTransfer for object_store::ObjectOperations {
    async fn download_to_file(&self, key: &str, dest: &Path) -> Result<(), ObjectStoreError> {
        object_store::ObjectOperations::download_to_file(self, key, dest).await
    }

    async fn upload_file(&self, key: &str, path: &Path, content_type: &str) -> Result<(), ObjectStoreError> {
        object_store::ObjectOperations::upload_file(self, key, path, content_type).await
    }
}

#[cfg(test)]
pub struct FakeObjectTransfer {
    pub uploaded: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl FakeObjectTransfer {
    pub fn new() -> Self {
        Self {
            uploaded: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl ObjectTransfer for FakeObjectTransfer {
    async fn download_to_file(&self, _key: &str, dest: &Path) -> Result<(), ObjectStoreError> {
        tokio::fs::write(dest, b"fake-source-bytes")
            .await
            .map_err(|e| ObjectStoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn upload_file(&self, key: &str, _path: &Path, _content_type: &str) -> Result<(), ObjectStoreError> {
        self.uploaded.lock().unwrap().push(key.to_string());
        Ok(())
    }
}
