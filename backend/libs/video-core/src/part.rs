//! VideoPart: one slice of a multipart upload.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PartStatus {
    Pending,
    Uploading,
    Uploaded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoPart {
    pub part_number: u32,
    pub size_bytes: i64,
    pub url: String,
    pub etag: String,
    pub status: PartStatus,
}

impl VideoPart {
    pub fn new(part_number: u32, size_bytes: i64) -> Self {
        Self {
            part_number,
            size_bytes,
            url: String::new(),
            etag: String::new(),
            status: PartStatus::Pending,
        }
    }

    pub fn has_url(&self) -> bool {
        !self.url.is_empty()
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(self.status, PartStatus::Uploaded) && !self.etag.is_empty()
    }
}
