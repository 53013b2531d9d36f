//! Persistence for the Video aggregate: create, find, and conditional update
//! keyed on `(id, currentStatus)` so the idempotent-receiver pattern (see the
//! Reconcile service) never needs a distributed lock.

pub mod error;
pub mod postgres;
pub mod in_memory;

pub use error::{RepositoryError, UpdateOutcome};
pub use in_memory::InMemoryVideoRepository;
pub use postgres::PostgresVideoRepository;

use async_trait::async_trait;
use uuid::Uuid;
use video_core::{Video, VideoStatus};

#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create_video(&self, video: &Video) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, RepositoryError>;

    async fn find_by_object_key(&self, object_key: &str) -> Result<Option<Video>, RepositoryError>;

    /// Persists `video.parts`/`video.metadata`/`video.storage`, unconditionally
    /// on `id`. Used for per-part progress (URL assignment, upload reports)
    /// that doesn't move the status machine.
    async fn update_video_part(&self, video: &Video) -> Result<(), RepositoryError>;

    /// Conditional write: succeeds only if the persisted status still equals
    /// `expected_status`. If another writer already advanced the row past
    /// `expected_status`, returns `Ok(UpdateOutcome::StaleUpdate)` rather than
    /// an error — the caller treats the effect as already achieved.
    async fn update_video(
        &self,
        video: &Video,
        expected_status: VideoStatus,
    ) -> Result<UpdateOutcome, RepositoryError>;
}
