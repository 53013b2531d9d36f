//! Postgres-backed `VideoRepository`.
//!
//! The aggregate is stored as one row per video: scalar columns for `id`,
//! `user_id`, `status`, `created_at`, `updated_at`, and JSONB columns for
//! `metadata`, `storage`, and `parts`. Parts don't get their own table —
//! a video's part count is bounded (see `MATERIALIZED_PART_CAP`), so a JSONB
//! array is simpler than a join and the aggregate is always read/written whole.

use crate::error::{RepositoryError, UpdateOutcome};
use crate::VideoRepository;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;
use video_core::{Video, VideoMetadata, VideoPart, VideoStatus, VideoStorage};

pub struct PostgresVideoRepository {
    pool: PgPool,
}

impl PostgresVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_video(row: &sqlx::postgres::PgRow) -> Result<Video, RepositoryError> {
        let metadata: Json<VideoMetadata> = row.try_get("metadata")?;
        let storage: Json<VideoStorage> = row.try_get("storage")?;
        let parts: Json<Vec<VideoPart>> = row.try_get("parts")?;

        Ok(Video {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            status: row.try_get("status")?,
            metadata: metadata.0,
            storage: storage.0,
            parts: parts.0,
            total_parts_planned: row.try_get::<i32, _>("total_parts_planned")? as u32,
            part_size_bytes: row.try_get("part_size_bytes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl VideoRepository for PostgresVideoRepository {
    async fn create_video(&self, video: &Video) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO videos
                (id, user_id, status, metadata, storage, parts, total_parts_planned, part_size_bytes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(video.id)
        .bind(video.user_id)
        .bind(video.status)
        .bind(Json(&video.metadata))
        .bind(Json(&video.storage))
        .bind(Json(&video.parts))
        .bind(video.total_parts_planned as i32)
        .bind(video.part_size_bytes)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_video).transpose()
    }

    async fn find_by_object_key(&self, object_key: &str) -> Result<Option<Video>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM videos WHERE storage ->> 'object_key' = $1")
            .bind(object_key)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_video).transpose()
    }

    async fn update_video_part(&self, video: &Video) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE videos
            SET metadata = $2, storage = $3, parts = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(video.id)
        .bind(Json(&video.metadata))
        .bind(Json(&video.storage))
        .bind(Json(&video.parts))
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_video(
        &self,
        video: &Video,
        expected_status: VideoStatus,
    ) -> Result<UpdateOutcome, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET status = $2, metadata = $3, storage = $4, parts = $5, updated_at = $6
            WHERE id = $1 AND status = $7
            "#,
        )
        .bind(video.id)
        .bind(video.status)
        .bind(Json(&video.metadata))
        .bind(Json(&video.storage))
        .bind(Json(&video.parts))
        .bind(video.updated_at)
        .bind(expected_status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(UpdateOutcome::StaleUpdate)
        } else {
            Ok(UpdateOutcome::Applied)
        }
    }
}
