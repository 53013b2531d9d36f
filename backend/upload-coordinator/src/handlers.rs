//! HTTP routes. Thin: parse the request, call the matching use-case,
//! shape the response. All business logic lives in `use_cases`/`services`.

use crate::error::{AppError, Result};
use crate::services::reconcile::ReconcileOutcome;
use crate::state::AppState;
use crate::use_cases::{
    complete_upload, create_video, generate_batch_of_urls, reconcile_from_webhook, report_part_uploaded,
};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateVideoHttpResponse {
    pub video_id: Uuid,
    pub upload_id: String,
    pub urls: Vec<generate_batch_of_urls::PartUrl>,
    pub video_path: String,
    pub status: String,
}

/// `POST /video-processor`
pub async fn post_create_video(
    state: web::Data<AppState>,
    body: web::Json<create_video::CreateVideoRequest>,
) -> Result<HttpResponse> {
    let created = create_video::create_video(&state, body.into_inner()).await?;
    let batch = generate_batch_of_urls::generate_batch_of_urls(&state, created.video_id, None).await?;

    Ok(HttpResponse::Created().json(CreateVideoHttpResponse {
        video_id: created.video_id,
        upload_id: created.upload_id,
        urls: batch.urls,
        video_path: created.object_key,
        status: "CREATED".to_string(),
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateUrlsBody {
    pub batch_size: Option<usize>,
}

/// `POST /video-processor/{id}/urls`
pub async fn post_generate_batch_of_urls(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: Option<web::Json<GenerateUrlsBody>>,
) -> Result<HttpResponse> {
    let batch_size = body.and_then(|b| b.batch_size);
    let response = generate_batch_of_urls::generate_batch_of_urls(&state, path.into_inner(), batch_size).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportPartUploadedBody {
    pub etag: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportPartUploadedResponse {
    pub progress: video_core::UploadProgress,
}

/// `POST /video-processor/{id}/parts/{part_number}`
pub async fn post_report_part_uploaded(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, u32)>,
    body: web::Json<ReportPartUploadedBody>,
) -> Result<HttpResponse> {
    let (video_id, part_number) = path.into_inner();
    report_part_uploaded::report_part_uploaded(&state, video_id, part_number, body.into_inner().etag).await?;

    let video = state
        .repository
        .find_by_id(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("video {video_id} not found")))?;

    Ok(HttpResponse::Ok().json(ReportPartUploadedResponse {
        progress: video.upload_progress(),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompleteUploadResponse {
    pub status: String,
    pub location: String,
    pub etag: String,
}

/// `POST /video-processor/{id}/complete`
pub async fn post_complete_upload(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let ambient = correlation_context::current();
    let correlation_id = ambient.as_ref().map(|c| c.correlation_id.clone());
    let trace_id = ambient.map(|c| c.trace_id);

    let (outcome, completed) =
        complete_upload::complete_upload(&state, path.into_inner(), correlation_id, trace_id).await?;
    Ok(HttpResponse::Ok().json(CompleteUploadResponse {
        status: outcome.status.as_str().to_string(),
        location: completed.location,
        etag: completed.etag,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteMultipartWebhookBody {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookReconcileResponse {
    pub status: String,
    pub skipped: bool,
}

impl From<ReconcileOutcome> for WebhookReconcileResponse {
    fn from(outcome: ReconcileOutcome) -> Self {
        Self {
            status: outcome.status.as_str().to_string(),
            skipped: outcome.skipped,
        }
    }
}

/// `POST /webhooks/s3/complete-multipart`
pub async fn post_complete_multipart_webhook(
    state: web::Data<AppState>,
    body: web::Json<CompleteMultipartWebhookBody>,
) -> Result<HttpResponse> {
    let outcome = reconcile_from_webhook::reconcile_from_webhook(&state, &body.bucket, &body.key).await?;
    Ok(HttpResponse::Ok().json(WebhookReconcileResponse::from(outcome)))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database: String,
}

/// `GET /health`
pub async fn get_health(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    let database = match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => "up",
        Err(_) => "down",
    };

    let body = HealthResponse {
        status: if database == "up" { "ok" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: database.to_string(),
    };

    if database == "up" {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// `GET /metrics`
pub async fn get_metrics() -> HttpResponse {
    use prometheus::{Encoder, TextEncoder};
    let metric_families = prometheus::gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return HttpResponse::InternalServerError().finish();
    }
    HttpResponse::Ok().content_type(encoder.format_type()).body(buffer)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(get_health))
        .route("/metrics", web::get().to(get_metrics))
        .route("/video-processor", web::post().to(post_create_video))
        .route("/video-processor/{id}/urls", web::post().to(post_generate_batch_of_urls))
        .route(
            "/video-processor/{id}/parts/{part_number}",
            web::post().to(post_report_part_uploaded),
        )
        .route("/video-processor/{id}/complete", web::post().to(post_complete_upload))
        .route(
            "/webhooks/s3/complete-multipart",
            web::post().to(post_complete_multipart_webhook),
        );
}
