//! Chunked upload handlers.
//!
//! Resumable uploads: clients register an upload, send chunks independently
//! (out of order, with retries), poll the status endpoint to resume, and
//! finally request completion, which assembles, verifies, and derives the
//! image variant set.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::upload::CompletionOutcome;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tessera_core::models::{
    ChunkUploadResponse, CompleteUploadRequest, CompleteUploadResponse, ImageResponse,
    InitUploadRequest, InitUploadResponse, UploadStatusResponse,
};
use tessera_core::AppError;
use tessera_db::NewUpload;

/// Register an upload before sending chunks
#[utoipa::path(
    post,
    path = "/uploads/init",
    tag = "uploads",
    request_body = InitUploadRequest,
    responses(
        (status = 200, description = "Upload registered (or already present)", body = InitUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn init_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<InitUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = state
        .service
        .init(NewUpload {
            upload_id: request.upload_id,
            filename: request.filename,
            size: request.size,
            total_chunks: request.total_chunks,
            checksum: request.checksum,
        })
        .await?;

    Ok(Json(InitUploadResponse {
        success: true,
        upload: upload.into(),
    }))
}

/// Accept one chunk as multipart form data: `upload_id`, `index`, `total`,
/// and the binary `chunk` field
#[utoipa::path(
    post,
    path = "/uploads/chunk",
    tag = "uploads",
    responses(
        (status = 200, description = "Chunk stored", body = ChunkUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_chunk(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut upload_id: Option<String> = None;
    let mut index: Option<u32> = None;
    let mut total: Option<u32> = None;
    let mut chunk: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("upload_id") => {
                upload_id = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid upload_id field: {}", e))
                })?);
            }
            Some("index") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid index field: {}", e)))?;
                index = Some(text.trim().parse::<u32>().map_err(|_| {
                    AppError::InvalidInput(format!("index must be a non-negative integer, got {:?}", text))
                })?);
            }
            Some("total") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid total field: {}", e)))?;
                total = Some(text.trim().parse::<u32>().map_err(|_| {
                    AppError::InvalidInput(format!("total must be a positive integer, got {:?}", text))
                })?);
            }
            Some("chunk") => {
                chunk = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid chunk field: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let upload_id =
        upload_id.ok_or_else(|| AppError::InvalidInput("Missing field: upload_id".to_string()))?;
    let index = index.ok_or_else(|| AppError::InvalidInput("Missing field: index".to_string()))?;
    let total = total.ok_or_else(|| AppError::InvalidInput("Missing field: total".to_string()))?;
    let chunk = chunk.ok_or_else(|| AppError::InvalidInput("Missing field: chunk".to_string()))?;

    let index = state
        .service
        .receive_chunk(&upload_id, index, total, chunk)
        .await?;

    Ok(Json(ChunkUploadResponse {
        success: true,
        index,
    }))
}

/// Indices of the chunks already stored, for client-driven resume
#[utoipa::path(
    get,
    path = "/uploads/status/{upload_id}",
    tag = "uploads",
    params(
        ("upload_id" = String, Path, description = "Client-chosen upload identifier")
    ),
    responses(
        (status = 200, description = "Stored chunk indices", body = UploadStatusResponse),
        (status = 400, description = "Invalid upload id", body = ErrorResponse)
    )
)]
pub async fn upload_status(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let uploaded = state.service.status(&upload_id).await?;
    Ok(Json(UploadStatusResponse { uploaded }))
}

/// Assemble the chunks, verify integrity, publish the original, and derive
/// the variant set. Idempotent for completed uploads.
#[utoipa::path(
    post,
    path = "/uploads/complete",
    tag = "uploads",
    request_body = CompleteUploadRequest,
    responses(
        (status = 200, description = "Upload completed (or already complete)", body = CompleteUploadResponse),
        (status = 404, description = "Unknown upload id", body = ErrorResponse),
        (status = 422, description = "Missing chunks or checksum mismatch", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn complete_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CompleteUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let outcome = state.service.complete(request).await?;

    let response = match outcome {
        CompletionOutcome::AlreadyCompleted => CompleteUploadResponse {
            success: true,
            message: "Already completed".to_string(),
            path: None,
        },
        CompletionOutcome::Completed { path, .. } => CompleteUploadResponse {
            success: true,
            message: "Upload completed".to_string(),
            path: Some(path),
        },
    };

    Ok(Json(response))
}

/// Image rows (original plus derived variants) recorded for an upload
#[utoipa::path(
    get,
    path = "/uploads/{upload_id}/images",
    tag = "uploads",
    params(
        ("upload_id" = String, Path, description = "Client-chosen upload identifier")
    ),
    responses(
        (status = 200, description = "Images for the upload", body = [ImageResponse]),
        (status = 404, description = "Unknown upload id", body = ErrorResponse)
    )
)]
pub async fn list_upload_images(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let images = state.service.images_for(&upload_id).await?;
    let response: Vec<ImageResponse> = images.into_iter().map(Into::into).collect();
    Ok(Json(response))
}
