//! OpenAPI document for the upload API.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::chunked_upload::init_upload,
        crate::handlers::chunked_upload::upload_chunk,
        crate::handlers::chunked_upload::upload_status,
        crate::handlers::chunked_upload::complete_upload,
        crate::handlers::chunked_upload::list_upload_images,
    ),
    components(schemas(
        tessera_core::models::InitUploadRequest,
        tessera_core::models::InitUploadResponse,
        tessera_core::models::UploadInfo,
        tessera_core::models::ChunkUploadResponse,
        tessera_core::models::UploadStatusResponse,
        tessera_core::models::CompleteUploadRequest,
        tessera_core::models::CompleteUploadResponse,
        tessera_core::models::ImageResponse,
        crate::error::ErrorResponse,
    )),
    tags(
        (name = "uploads", description = "Resumable chunked image uploads")
    )
)]
pub struct ApiDoc;
