//! Ledger row models for uploads and images.

use chrono::{DateTime, Utc};
use tessera_core::models::{ImageResponse, UploadInfo};
use uuid::Uuid;

/// One logical upload: identity, declared shape, receipt progress, and
/// completion state. `uploaded_chunks` is reconciled by recounting persisted
/// chunk blobs, never incremented, so duplicate chunk posts cannot skew it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Upload {
    pub id: Uuid,
    /// Client-supplied opaque identifier, unique across uploads
    pub upload_id: String,
    pub filename: String,
    pub size: i64,
    pub total_chunks: i32,
    pub uploaded_chunks: i32,
    /// Expected SHA-256 (hex) of the assembled file, if declared
    pub checksum: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to register an upload
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub upload_id: String,
    pub filename: String,
    pub size: i64,
    pub total_chunks: i32,
    pub checksum: Option<String>,
}

/// One published raster: the original or a derived variant.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Image {
    pub id: Uuid,
    /// Owning upload (surrogate id, not the client-supplied string)
    pub upload_id: Uuid,
    pub variant: String,
    pub path: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to record an image row (the owning upload id is supplied by
/// the completion batch)
#[derive(Debug, Clone)]
pub struct NewImage {
    pub variant: String,
    pub path: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub is_primary: bool,
}

impl From<Upload> for UploadInfo {
    fn from(upload: Upload) -> Self {
        UploadInfo {
            id: upload.id,
            upload_id: upload.upload_id,
            filename: upload.filename,
            size: upload.size,
            total_chunks: upload.total_chunks,
            uploaded_chunks: upload.uploaded_chunks,
            checksum: upload.checksum,
            completed: upload.completed,
            created_at: upload.created_at,
            updated_at: upload.updated_at,
        }
    }
}

impl From<Image> for ImageResponse {
    fn from(image: Image) -> Self {
        ImageResponse {
            id: image.id,
            upload_id: image.upload_id,
            variant: image.variant,
            path: image.path,
            width: image.width,
            height: image.height,
            entity_type: image.entity_type,
            entity_id: image.entity_id,
            is_primary: image.is_primary,
            created_at: image.created_at,
        }
    }
}

impl Upload {
    /// Extension of the declared filename, lowercased; `jpg` when absent.
    pub fn extension(&self) -> String {
        let ext = self
            .filename
            .rsplit('.')
            .next()
            .filter(|e| *e != self.filename && !e.is_empty())
            .map(|e| e.to_lowercase());
        ext.unwrap_or_else(|| tessera_core::constants::DEFAULT_EXTENSION.to_string())
    }
}
