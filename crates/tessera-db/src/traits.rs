//! Repository traits for the upload and image ledgers.

use crate::models::{Image, NewImage, NewUpload, Upload};
use async_trait::async_trait;
use tessera_core::AppError;
use uuid::Uuid;

/// Ledger of upload rows.
#[async_trait]
pub trait UploadRepository: Send + Sync {
    /// Create the ledger row for `new_upload`, or return the existing row when
    /// the upload id is already registered (idempotent init).
    async fn create_or_get(&self, new_upload: NewUpload) -> Result<Upload, AppError>;

    /// Look up an upload by its client-supplied id.
    async fn get_by_upload_id(&self, upload_id: &str) -> Result<Option<Upload>, AppError>;

    /// Store a freshly recounted chunk total and the client-declared chunk
    /// count. Returns `false` when no ledger row exists yet (chunk receipt
    /// tolerates unknown uploads; reconciliation happens at completion).
    ///
    /// Implementations must serialize concurrent calls for the same upload
    /// against each other (row lock or equivalent).
    async fn reconcile_chunks(
        &self,
        upload_id: &str,
        uploaded_chunks: i32,
        total_chunks: i32,
    ) -> Result<bool, AppError>;

    /// Atomically record the completion batch: insert all image rows, mark the
    /// upload completed, and persist `checksum` when the row has none stored.
    /// Either every ledger-visible effect lands or none does.
    async fn complete_with_images(
        &self,
        id: Uuid,
        checksum: Option<String>,
        images: Vec<NewImage>,
    ) -> Result<Vec<Image>, AppError>;
}

/// Ledger of image rows.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// All image rows recorded for an upload (original plus variants).
    async fn list_for_upload(&self, upload_id: Uuid) -> Result<Vec<Image>, AppError>;
}
