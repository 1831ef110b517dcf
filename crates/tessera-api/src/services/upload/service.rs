//! Upload orchestration service.
//!
//! Sequences the pipeline per upload id: chunk receipt (write + recount),
//! resume status, assembly (enumerate, concatenate, verify), and variant
//! generation, ending in one transactional ledger batch. State machine per
//! upload: pending -> assembling (under the assembly lock) -> completed;
//! integrity failures return the upload to pending so the client can resend
//! chunks or retry completion.

use super::locks::UploadLocks;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tessera_core::constants::{MAX_UPLOAD_ID_LEN, ORIGINAL_VARIANT};
use tessera_core::models::CompleteUploadRequest;
use tessera_core::AppError;
use tessera_db::{Image, ImageRepository, NewImage, NewUpload, Upload, UploadRepository};
use tessera_processing::derive_variants;
use tessera_storage::{keys, Storage, StorageError};

/// Result of a completion call.
#[derive(Debug)]
pub enum CompletionOutcome {
    /// The upload was already completed; nothing was reprocessed.
    AlreadyCompleted,
    /// The upload was assembled and published in this call.
    Completed { path: String, images: Vec<Image> },
}

/// Map a storage failure onto the application error taxonomy.
pub fn storage_app_error(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(key) => AppError::NotFound(format!("Object not found: {}", key)),
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        other => AppError::Storage(other.to_string()),
    }
}

fn validate_upload_id(upload_id: &str) -> Result<(), AppError> {
    if upload_id.is_empty() || upload_id.len() > MAX_UPLOAD_ID_LEN {
        return Err(AppError::InvalidInput(format!(
            "upload_id must be 1-{} characters",
            MAX_UPLOAD_ID_LEN
        )));
    }
    if !upload_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::InvalidInput(
            "upload_id may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

/// Reduce a declared filename to something safe to use as a storage path
/// segment for the scratch assembly.
fn sanitize_filename(filename: &str) -> String {
    const MAX: usize = 255;
    let base = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    let sanitized: String = base
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

#[derive(Clone)]
pub struct UploadService {
    uploads: Arc<dyn UploadRepository>,
    images: Arc<dyn ImageRepository>,
    storage: Arc<dyn Storage>,
    count_locks: UploadLocks,
    assembly_locks: UploadLocks,
}

impl UploadService {
    pub fn new(
        uploads: Arc<dyn UploadRepository>,
        images: Arc<dyn ImageRepository>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            uploads,
            images,
            storage,
            count_locks: UploadLocks::new(),
            assembly_locks: UploadLocks::new(),
        }
    }

    /// Register an upload (or return the existing row for its id).
    pub async fn init(&self, new_upload: NewUpload) -> Result<Upload, AppError> {
        validate_upload_id(&new_upload.upload_id)?;
        if new_upload.filename.is_empty() {
            return Err(AppError::InvalidInput("filename must not be empty".to_string()));
        }
        if new_upload.size < 0 {
            return Err(AppError::InvalidInput("size must not be negative".to_string()));
        }
        if new_upload.total_chunks < 1 {
            return Err(AppError::InvalidInput(
                "total_chunks must be at least 1".to_string(),
            ));
        }

        let upload = self.uploads.create_or_get(new_upload).await?;

        tracing::info!(
            upload_id = %upload.upload_id,
            filename = %upload.filename,
            total_chunks = upload.total_chunks,
            "Upload registered"
        );

        Ok(upload)
    }

    /// Accept one chunk: persist it (overwriting any prior blob at that
    /// index), then recount persisted chunks under the per-upload lock and
    /// reconcile the ledger. An unknown upload id is tolerated; the ledger
    /// update is simply skipped until completion reconciles.
    pub async fn receive_chunk(
        &self,
        upload_id: &str,
        index: u32,
        total: u32,
        data: Vec<u8>,
    ) -> Result<u32, AppError> {
        validate_upload_id(upload_id)?;
        if total < 1 {
            return Err(AppError::InvalidInput("total must be at least 1".to_string()));
        }
        if data.is_empty() {
            return Err(AppError::InvalidInput("chunk must not be empty".to_string()));
        }

        self.storage
            .put(&keys::chunk_key(upload_id, index), data)
            .await
            .map_err(storage_app_error)?;

        {
            let _guard = self.count_locks.acquire(upload_id).await;
            let count = self.chunk_indices(upload_id).await?.len() as i32;
            let known = self
                .uploads
                .reconcile_chunks(upload_id, count, total as i32)
                .await?;
            if !known {
                tracing::debug!(
                    upload_id = %upload_id,
                    "Chunk stored for unregistered upload; ledger reconciliation deferred"
                );
            }
        }

        tracing::info!(upload_id = %upload_id, index = index, "Chunk stored");

        Ok(index)
    }

    /// Indices of the chunk blobs present on storage, ascending. A missing
    /// chunk directory yields an empty set so clients can always diff.
    pub async fn status(&self, upload_id: &str) -> Result<Vec<u32>, AppError> {
        validate_upload_id(upload_id)?;
        self.chunk_indices(upload_id).await
    }

    /// Finalize an upload: assemble the chunks in index order, verify the
    /// checksum, publish the original, derive the variant set, and record the
    /// whole batch atomically. Idempotent: re-completion returns
    /// [`CompletionOutcome::AlreadyCompleted`] without reprocessing.
    pub async fn complete(
        &self,
        request: CompleteUploadRequest,
    ) -> Result<CompletionOutcome, AppError> {
        validate_upload_id(&request.upload_id)?;

        let upload = self
            .uploads
            .get_by_upload_id(&request.upload_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Upload not found".to_string()))?;

        if upload.completed {
            return Ok(CompletionOutcome::AlreadyCompleted);
        }

        // At most one assembly per upload id; a concurrent completion blocks
        // here, then observes completed == true on the re-read below.
        let _guard = self.assembly_locks.acquire(&request.upload_id).await;

        let upload = self
            .uploads
            .get_by_upload_id(&request.upload_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Upload not found".to_string()))?;

        if upload.completed {
            return Ok(CompletionOutcome::AlreadyCompleted);
        }

        let indices = self.chunk_indices(&upload.upload_id).await?;
        let expected_indices: Vec<u32> = (0..upload.total_chunks as u32).collect();
        if indices != expected_indices {
            return Err(AppError::MissingChunks {
                received: indices.len() as i32,
                expected: upload.total_chunks,
            });
        }

        let assembled = self.assemble_chunks(&upload, &indices).await?;

        let scratch_key =
            keys::assembly_key(&upload.upload_id, &sanitize_filename(&upload.filename));
        self.storage
            .put(&scratch_key, assembled.clone())
            .await
            .map_err(storage_app_error)?;

        let computed = hex::encode(Sha256::digest(&assembled));

        // Ledger checksum wins; the request-supplied value is only
        // authoritative when none was stored at init.
        let expected_checksum = upload
            .checksum
            .clone()
            .or_else(|| request.checksum.clone())
            .map(|c| c.trim().to_lowercase());

        match &expected_checksum {
            Some(expected) if *expected != computed => {
                self.storage
                    .delete(&scratch_key)
                    .await
                    .map_err(storage_app_error)?;
                return Err(AppError::ChecksumMismatch {
                    expected: expected.clone(),
                    computed,
                });
            }
            Some(_) => {}
            None => {
                tracing::debug!(
                    upload_id = %upload.upload_id,
                    "No checksum supplied; integrity verification skipped"
                );
            }
        }

        let extension = upload.extension();
        let original_path = keys::original_key(&upload.upload_id, &extension);
        self.storage
            .put(&original_path, assembled.clone())
            .await
            .map_err(storage_app_error)?;

        let variant_set = {
            let extension = extension.clone();
            tokio::task::spawn_blocking(move || derive_variants(&assembled, &extension))
                .await
                .map_err(|e| AppError::Internal(format!("Variant derivation panicked: {}", e)))?
        };

        let is_primary = request.is_primary.unwrap_or(false);
        let mut rows = Vec::with_capacity(1 + variant_set.variants.len());
        rows.push(NewImage {
            variant: ORIGINAL_VARIANT.to_string(),
            path: original_path.clone(),
            width: variant_set.original_dimensions.map(|(w, _)| w as i32),
            height: variant_set.original_dimensions.map(|(_, h)| h as i32),
            entity_type: request.entity_type.clone(),
            entity_id: request.entity_id,
            is_primary,
        });

        for variant in &variant_set.variants {
            let path = keys::variant_key(&upload.upload_id, &variant.label, &extension);
            self.storage
                .put(&path, variant.data.clone())
                .await
                .map_err(storage_app_error)?;
            rows.push(NewImage {
                variant: variant.label.clone(),
                path,
                width: Some(variant.width as i32),
                height: Some(variant.height as i32),
                entity_type: request.entity_type.clone(),
                entity_id: request.entity_id,
                is_primary,
            });
        }

        let images = self
            .uploads
            .complete_with_images(upload.id, request.checksum.clone(), rows)
            .await?;

        tracing::info!(
            upload_id = %upload.upload_id,
            path = %original_path,
            url = %self.storage.url_for(&original_path),
            images = images.len(),
            "Upload completed"
        );

        Ok(CompletionOutcome::Completed {
            path: original_path,
            images,
        })
    }

    /// Image rows recorded for an upload.
    pub async fn images_for(&self, upload_id: &str) -> Result<Vec<Image>, AppError> {
        validate_upload_id(upload_id)?;

        let upload = self
            .uploads
            .get_by_upload_id(upload_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Upload not found".to_string()))?;

        self.images.list_for_upload(upload.id).await
    }

    /// Parse the chunk directory listing into sorted integer indices,
    /// discarding non-numeric entries.
    async fn chunk_indices(&self, upload_id: &str) -> Result<Vec<u32>, AppError> {
        let names = self
            .storage
            .list_dir(&keys::chunk_dir(upload_id))
            .await
            .map_err(storage_app_error)?;

        let mut indices: Vec<u32> = names
            .iter()
            .filter_map(|name| name.parse::<u32>().ok())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }

    /// Concatenate chunk contents in ascending index order.
    async fn assemble_chunks(
        &self,
        upload: &Upload,
        indices: &[u32],
    ) -> Result<Vec<u8>, AppError> {
        let mut assembled = Vec::new();
        for &index in indices {
            let chunk = self
                .storage
                .get(&keys::chunk_key(&upload.upload_id, index))
                .await
                .map_err(storage_app_error)?;
            assembled.extend_from_slice(&chunk);
        }
        Ok(assembled)
    }
}
