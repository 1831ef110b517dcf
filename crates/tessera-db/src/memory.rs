//! In-memory ledger implementation.
//!
//! Backs both repository traits with a single mutex-guarded store so the
//! completion batch is atomic, mirroring the transactional Postgres path.
//! Used by the integration tests and by embedded/development setups that run
//! without a database.

use crate::models::{Image, NewImage, NewUpload, Upload};
use crate::traits::{ImageRepository, UploadRepository};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tessera_core::AppError;
use uuid::Uuid;

#[derive(Default)]
struct LedgerInner {
    uploads: HashMap<String, Upload>,
    images: Vec<Image>,
}

/// In-memory upload + image ledger.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    inner: Arc<Mutex<LedgerInner>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UploadRepository for InMemoryLedger {
    async fn create_or_get(&self, new_upload: NewUpload) -> Result<Upload, AppError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(existing) = inner.uploads.get(&new_upload.upload_id) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let upload = Upload {
            id: Uuid::new_v4(),
            upload_id: new_upload.upload_id.clone(),
            filename: new_upload.filename,
            size: new_upload.size,
            total_chunks: new_upload.total_chunks,
            uploaded_chunks: 0,
            checksum: new_upload.checksum,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        inner
            .uploads
            .insert(new_upload.upload_id, upload.clone());

        Ok(upload)
    }

    async fn get_by_upload_id(&self, upload_id: &str) -> Result<Option<Upload>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.uploads.get(upload_id).cloned())
    }

    async fn reconcile_chunks(
        &self,
        upload_id: &str,
        uploaded_chunks: i32,
        total_chunks: i32,
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();

        let Some(upload) = inner.uploads.get_mut(upload_id) else {
            return Ok(false);
        };

        upload.uploaded_chunks = uploaded_chunks;
        upload.total_chunks = total_chunks;
        upload.updated_at = Utc::now();

        Ok(true)
    }

    async fn complete_with_images(
        &self,
        id: Uuid,
        checksum: Option<String>,
        images: Vec<NewImage>,
    ) -> Result<Vec<Image>, AppError> {
        let mut inner = self.inner.lock().unwrap();

        let now = Utc::now();
        let mut created = Vec::with_capacity(images.len());
        for image in images {
            let row = Image {
                id: Uuid::new_v4(),
                upload_id: id,
                variant: image.variant,
                path: image.path,
                width: image.width,
                height: image.height,
                entity_type: image.entity_type,
                entity_id: image.entity_id,
                is_primary: image.is_primary,
                created_at: now,
            };
            inner.images.push(row.clone());
            created.push(row);
        }

        if let Some(upload) = inner.uploads.values_mut().find(|u| u.id == id) {
            upload.completed = true;
            if upload.checksum.is_none() {
                upload.checksum = checksum;
            }
            upload.updated_at = now;
        }

        Ok(created)
    }
}

#[async_trait]
impl ImageRepository for InMemoryLedger {
    async fn list_for_upload(&self, upload_id: Uuid) -> Result<Vec<Image>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .images
            .iter()
            .filter(|img| img.upload_id == upload_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_upload(upload_id: &str) -> NewUpload {
        NewUpload {
            upload_id: upload_id.to_string(),
            filename: "photo.jpg".to_string(),
            size: 100,
            total_chunks: 2,
            checksum: None,
        }
    }

    #[tokio::test]
    async fn test_create_or_get_is_idempotent() {
        let ledger = InMemoryLedger::new();

        let first = ledger.create_or_get(new_upload("u1")).await.unwrap();
        let second = ledger
            .create_or_get(NewUpload {
                filename: "other.png".to_string(),
                ..new_upload("u1")
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.filename, "photo.jpg");
    }

    #[tokio::test]
    async fn test_reconcile_unknown_upload_is_noop() {
        let ledger = InMemoryLedger::new();
        let updated = ledger.reconcile_chunks("ghost", 1, 2).await.unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_complete_with_images_batch() {
        let ledger = InMemoryLedger::new();
        let upload = ledger.create_or_get(new_upload("u1")).await.unwrap();

        let created = ledger
            .complete_with_images(
                upload.id,
                Some("deadbeef".to_string()),
                vec![
                    NewImage {
                        variant: "original".to_string(),
                        path: "images/u1/original.jpg".to_string(),
                        width: Some(100),
                        height: Some(50),
                        entity_type: None,
                        entity_id: None,
                        is_primary: false,
                    },
                    NewImage {
                        variant: "256".to_string(),
                        path: "images/u1/variant_256.jpg".to_string(),
                        width: Some(256),
                        height: Some(128),
                        entity_type: None,
                        entity_id: None,
                        is_primary: false,
                    },
                ],
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 2);

        let reloaded = ledger.get_by_upload_id("u1").await.unwrap().unwrap();
        assert!(reloaded.completed);
        assert_eq!(reloaded.checksum.as_deref(), Some("deadbeef"));

        let images = ledger.list_for_upload(upload.id).await.unwrap();
        assert_eq!(images.len(), 2);
    }

    #[tokio::test]
    async fn test_stored_checksum_wins_over_batch_checksum() {
        let ledger = InMemoryLedger::new();
        let upload = ledger
            .create_or_get(NewUpload {
                checksum: Some("stored".to_string()),
                ..new_upload("u1")
            })
            .await
            .unwrap();

        ledger
            .complete_with_images(upload.id, Some("late".to_string()), vec![])
            .await
            .unwrap();

        let reloaded = ledger.get_by_upload_id("u1").await.unwrap().unwrap();
        assert_eq!(reloaded.checksum.as_deref(), Some("stored"));
    }
}
