//! Postgres-backed repositories.
//!
//! Queries are dynamic (no compile-time `DATABASE_URL` requirement). The
//! chunk-count reconciliation takes a `SELECT ... FOR UPDATE` row lock so
//! concurrent recounts for the same upload serialize at the database as well
//! as behind the service's per-upload mutex.

use crate::models::{Image, NewImage, NewUpload, Upload};
use crate::traits::{ImageRepository, UploadRepository};
use async_trait::async_trait;
use sqlx::PgPool;
use tessera_core::AppError;
use uuid::Uuid;

/// Repository for upload ledger rows
#[derive(Clone)]
pub struct PgUploadRepository {
    pool: PgPool,
}

impl PgUploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadRepository for PgUploadRepository {
    async fn create_or_get(&self, new_upload: NewUpload) -> Result<Upload, AppError> {
        sqlx::query(
            r#"
            INSERT INTO uploads (upload_id, filename, size, total_chunks, checksum)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (upload_id) DO NOTHING
            "#,
        )
        .bind(&new_upload.upload_id)
        .bind(&new_upload.filename)
        .bind(new_upload.size)
        .bind(new_upload.total_chunks)
        .bind(&new_upload.checksum)
        .execute(&self.pool)
        .await?;

        let upload = sqlx::query_as::<_, Upload>(
            r#"
            SELECT id, upload_id, filename, size, total_chunks, uploaded_chunks,
                   checksum, completed, created_at, updated_at
            FROM uploads
            WHERE upload_id = $1
            "#,
        )
        .bind(&new_upload.upload_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(upload)
    }

    async fn get_by_upload_id(&self, upload_id: &str) -> Result<Option<Upload>, AppError> {
        let upload = sqlx::query_as::<_, Upload>(
            r#"
            SELECT id, upload_id, filename, size, total_chunks, uploaded_chunks,
                   checksum, completed, created_at, updated_at
            FROM uploads
            WHERE upload_id = $1
            "#,
        )
        .bind(upload_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(upload)
    }

    async fn reconcile_chunks(
        &self,
        upload_id: &str,
        uploaded_chunks: i32,
        total_chunks: i32,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM uploads WHERE upload_id = $1 FOR UPDATE")
                .bind(upload_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((id,)) = locked else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query(
            r#"
            UPDATE uploads
            SET uploaded_chunks = $2, total_chunks = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(uploaded_chunks)
        .bind(total_chunks)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn complete_with_images(
        &self,
        id: Uuid,
        checksum: Option<String>,
        images: Vec<NewImage>,
    ) -> Result<Vec<Image>, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut created = Vec::with_capacity(images.len());
        for image in &images {
            let row = sqlx::query_as::<_, Image>(
                r#"
                INSERT INTO images (upload_id, variant, path, width, height,
                                    entity_type, entity_id, is_primary)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, upload_id, variant, path, width, height,
                          entity_type, entity_id, is_primary, created_at
                "#,
            )
            .bind(id)
            .bind(&image.variant)
            .bind(&image.path)
            .bind(image.width)
            .bind(image.height)
            .bind(&image.entity_type)
            .bind(image.entity_id)
            .bind(image.is_primary)
            .fetch_one(&mut *tx)
            .await?;
            created.push(row);
        }

        sqlx::query(
            r#"
            UPDATE uploads
            SET completed = TRUE, checksum = COALESCE(checksum, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(checksum)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(created)
    }
}

/// Repository for image ledger rows
#[derive(Clone)]
pub struct PgImageRepository {
    pool: PgPool,
}

impl PgImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRepository for PgImageRepository {
    async fn list_for_upload(&self, upload_id: Uuid) -> Result<Vec<Image>, AppError> {
        let images = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, upload_id, variant, path, width, height,
                   entity_type, entity_id, is_primary, created_at
            FROM images
            WHERE upload_id = $1
            ORDER BY created_at, variant
            "#,
        )
        .bind(upload_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }
}
