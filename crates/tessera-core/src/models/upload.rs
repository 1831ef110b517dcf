//! Upload API models: requests and responses for the chunked upload endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request to register an upload before sending chunks
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct InitUploadRequest {
    /// Client-chosen opaque upload identifier
    pub upload_id: String,
    /// Original filename (its extension decides the published format)
    pub filename: String,
    /// Declared total file size in bytes
    pub size: i64,
    /// Declared number of chunks
    pub total_chunks: i32,
    /// Expected SHA-256 of the whole file (hex), if the client knows it
    #[serde(default)]
    pub checksum: Option<String>,
}

/// Serializable view of an upload ledger row
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadInfo {
    pub id: Uuid,
    pub upload_id: String,
    pub filename: String,
    pub size: i64,
    pub total_chunks: i32,
    pub uploaded_chunks: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response for upload registration
#[derive(Debug, Serialize, ToSchema)]
pub struct InitUploadResponse {
    pub success: bool,
    pub upload: UploadInfo,
}

/// Response for a received chunk
#[derive(Debug, Serialize, ToSchema)]
pub struct ChunkUploadResponse {
    pub success: bool,
    /// Zero-based index of the chunk that was stored
    pub index: u32,
}

/// Response for the resume status query
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadStatusResponse {
    /// Indices of the chunks present on storage, ascending
    pub uploaded: Vec<u32>,
}

/// Request to finalize an upload: assemble chunks, verify, derive variants
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CompleteUploadRequest {
    pub upload_id: String,
    /// Expected SHA-256 (hex); only authoritative when none was given at init
    #[serde(default)]
    pub checksum: Option<String>,
    /// Optional polymorphic link, e.g. "User" or "Product"
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<i64>,
    #[serde(default)]
    pub is_primary: Option<bool>,
}

/// Response for upload completion
#[derive(Debug, Serialize, ToSchema)]
pub struct CompleteUploadResponse {
    pub success: bool,
    pub message: String,
    /// Storage path of the published original, when newly assembled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
