//! Image API models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Serializable view of an image ledger row (the original or a derived variant)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageResponse {
    pub id: Uuid,
    pub upload_id: Uuid,
    /// "original", "1024", "512", or "256"
    pub variant: String,
    /// Storage path of the raster bytes
    pub path: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}
