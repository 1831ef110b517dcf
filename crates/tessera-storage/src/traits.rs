//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Blob store abstraction.
///
/// Keys are slash-separated relative paths (see [`crate::keys`]). Writes are
/// whole-object overwrites: re-writing a key atomically replaces the prior
/// bytes, which is what gives chunk re-upload its idempotent semantics.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` to `key`, overwriting any existing object.
    async fn put(&self, key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Read the full object at `key`.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Check whether an object exists at `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// List the file names (not full keys) directly under the directory `prefix`.
    /// A missing directory yields an empty list, not an error.
    async fn list_dir(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Delete the object at `key`. Deleting a missing object is a no-op.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Publicly servable URL for `key`.
    fn url_for(&self, key: &str) -> String;
}
