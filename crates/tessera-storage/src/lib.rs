//! Blob storage abstraction for chunk and image bytes.
//!
//! The [`Storage`] trait covers exactly what the upload pipeline needs: write,
//! read, existence check, directory listing, and delete, all keyed by
//! slash-separated path strings. [`LocalStorage`] is the filesystem backend;
//! [`keys`] centralizes the path layout (`uploads/{id}/chunks/{index}`,
//! `images/{id}/...`).

pub mod keys;
mod local;
mod traits;

pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
