//! Shared key construction for the upload and image storage layout.
//!
//! Layout: chunks at `uploads/{upload_id}/chunks/{index}`, scratch assemblies
//! at `uploads/{upload_id}/assembled/{filename}`, published originals at
//! `images/{upload_id}/original.{ext}`, derived variants at
//! `images/{upload_id}/variant_{label}.{ext}`. All backends use this layout.

/// Directory holding the chunk blobs of one upload.
pub fn chunk_dir(upload_id: &str) -> String {
    format!("uploads/{}/chunks", upload_id)
}

/// Key of a single chunk blob, named by its zero-based index.
pub fn chunk_key(upload_id: &str, index: u32) -> String {
    format!("uploads/{}/chunks/{}", upload_id, index)
}

/// Scratch location owned by one assembly attempt.
pub fn assembly_key(upload_id: &str, filename: &str) -> String {
    format!("uploads/{}/assembled/{}", upload_id, filename)
}

/// Key of the published original.
pub fn original_key(upload_id: &str, extension: &str) -> String {
    format!("images/{}/original.{}", upload_id, extension)
}

/// Key of a derived variant, labelled by its maximum bounding dimension.
pub fn variant_key(upload_id: &str, label: &str, extension: &str) -> String {
    format!("images/{}/variant_{}.{}", upload_id, label, extension)
}
