//! Application-wide constants.

/// Variant label used for the unresized published original.
pub const ORIGINAL_VARIANT: &str = "original";

/// Maximum bounding dimensions (pixels) of the derived image variants.
/// Each derived copy is labelled by its bound ("1024", "512", "256").
pub const VARIANT_MAX_DIMENSIONS: [u32; 3] = [1024, 512, 256];

/// Extension assumed when the declared filename has none.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Upper bound on client-supplied upload ids (they become storage path
/// segments, so they are validated and length-capped).
pub const MAX_UPLOAD_ID_LEN: usize = 128;
