//! Variant derivation: the fixed plan of downsized copies produced from a
//! published original.
//!
//! A failure deriving one variant is logged and that variant skipped; the
//! rest of the batch still runs. The caller therefore always gets a usable
//! (possibly partial) set and records the original even when the source can't
//! be resized.

use super::{orientation, processor, resize};
use image::GenericImageView;
use tessera_core::constants::VARIANT_MAX_DIMENSIONS;

/// One successfully derived downsized copy.
#[derive(Debug, Clone)]
pub struct DerivedVariant {
    /// Label is the maximum bounding dimension, e.g. "512"
    pub label: String,
    pub width: u32,
    pub height: u32,
    /// Re-encoded raster bytes in the original's format
    pub data: Vec<u8>,
}

/// Outcome of a derivation run over one original.
#[derive(Debug, Clone, Default)]
pub struct VariantSet {
    /// Natural dimensions of the stored original, when it decodes
    pub original_dimensions: Option<(u32, u32)>,
    /// Successfully derived variants, largest bound first
    pub variants: Vec<DerivedVariant>,
}

/// Derive the fixed variant set (1024/512/256 max bounding dimension) from
/// `data`, encoding each copy back to the format implied by `extension`.
///
/// Orientation metadata is applied before resizing; aspect ratio is
/// preserved and images are never upscaled.
pub fn derive_variants(data: &[u8], extension: &str) -> VariantSet {
    let decoded = match processor::decode(data) {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to decode original; no variants derived");
            return VariantSet::default();
        }
    };

    let original_dimensions = Some(decoded.dimensions());
    let oriented = orientation::apply_exif_orientation(decoded, data);

    let mut variants = Vec::new();
    for max_dimension in VARIANT_MAX_DIMENSIONS {
        let label = max_dimension.to_string();

        let Some(format) = processor::format_for_extension(extension) else {
            tracing::warn!(
                variant = %label,
                extension = %extension,
                "No encoder for extension; skipping variant"
            );
            continue;
        };

        let resized = resize::resize_to_fit(&oriented, max_dimension);
        let (width, height) = resized.dimensions();

        match processor::encode(&resized, format) {
            Ok(encoded) => variants.push(DerivedVariant {
                label,
                width,
                height,
                data: encoded,
            }),
            Err(e) => {
                tracing::warn!(
                    variant = %label,
                    error = %e,
                    "Failed to encode variant; skipping"
                );
            }
        }
    }

    VariantSet {
        original_dimensions,
        variants,
    }
}
