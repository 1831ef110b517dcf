//! Image processing for the upload pipeline: decoding, EXIF orientation,
//! shrink-only resizing, and the fixed variant derivation plan.

pub mod image;

pub use image::variants::{derive_variants, DerivedVariant, VariantSet};
