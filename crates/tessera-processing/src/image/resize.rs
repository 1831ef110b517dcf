//! Shrink-only, aspect-preserving resize toward a maximum bounding dimension.

use image::{DynamicImage, GenericImageView};

/// Target dimensions when fitting `orig` into a `max_dimension` square.
/// Never upscales: images already inside the bound keep their size.
pub fn fit_within(orig_width: u32, orig_height: u32, max_dimension: u32) -> (u32, u32) {
    if orig_width <= max_dimension && orig_height <= max_dimension {
        return (orig_width, orig_height);
    }

    let scale = max_dimension as f32 / orig_width.max(orig_height) as f32;
    let width = ((orig_width as f32 * scale).round() as u32).max(1);
    let height = ((orig_height as f32 * scale).round() as u32).max(1);
    (width.min(max_dimension), height.min(max_dimension))
}

/// Select a filter type based on the resize ratio: cheaper filters for large
/// reductions, sharper ones near 1:1.
pub fn select_filter(
    orig_width: u32,
    orig_height: u32,
    new_width: u32,
    new_height: u32,
) -> image::imageops::FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        image::imageops::FilterType::Triangle
    } else if max_ratio > 1.5 {
        image::imageops::FilterType::CatmullRom
    } else {
        image::imageops::FilterType::Lanczos3
    }
}

/// Resize so both dimensions fit within `max_dimension`, preserving aspect
/// ratio and never upscaling.
pub fn resize_to_fit(img: &DynamicImage, max_dimension: u32) -> DynamicImage {
    let (orig_width, orig_height) = img.dimensions();
    let (width, height) = fit_within(orig_width, orig_height, max_dimension);

    if (width, height) == (orig_width, orig_height) {
        return img.clone();
    }

    let filter = select_filter(orig_width, orig_height, width, height);
    img.resize_exact(width, height, filter)
}
