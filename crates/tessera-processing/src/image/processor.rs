//! Image decoding and encoding helpers.

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

/// Decode image bytes, guessing the container format from the data.
pub fn decode(data: &[u8]) -> Result<DynamicImage, anyhow::Error> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    Ok(reader.decode()?)
}

/// Pixel dimensions of the encoded image, if it decodes at all.
pub fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
    decode(data).ok().map(|img| img.dimensions())
}

/// Raster format for a filename extension ("jpg", "png", ...).
pub fn format_for_extension(extension: &str) -> Option<ImageFormat> {
    ImageFormat::from_extension(extension)
}

/// Encode an image into `format`.
///
/// JPEG cannot carry an alpha channel, so images that went through the
/// orientation pass (which works in RGBA) are flattened to RGB first.
pub fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, anyhow::Error> {
    let mut buf = Cursor::new(Vec::new());
    if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut buf, format)?;
    } else {
        img.write_to(&mut buf, format)?;
    }
    Ok(buf.into_inner())
}
