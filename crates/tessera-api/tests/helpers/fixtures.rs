//! Test fixtures: generated images and digests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use sha2::{Digest, Sha256};
use std::io::Cursor;

/// Encode a solid-color JPEG of the given dimensions.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([60, 110, 190])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).expect("encode jpeg");
    buf.into_inner()
}

/// Hex-encoded SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Split `data` into `parts` contiguous chunks (last one takes the remainder).
pub fn split_chunks(data: &[u8], parts: usize) -> Vec<Vec<u8>> {
    assert!(parts > 0);
    let chunk_size = data.len().div_ceil(parts);
    data.chunks(chunk_size).map(|c| c.to_vec()).collect()
}
