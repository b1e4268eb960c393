//! JPEG encoding of the crop result.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate, EncodeError};
use crate::config::OutputFormat;

/// Encode RGB pixel data to JPEG bytes.
///
/// `quality` is clamped to 1-100.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height)?;

    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: OutputFormat::Jpeg,
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
