//! Output encoding of cropped images.
//!
//! JPEG (with quality) and PNG through the `image` crate's encoders. Both take
//! RGB8 row-major pixels.

mod jpeg;
mod png;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

use thiserror::Error;

use crate::bitmap::DecodedImage;
use crate::config::OutputFormat;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("{format:?} encoding failed: {message}")]
    EncodingFailed {
        format: OutputFormat,
        message: String,
    },
}

/// Encode an image in the configured output format.
///
/// `quality` only applies to JPEG.
pub fn encode(
    image: &DecodedImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Jpeg => encode_jpeg(&image.pixels, image.width, image.height, quality),
        OutputFormat::Png => encode_png(&image.pixels, image.width, image.height),
    }
}

fn validate(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let expected = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_dispatches_by_format() {
        let image = DecodedImage::filled(8, 4, [10, 20, 30]);
        let jpeg = encode(&image, OutputFormat::Jpeg, 90).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        let png = encode(&image, OutputFormat::Png, 0).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            validate(&[], 0, 3),
            Err(EncodeError::InvalidDimensions { width: 0, height: 3 })
        ));
        assert!(matches!(
            validate(&[0; 5], 1, 2),
            Err(EncodeError::InvalidPixelData {
                expected: 6,
                actual: 5
            })
        ));
        assert!(validate(&[0; 6], 1, 2).is_ok());
    }
}
