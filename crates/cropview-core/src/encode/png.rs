//! Lossless PNG encoding of the crop result.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate, EncodeError};
use crate::config::OutputFormat;

/// Encode RGB pixel data to PNG bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: OutputFormat::Png,
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_is_lossless() {
        let pixels: Vec<u8> = (0..(7 * 5 * 3)).map(|i| (i * 7 % 256) as u8).collect();
        let png = encode_png(&pixels, 7, 5).unwrap();
        assert_eq!(&png[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.into_raw(), pixels);
    }

    #[test]
    fn test_png_rejects_zero_size() {
        assert!(matches!(
            encode_png(&[], 0, 0),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }
}
