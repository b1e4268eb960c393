//! Decoded bitmaps handed to the crop executor.

use serde::{Deserialize, Serialize};

/// Filter type for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// EXIF orientation values (1-8).
///
/// Hosts read this from the file and pass [`Orientation::rotation_degrees`]
/// as the initial rotation when the image is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Flip horizontal + rotate 270 CW.
    Transpose = 5,
    Rotate90CW = 6,
    /// Flip horizontal + rotate 90 CW.
    Transverse = 7,
    Rotate270CW = 8,
}

impl Orientation {
    /// Clockwise rotation that displays the image upright.
    pub fn rotation_degrees(self) -> i32 {
        match self {
            Orientation::Normal | Orientation::FlipHorizontal | Orientation::FlipVertical => 0,
            Orientation::Rotate90CW | Orientation::Transverse => 90,
            Orientation::Rotate180 => 180,
            Orientation::Rotate270CW | Orientation::Transpose => 270,
        }
    }

    /// `(horizontal, vertical)` flips applied on top of the rotation.
    pub fn flips(self) -> (bool, bool) {
        match self {
            Orientation::FlipHorizontal | Orientation::Transpose | Orientation::Transverse => {
                (true, false)
            }
            Orientation::FlipVertical => (false, true),
            _ => (false, false),
        }
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A decoded image with RGB pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width * height * 3) as usize,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Image filled with one color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// `None` when the buffer length does not match the dimensions.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y * self.width + x) * 3) as usize;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }
}

/// Largest power of two that keeps both halves above the requested size.
///
/// Returns 1 when the image already fits the request.
pub fn calculate_sample_size(width: u32, height: u32, req_width: u32, req_height: u32) -> u32 {
    let mut sample_size = 1;
    if height > req_height || width > req_width {
        while height / 2 / sample_size > req_height && width / 2 / sample_size > req_width {
            sample_size *= 2;
        }
    }
    sample_size
}
