//! Pixel crop executor.
//!
//! Turns a [`CropRequest`] taken from a session into output pixels:
//!
//! 1. Bounding rect of the crop polygon in the supplied bitmap
//! 2. Extraction of that region
//! 3. Clockwise rotation by the session's degrees, then the flips
//! 4. For angles that are not right angles, a centered crop to the crop
//!    window's true size (the rotated region carries corners of image
//!    outside the window)
//! 5. Resize per [`RequestSizeOptions`]
//!
//! The executor is synchronous. Hosts run it off the interaction thread and
//! hand the result back to [`CropSession::complete_crop`](crate::CropSession::complete_crop).

mod resize;
mod rotate;

pub use resize::{apply_request_size, resize};
pub use rotate::{center_crop, extract_region, flip, rotate_clockwise, rotated_bounds};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::bitmap::DecodedImage;
use crate::config::{OutputFormat, RequestSizeOptions};
use crate::geometry::{corner_distance, rect_from_points, AspectRatio, IntRect, Quad};

/// Errors from the pixel crop executor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CropError {
    /// Pixel data length doesn't match the image dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// The crop polygon does not cover any pixel of the image
    #[error("Crop region {rect:?} is empty inside a {width}x{height} image")]
    EmptyRegion {
        rect: IntRect,
        width: u32,
        height: u32,
    },

    #[error("Resize failed: {0}")]
    ResizeFailed(String),
}

/// Everything needed to crop the pixels the user selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRequest {
    /// Crop window corners in original source pixels (TL, TR, BR, BL as displayed).
    pub points: Quad,
    pub degrees_rotated: i32,
    pub flip_horizontally: bool,
    pub flip_vertically: bool,
    /// Locked aspect ratio, if any.
    pub aspect_ratio: Option<AspectRatio>,
    pub request_width: u32,
    pub request_height: u32,
    pub request_options: RequestSizeOptions,
    pub output_format: OutputFormat,
    pub output_quality: u8,
}

/// Cropped pixels plus the sub-sampling relative to the original image.
#[derive(Debug, Clone, PartialEq)]
pub struct CropOutcome {
    pub image: DecodedImage,
    pub sample_size: u32,
}

/// Crop `source` per `request`.
///
/// `source_sample_size` is how much `source` was sub-sampled relative to the
/// original image: 1 for a full-resolution bitmap, otherwise the sample size
/// the session displayed it with. Crop points are divided by it.
///
/// # Errors
///
/// [`CropError::InvalidPixelData`] for a malformed source,
/// [`CropError::EmptyRegion`] when the polygon misses the image and
/// [`CropError::ResizeFailed`] when the output resize fails.
pub fn crop_image(
    source: &DecodedImage,
    source_sample_size: u32,
    request: &CropRequest,
) -> Result<CropOutcome, CropError> {
    if source.pixels.len() != source.expected_len() {
        return Err(CropError::InvalidPixelData {
            expected: source.expected_len(),
            actual: source.pixels.len(),
        });
    }

    let source_sample_size = source_sample_size.max(1);
    let mut points = request.points;
    for value in points.iter_mut() {
        *value /= source_sample_size as f32;
    }

    let rect = rect_from_points(
        &points,
        source.width as i32,
        source.height as i32,
        request.aspect_ratio,
    );
    if rect.is_empty() {
        return Err(CropError::EmptyRegion {
            rect,
            width: source.width,
            height: source.height,
        });
    }

    let region = extract_region(source, &rect);
    debug!(?rect, width = region.width, height = region.height, "crop region extracted");

    let degrees = request.degrees_rotated.rem_euclid(360);
    let mut cropped = flip(
        rotate_clockwise(&region, degrees as f64),
        request.flip_horizontally,
        request.flip_vertically,
    );

    if degrees % 90 != 0 {
        let width = corner_distance(&points, 0, 1).round() as u32;
        let height = corner_distance(&points, 1, 2).round() as u32;
        cropped = center_crop(&cropped, width, height);
        debug!(degrees, width, height, "rotated crop trimmed to window");
    }

    let (image, sampling) = apply_request_size(
        cropped,
        request.request_width,
        request.request_height,
        request.request_options,
    )?;

    info!(
        width = image.width,
        height = image.height,
        degrees,
        options = ?request.request_options,
        "crop executed"
    );

    Ok(CropOutcome {
        image,
        sample_size: source_sample_size.saturating_mul(sampling),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Matrix, Rect};

    fn request(points: Quad) -> CropRequest {
        CropRequest {
            points,
            degrees_rotated: 0,
            flip_horizontally: false,
            flip_vertically: false,
            aspect_ratio: None,
            request_width: 0,
            request_height: 0,
            request_options: RequestSizeOptions::None,
            output_format: OutputFormat::Jpeg,
            output_quality: 90,
        }
    }

    /// Left half red, right half blue.
    fn two_tone(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..height {
            for x in 0..width {
                let rgb = if x < width / 2 { [255, 0, 0] } else { [0, 0, 255] };
                pixels.extend_from_slice(&rgb);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_plain_crop() {
        let source = two_tone(100, 50);
        let outcome = crop_image(&source, 1, &request(Rect::new(10.0, 5.0, 60.0, 45.0).corners())).unwrap();
        assert_eq!((outcome.image.width, outcome.image.height), (50, 40));
        assert_eq!(outcome.image.pixel(0, 0), [255, 0, 0]);
        assert_eq!(outcome.image.pixel(49, 0), [0, 0, 255]);
        assert_eq!(outcome.sample_size, 1);
    }

    #[test]
    fn test_subsampled_source_divides_points() {
        let source = two_tone(50, 25);
        let outcome = crop_image(&source, 2, &request(Rect::new(20.0, 10.0, 120.0, 50.0).corners())).unwrap();
        assert_eq!((outcome.image.width, outcome.image.height), (50, 20));
        assert_eq!(outcome.sample_size, 2);
    }

    #[test]
    fn test_quarter_turn_and_flip() {
        let source = two_tone(100, 50);
        let mut req = request(Rect::new(0.0, 0.0, 100.0, 50.0).corners());
        req.degrees_rotated = 90;
        let outcome = crop_image(&source, 1, &req).unwrap();
        assert_eq!((outcome.image.width, outcome.image.height), (50, 100));
        // red (left) ends on top after a clockwise quarter turn
        assert_eq!(outcome.image.pixel(25, 0), [255, 0, 0]);
        assert_eq!(outcome.image.pixel(25, 99), [0, 0, 255]);

        req.flip_vertically = true;
        let outcome = crop_image(&source, 1, &req).unwrap();
        assert_eq!(outcome.image.pixel(25, 0), [0, 0, 255]);
    }

    #[test]
    fn test_horizontal_flip() {
        let source = two_tone(100, 50);
        let mut req = request(Rect::new(0.0, 0.0, 100.0, 50.0).corners());
        req.flip_horizontally = true;
        let outcome = crop_image(&source, 1, &req).unwrap();
        assert_eq!(outcome.image.pixel(0, 0), [0, 0, 255]);
    }

    #[test]
    fn test_rotated_window_gets_true_size() {
        let source = DecodedImage::filled(400, 400, [10, 200, 30]);
        // 120x80 window turned 30 degrees about the image center
        let mut m = Matrix::IDENTITY;
        m.post_rotate(-30.0, 200.0, 200.0);
        let points = m.map_quad(&Rect::new(140.0, 160.0, 260.0, 240.0).corners());

        let mut req = request(points);
        req.degrees_rotated = 30;
        let outcome = crop_image(&source, 1, &req).unwrap();
        assert_eq!((outcome.image.width, outcome.image.height), (120, 80));
        let center = outcome.image.pixel(60, 40);
        assert_eq!(center, [10, 200, 30]);
    }

    #[test]
    fn test_square_lock_trims() {
        let source = two_tone(100, 50);
        let mut req = request(Rect::new(0.0, 0.0, 40.0, 30.0).corners());
        req.aspect_ratio = Some(AspectRatio::new(1, 1));
        let outcome = crop_image(&source, 1, &req).unwrap();
        assert_eq!((outcome.image.width, outcome.image.height), (30, 30));
    }

    #[test]
    fn test_request_size_applied() {
        let source = two_tone(100, 50);
        let mut req = request(Rect::new(0.0, 0.0, 100.0, 50.0).corners());
        req.request_width = 50;
        req.request_height = 50;
        req.request_options = RequestSizeOptions::ResizeInside;
        let outcome = crop_image(&source, 1, &req).unwrap();
        assert_eq!((outcome.image.width, outcome.image.height), (50, 25));
    }

    #[test]
    fn test_polygon_outside_image() {
        let source = two_tone(100, 50);
        let result = crop_image(&source, 1, &request(Rect::new(200.0, 0.0, 300.0, 50.0).corners()));
        assert!(matches!(result, Err(CropError::EmptyRegion { .. })));
    }

    #[test]
    fn test_malformed_source() {
        let source = DecodedImage {
            width: 10,
            height: 10,
            pixels: vec![0; 5],
        };
        let result = crop_image(&source, 1, &request(Rect::new(0.0, 0.0, 5.0, 5.0).corners()));
        assert_eq!(
            result,
            Err(CropError::InvalidPixelData {
                expected: 300,
                actual: 5
            })
        );
    }
}

// ============================================================================
// Property-based tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::geometry::Rect;
    use proptest::prelude::*;

    proptest! {
        /// Property: an axis-aligned crop yields exactly the integer rect size,
        /// swapped by quarter turns.
        #[test]
        fn prop_right_angle_crop_dimensions(
            (left, top) in (0u32..50, 0u32..50),
            (width, height) in (1u32..50, 1u32..50),
            quarter in 0i32..4,
        ) {
            let source = DecodedImage::filled(100, 100, [1, 2, 3]);
            let rect = Rect::new(left as f32, top as f32, (left + width) as f32, (top + height) as f32);
            let req = CropRequest {
                points: rect.corners(),
                degrees_rotated: quarter * 90,
                flip_horizontally: false,
                flip_vertically: false,
                aspect_ratio: None,
                request_width: 0,
                request_height: 0,
                request_options: RequestSizeOptions::None,
                output_format: OutputFormat::Png,
                output_quality: 100,
            };
            let outcome = crop_image(&source, 1, &req).unwrap();
            let expected = if quarter % 2 == 0 { (width, height) } else { (height, width) };
            prop_assert_eq!((outcome.image.width, outcome.image.height), expected);
        }
    }
}
