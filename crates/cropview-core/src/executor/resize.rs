//! Post-crop resizing to the requested output size.

use super::CropError;
use crate::bitmap::{calculate_sample_size, DecodedImage, FilterType};
use crate::config::RequestSizeOptions;

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns [`CropError::ResizeFailed`] for a zero target size or a pixel
/// buffer that does not match the image dimensions.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, CropError> {
    if width == 0 || height == 0 {
        return Err(CropError::ResizeFailed(format!(
            "target size {width}x{height} is empty"
        )));
    }

    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| CropError::ResizeFailed("Failed to create RgbImage".to_string()))?;

    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Apply the requested output size.
///
/// Returns the resized image and the power-of-two sub-sampling factor used
/// (1 unless `options` is [`RequestSizeOptions::Sampling`]). A zero request
/// on either axis leaves the image untouched.
pub fn apply_request_size(
    image: DecodedImage,
    req_width: u32,
    req_height: u32,
    options: RequestSizeOptions,
) -> Result<(DecodedImage, u32), CropError> {
    if req_width == 0 || req_height == 0 {
        return Ok((image, 1));
    }

    match options {
        RequestSizeOptions::None => Ok((image, 1)),
        RequestSizeOptions::Sampling => {
            let sample_size = calculate_sample_size(image.width, image.height, req_width, req_height);
            if sample_size == 1 {
                return Ok((image, 1));
            }
            let resized = resize(
                &image,
                (image.width / sample_size).max(1),
                (image.height / sample_size).max(1),
                FilterType::Bilinear,
            )?;
            Ok((resized, sample_size))
        }
        RequestSizeOptions::ResizeExact => {
            Ok((resize(&image, req_width, req_height, FilterType::Bilinear)?, 1))
        }
        RequestSizeOptions::ResizeInside | RequestSizeOptions::ResizeFit => {
            let scale = (image.width as f32 / req_width as f32)
                .max(image.height as f32 / req_height as f32);
            // inside only ever shrinks
            if scale > 1.0 || options == RequestSizeOptions::ResizeFit {
                let width = ((image.width as f32 / scale) as u32).max(1);
                let height = ((image.height as f32 / scale) as u32).max(1);
                return Ok((resize(&image, width, height, FilterType::Bilinear)?, 1));
            }
            Ok((image, 1))
        }
    }
}
