//! Crop executor and encoder bindings.
//!
//! These run without a session so a host can move the pixel work to a Web
//! Worker: the session's `begin_crop` request is posted to the worker, which
//! calls [`crop_with_request`] and posts the image back for `complete_crop`.
//!
//! ```typescript
//! const { ticket, request } = session.begin_crop();
//! const cropped = crop_with_request(image, 1, request);
//! const result = session.complete_crop(ticket, cropped);
//! const png = encode_image(result.image, 'PNG', 100);
//! ```

use crate::types::{from_js, JsDecodedImage};
use cropview_core::{encode, executor, CropRequest, OutputFormat};
use wasm_bindgen::prelude::*;

/// Output of a crop: the pixels plus the sub-sampling relative to the original.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsCropOutput {
    image: JsDecodedImage,
    sample_size: u32,
}

#[wasm_bindgen]
impl JsCropOutput {
    #[wasm_bindgen(constructor)]
    pub fn new(image: JsDecodedImage, sample_size: u32) -> JsCropOutput {
        JsCropOutput { image, sample_size }
    }

    #[wasm_bindgen(getter)]
    pub fn image(&self) -> JsDecodedImage {
        self.image.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }
}

impl JsCropOutput {
    pub(crate) fn from_outcome(outcome: executor::CropOutcome) -> Self {
        Self {
            image: JsDecodedImage::from_decoded(outcome.image),
            sample_size: outcome.sample_size,
        }
    }

    pub(crate) fn to_outcome(&self) -> executor::CropOutcome {
        executor::CropOutcome {
            image: self.image.to_decoded(),
            sample_size: self.sample_size,
        }
    }
}

/// Crop `image` per a request produced by `JsCropSession.begin_crop`.
///
/// `source_sample_size` is 1 for a full-resolution image, otherwise the
/// sample size the session displayed the image with.
#[wasm_bindgen]
pub fn crop_with_request(
    image: &JsDecodedImage,
    source_sample_size: u32,
    request: JsValue,
) -> Result<JsCropOutput, JsValue> {
    let request: CropRequest = from_js(request)?;
    run_crop(image, source_sample_size, &request)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

pub(crate) fn run_crop(
    image: &JsDecodedImage,
    source_sample_size: u32,
    request: &CropRequest,
) -> Result<JsCropOutput, executor::CropError> {
    executor::crop_image(&image.to_decoded(), source_sample_size, request)
        .map(JsCropOutput::from_outcome)
}

/// Encode RGB pixel data to JPEG bytes. Quality is clamped to 1-100.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode RGB pixel data to PNG bytes.
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode an image as `"JPEG"` or `"PNG"`.
#[wasm_bindgen]
pub fn encode_image(image: &JsDecodedImage, format: &str, quality: u8) -> Result<Vec<u8>, JsValue> {
    let format = parse_format(format).ok_or_else(|| JsValue::from_str(&format!("Unknown output format: {format}")))?;
    encode::encode(&image.to_decoded(), format, quality).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_format(format: &str) -> Option<OutputFormat> {
    match format.to_ascii_uppercase().as_str() {
        "JPEG" | "JPG" => Some(OutputFormat::Jpeg),
        "PNG" => Some(OutputFormat::Png),
        _ => None,
    }
}

/// Note: functions returning `Result<T, JsValue>` only work on wasm32 targets;
/// the native tests exercise the shared helpers.
#[cfg(test)]
mod tests {
    use super::*;
    use cropview_core::{Rect, RequestSizeOptions};

    fn request(rect: Rect) -> CropRequest {
        CropRequest {
            points: rect.corners(),
            degrees_rotated: 90,
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

    #[test]
    fn test_run_crop_rotates() {
        let image = JsDecodedImage::new(40, 20, vec![7u8; 40 * 20 * 3]);
        let output = run_crop(&image, 1, &request(Rect::new(0.0, 0.0, 30.0, 10.0))).unwrap();
        assert_eq!((output.image().width(), output.image().height()), (10, 30));
        assert_eq!(output.sample_size(), 1);
        assert_eq!(output.to_outcome().image.width, 10);
    }

    #[test]
    fn test_run_crop_reports_bad_buffer() {
        let image = JsDecodedImage::new(40, 20, vec![7u8; 10]);
        let result = run_crop(&image, 1, &request(Rect::new(0.0, 0.0, 30.0, 10.0)));
        assert!(matches!(result, Err(executor::CropError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("png"), Some(OutputFormat::Png));
        assert_eq!(parse_format("JPG"), Some(OutputFormat::Jpeg));
        assert_eq!(parse_format("webp"), None);
    }
}
