//! WASM-compatible wrapper types.
//!
//! Images cross the boundary as `JsDecodedImage`; rects and quads cross as
//! flat `Float32Array`s; everything structured goes through
//! `serde_wasm_bindgen`.

use cropview_core::{DecodedImage, Quad, Rect};
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::prelude::*;

/// A decoded RGB image wrapper for JavaScript.
///
/// The pixel data is stored in WASM memory. `pixels()` copies it out to a
/// `Uint8Array`.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create an image from RGB pixel data (3 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer.
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Copy into a core image. The buffer length is checked by the consumer.
    pub(crate) fn to_decoded(&self) -> DecodedImage {
        DecodedImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// `[left, top, right, bottom]`.
pub(crate) fn rect_to_vec(rect: &Rect) -> Vec<f32> {
    vec![rect.left, rect.top, rect.right, rect.bottom]
}

pub(crate) fn quad_to_vec(quad: &Quad) -> Vec<f32> {
    quad.to_vec()
}

pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}
