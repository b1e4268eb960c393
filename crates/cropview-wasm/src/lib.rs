//! Cropview WASM - WebAssembly bindings for Cropview
//!
//! This crate exposes the cropview-core crop window engine to
//! JavaScript/TypeScript hosts.
//!
//! # Module Structure
//!
//! - `session` - The interactive crop session (gestures, commands, events)
//! - `crop` - Crop executor and output encoders, usable from a Web Worker
//! - `handoff` - Bitmap store for view teardown and restore
//! - `types` - WASM-compatible wrapper types for image data
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession, JsDecodedImage, encode_image } from '@cropview/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const session = new JsCropSession({ guidelines: 'ON_TOUCH' });
//! session.on_view_resized(640, 480);
//! session.on_image_loaded(bitmap.width, bitmap.height, 1, exifOrientation);
//!
//! // ... forward pointer events, draw crop_window_rect() ...
//!
//! const result = session.crop(new JsDecodedImage(bitmap.width, bitmap.height, rgb), 1);
//! const jpeg = encode_image(result.image, 'JPEG', 90);
//! ```

use cropview_core::calculate_sample_size;
use wasm_bindgen::prelude::*;

mod crop;
mod handoff;
mod session;
mod types;

// Re-export public types
pub use crop::{crop_with_request, encode_image, encode_jpeg, encode_png, JsCropOutput};
pub use handoff::JsHandoffCache;
pub use session::{JsCropResult, JsCropSession, JsSessionEvent};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Largest power-of-two sample size that keeps the decoded image at least
/// `req_width` x `req_height`.
#[wasm_bindgen]
pub fn sample_size_for(width: u32, height: u32, req_width: u32, req_height: u32) -> u32 {
    calculate_sample_size(width, height, req_width, req_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_sample_size_for() {
        assert_eq!(sample_size_for(8000, 6000, 2000, 1500), 2);
        assert_eq!(sample_size_for(100, 100, 200, 200), 1);
    }
}
