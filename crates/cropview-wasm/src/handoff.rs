//! Bitmap handoff across view teardown.

use crate::types::{from_js, to_js, JsDecodedImage};
use cropview_core::{DecodedImage, HandoffCache, HandoffKey};
use wasm_bindgen::prelude::*;

/// Host-owned store for the decoded bitmap while a crop view is rebuilt.
///
/// ```typescript
/// const key = handoff.deposit(image);
/// const snapshot = session.snapshot(key);
/// // ... view is rebuilt ...
/// const restored = new JsCropSession(config);
/// restored.restore(snapshot);
/// const bitmap = handoff.claim(snapshot.handoffKey);
/// ```
#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct JsHandoffCache {
    inner: HandoffCache<DecodedImage>,
}

#[wasm_bindgen]
impl JsHandoffCache {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsHandoffCache {
        JsHandoffCache::default()
    }

    /// Store an image; the returned key can be claimed once.
    pub fn deposit(&mut self, image: &JsDecodedImage) -> Result<JsValue, JsValue> {
        to_js(&self.deposit_image(image))
    }

    /// Take the image for `key`, or `undefined` if it was already claimed.
    pub fn claim(&mut self, key: JsValue) -> Result<Option<JsDecodedImage>, JsValue> {
        let key: HandoffKey = from_js(key)?;
        Ok(self.claim_image(&key))
    }

    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.inner.len()
    }
}

impl JsHandoffCache {
    pub(crate) fn deposit_image(&mut self, image: &JsDecodedImage) -> HandoffKey {
        self.inner.deposit(image.to_decoded())
    }

    pub(crate) fn claim_image(&mut self, key: &HandoffKey) -> Option<JsDecodedImage> {
        self.inner.claim(key).map(JsDecodedImage::from_decoded)
    }
}
