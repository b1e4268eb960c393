//! Crop session bindings.
//!
//! `JsCropSession` wraps the core session for a JavaScript host that draws the
//! overlay and forwards pointer events. Tickets, snapshots, selections and
//! events cross as plain objects through `serde_wasm_bindgen`.
//!
//! ```typescript
//! const session = new JsCropSession({ fixAspectRatio: true, aspectRatio: { x: 4, y: 3 } });
//! session.on_view_resized(canvas.width, canvas.height);
//! session.on_image_loaded(image.width, image.height, 1, exifOrientation);
//!
//! canvas.onpointerdown = (e) => session.pointer_down(e.offsetX, e.offsetY);
//! canvas.onpointermove = (e) => session.pointer_move(e.offsetX, e.offsetY);
//! canvas.onpointerup = () => session.pointer_up();
//!
//! for (const event of session.take_events()) {
//!   if (event.type === 'cropOverlayReleased') enableConfirm(event.rect);
//! }
//! ```

use crate::crop::{run_crop, JsCropOutput};
use crate::types::{from_js, quad_to_vec, rect_to_vec, to_js, JsDecodedImage};
use cropview_core::{
    CropConfig, CropSession, CropShape, CropTicket, DragHandle, FlipAxis, Guidelines, HandoffKey,
    ImageSource, IntRect, LoadError, LoadTicket, Orientation, ScaleType, SessionEvent,
    SessionSnapshot, SessionState,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Session event as seen from JavaScript, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JsSessionEvent {
    #[serde(rename_all = "camelCase")]
    CropWindowChanged { in_progress: bool },
    CropOverlayMoved { rect: Option<IntRect> },
    CropOverlayReleased { rect: Option<IntRect> },
    ImageLoaded,
    ImageLoadFailed { message: String },
}

impl From<SessionEvent> for JsSessionEvent {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::CropWindowChanged { in_progress } => {
                JsSessionEvent::CropWindowChanged { in_progress }
            }
            SessionEvent::CropOverlayMoved(rect) => JsSessionEvent::CropOverlayMoved { rect },
            SessionEvent::CropOverlayReleased(rect) => JsSessionEvent::CropOverlayReleased { rect },
            SessionEvent::ImageLoaded => JsSessionEvent::ImageLoaded,
            SessionEvent::ImageLoadFailed(error) => JsSessionEvent::ImageLoadFailed {
                message: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsCropStart {
    ticket: CropTicket,
    request: cropview_core::CropRequest,
}

/// Interactive crop session.
#[wasm_bindgen]
pub struct JsCropSession {
    inner: CropSession,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Create a session from a (partial) configuration object.
    ///
    /// `undefined` or `null` uses the defaults. Invalid values throw.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsCropSession, JsValue> {
        let config: CropConfig = if config.is_undefined() || config.is_null() {
            CropConfig::default()
        } else {
            from_js(config)?
        };
        Self::from_config(config).map_err(|e| JsValue::from_str(&e))
    }

    /// `NO_IMAGE`, `IMAGE_LOADING`, `IMAGE_READY` or `DRAGGING`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.inner.state()).to_string()
    }

    // Image lifecycle

    /// Start an asynchronous load; returns the ticket to pass back on completion.
    pub fn begin_loading(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.begin_loading())
    }

    /// Complete a load. `orientation` is the EXIF orientation tag (1-8).
    /// Returns `false` for a stale ticket.
    pub fn complete_loading(
        &mut self,
        ticket: JsValue,
        width: u32,
        height: u32,
        sample_size: u32,
        orientation: u32,
    ) -> Result<bool, JsValue> {
        let ticket: LoadTicket = from_js(ticket)?;
        let source = image_source(width, height, sample_size, orientation);
        if !self.inner.complete_loading(ticket, Ok(source)) {
            warn_stale("image load");
            return Ok(false);
        }
        Ok(true)
    }

    /// Report a failed load. Returns `false` for a stale ticket.
    pub fn fail_loading(&mut self, ticket: JsValue, message: String) -> Result<bool, JsValue> {
        let ticket: LoadTicket = from_js(ticket)?;
        if !self.inner.complete_loading(ticket, Err(LoadError::Decode(message))) {
            warn_stale("image load");
            return Ok(false);
        }
        Ok(true)
    }

    /// Show an image decoded synchronously by the host. `orientation` is the
    /// EXIF orientation tag; unknown values show the image as decoded.
    pub fn on_image_loaded(
        &mut self,
        width: u32,
        height: u32,
        sample_size: u32,
        orientation: u32,
    ) -> Result<(), JsValue> {
        let source = image_source(width, height, sample_size, orientation);
        self.inner
            .on_image_loaded(source)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn on_view_resized(&mut self, width: f32, height: f32) {
        self.inner.on_view_resized(width, height);
    }

    pub fn clear_image(&mut self) {
        self.inner.clear_image();
    }

    // Gestures

    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.inner.pointer_down(x, y)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.inner.pointer_move(x, y)
    }

    pub fn pointer_up(&mut self) -> bool {
        self.inner.pointer_up()
    }

    pub fn pointer_cancel(&mut self) -> bool {
        self.inner.pointer_cancel()
    }

    pub fn pinch(&mut self, focus_x: f32, focus_y: f32, span_x: f32, span_y: f32) -> bool {
        self.inner.pinch(focus_x, focus_y, span_x, span_y)
    }

    // Commands

    pub fn rotate(&mut self, degrees: i32) -> bool {
        self.inner.rotate(degrees)
    }

    pub fn rotate_by_step(&mut self, clockwise: bool) -> bool {
        self.inner.rotate_by_step(clockwise)
    }

    pub fn set_rotated_degrees(&mut self, degrees: i32) -> bool {
        self.inner.set_rotated_degrees(degrees)
    }

    pub fn flip_horizontally(&mut self) -> bool {
        self.inner.flip(FlipAxis::Horizontal)
    }

    pub fn flip_vertically(&mut self) -> bool {
        self.inner.flip(FlipAxis::Vertical)
    }

    pub fn reset(&mut self) -> bool {
        self.inner.reset()
    }

    // Live configuration

    pub fn set_aspect_ratio(&mut self, x: i32, y: i32) -> Result<(), JsValue> {
        self.inner
            .set_aspect_ratio(x, y)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_fixed_aspect_ratio(&mut self, fixed: bool) {
        self.inner.set_fixed_aspect_ratio(fixed);
    }

    pub fn clear_aspect_ratio(&mut self) {
        self.inner.clear_aspect_ratio();
    }

    /// `"RECTANGLE"` or `"OVAL"`.
    pub fn set_crop_shape(&mut self, shape: JsValue) -> Result<(), JsValue> {
        let shape: CropShape = from_js(shape)?;
        self.inner.set_crop_shape(shape);
        Ok(())
    }

    /// `"OFF"`, `"ON_TOUCH"` or `"ON"`.
    pub fn set_guidelines(&mut self, guidelines: JsValue) -> Result<(), JsValue> {
        let guidelines: Guidelines = from_js(guidelines)?;
        self.inner.set_guidelines(guidelines);
        Ok(())
    }

    pub fn set_scale_type(&mut self, scale_type: JsValue) -> Result<(), JsValue> {
        let scale_type: ScaleType = from_js(scale_type)?;
        self.inner.set_scale_type(scale_type);
        Ok(())
    }

    pub fn set_snap_radius(&mut self, snap_radius: f32) {
        self.inner.set_snap_radius(snap_radius);
    }

    pub fn set_multi_touch_enabled(&mut self, enabled: bool) {
        self.inner.set_multi_touch_enabled(enabled);
    }

    pub fn set_auto_zoom_enabled(&mut self, enabled: bool) {
        self.inner.set_auto_zoom_enabled(enabled);
    }

    pub fn set_max_zoom(&mut self, max_zoom: f32) {
        self.inner.set_max_zoom(max_zoom);
    }

    pub fn set_min_crop_result_size(&mut self, width: i32, height: i32) {
        self.inner.set_min_crop_result_size(width, height);
    }

    pub fn set_max_crop_result_size(&mut self, width: i32, height: i32) {
        self.inner.set_max_crop_result_size(width, height);
    }

    /// `{ left, top, right, bottom }` in source pixels, or `null` to clear.
    pub fn set_initial_crop_rect(&mut self, rect: JsValue) -> Result<(), JsValue> {
        let rect: Option<IntRect> = if rect.is_undefined() || rect.is_null() {
            None
        } else {
            Some(from_js(rect)?)
        };
        self.inner.set_initial_crop_rect(rect);
        Ok(())
    }

    // Rendering state

    /// Crop window in view coordinates as `[left, top, right, bottom]`.
    pub fn crop_window_rect(&self) -> Vec<f32> {
        rect_to_vec(&self.inner.crop_window_rect())
    }

    /// Displayed image corners as 8 floats (TL, TR, BR, BL).
    pub fn image_points(&self) -> Vec<f32> {
        quad_to_vec(self.inner.image_points())
    }

    /// Crop window corners in original source pixels.
    pub fn crop_points(&self) -> Option<Vec<f32>> {
        self.inner.crop_points().as_ref().map(quad_to_vec)
    }

    pub fn crop_rect(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.crop_rect())
    }

    pub fn whole_image_rect(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.whole_image_rect())
    }

    #[wasm_bindgen(getter)]
    pub fn degrees_rotated(&self) -> i32 {
        self.inner.degrees_rotated()
    }

    #[wasm_bindgen(getter)]
    pub fn flipped_horizontally(&self) -> bool {
        self.inner.is_flipped_horizontally()
    }

    #[wasm_bindgen(getter)]
    pub fn flipped_vertically(&self) -> bool {
        self.inner.is_flipped_vertically()
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f32 {
        self.inner.zoom()
    }

    pub fn guidelines_visible(&self) -> bool {
        self.inner.guidelines_visible()
    }

    /// Grabbed handle while dragging, e.g. `"TOP_LEFT"` or `"CENTER"`.
    pub fn active_handle(&self) -> Option<String> {
        self.inner.active_handle().map(|handle| handle_name(handle).to_string())
    }

    /// Drain queued events as an array of `{ type, ... }` objects.
    pub fn take_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.drain_events())
    }

    // Save / restore

    /// Capture restorable state. `handoff_key` comes from `JsHandoffCache.deposit`.
    pub fn snapshot(&self, handoff_key: JsValue) -> Result<JsValue, JsValue> {
        let key: Option<HandoffKey> = if handoff_key.is_undefined() || handoff_key.is_null() {
            None
        } else {
            Some(from_js(handoff_key)?)
        };
        to_js(&self.inner.snapshot(key))
    }

    /// Restore a snapshot before the image is loaded again.
    pub fn restore(&mut self, snapshot: JsValue) -> Result<bool, JsValue> {
        let snapshot: SessionSnapshot = from_js(snapshot)?;
        Ok(self.inner.restore(&snapshot))
    }

    // Crop

    /// Crop polygon, rects, rotation and sample size, or `null` without an image.
    pub fn commit(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.commit())
    }

    /// Start a crop: `{ ticket, request }`, or `null` without an image.
    pub fn begin_crop(&mut self) -> Result<JsValue, JsValue> {
        let start = self
            .inner
            .begin_crop()
            .map(|(ticket, request)| JsCropStart { ticket, request });
        to_js(&start)
    }

    /// Hand back the output of `crop_with_request`. Returns `null` for a
    /// stale ticket.
    pub fn complete_crop(
        &mut self,
        ticket: JsValue,
        output: &JsCropOutput,
    ) -> Result<Option<JsCropResult>, JsValue> {
        let ticket: CropTicket = from_js(ticket)?;
        match self.inner.complete_crop(ticket, Ok(output.to_outcome())) {
            Some(result) => JsCropResult::try_from(result).map(Some),
            None => {
                warn_stale("crop");
                Ok(None)
            }
        }
    }

    /// Crop synchronously on the calling thread.
    pub fn crop(
        &mut self,
        image: &JsDecodedImage,
        source_sample_size: u32,
    ) -> Result<JsCropResult, JsValue> {
        let (ticket, request) = self
            .inner
            .begin_crop()
            .ok_or_else(|| JsValue::from_str("No image loaded"))?;
        let outcome = run_crop(image, source_sample_size, &request).map(|output| output.to_outcome());
        let result = self
            .inner
            .complete_crop(ticket, outcome)
            .ok_or_else(|| JsValue::from_str("Crop superseded"))?;
        JsCropResult::try_from(result)
    }
}

impl JsCropSession {
    pub(crate) fn from_config(config: CropConfig) -> Result<Self, String> {
        CropSession::new(config)
            .map(|inner| Self { inner })
            .map_err(|e| e.to_string())
    }

    pub(crate) fn drain_events(&mut self) -> Vec<JsSessionEvent> {
        self.inner
            .take_events()
            .into_iter()
            .map(JsSessionEvent::from)
            .collect()
    }
}

/// A finished crop: the output image plus the selection it came from.
#[wasm_bindgen]
pub struct JsCropResult {
    output: JsCropOutput,
    selection: cropview_core::CropSelection,
    sample_size: u32,
}

#[wasm_bindgen]
impl JsCropResult {
    #[wasm_bindgen(getter)]
    pub fn image(&self) -> JsDecodedImage {
        self.output.image()
    }

    /// Effective sample size of the output relative to the original image.
    #[wasm_bindgen(getter)]
    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }

    /// `{ cropPoints, cropRect, wholeImageRect, degreesRotated, ... }`
    pub fn selection(&self) -> Result<JsValue, JsValue> {
        to_js(&self.selection)
    }
}

impl TryFrom<cropview_core::CropResult> for JsCropResult {
    type Error = JsValue;

    fn try_from(result: cropview_core::CropResult) -> Result<Self, JsValue> {
        let outcome = result
            .outcome
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            output: JsCropOutput::from_outcome(outcome),
            selection: result.selection,
            sample_size: result.sample_size,
        })
    }
}

fn image_source(width: u32, height: u32, sample_size: u32, orientation: u32) -> ImageSource {
    ImageSource::new(width, height)
        .with_sample_size(sample_size)
        .with_orientation(Orientation::from(orientation))
}

fn warn_stale(what: &str) {
    web_sys::console::warn_1(&JsValue::from_str(&format!("cropview: stale {what} result ignored")));
}

fn handle_name(handle: DragHandle) -> &'static str {
    match handle {
        DragHandle::TopLeft => "TOP_LEFT",
        DragHandle::TopRight => "TOP_RIGHT",
        DragHandle::BottomLeft => "BOTTOM_LEFT",
        DragHandle::BottomRight => "BOTTOM_RIGHT",
        DragHandle::Left => "LEFT",
        DragHandle::Top => "TOP",
        DragHandle::Right => "RIGHT",
        DragHandle::Bottom => "BOTTOM",
        DragHandle::Center => "CENTER",
    }
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::NoImage => "NO_IMAGE",
        SessionState::ImageLoading => "IMAGE_LOADING",
        SessionState::ImageReady => "IMAGE_READY",
        SessionState::Dragging => "DRAGGING",
    }
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn config_object(key: &str, value: JsValue) -> JsValue {
        let config = js_sys::Object::new();
        js_sys::Reflect::set(&config, &key.into(), &value).unwrap();
        config.into()
    }

    #[wasm_bindgen_test]
    fn test_constructor_accepts_partial_config() {
        assert!(JsCropSession::new(JsValue::UNDEFINED).is_ok());
        assert!(JsCropSession::new(config_object("maxZoom", 8.0.into())).is_ok());
        assert!(JsCropSession::new(config_object("maxZoom", (-1.0).into())).is_err());
    }

    #[wasm_bindgen_test]
    fn test_snapshot_restore_through_js() {
        let mut session = JsCropSession::new(JsValue::NULL).unwrap();
        session.on_view_resized(1000.0, 1000.0);
        session.on_image_loaded(1000, 1000, 1, 1).unwrap();
        assert!(session.rotate(90));

        let snapshot = session.snapshot(JsValue::NULL).unwrap();
        let degrees = js_sys::Reflect::get(&snapshot, &"degreesRotated".into()).unwrap();
        assert_eq!(degrees.as_f64(), Some(90.0));

        let mut restored = JsCropSession::new(JsValue::NULL).unwrap();
        assert!(restored.restore(snapshot).unwrap());
        restored.on_view_resized(1000.0, 1000.0);
        restored.on_image_loaded(1000, 1000, 1, 1).unwrap();
        assert_eq!(restored.degrees_rotated(), 90);
    }

    #[wasm_bindgen_test]
    fn test_enum_setters_reject_unknown_names() {
        let mut session = JsCropSession::new(JsValue::NULL).unwrap();
        assert!(session.set_crop_shape("OVAL".into()).is_ok());
        assert!(session.set_guidelines("SOMETIMES".into()).is_err());
    }
}
