//! Crop session orchestrator.
//!
//! [`CropSession`] owns the overlay and the viewport transform and drives them
//! from host events: image loads, view resizes, pointer gestures and
//! rotate/flip/reset commands. Its state machine is
//!
//! ```text
//! NO_IMAGE -> IMAGE_LOADING -> IMAGE_READY <-> DRAGGING
//!                  |
//!                  +-> NO_IMAGE (load failed)
//! ```
//!
//! Asynchronous work (image decode, pixel crop) runs outside the session. Each
//! operation hands out a ticket; results carrying an outdated ticket are
//! discarded. Changes are reported as [`SessionEvent`]s that the single
//! consumer drains with [`CropSession::take_events`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bitmap::Orientation;
use crate::config::{ConfigError, CropConfig, CropShape, Guidelines, RequestSizeOptions, ScaleType};
use crate::executor::{CropError, CropOutcome, CropRequest};
use crate::geometry::{AspectRatio, IntRect, Quad, Rect};
use crate::handoff::HandoffKey;
use crate::overlay::CropOverlay;
use crate::viewport::ViewportTransform;
use crate::window::DragHandle;

/// Lifecycle state of a [`CropSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    NoImage,
    ImageLoading,
    ImageReady,
    Dragging,
}

/// A decoded image as reported by the host's image source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    /// Decoded bitmap width.
    pub width: u32,
    /// Decoded bitmap height.
    pub height: u32,
    /// Divisor the original was sub-sampled by during decode.
    pub sample_size: u32,
    /// Clockwise rotation the image should be shown with (e.g. from EXIF).
    pub rotation: i32,
    /// Mirroring the image should be shown with, on top of the rotation.
    #[serde(default)]
    pub flip_horizontally: bool,
    #[serde(default)]
    pub flip_vertically: bool,
}

impl ImageSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sample_size: 1,
            rotation: 0,
            flip_horizontally: false,
            flip_vertically: false,
        }
    }

    pub fn with_sample_size(mut self, sample_size: u32) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_flips(mut self, horizontal: bool, vertical: bool) -> Self {
        self.flip_horizontally = horizontal;
        self.flip_vertically = vertical;
        self
    }

    /// Rotation and mirroring from an EXIF orientation tag.
    pub fn with_orientation(self, orientation: Orientation) -> Self {
        let (horizontal, vertical) = orientation.flips();
        self.with_rotation(orientation.rotation_degrees())
            .with_flips(horizontal, vertical)
    }
}

/// Failure of the host's image source, forwarded to the consumer as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Image source unavailable: {0}")]
    Unavailable(String),

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Identifies one image load started with [`CropSession::begin_loading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadTicket(u64);

/// Identifies one crop started with [`CropSession::begin_crop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// Notifications queued for the session's consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The crop window changed; `in_progress` while a gesture is running.
    CropWindowChanged { in_progress: bool },
    /// The window moved during a gesture. Carries the crop rect in source pixels.
    CropOverlayMoved(Option<IntRect>),
    /// A gesture ended. Carries the crop rect in source pixels.
    CropOverlayReleased(Option<IntRect>),
    ImageLoaded,
    ImageLoadFailed(LoadError),
}

/// Session state that survives a host lifecycle change.
///
/// The crop window is stored in unrotated bitmap space so it can be mapped
/// into whatever layout the restored view ends up with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub crop_window_rect: Rect,
    pub degrees_rotated: i32,
    pub flip_horizontally: bool,
    pub flip_vertically: bool,
    pub crop_shape: CropShape,
    pub auto_zoom_enabled: bool,
    pub max_zoom: f32,
    pub loaded_sample_size: u32,
    pub initial_crop_rect: Option<IntRect>,
    /// Key of the bitmap left in a [`HandoffCache`](crate::HandoffCache).
    pub handoff_key: Option<HandoffKey>,
}

/// What the host needs to crop the selected region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSelection {
    /// Crop window corners in original source pixels.
    pub crop_points: Quad,
    pub crop_rect: IntRect,
    pub whole_image_rect: IntRect,
    pub degrees_rotated: i32,
    pub flip_horizontally: bool,
    pub flip_vertically: bool,
    /// Sample size of the displayed bitmap.
    pub sample_size: u32,
}

/// Outcome of a crop paired with the selection it was made from.
#[derive(Debug, Clone, PartialEq)]
pub struct CropResult {
    pub outcome: Result<CropOutcome, CropError>,
    pub selection: CropSelection,
    /// Effective sample size of the output relative to the original.
    pub sample_size: u32,
}

#[derive(Debug, Clone, Copy)]
struct PendingRestore {
    rect: Rect,
    degrees: i32,
}

/// One interactive crop view.
#[derive(Debug)]
pub struct CropSession {
    config: CropConfig,
    state: SessionState,
    overlay: CropOverlay,
    viewport: ViewportTransform,
    events: Vec<SessionEvent>,
    next_ticket: u64,
    loading: Option<LoadTicket>,
    cropping: Option<(CropTicket, CropSelection)>,
    pending_restore: Option<PendingRestore>,
    pinching: bool,
}

impl CropSession {
    /// Build a session from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found by [`CropConfig::validate`].
    pub fn new(config: CropConfig) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            warn!(error = %e, "rejected crop configuration");
            return Err(e);
        }
        Ok(Self {
            overlay: CropOverlay::new(&config),
            viewport: ViewportTransform::new(&config),
            config,
            state: SessionState::NoImage,
            events: Vec::new(),
            next_ticket: 0,
            loading: None,
            cropping: None,
            pending_restore: None,
            pinching: false,
        })
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn overlay(&self) -> &CropOverlay {
        &self.overlay
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn has_image(&self) -> bool {
        self.viewport.has_image()
    }

    /// Crop window in display space.
    pub fn crop_window_rect(&self) -> Rect {
        self.overlay.rect()
    }

    /// Displayed image corners in display space.
    pub fn image_points(&self) -> &Quad {
        self.viewport.image_points()
    }

    /// Crop window corners in original source pixels.
    pub fn crop_points(&self) -> Option<Quad> {
        self.has_image()
            .then(|| self.viewport.crop_points(&self.overlay))
    }

    pub fn crop_rect(&self) -> Option<IntRect> {
        self.viewport.crop_rect(&self.overlay)
    }

    pub fn whole_image_rect(&self) -> Option<IntRect> {
        self.viewport.whole_image_rect()
    }

    pub fn degrees_rotated(&self) -> i32 {
        self.viewport.degrees_rotated()
    }

    pub fn is_flipped_horizontally(&self) -> bool {
        self.viewport.is_flipped_horizontally()
    }

    pub fn is_flipped_vertically(&self) -> bool {
        self.viewport.is_flipped_vertically()
    }

    pub fn zoom(&self) -> f32 {
        self.viewport.zoom()
    }

    pub fn guidelines_visible(&self) -> bool {
        self.overlay.guidelines_visible()
    }

    pub fn active_handle(&self) -> Option<DragHandle> {
        self.overlay.active_handle()
    }

    /// Drain the queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Image lifecycle
    // ------------------------------------------------------------------

    /// Start an asynchronous image load. The current image is dropped and any
    /// earlier load ticket becomes stale.
    pub fn begin_loading(&mut self) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket());
        self.drop_image();
        self.loading = Some(ticket);
        self.set_state(SessionState::ImageLoading);
        ticket
    }

    /// Deliver the result of an image load. Returns `false` when the ticket is
    /// stale and the result was discarded.
    pub fn complete_loading(
        &mut self,
        ticket: LoadTicket,
        result: Result<ImageSource, LoadError>,
    ) -> bool {
        if self.loading != Some(ticket) {
            warn!(ticket = ticket.0, "discarding stale image load result");
            return false;
        }
        self.loading = None;

        if let Err(e) = result.and_then(|source| self.on_image_loaded(source)) {
            warn!(error = %e, "image load failed");
            self.set_state(SessionState::NoImage);
            self.events.push(SessionEvent::ImageLoadFailed(e));
        }
        true
    }

    /// Show a decoded image. Supersedes any load in flight.
    ///
    /// The configured initial rotation, when set, overrides the source's.
    ///
    /// # Errors
    ///
    /// [`LoadError::EmptyImage`] when either dimension is zero.
    pub fn on_image_loaded(&mut self, source: ImageSource) -> Result<(), LoadError> {
        if source.width == 0 || source.height == 0 {
            return Err(LoadError::EmptyImage {
                width: source.width,
                height: source.height,
            });
        }

        self.loading = None;
        self.cropping = None;
        // a gesture on the previous image does not carry over
        self.overlay.pointer_up();
        self.pinching = false;
        let degrees = self.config.initial_rotation.unwrap_or(source.rotation);
        self.viewport.load_image(
            &mut self.overlay,
            source.width,
            source.height,
            source.sample_size,
            degrees,
        );
        if source.flip_horizontally || source.flip_vertically {
            self.viewport.set_source_flips(
                &mut self.overlay,
                source.flip_horizontally,
                source.flip_vertically,
            );
        }
        info!(
            width = source.width,
            height = source.height,
            sample_size = source.sample_size,
            degrees,
            "image loaded"
        );

        self.set_state(SessionState::ImageReady);
        self.events.push(SessionEvent::ImageLoaded);
        self.apply_pending_restore();
        Ok(())
    }

    /// The view was laid out at a new size.
    pub fn on_view_resized(&mut self, width: f32, height: f32) {
        let (old_width, old_height) = self.viewport.view_size();
        self.viewport.set_view_size(width, height);
        if !self.has_image() {
            return;
        }

        let center = self.state != SessionState::Dragging;
        self.viewport.apply(&mut self.overlay, center);
        if self.pending_restore.is_some() {
            self.apply_pending_restore();
        } else if old_width > 0.0
            && old_height > 0.0
            && (old_width != width || old_height != height)
        {
            self.viewport
                .handle_crop_window_changed(&mut self.overlay, false);
            self.events
                .push(SessionEvent::CropWindowChanged { in_progress: false });
        }
    }

    /// Drop the image, the pending restore and every outstanding ticket.
    pub fn clear_image(&mut self) {
        self.drop_image();
        self.loading = None;
        self.pending_restore = None;
        self.set_state(SessionState::NoImage);
    }

    fn drop_image(&mut self) {
        self.cropping = None;
        self.pinching = false;
        if self.has_image() {
            self.viewport.clear(&mut self.overlay);
        }
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Returns `true` if a handle was grabbed and a drag started.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        if self.state != SessionState::ImageReady {
            return false;
        }
        if !self.overlay.pointer_down(x, y) {
            return false;
        }
        self.set_state(SessionState::Dragging);
        true
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        if self.state != SessionState::Dragging || !self.overlay.pointer_move(x, y) {
            return false;
        }
        self.crop_window_changed(true);
        true
    }

    /// End the gesture; the settled window may trigger auto-zoom.
    pub fn pointer_up(&mut self) -> bool {
        let dragged = self.overlay.pointer_up();
        let pinched = std::mem::take(&mut self.pinching);
        if self.state == SessionState::Dragging {
            self.set_state(SessionState::ImageReady);
        }
        if dragged || pinched {
            self.crop_window_changed(false);
        }
        dragged || pinched
    }

    /// A cancelled gesture settles like a release.
    pub fn pointer_cancel(&mut self) -> bool {
        self.pointer_up()
    }

    /// Two-finger resize around `(focus_x, focus_y)` with spans `span_x`/`span_y`.
    pub fn pinch(&mut self, focus_x: f32, focus_y: f32, span_x: f32, span_y: f32) -> bool {
        if !matches!(self.state, SessionState::ImageReady | SessionState::Dragging) {
            return false;
        }
        if !self.overlay.pinch(focus_x, focus_y, span_x, span_y) {
            return false;
        }
        self.pinching = true;
        self.crop_window_changed(true);
        true
    }

    fn crop_window_changed(&mut self, in_progress: bool) {
        self.viewport
            .handle_crop_window_changed(&mut self.overlay, in_progress);
        let rect = self.crop_rect();
        self.events
            .push(SessionEvent::CropWindowChanged { in_progress });
        self.events.push(if in_progress {
            SessionEvent::CropOverlayMoved(rect)
        } else {
            SessionEvent::CropOverlayReleased(rect)
        });
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Rotate by `degrees`, clockwise when positive. Returns `false` when the
    /// command was ignored.
    pub fn rotate(&mut self, degrees: i32) -> bool {
        if !self.accepts_commands() {
            return false;
        }
        if !self.config.allow_rotation {
            debug!(degrees, "rotation disabled, ignoring");
            return false;
        }
        self.viewport.rotate(&mut self.overlay, degrees);
        self.settled();
        true
    }

    /// Rotate by the configured step. Stepping counter-clockwise needs
    /// `allow_counter_rotation`.
    pub fn rotate_by_step(&mut self, clockwise: bool) -> bool {
        if !clockwise && !self.config.allow_counter_rotation {
            debug!("counter rotation disabled, ignoring");
            return false;
        }
        let step = self.config.rotation_degrees;
        self.rotate(if clockwise { step } else { -step })
    }

    /// Rotate to an absolute angle.
    pub fn set_rotated_degrees(&mut self, degrees: i32) -> bool {
        if !self.accepts_commands() || !self.config.allow_rotation {
            return false;
        }
        self.viewport
            .set_degrees_rotated(&mut self.overlay, degrees.rem_euclid(360));
        self.settled();
        true
    }

    pub fn flip(&mut self, axis: FlipAxis) -> bool {
        if !self.accepts_commands() {
            return false;
        }
        if !self.config.allow_flipping {
            debug!(?axis, "flipping disabled, ignoring");
            return false;
        }
        match axis {
            FlipAxis::Horizontal => self.viewport.flip_horizontally(&mut self.overlay),
            FlipAxis::Vertical => self.viewport.flip_vertically(&mut self.overlay),
        }
        self.settled();
        true
    }

    /// Back to the loaded orientation with a fresh crop window.
    pub fn reset(&mut self) -> bool {
        if !self.accepts_commands() {
            return false;
        }
        self.viewport.reset_crop_rect(&mut self.overlay);
        self.settled();
        true
    }

    fn accepts_commands(&self) -> bool {
        self.state == SessionState::ImageReady
    }

    fn settled(&mut self) {
        self.events
            .push(SessionEvent::CropWindowChanged { in_progress: false });
    }

    // ------------------------------------------------------------------
    // Live configuration
    // ------------------------------------------------------------------

    /// Lock the window to `x:y`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NonPositiveAspectRatio`] when either component is `<= 0`.
    pub fn set_aspect_ratio(&mut self, x: i32, y: i32) -> Result<(), ConfigError> {
        self.overlay.set_aspect_ratio(AspectRatio::new(x, y))?;
        self.overlay.set_fixed_aspect_ratio(true);
        self.window_rebuilt();
        Ok(())
    }

    pub fn set_fixed_aspect_ratio(&mut self, fixed: bool) {
        self.overlay.set_fixed_aspect_ratio(fixed);
        self.window_rebuilt();
    }

    /// Back to an unlocked 1:1 ratio.
    pub fn clear_aspect_ratio(&mut self) {
        // 1:1 is always accepted
        let _ = self.overlay.set_aspect_ratio(AspectRatio::default());
        self.overlay.set_fixed_aspect_ratio(false);
        self.window_rebuilt();
    }

    pub fn set_crop_shape(&mut self, shape: CropShape) {
        self.overlay.set_crop_shape(shape);
    }

    pub fn set_guidelines(&mut self, guidelines: Guidelines) {
        self.overlay.set_guidelines(guidelines);
    }

    /// Negative radii are ignored.
    pub fn set_snap_radius(&mut self, snap_radius: f32) {
        if snap_radius < 0.0 {
            debug!(snap_radius, "ignoring negative snap radius");
            return;
        }
        self.overlay.set_snap_radius(snap_radius);
    }

    pub fn set_multi_touch_enabled(&mut self, enabled: bool) {
        self.overlay.set_multi_touch_enabled(enabled);
    }

    pub fn set_scale_type(&mut self, scale_type: ScaleType) {
        self.viewport.set_scale_type(&mut self.overlay, scale_type);
    }

    pub fn set_auto_zoom_enabled(&mut self, enabled: bool) {
        if self.viewport.set_auto_zoom_enabled(&mut self.overlay, enabled) {
            self.window_rebuilt();
        }
    }

    /// Values `<= 0` are ignored.
    pub fn set_max_zoom(&mut self, max_zoom: f32) {
        if self.viewport.set_max_zoom(&mut self.overlay, max_zoom) {
            self.window_rebuilt();
        }
    }

    pub fn set_min_crop_result_size(&mut self, width: i32, height: i32) {
        self.overlay.set_min_result_size(width, height);
    }

    pub fn set_max_crop_result_size(&mut self, width: i32, height: i32) {
        self.overlay.set_max_result_size(width, height);
    }

    /// Initial window in source pixels; rebuilds the window when an image is shown.
    pub fn set_initial_crop_rect(&mut self, rect: Option<IntRect>) {
        if self.overlay.set_initial_crop_rect(rect) {
            self.window_rebuilt();
        }
    }

    fn window_rebuilt(&mut self) {
        if self.overlay.is_initialized() {
            self.settled();
        }
    }

    // ------------------------------------------------------------------
    // Save / restore
    // ------------------------------------------------------------------

    /// Capture the restorable state. `None` without an image.
    pub fn snapshot(&self, handoff_key: Option<HandoffKey>) -> Option<SessionSnapshot> {
        if !self.has_image() {
            return None;
        }
        Some(SessionSnapshot {
            crop_window_rect: self.viewport.to_bitmap_rect(&self.overlay.rect()),
            degrees_rotated: self.viewport.degrees_rotated(),
            flip_horizontally: self.viewport.is_flipped_horizontally(),
            flip_vertically: self.viewport.is_flipped_vertically(),
            crop_shape: self.overlay.crop_shape(),
            auto_zoom_enabled: self.viewport.is_auto_zoom_enabled(),
            max_zoom: self.viewport.max_zoom(),
            loaded_sample_size: self.viewport.sample_size(),
            initial_crop_rect: self.overlay.initial_crop_rect(),
            handoff_key,
        })
    }

    /// Restore a snapshot into a session that has no image yet.
    ///
    /// Display settings apply at once. The window and rotation wait for the
    /// next image load with a measured view. Returns `false` when the session
    /// already holds or is loading an image.
    pub fn restore(&mut self, snapshot: &SessionSnapshot) -> bool {
        if self.state != SessionState::NoImage {
            debug!(state = ?self.state, "session already in use, snapshot ignored");
            return false;
        }

        self.overlay.set_crop_shape(snapshot.crop_shape);
        self.viewport
            .set_auto_zoom_enabled(&mut self.overlay, snapshot.auto_zoom_enabled);
        self.viewport
            .set_max_zoom(&mut self.overlay, snapshot.max_zoom);
        self.viewport.set_flips(
            &mut self.overlay,
            snapshot.flip_horizontally,
            snapshot.flip_vertically,
        );
        if let Some(rect) = snapshot.initial_crop_rect {
            if rect.width() > 0 || rect.height() > 0 {
                self.overlay.set_initial_crop_rect(Some(rect));
            }
        }

        let rect = snapshot.crop_window_rect;
        self.pending_restore = (rect.width() > 0.0 || rect.height() > 0.0).then_some(PendingRestore {
            rect,
            degrees: snapshot.degrees_rotated,
        });
        debug!(pending = self.pending_restore.is_some(), "snapshot restored");
        true
    }

    /// Re-apply a pending snapshot once an image is shown in a measured view.
    fn apply_pending_restore(&mut self) {
        let (width, height) = self.viewport.view_size();
        if !self.has_image() || width <= 0.0 || height <= 0.0 {
            return;
        }
        let Some(pending) = self.pending_restore.take() else {
            return;
        };

        self.viewport
            .restore_rotation(&mut self.overlay, pending.degrees);
        let rect = self.viewport.to_display_rect(&pending.rect);
        self.overlay.set_rect(rect);
        self.viewport
            .handle_crop_window_changed(&mut self.overlay, false);
        self.overlay.fix_current_rect();
        self.settled();
    }

    // ------------------------------------------------------------------
    // Crop
    // ------------------------------------------------------------------

    /// The crop selection for the current window, `None` without an image.
    pub fn commit(&self) -> Option<CropSelection> {
        Some(CropSelection {
            crop_points: self.crop_points()?,
            crop_rect: self.crop_rect()?,
            whole_image_rect: self.whole_image_rect()?,
            degrees_rotated: self.viewport.degrees_rotated(),
            flip_horizontally: self.viewport.is_flipped_horizontally(),
            flip_vertically: self.viewport.is_flipped_vertically(),
            sample_size: self.viewport.sample_size(),
        })
    }

    /// Snapshot a crop request for the executor. Any earlier crop ticket
    /// becomes stale.
    pub fn begin_crop(&mut self) -> Option<(CropTicket, CropRequest)> {
        let selection = self.commit()?;
        let options = self.config.output_request_options;
        let (request_width, request_height) = if options == RequestSizeOptions::None {
            (0, 0)
        } else {
            (
                self.config.output_request_width.max(0) as u32,
                self.config.output_request_height.max(0) as u32,
            )
        };

        let request = CropRequest {
            points: selection.crop_points,
            degrees_rotated: selection.degrees_rotated,
            flip_horizontally: selection.flip_horizontally,
            flip_vertically: selection.flip_vertically,
            aspect_ratio: self.overlay.locked_aspect(),
            request_width,
            request_height,
            request_options: options,
            output_format: self.config.output_format,
            output_quality: self.config.output_quality.clamp(0, 100) as u8,
        };

        let ticket = CropTicket(self.next_ticket());
        debug!(ticket = ticket.0, rect = ?selection.crop_rect, "crop started");
        self.cropping = Some((ticket, selection));
        Some((ticket, request))
    }

    /// Pair an executor result with its selection. `None` for a stale ticket.
    pub fn complete_crop(
        &mut self,
        ticket: CropTicket,
        outcome: Result<CropOutcome, CropError>,
    ) -> Option<CropResult> {
        match self.cropping.take() {
            Some((current, selection)) if current == ticket => {
                let sample_size = outcome
                    .as_ref()
                    .map_or(selection.sample_size, |outcome| outcome.sample_size);
                if let Err(e) = &outcome {
                    warn!(error = %e, "crop failed");
                }
                Some(CropResult {
                    outcome,
                    selection,
                    sample_size,
                })
            }
            other => {
                self.cropping = other;
                warn!(ticket = ticket.0, "discarding stale crop result");
                None
            }
        }
    }

    fn next_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "session state");
            self.state = state;
        }
    }
}


// ============================================================================
// Property-based tests
// ============================================================================
