//! Source bitmap to display mapping.
//!
//! [`ViewportTransform`] rebuilds the image matrix from the loaded bitmap
//! size, the rotation, the fit-to-view scale, the user zoom and the flips. Every
//! rebuild carries the crop window along: the window is mapped back into
//! bitmap space through the old matrix and forward through the new one, so it
//! stays on the same part of the image.
//!
//! All methods that touch the window take the [`CropOverlay`] explicitly; the
//! transform never holds on to it.

use tracing::debug;

use crate::config::{CropConfig, ScaleType};
use crate::geometry::{
    bounding_bottom, bounding_center_x, bounding_center_y, bounding_height, bounding_left,
    bounding_right, bounding_top, bounding_width, rect_from_points, IntRect, Matrix, Quad, Rect,
};
use crate::overlay::CropOverlay;

/// Zoom in when the window is smaller than this share of both view axes.
const ZOOM_IN_TRIGGER: f32 = 0.5;
/// Share of the view the window should cover after zooming in.
const ZOOM_IN_TARGET: f32 = 0.64;
/// Zoom out when the window is larger than this share of either view axis.
const ZOOM_OUT_TRIGGER: f32 = 0.65;
/// Share of the view the window should cover after zooming out.
const ZOOM_OUT_TARGET: f32 = 0.51;

/// Edge length of the square used to measure display scale.
const SCALE_PROBE: f32 = 100.0;

/// Decoded bitmap dimensions plus the sub-sampling it was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoadedImage {
    width: u32,
    height: u32,
    sample_size: u32,
}

/// Image matrix and zoom state for one crop view.
#[derive(Debug, Clone)]
pub struct ViewportTransform {
    matrix: Matrix,
    image: Option<LoadedImage>,
    view_width: f32,
    view_height: f32,
    degrees_rotated: i32,
    initial_degrees_rotated: i32,
    /// Flips `reset_crop_rect` returns to.
    initial_flips: (bool, bool),
    flip_horizontally: bool,
    flip_vertically: bool,
    zoom: f32,
    zoom_offset_x: f32,
    zoom_offset_y: f32,
    image_points: Quad,
    scale_image_points: Quad,
    scale_type: ScaleType,
    auto_zoom_enabled: bool,
    max_zoom: f32,
}

impl ViewportTransform {
    pub fn new(config: &CropConfig) -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            image: None,
            view_width: 0.0,
            view_height: 0.0,
            degrees_rotated: 0,
            initial_degrees_rotated: 0,
            initial_flips: (false, false),
            flip_horizontally: config.flip_horizontally,
            flip_vertically: config.flip_vertically,
            zoom: 1.0,
            zoom_offset_x: 0.0,
            zoom_offset_y: 0.0,
            image_points: [0.0; 8],
            scale_image_points: [0.0; 8],
            scale_type: config.scale_type,
            auto_zoom_enabled: config.auto_zoom_enabled,
            max_zoom: config.max_zoom,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Decoded bitmap size, if an image is loaded.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image.map(|image| (image.width, image.height))
    }

    pub fn sample_size(&self) -> u32 {
        self.image.map_or(1, |image| image.sample_size)
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Displayed image corners in display space.
    pub fn image_points(&self) -> &Quad {
        &self.image_points
    }

    pub fn view_size(&self) -> (f32, f32) {
        (self.view_width, self.view_height)
    }

    pub fn set_view_size(&mut self, width: f32, height: f32) {
        self.view_width = width;
        self.view_height = height;
    }

    pub fn degrees_rotated(&self) -> i32 {
        self.degrees_rotated
    }

    pub fn initial_degrees_rotated(&self) -> i32 {
        self.initial_degrees_rotated
    }

    pub fn is_flipped_horizontally(&self) -> bool {
        self.flip_horizontally
    }

    pub fn is_flipped_vertically(&self) -> bool {
        self.flip_vertically
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn zoom_offset(&self) -> (f32, f32) {
        (self.zoom_offset_x, self.zoom_offset_y)
    }

    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    pub fn is_auto_zoom_enabled(&self) -> bool {
        self.auto_zoom_enabled
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    /// Show a newly decoded bitmap and rebuild the crop window for it.
    pub fn load_image(
        &mut self,
        overlay: &mut CropOverlay,
        width: u32,
        height: u32,
        sample_size: u32,
        degrees_rotated: i32,
    ) {
        self.reset_image_state();
        self.image = Some(LoadedImage {
            width,
            height,
            sample_size: sample_size.max(1),
        });
        self.degrees_rotated = degrees_rotated.rem_euclid(360);
        self.initial_degrees_rotated = self.degrees_rotated;
        self.initial_flips = (false, false);

        self.apply(overlay, true);
        overlay.reset();
    }

    /// Drop the image and the crop window bounds.
    pub fn clear(&mut self, overlay: &mut CropOverlay) {
        self.reset_image_state();
        self.image = None;
        self.initial_degrees_rotated = 0;
        self.initial_flips = (false, false);
        self.update_image_bounds(overlay, true);
        overlay.clear();
    }

    fn reset_image_state(&mut self) {
        self.degrees_rotated = 0;
        self.zoom = 1.0;
        self.zoom_offset_x = 0.0;
        self.zoom_offset_y = 0.0;
        self.matrix.reset();
    }

    /// Rebuild the image matrix and carry the crop window along.
    ///
    /// With `center` the zoom offset centers the crop window in the view as far
    /// as the image allows; otherwise the offset only moves enough to keep the
    /// window inside the view.
    pub fn apply(&mut self, overlay: &mut CropOverlay, center: bool) {
        let Some(image) = self.image else {
            return;
        };
        let (width, height) = (self.view_width, self.view_height);
        if width <= 0.0 || height <= 0.0 {
            return;
        }

        let inverse = self.matrix.invert().unwrap_or_default();
        let mut crop = inverse.map_rect(&overlay.rect());

        self.matrix.reset();
        self.matrix.post_translate(
            (width - image.width as f32) / 2.0,
            (height - image.height as f32) / 2.0,
        );
        self.map_image_points();

        if self.degrees_rotated > 0 {
            self.matrix.post_rotate(
                self.degrees_rotated as f32,
                bounding_center_x(&self.image_points),
                bounding_center_y(&self.image_points),
            );
            self.map_image_points();
        }

        let scale = (width / bounding_width(&self.image_points))
            .min(height / bounding_height(&self.image_points));
        if self.scale_type == ScaleType::FitCenter
            || (self.scale_type == ScaleType::CenterInside && scale < 1.0)
            || (scale > 1.0 && self.auto_zoom_enabled)
        {
            self.matrix.post_scale(
                scale,
                scale,
                bounding_center_x(&self.image_points),
                bounding_center_y(&self.image_points),
            );
            self.map_image_points();
        }

        let scale_x = if self.flip_horizontally {
            -self.zoom
        } else {
            self.zoom
        };
        let scale_y = if self.flip_vertically {
            -self.zoom
        } else {
            self.zoom
        };
        self.matrix.post_scale(
            scale_x,
            scale_y,
            bounding_center_x(&self.image_points),
            bounding_center_y(&self.image_points),
        );
        self.map_image_points();

        crop = self.matrix.map_rect(&crop);

        let points = &self.image_points;
        if center {
            self.zoom_offset_x = if width > bounding_width(points) {
                0.0
            } else {
                (width / 2.0 - crop.center_x())
                    .min(-bounding_left(points))
                    .max(width - bounding_right(points))
                    / scale_x
            };
            self.zoom_offset_y = if height > bounding_height(points) {
                0.0
            } else {
                (height / 2.0 - crop.center_y())
                    .min(-bounding_top(points))
                    .max(height - bounding_bottom(points))
                    / scale_y
            };
        } else {
            self.zoom_offset_x = (self.zoom_offset_x * scale_x)
                .max(-crop.left)
                .min(width - crop.right)
                / scale_x;
            self.zoom_offset_y = (self.zoom_offset_y * scale_y)
                .max(-crop.top)
                .min(height - crop.bottom)
                / scale_y;
        }

        let dx = self.zoom_offset_x * scale_x;
        let dy = self.zoom_offset_y * scale_y;
        self.matrix.post_translate(dx, dy);
        crop.offset(dx, dy);
        overlay.set_rect(crop);
        self.map_image_points();

        self.update_image_bounds(overlay, false);
    }

    fn map_image_points(&mut self) {
        let (width, height) = self
            .image
            .map_or((0.0, 0.0), |image| (image.width as f32, image.height as f32));
        self.image_points = self
            .matrix
            .map_quad(&Rect::new(0.0, 0.0, width, height).corners());
        self.scale_image_points = self
            .matrix
            .map_quad(&Rect::new(0.0, 0.0, SCALE_PROBE, SCALE_PROBE).corners());
    }

    /// Push the image quad and the source-per-display scale to the overlay.
    fn update_image_bounds(&self, overlay: &mut CropOverlay, clear: bool) {
        if let (Some(image), false) = (self.image, clear) {
            let sample = image.sample_size as f32;
            let sf_width = SCALE_PROBE * sample / bounding_width(&self.scale_image_points);
            let sf_height = SCALE_PROBE * sample / bounding_height(&self.scale_image_points);
            overlay.set_window_limits(self.view_width, self.view_height, sf_width, sf_height);
        }

        let points = (!clear).then_some(&self.image_points);
        overlay.set_bounds(points, self.view_width, self.view_height);
    }

    /// React to a crop window change.
    ///
    /// While a gesture is in progress the view only pans to keep the window
    /// visible. A settled window runs the auto-zoom heuristic. Returns `true`
    /// when the zoom changed.
    pub fn handle_crop_window_changed(&mut self, overlay: &mut CropOverlay, in_progress: bool) -> bool {
        let (width, height) = (self.view_width, self.view_height);
        if self.image.is_none() || width <= 0.0 || height <= 0.0 {
            return false;
        }

        let rect = overlay.rect();
        if in_progress {
            if rect.left < 0.0 || rect.top < 0.0 || rect.right > width || rect.bottom > height {
                self.apply(overlay, false);
            }
            return false;
        }

        if !(self.auto_zoom_enabled || self.zoom > 1.0) {
            return false;
        }

        let mut new_zoom = 0.0f32;
        if self.zoom < self.max_zoom
            && rect.width() < width * ZOOM_IN_TRIGGER
            && rect.height() < height * ZOOM_IN_TRIGGER
        {
            new_zoom = self.max_zoom.min(
                (width / (rect.width() / self.zoom / ZOOM_IN_TARGET))
                    .min(height / (rect.height() / self.zoom / ZOOM_IN_TARGET)),
            );
        }
        if self.zoom > 1.0
            && (rect.width() > width * ZOOM_OUT_TRIGGER || rect.height() > height * ZOOM_OUT_TRIGGER)
        {
            new_zoom = (width / (rect.width() / self.zoom / ZOOM_OUT_TARGET))
                .min(height / (rect.height() / self.zoom / ZOOM_OUT_TARGET))
                .max(1.0);
        }
        if !self.auto_zoom_enabled {
            new_zoom = 1.0;
        }

        if new_zoom > 0.0 && new_zoom != self.zoom {
            debug!(from = self.zoom, to = new_zoom, "auto zoom");
            self.zoom = new_zoom;
            self.apply(overlay, true);
            return true;
        }
        false
    }

    /// Rotate the image by `delta` degrees, keeping the crop window's size
    /// and its position on the image.
    pub fn rotate(&mut self, overlay: &mut CropOverlay, delta: i32) {
        if self.image.is_none() {
            return;
        }
        let delta = delta.rem_euclid(360);

        // a quarter turn swaps which image axis is horizontal
        let flip_axes = !overlay.is_fix_aspect_ratio()
            && ((46..=134).contains(&delta) || (216..=304).contains(&delta));

        let rect = overlay.rect();
        let (mut half_width, mut half_height) = if flip_axes {
            (rect.height() / 2.0, rect.width() / 2.0)
        } else {
            (rect.width() / 2.0, rect.height() / 2.0)
        };
        if flip_axes {
            std::mem::swap(&mut self.flip_horizontally, &mut self.flip_vertically);
        }

        // window center plus a unit vector, in bitmap space
        let inverse = self.matrix.invert().unwrap_or_default();
        let probe = [
            inverse.map_xy(rect.center_x(), rect.center_y()),
            inverse.map_xy(0.0, 0.0),
            inverse.map_xy(1.0, 0.0),
        ];

        self.degrees_rotated = (self.degrees_rotated + delta) % 360;
        self.apply(overlay, true);

        // keep the apparent scale across the new fit
        self.zoom /= self.probe_length(&probe);
        self.zoom = self.zoom.max(1.0);
        self.apply(overlay, true);

        let change = self.probe_length(&probe);
        half_width *= change;
        half_height *= change;

        let (cx, cy) = self.matrix.map_xy(probe[0].0, probe[0].1);
        let rotated = Rect::new(cx - half_width, cy - half_height, cx + half_width, cy + half_height);

        debug!(delta, degrees = self.degrees_rotated, zoom = self.zoom, "image rotated");

        overlay.reset();
        overlay.set_rect(rotated);
        self.apply(overlay, true);
        self.handle_crop_window_changed(overlay, false);
        overlay.fix_current_rect();
    }

    /// Display length of the probe's unit vector under the current matrix.
    fn probe_length(&self, probe: &[(f32, f32); 3]) -> f32 {
        let (x0, y0) = self.matrix.map_xy(probe[1].0, probe[1].1);
        let (x1, y1) = self.matrix.map_xy(probe[2].0, probe[2].1);
        ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt()
    }

    /// Rotate to an absolute angle.
    pub fn set_degrees_rotated(&mut self, overlay: &mut CropOverlay, degrees: i32) {
        if self.degrees_rotated != degrees {
            self.rotate(overlay, degrees - self.degrees_rotated);
        }
    }

    pub fn flip_horizontally(&mut self, overlay: &mut CropOverlay) {
        self.flip_horizontally = !self.flip_horizontally;
        self.apply(overlay, false);
    }

    pub fn flip_vertically(&mut self, overlay: &mut CropOverlay) {
        self.flip_vertically = !self.flip_vertically;
        self.apply(overlay, false);
    }

    /// Set both flips at once, rebuilding only if either changed.
    pub fn set_flips(&mut self, overlay: &mut CropOverlay, horizontal: bool, vertical: bool) {
        if self.flip_horizontally != horizontal || self.flip_vertically != vertical {
            self.flip_horizontally = horizontal;
            self.flip_vertically = vertical;
            self.apply(overlay, false);
        }
    }

    /// Mirror the loaded bitmap on top of the current flips, e.g. for an
    /// EXIF orientation. `reset_crop_rect` keeps the result.
    pub fn set_source_flips(&mut self, overlay: &mut CropOverlay, horizontal: bool, vertical: bool) {
        let flips = (self.flip_horizontally ^ horizontal, self.flip_vertically ^ vertical);
        self.initial_flips = flips;
        self.set_flips(overlay, flips.0, flips.1);
    }

    /// Rotation used by a restored session; rebuilds around the window.
    pub fn restore_rotation(&mut self, overlay: &mut CropOverlay, degrees: i32) {
        let degrees = degrees.rem_euclid(360);
        if degrees != self.degrees_rotated {
            self.degrees_rotated = degrees;
            self.apply(overlay, true);
        }
    }

    /// Back to the loaded orientation, no zoom, no flips, fresh window.
    pub fn reset_crop_rect(&mut self, overlay: &mut CropOverlay) {
        self.zoom = 1.0;
        self.zoom_offset_x = 0.0;
        self.zoom_offset_y = 0.0;
        self.degrees_rotated = self.initial_degrees_rotated;
        (self.flip_horizontally, self.flip_vertically) = self.initial_flips;
        self.apply(overlay, false);
        overlay.reset_crop_window_rect();
    }

    /// Changing the fit mode drops the zoom and rebuilds the window.
    pub fn set_scale_type(&mut self, overlay: &mut CropOverlay, scale_type: ScaleType) {
        if self.scale_type != scale_type {
            self.scale_type = scale_type;
            self.zoom = 1.0;
            self.zoom_offset_x = 0.0;
            self.zoom_offset_y = 0.0;
            overlay.reset();
            self.apply(overlay, true);
        }
    }

    /// Returns `true` when the setting changed.
    pub fn set_auto_zoom_enabled(&mut self, overlay: &mut CropOverlay, enabled: bool) -> bool {
        if self.auto_zoom_enabled == enabled {
            return false;
        }
        self.auto_zoom_enabled = enabled;
        self.handle_crop_window_changed(overlay, false);
        true
    }

    /// Values `<= 0` are ignored. Returns `true` when the setting changed.
    pub fn set_max_zoom(&mut self, overlay: &mut CropOverlay, max_zoom: f32) -> bool {
        if max_zoom <= 0.0 || self.max_zoom == max_zoom {
            return false;
        }
        self.max_zoom = max_zoom;
        self.handle_crop_window_changed(overlay, false);
        true
    }

    /// Display rect to unrotated bitmap space.
    pub fn to_bitmap_rect(&self, rect: &Rect) -> Rect {
        self.matrix.invert().unwrap_or_default().map_rect(rect)
    }

    /// Unrotated bitmap rect to display space.
    pub fn to_display_rect(&self, rect: &Rect) -> Rect {
        self.matrix.map_rect(rect)
    }

    /// Crop window corners in original source pixels, in TL, TR, BR, BL order.
    pub fn crop_points(&self, overlay: &CropOverlay) -> Quad {
        let inverse = self.matrix.invert().unwrap_or_default();
        let mut points = inverse.map_quad(&overlay.rect().corners());
        let sample = self.sample_size() as f32;
        for value in points.iter_mut() {
            *value *= sample;
        }
        points
    }

    /// Integer crop rect in original source pixels.
    pub fn crop_rect(&self, overlay: &CropOverlay) -> Option<IntRect> {
        let (width, height) = self.original_size()?;
        Some(rect_from_points(
            &self.crop_points(overlay),
            width,
            height,
            overlay.locked_aspect(),
        ))
    }

    /// `(0, 0, width, height)` of the original image.
    pub fn whole_image_rect(&self) -> Option<IntRect> {
        let (width, height) = self.original_size()?;
        Some(IntRect::new(0, 0, width, height))
    }

    fn original_size(&self) -> Option<(i32, i32)> {
        let scaled = |length: u32, sample_size: u32| {
            i32::try_from(u64::from(length) * u64::from(sample_size)).unwrap_or(i32::MAX)
        };
        self.image.map(|image| {
            (
                scaled(image.width, image.sample_size),
                scaled(image.height, image.sample_size),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::AspectRatio;

    fn setup(config: &CropConfig, view: (f32, f32), image: (u32, u32), sample: u32) -> (ViewportTransform, CropOverlay) {
        let mut viewport = ViewportTransform::new(config);
        let mut overlay = CropOverlay::new(config);
        viewport.set_view_size(view.0, view.1);
        viewport.load_image(&mut overlay, image.0, image.1, sample, 0);
        (viewport, overlay)
    }

    fn assert_rect_near(actual: Rect, expected: Rect, tolerance: f32) {
        for (a, e) in [
            (actual.left, expected.left),
            (actual.top, expected.top),
            (actual.right, expected.right),
            (actual.bottom, expected.bottom),
        ] {
            assert!((a - e).abs() <= tolerance, "{actual:?} != {expected:?}");
        }
    }

    fn assert_quad_near(actual: &Quad, expected: &Quad, tolerance: f32) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() <= tolerance, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_load_fits_image_and_places_window() {
        let (viewport, overlay) = setup(&CropConfig::default(), (1000.0, 1000.0), (2000, 1000), 1);
        assert_quad_near(
            viewport.image_points(),
            &Rect::new(0.0, 250.0, 1000.0, 750.0).corners(),
            1e-3,
        );
        assert_rect_near(overlay.rect(), Rect::new(100.0, 300.0, 900.0, 700.0), 1e-3);
        assert!((overlay.limits().scale_factor_width() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_square_image_in_square_view() {
        let (_, overlay) = setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        assert_rect_near(overlay.rect(), Rect::new(100.0, 100.0, 900.0, 900.0), 1e-3);
    }

    #[test]
    fn test_crop_points_and_rect_in_source_pixels() {
        let (viewport, overlay) = setup(&CropConfig::default(), (1000.0, 1000.0), (2000, 1000), 1);
        assert_quad_near(
            &viewport.crop_points(&overlay),
            &Rect::new(200.0, 100.0, 1800.0, 900.0).corners(),
            1e-2,
        );
        assert_eq!(viewport.crop_rect(&overlay), Some(IntRect::new(200, 100, 1800, 900)));
        assert_eq!(viewport.whole_image_rect(), Some(IntRect::new(0, 0, 2000, 1000)));
    }

    #[test]
    fn test_sample_size_scales_outputs() {
        let (viewport, overlay) = setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 500), 2);
        assert_eq!(viewport.whole_image_rect(), Some(IntRect::new(0, 0, 2000, 1000)));
        assert_eq!(viewport.crop_rect(&overlay), Some(IntRect::new(200, 100, 1800, 900)));
        assert!((overlay.limits().scale_factor_width() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_square_lock_trims_crop_rect() {
        let config = CropConfig {
            fix_aspect_ratio: true,
            aspect_ratio: AspectRatio::new(1, 1),
            ..Default::default()
        };
        let (viewport, mut overlay) = setup(&config, (1000.0, 1000.0), (1000, 1000), 1);
        overlay.set_rect(Rect::new(100.0, 100.0, 600.0, 500.0));
        let rect = viewport.crop_rect(&overlay).unwrap();
        assert_eq!(rect.width(), rect.height());
    }

    #[test]
    fn test_no_image_outputs() {
        let config = CropConfig::default();
        let viewport = ViewportTransform::new(&config);
        let overlay = CropOverlay::new(&config);
        assert_eq!(viewport.crop_rect(&overlay), None);
        assert_eq!(viewport.whole_image_rect(), None);
        assert_eq!(viewport.sample_size(), 1);
    }

    #[test]
    fn test_rotate_quarter_turn_swaps_window() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        overlay.set_rect(Rect::new(200.0, 100.0, 700.0, 900.0));
        let before = viewport.crop_points(&overlay);

        viewport.rotate(&mut overlay, 90);
        assert_eq!(viewport.degrees_rotated(), 90);
        let rect = overlay.rect();
        assert!((rect.width() - 800.0).abs() < 1e-2);
        assert!((rect.height() - 500.0).abs() < 1e-2);

        // the same part of the image, with its corners turned a quarter
        let after = viewport.crop_points(&overlay);
        assert!((Rect::bounding(&after).left - Rect::bounding(&before).left).abs() < 1e-2);
        assert!((Rect::bounding(&after).bottom - Rect::bounding(&before).bottom).abs() < 1e-2);
    }

    #[test]
    fn test_four_quarter_turns_round_trip() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 800.0), (1200, 900), 1);
        overlay.set_rect(Rect::new(250.0, 200.0, 650.0, 560.0));
        let points_before = viewport.crop_points(&overlay);

        for _ in 0..4 {
            viewport.rotate(&mut overlay, 90);
        }
        assert_eq!(viewport.degrees_rotated(), 0);
        assert!(!viewport.is_flipped_horizontally() && !viewport.is_flipped_vertically());
        // zoom may differ, the covered image region may not
        assert_quad_near(&viewport.crop_points(&overlay), &points_before, 0.5);
    }

    #[test]
    fn test_negative_rotation_normalizes() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        viewport.rotate(&mut overlay, -90);
        assert_eq!(viewport.degrees_rotated(), 270);
        viewport.set_degrees_rotated(&mut overlay, 0);
        assert_eq!(viewport.degrees_rotated(), 0);
    }

    #[test]
    fn test_non_right_angle_keeps_window_inside_image() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        viewport.rotate(&mut overlay, 30);
        assert_eq!(viewport.degrees_rotated(), 30);

        let rect = overlay.rect();
        let outer = Rect::bounding(viewport.image_points());
        assert!(rect.left >= outer.left - 1e-3 && rect.right <= outer.right + 1e-3);
        assert!(rect.width() >= overlay.limits().min_crop_width() - 1e-3);
    }

    #[test]
    fn test_flip_twice_restores_matrix() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (2000, 1000), 1);
        let matrix = *viewport.matrix();
        let rect = overlay.rect();

        viewport.flip_horizontally(&mut overlay);
        assert!(viewport.is_flipped_horizontally());
        assert!(viewport.matrix().a < 0.0);

        viewport.flip_horizontally(&mut overlay);
        assert!(!viewport.is_flipped_horizontally());
        let restored = viewport.matrix();
        for (a, b) in [
            (restored.a, matrix.a),
            (restored.b, matrix.b),
            (restored.c, matrix.c),
            (restored.d, matrix.d),
            (restored.e, matrix.e),
            (restored.f, matrix.f),
        ] {
            assert!((a - b).abs() < 1e-3);
        }
        assert_rect_near(overlay.rect(), rect, 1e-2);
    }

    #[test]
    fn test_auto_zoom_in_on_small_window() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        overlay.set_rect(Rect::new(400.0, 400.0, 600.0, 600.0));
        assert!(viewport.handle_crop_window_changed(&mut overlay, false));
        assert!((viewport.zoom() - 3.2).abs() < 1e-4);
        assert_rect_near(overlay.rect(), Rect::new(180.0, 180.0, 820.0, 820.0), 1e-2);
    }

    #[test]
    fn test_auto_zoom_capped_by_max_zoom() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        overlay.set_rect(Rect::new(480.0, 480.0, 520.0, 520.0));
        viewport.handle_crop_window_changed(&mut overlay, false);
        assert_eq!(viewport.zoom(), 4.0);
    }

    #[test]
    fn test_auto_zoom_out_on_large_window() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        overlay.set_rect(Rect::new(400.0, 400.0, 600.0, 600.0));
        viewport.handle_crop_window_changed(&mut overlay, false);

        overlay.set_rect(Rect::new(50.0, 50.0, 950.0, 950.0));
        assert!(viewport.handle_crop_window_changed(&mut overlay, false));
        // 0.51 * 1000 / (900 / 3.2)
        assert!((viewport.zoom() - 1.8133).abs() < 1e-3);
    }

    #[test]
    fn test_auto_zoom_hysteresis_band_is_stable() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        overlay.set_rect(Rect::new(225.0, 225.0, 775.0, 775.0));
        assert!(!viewport.handle_crop_window_changed(&mut overlay, false));
        assert_eq!(viewport.zoom(), 1.0);
    }

    #[test]
    fn test_disabling_auto_zoom_resets_zoom() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        overlay.set_rect(Rect::new(400.0, 400.0, 600.0, 600.0));
        viewport.handle_crop_window_changed(&mut overlay, false);
        assert!(viewport.zoom() > 1.0);

        assert!(viewport.set_auto_zoom_enabled(&mut overlay, false));
        assert_eq!(viewport.zoom(), 1.0);
    }

    #[test]
    fn test_in_progress_pans_window_back_into_view() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        overlay.set_rect(Rect::new(400.0, 400.0, 600.0, 600.0));
        viewport.handle_crop_window_changed(&mut overlay, false);

        overlay.set_rect(Rect::new(-100.0, 300.0, 200.0, 600.0));
        assert!(!viewport.handle_crop_window_changed(&mut overlay, true));
        let rect = overlay.rect();
        assert!(rect.left >= -1e-3);
        assert!((rect.width() - 300.0).abs() < 1e-2);
    }

    #[test]
    fn test_max_zoom_setter_ignores_non_positive() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        assert!(!viewport.set_max_zoom(&mut overlay, 0.0));
        assert!(!viewport.set_max_zoom(&mut overlay, 4.0));
        assert!(viewport.set_max_zoom(&mut overlay, 2.0));
        assert_eq!(viewport.max_zoom(), 2.0);
    }

    #[test]
    fn test_reset_crop_rect_restores_initial_state() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        viewport.rotate(&mut overlay, 90);
        viewport.flip_vertically(&mut overlay);
        overlay.set_rect(Rect::new(400.0, 400.0, 600.0, 600.0));
        viewport.handle_crop_window_changed(&mut overlay, false);

        viewport.reset_crop_rect(&mut overlay);
        assert_eq!(viewport.degrees_rotated(), 0);
        assert_eq!(viewport.zoom(), 1.0);
        assert!(!viewport.is_flipped_vertically());
        assert_rect_near(overlay.rect(), Rect::new(100.0, 100.0, 900.0, 900.0), 1e-2);
    }

    #[test]
    fn test_source_flips_survive_reset() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        viewport.set_source_flips(&mut overlay, true, false);
        assert!(viewport.is_flipped_horizontally());
        assert_rect_near(overlay.rect(), Rect::new(100.0, 100.0, 900.0, 900.0), 1e-2);

        viewport.flip_horizontally(&mut overlay);
        viewport.flip_vertically(&mut overlay);
        viewport.reset_crop_rect(&mut overlay);
        assert!(viewport.is_flipped_horizontally());
        assert!(!viewport.is_flipped_vertically());

        viewport.load_image(&mut overlay, 1000, 1000, 1, 0);
        viewport.reset_crop_rect(&mut overlay);
        assert!(!viewport.is_flipped_horizontally());
    }

    #[test]
    fn test_oversized_original_saturates() {
        let (viewport, _) = setup(&CropConfig::default(), (1000.0, 1000.0), (100_000, 100), 65_536);
        assert_eq!(
            viewport.whole_image_rect(),
            Some(IntRect::new(0, 0, i32::MAX, 6_553_600))
        );
    }

    #[test]
    fn test_clear_drops_image_and_window() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (1000, 1000), 1);
        viewport.clear(&mut overlay);
        assert!(!viewport.has_image());
        assert!(!overlay.is_initialized());
        assert_eq!(overlay.rect(), Rect::EMPTY);
        assert_eq!(overlay.bounds_points(), &[0.0; 8]);
    }

    #[test]
    fn test_bitmap_rect_round_trip() {
        let (mut viewport, mut overlay) =
            setup(&CropConfig::default(), (1000.0, 1000.0), (2000, 1000), 1);
        viewport.rotate(&mut overlay, 90);
        let rect = overlay.rect();
        let back = viewport.to_display_rect(&viewport.to_bitmap_rect(&rect));
        assert_rect_near(back, rect, 1e-2);
    }
}

// ============================================================================
// Property-based tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: after loading, the window respects the effective size
        /// limits and lies inside the displayed image.
        #[test]
        fn prop_loaded_window_is_valid(
            view_w in 200.0f32..2000.0,
            view_h in 200.0f32..2000.0,
            image_w in 100u32..4000,
            image_h in 100u32..4000,
            padding in 0.0f32..0.45,
        ) {
            let config = CropConfig {
                initial_crop_window_padding_ratio: padding,
                min_crop_result_width: 0,
                min_crop_result_height: 0,
                ..Default::default()
            };
            let mut viewport = ViewportTransform::new(&config);
            let mut overlay = CropOverlay::new(&config);
            viewport.set_view_size(view_w, view_h);
            viewport.load_image(&mut overlay, image_w, image_h, 1, 0);

            let rect = overlay.rect();
            let bounds = Rect::bounding(viewport.image_points());
            let limits = overlay.limits();
            let tol = 1e-2;
            prop_assert!(rect.width() <= limits.max_crop_width() + tol);
            prop_assert!(rect.height() <= limits.max_crop_height() + tol);
            prop_assert!(rect.left >= bounds.left - tol && rect.right <= bounds.right + tol);
            prop_assert!(rect.top >= bounds.top - tol && rect.bottom <= bounds.bottom + tol);
            // the min size only holds when the displayed image is that large
            if bounds.width() >= limits.min_crop_width() && bounds.height() >= limits.min_crop_height() {
                prop_assert!(rect.width() >= limits.min_crop_width().min(bounds.width()) - tol);
            }
        }

        /// Property: two horizontal flips are an involution.
        #[test]
        fn prop_double_flip_restores(
            image_w in 100u32..3000,
            image_h in 100u32..3000,
        ) {
            let config = CropConfig::default();
            let mut viewport = ViewportTransform::new(&config);
            let mut overlay = CropOverlay::new(&config);
            viewport.set_view_size(800.0, 600.0);
            viewport.load_image(&mut overlay, image_w, image_h, 1, 0);
            let before = viewport.image_points().to_owned();

            viewport.flip_horizontally(&mut overlay);
            viewport.flip_horizontally(&mut overlay);
            for (a, b) in viewport.image_points().iter().zip(before.iter()) {
                prop_assert!((a - b).abs() < 1e-2);
            }
        }
    }
}
