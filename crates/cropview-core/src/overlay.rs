//! Crop overlay: the crop window positioned over the displayed image.
//!
//! The overlay owns the crop window rect (through [`CropWindowLimits`]), the
//! displayed image quad, and the active drag gesture. It decides where the
//! window starts out, keeps it inside the (possibly rotated) image, and turns
//! pointer events into window changes.
//!
//! Methods that change the window return `true` when the change should be
//! reported to listeners; the caller knows whether it was in progress.

use tracing::debug;

use crate::config::{ConfigError, CropConfig, CropShape, Guidelines};
use crate::geometry::{
    bounding_bottom, bounding_left, bounding_right, bounding_top, AspectRatio, IntRect, Quad, Rect,
};
use crate::window::{resolve_handle, CropWindowLimits, DragConstraints, DragController, DragHandle};

/// Locked aspect ratios off by more than this many pixels are corrected.
const ASPECT_TOLERANCE: f32 = 0.1;

/// Crop window state over the displayed image.
#[derive(Debug, Clone)]
pub struct CropOverlay {
    limits: CropWindowLimits,
    bounds_points: Quad,
    view_width: f32,
    view_height: f32,
    drag: Option<DragController>,
    crop_shape: CropShape,
    guidelines: Guidelines,
    snap_radius: f32,
    touch_radius: f32,
    padding_ratio: f32,
    multi_touch_enabled: bool,
    fix_aspect_ratio: bool,
    aspect_ratio: AspectRatio,
    initial_crop_rect: Option<IntRect>,
    initialized: bool,
}

impl CropOverlay {
    pub fn new(config: &CropConfig) -> Self {
        Self {
            limits: CropWindowLimits::from_config(config),
            bounds_points: [0.0; 8],
            view_width: 0.0,
            view_height: 0.0,
            drag: None,
            crop_shape: config.crop_shape,
            guidelines: config.guidelines,
            snap_radius: config.snap_radius,
            touch_radius: config.touch_radius,
            padding_ratio: config.initial_crop_window_padding_ratio,
            multi_touch_enabled: config.multi_touch_enabled,
            fix_aspect_ratio: config.fix_aspect_ratio,
            aspect_ratio: config.aspect_ratio,
            initial_crop_rect: config.initial_crop_window_rect,
            initialized: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.limits.rect()
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.limits.set_rect(rect);
    }

    pub fn limits(&self) -> &CropWindowLimits {
        &self.limits
    }

    /// Displayed image corners in display space.
    pub fn bounds_points(&self) -> &Quad {
        &self.bounds_points
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn crop_shape(&self) -> CropShape {
        self.crop_shape
    }

    pub fn set_crop_shape(&mut self, shape: CropShape) {
        self.crop_shape = shape;
    }

    pub fn guidelines(&self) -> Guidelines {
        self.guidelines
    }

    pub fn set_guidelines(&mut self, guidelines: Guidelines) {
        self.guidelines = guidelines;
    }

    pub fn snap_radius(&self) -> f32 {
        self.snap_radius
    }

    pub fn set_snap_radius(&mut self, snap_radius: f32) {
        self.snap_radius = snap_radius;
    }

    pub fn multi_touch_enabled(&self) -> bool {
        self.multi_touch_enabled
    }

    /// Returns `true` when the setting actually changed.
    pub fn set_multi_touch_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.multi_touch_enabled != enabled;
        self.multi_touch_enabled = enabled;
        changed
    }

    pub fn is_fix_aspect_ratio(&self) -> bool {
        self.fix_aspect_ratio
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Locked ratio when aspect lock is on.
    pub fn locked_aspect(&self) -> Option<AspectRatio> {
        self.fix_aspect_ratio.then_some(self.aspect_ratio)
    }

    fn target_aspect(&self) -> f32 {
        self.aspect_ratio.value()
    }

    /// Toggle the aspect lock; re-initializes the window if it changed.
    pub fn set_fixed_aspect_ratio(&mut self, fixed: bool) {
        if self.fix_aspect_ratio != fixed {
            self.fix_aspect_ratio = fixed;
            if self.initialized {
                self.init_crop_window();
            }
        }
    }

    /// Change the target ratio; re-initializes the window if it changed.
    ///
    /// # Errors
    ///
    /// Rejects components `<= 0` without touching the current ratio.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) -> Result<(), ConfigError> {
        if ratio.x <= 0 || ratio.y <= 0 {
            return Err(ConfigError::NonPositiveAspectRatio {
                x: ratio.x,
                y: ratio.y,
            });
        }
        if self.aspect_ratio != ratio {
            self.aspect_ratio = ratio;
            if self.initialized {
                self.init_crop_window();
            }
        }
        Ok(())
    }

    pub fn set_min_result_size(&mut self, width: i32, height: i32) {
        self.limits.set_min_result_size(width, height);
    }

    pub fn set_max_result_size(&mut self, width: i32, height: i32) {
        self.limits.set_max_result_size(width, height);
    }

    /// View size plus source-per-display pixel factors.
    pub fn set_window_limits(&mut self, max_width: f32, max_height: f32, sf_width: f32, sf_height: f32) {
        self.limits.set_window_limits(max_width, max_height);
        self.limits.set_scale_factors(sf_width, sf_height);
    }

    pub fn initial_crop_rect(&self) -> Option<IntRect> {
        self.initial_crop_rect
    }

    /// Set the initial window in source pixels. Returns `true` when the
    /// window was rebuilt from it.
    pub fn set_initial_crop_rect(&mut self, rect: Option<IntRect>) -> bool {
        self.initial_crop_rect = rect;
        if self.initialized {
            self.init_crop_window();
            return true;
        }
        false
    }

    /// Update the displayed image quad. A zero-sized window is initialized
    /// against the new bounds.
    pub fn set_bounds(&mut self, points: Option<&Quad>, view_width: f32, view_height: f32) {
        let points = points.copied().unwrap_or([0.0; 8]);
        if points != self.bounds_points {
            self.bounds_points = points;
            self.view_width = view_width;
            self.view_height = view_height;
            let rect = self.limits.rect();
            if rect.width() == 0.0 || rect.height() == 0.0 {
                self.init_crop_window();
            }
        }
    }

    /// Drop the current window and build a fresh one.
    pub fn reset(&mut self) {
        if self.initialized {
            self.limits.set_rect(Rect::EMPTY);
            self.init_crop_window();
        }
    }

    /// Rebuild the window in place. Returns `true` if it was rebuilt.
    pub fn reset_crop_window_rect(&mut self) -> bool {
        if self.initialized {
            self.init_crop_window();
            return true;
        }
        false
    }

    /// Forget the window entirely, as when the image is cleared.
    pub fn clear(&mut self) {
        self.drag = None;
        self.limits.set_rect(Rect::EMPTY);
        self.initialized = false;
    }

    /// Re-apply size, bounds and aspect rules to the current window.
    pub fn fix_current_rect(&mut self) {
        let mut rect = self.limits.rect();
        self.fix_rect_by_rules(&mut rect);
        self.limits.set_rect(rect);
    }

    /// Guidelines are drawn when the window is large enough and the mode
    /// asks for them.
    pub fn guidelines_visible(&self) -> bool {
        self.limits.guidelines_fit()
            && match self.guidelines {
                Guidelines::On => true,
                Guidelines::OnTouch => self.drag.is_some(),
                Guidelines::Off => false,
            }
    }

    pub fn active_handle(&self) -> Option<DragHandle> {
        self.drag.as_ref().map(DragController::handle)
    }

    /// Start a gesture. Returns `true` if a handle was grabbed.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.drag = resolve_handle(
            x,
            y,
            &self.limits.rect(),
            self.touch_radius,
            self.crop_shape,
        )
        .map(|handle| DragController::new(handle, &self.limits, x, y));
        if let Some(drag) = &self.drag {
            debug!(handle = ?drag.handle(), x, y, "crop handle grabbed");
        }
        self.drag.is_some()
    }

    /// Move the active handle. Returns `true` if the window changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        if self.drag.is_none() {
            return false;
        }

        let mut rect = self.limits.rect();
        let (bounds, rotated) = calculate_bounds(&self.bounds_points, &rect);
        let constraints = DragConstraints {
            bounds,
            view_width: self.view_width,
            view_height: self.view_height,
            // snapping fights the slanted edges of a rotated image
            snap_radius: if rotated { 0.0 } else { self.snap_radius },
            aspect_ratio: self.fix_aspect_ratio.then(|| self.target_aspect()),
        };

        if let Some(drag) = self.drag.as_mut() {
            drag.move_to(&mut rect, x, y, &constraints);
        }
        self.limits.set_rect(rect);
        true
    }

    /// End the gesture. Returns `true` if a gesture was active.
    pub fn pointer_up(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// Resize the window from a pinch. Returns `true` if it was applied.
    pub fn pinch(&mut self, focus_x: f32, focus_y: f32, span_x: f32, span_y: f32) -> bool {
        if !self.multi_touch_enabled {
            return false;
        }

        let dx = span_x / 2.0;
        let dy = span_y / 2.0;
        let rect = Rect::new(focus_x - dx, focus_y - dy, focus_x + dx, focus_y + dy);

        if rect.left < rect.right
            && rect.top <= rect.bottom
            && rect.left >= 0.0
            && rect.right <= self.limits.max_crop_width()
            && rect.top >= 0.0
            && rect.bottom <= self.limits.max_crop_height()
        {
            self.limits.set_rect(rect);
            return true;
        }
        false
    }

    /// Place the window per the initial rect, aspect or padding rules.
    ///
    /// Does nothing while the image bounds inside the view are degenerate.
    fn init_crop_window(&mut self) {
        let points = &self.bounds_points;
        let left_limit = bounding_left(points).max(0.0);
        let top_limit = bounding_top(points).max(0.0);
        let right_limit = bounding_right(points).min(self.view_width);
        let bottom_limit = bounding_bottom(points).min(self.view_height);

        if right_limit <= left_limit || bottom_limit <= top_limit {
            debug!(
                left_limit,
                top_limit, right_limit, bottom_limit, "crop window init deferred"
            );
            return;
        }

        self.initialized = true;

        let horizontal_padding = self.padding_ratio * (right_limit - left_limit);
        let vertical_padding = self.padding_ratio * (bottom_limit - top_limit);
        let mut rect = Rect::EMPTY;

        match self.initial_crop_rect.filter(|r| !r.is_empty()) {
            Some(initial) => {
                let sf_width = self.limits.scale_factor_width();
                let sf_height = self.limits.scale_factor_height();
                rect.left = left_limit + initial.left as f32 / sf_width;
                rect.top = top_limit + initial.top as f32 / sf_height;
                rect.right = rect.left + initial.width() as f32 / sf_width;
                rect.bottom = rect.top + initial.height() as f32 / sf_height;

                rect.left = rect.left.max(left_limit);
                rect.top = rect.top.max(top_limit);
                rect.right = rect.right.min(right_limit);
                rect.bottom = rect.bottom.min(bottom_limit);
            }
            None if self.fix_aspect_ratio => {
                let target = self.target_aspect();
                let bitmap_aspect = (right_limit - left_limit) / (bottom_limit - top_limit);
                if bitmap_aspect > target {
                    // image wider than target: height drives
                    rect.top = top_limit + vertical_padding;
                    rect.bottom = bottom_limit - vertical_padding;
                    let center_x = self.view_width / 2.0;
                    let crop_width = self.limits.min_crop_width().max(rect.height() * target);
                    rect.left = center_x - crop_width / 2.0;
                    rect.right = center_x + crop_width / 2.0;
                } else {
                    rect.left = left_limit + horizontal_padding;
                    rect.right = right_limit - horizontal_padding;
                    let center_y = self.view_height / 2.0;
                    let crop_height = self.limits.min_crop_height().max(rect.width() / target);
                    rect.top = center_y - crop_height / 2.0;
                    rect.bottom = center_y + crop_height / 2.0;
                }
            }
            None => {
                rect.left = left_limit + horizontal_padding;
                rect.top = top_limit + vertical_padding;
                rect.right = right_limit - horizontal_padding;
                rect.bottom = bottom_limit - vertical_padding;
            }
        }

        self.fix_rect_by_rules(&mut rect);
        self.limits.set_rect(rect);
    }

    fn fix_rect_by_rules(&self, rect: &mut Rect) {
        let limits = &self.limits;

        if rect.width() < limits.min_crop_width() {
            let adj = (limits.min_crop_width() - rect.width()) / 2.0;
            rect.left -= adj;
            rect.right += adj;
        }
        if rect.height() < limits.min_crop_height() {
            let adj = (limits.min_crop_height() - rect.height()) / 2.0;
            rect.top -= adj;
            rect.bottom += adj;
        }
        if rect.width() > limits.max_crop_width() {
            let adj = (rect.width() - limits.max_crop_width()) / 2.0;
            rect.left += adj;
            rect.right -= adj;
        }
        if rect.height() > limits.max_crop_height() {
            let adj = (rect.height() - limits.max_crop_height()) / 2.0;
            rect.top += adj;
            rect.bottom -= adj;
        }

        let (bounds, _) = calculate_bounds(&self.bounds_points, rect);
        if bounds.width() > 0.0 && bounds.height() > 0.0 {
            rect.left = rect.left.max(bounds.left.max(0.0));
            rect.top = rect.top.max(bounds.top.max(0.0));
            rect.right = rect.right.min(bounds.right.min(self.view_width));
            rect.bottom = rect.bottom.min(bounds.bottom.min(self.view_height));
        }

        if self.fix_aspect_ratio {
            let target = self.target_aspect();
            if (rect.width() - rect.height() * target).abs() > ASPECT_TOLERANCE {
                if rect.width() > rect.height() * target {
                    let adj = (rect.height() * target - rect.width()).abs() / 2.0;
                    rect.left += adj;
                    rect.right -= adj;
                } else {
                    let adj = (rect.width() / target - rect.height()).abs() / 2.0;
                    rect.top += adj;
                    rect.bottom -= adj;
                }
            }
        }
    }
}

/// `true` when the quad is a rotated (non right-angle) image outline.
fn is_non_straight_angle_rotated(points: &Quad) -> bool {
    points[0] != points[6] && points[1] != points[7]
}

/// Region the crop window may occupy inside the displayed image.
///
/// For an axis-aligned image this is the image's bounding box and the second
/// value is `false`. For a rotated image the bounding box is shrunk to where
/// the window's diagonals, extended from its current shape, meet the image's
/// slanted edges; the second value is then `true`.
pub fn calculate_bounds(points: &Quad, rect: &Rect) -> (Rect, bool) {
    let mut left = bounding_left(points);
    let mut top = bounding_top(points);
    let mut right = bounding_right(points);
    let mut bottom = bounding_bottom(points);

    if !is_non_straight_angle_rotated(points) {
        return (Rect::new(left, top, right, bottom), false);
    }

    // Pick the corner order so (x0, y0) -> (x3, y3) is one edge and
    // (x2, y2) the opposite corner, whatever the rotation quadrant.
    let (i0, i2, i3) = if points[7] < points[1] {
        if points[1] < points[3] {
            (3, 1, 2)
        } else {
            (2, 0, 1)
        }
    } else if points[1] > points[3] {
        (1, 3, 0)
    } else {
        (0, 2, 3)
    };
    let (x0, y0) = (points[i0 * 2], points[i0 * 2 + 1]);
    let (x2, y2) = (points[i2 * 2], points[i2 * 2 + 1]);
    let (x3, y3) = (points[i3 * 2], points[i3 * 2 + 1]);

    // Image edges: y = a0*x + b0 / b2 and y = a1*x + b1 / b3
    let a0 = (y3 - y0) / (x3 - x0);
    let a1 = -1.0 / a0;
    let b0 = y0 - a0 * x0;
    let b1 = y0 - a1 * x0;
    let b2 = y2 - a0 * x2;
    let b3 = y2 - a1 * x2;

    // Window diagonals: y = c0*x + d0 and y = c1*x + d1
    let c0 = (rect.center_y() - rect.top) / (rect.center_x() - rect.left);
    let c1 = -c0;
    let d0 = rect.top - c0 * rect.left;
    let d1 = rect.top - c1 * rect.right;

    for candidate in [
        (d0 - b0) / (a0 - c0),
        (d0 - b1) / (a1 - c0),
        (d1 - b3) / (a1 - c1),
    ] {
        if candidate < rect.right {
            left = left.max(candidate);
        }
    }
    for candidate in [
        (d1 - b1) / (a1 - c1),
        (d1 - b2) / (a0 - c1),
        (d0 - b2) / (a0 - c0),
    ] {
        if candidate > rect.left {
            right = right.min(candidate);
        }
    }

    top = top.max((a0 * left + b0).max(a1 * right + b1));
    bottom = bottom.min((a1 * left + b3).min(a0 * right + b2));

    (Rect::new(left, top, right, bottom), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Matrix;

    fn overlay_over(config: &CropConfig, width: f32, height: f32) -> CropOverlay {
        let mut overlay = CropOverlay::new(config);
        overlay.set_window_limits(width, height, 1.0, 1.0);
        overlay.set_bounds(
            Some(&Rect::new(0.0, 0.0, width, height).corners()),
            width,
            height,
        );
        overlay
    }

    #[test]
    fn test_padding_rule() {
        let overlay = overlay_over(&CropConfig::default(), 1000.0, 1000.0);
        assert!(overlay.is_initialized());
        assert_eq!(overlay.rect(), Rect::new(100.0, 100.0, 900.0, 900.0));
    }

    #[test]
    fn test_aspect_rule_height_driven() {
        let config = CropConfig {
            fix_aspect_ratio: true,
            ..Default::default()
        };
        let overlay = overlay_over(&config, 2000.0, 1000.0);
        assert_eq!(overlay.rect(), Rect::new(600.0, 100.0, 1400.0, 900.0));
    }

    #[test]
    fn test_aspect_rule_width_driven() {
        let config = CropConfig {
            fix_aspect_ratio: true,
            aspect_ratio: AspectRatio::new(2, 1),
            ..Default::default()
        };
        let overlay = overlay_over(&config, 1000.0, 1000.0);
        assert_eq!(overlay.rect(), Rect::new(100.0, 300.0, 900.0, 700.0));
    }

    #[test]
    fn test_initial_rect_is_scaled_and_clamped() {
        let config = CropConfig {
            initial_crop_window_rect: Some(IntRect::new(100, 100, 2400, 500)),
            ..Default::default()
        };
        let mut overlay = CropOverlay::new(&config);
        // two source px per display px
        overlay.set_window_limits(1000.0, 1000.0, 2.0, 2.0);
        overlay.set_bounds(Some(&Rect::new(0.0, 0.0, 1000.0, 1000.0).corners()), 1000.0, 1000.0);
        assert_eq!(overlay.rect(), Rect::new(50.0, 50.0, 1000.0, 250.0));
    }

    #[test]
    fn test_init_deferred_until_bounds_exist() {
        let mut overlay = CropOverlay::new(&CropConfig::default());
        overlay.set_window_limits(0.0, 0.0, 1.0, 1.0);
        overlay.set_bounds(Some(&Rect::new(0.0, 0.0, 500.0, 500.0).corners()), 0.0, 0.0);
        assert!(!overlay.is_initialized());
        assert_eq!(overlay.rect(), Rect::EMPTY);

        overlay.set_window_limits(500.0, 500.0, 1.0, 1.0);
        overlay.set_bounds(Some(&Rect::new(0.0, 0.0, 500.0, 501.0).corners()), 500.0, 500.0);
        assert!(overlay.is_initialized());
        assert_eq!(overlay.rect(), Rect::new(50.0, 50.0, 450.0, 450.0));
    }

    #[test]
    fn test_fix_grows_small_window_to_min() {
        let mut overlay = overlay_over(&CropConfig::default(), 1000.0, 1000.0);
        overlay.set_rect(Rect::new(500.0, 500.0, 510.0, 510.0));
        overlay.fix_current_rect();
        let rect = overlay.rect();
        assert_eq!(rect.width(), 42.0);
        assert_eq!(rect.height(), 42.0);
        assert_eq!(rect.center_x(), 505.0);
    }

    #[test]
    fn test_fix_clamps_into_bounds() {
        let mut overlay = overlay_over(&CropConfig::default(), 1000.0, 1000.0);
        overlay.set_rect(Rect::new(-50.0, 900.0, 300.0, 1100.0));
        overlay.fix_current_rect();
        assert_eq!(overlay.rect(), Rect::new(0.0, 900.0, 300.0, 1000.0));
    }

    #[test]
    fn test_fix_restores_locked_aspect() {
        let config = CropConfig {
            fix_aspect_ratio: true,
            ..Default::default()
        };
        let mut overlay = overlay_over(&config, 1000.0, 1000.0);
        overlay.set_rect(Rect::new(100.0, 100.0, 500.0, 300.0));
        overlay.fix_current_rect();
        assert_eq!(overlay.rect(), Rect::new(200.0, 100.0, 400.0, 300.0));
    }

    #[test]
    fn test_pointer_cycle() {
        let mut overlay = overlay_over(&CropConfig::default(), 1000.0, 1000.0);
        assert!(!overlay.pointer_move(10.0, 10.0));
        assert!(!overlay.pointer_up());

        assert!(overlay.pointer_down(100.0, 100.0));
        assert_eq!(overlay.active_handle(), Some(DragHandle::TopLeft));
        assert!(overlay.pointer_move(200.0, 250.0));
        assert_eq!(overlay.rect(), Rect::new(200.0, 250.0, 900.0, 900.0));
        assert!(overlay.pointer_up());
        assert_eq!(overlay.active_handle(), None);
    }

    #[test]
    fn test_pointer_down_outside_is_ignored() {
        let mut overlay = overlay_over(&CropConfig::default(), 1000.0, 1000.0);
        assert!(!overlay.pointer_down(20.0, 20.0));
        assert!(!overlay.pointer_move(400.0, 400.0));
        assert_eq!(overlay.rect(), Rect::new(100.0, 100.0, 900.0, 900.0));
    }

    #[test]
    fn test_guidelines_visibility_modes() {
        let mut overlay = overlay_over(&CropConfig::default(), 1000.0, 1000.0);
        assert!(!overlay.guidelines_visible());
        overlay.pointer_down(500.0, 500.0);
        assert!(overlay.guidelines_visible());
        overlay.pointer_up();

        overlay.set_guidelines(Guidelines::On);
        assert!(overlay.guidelines_visible());
        overlay.set_rect(Rect::new(0.0, 0.0, 80.0, 300.0));
        assert!(!overlay.guidelines_visible());

        overlay.set_guidelines(Guidelines::Off);
        overlay.set_rect(Rect::new(0.0, 0.0, 500.0, 500.0));
        assert!(!overlay.guidelines_visible());
    }

    #[test]
    fn test_pinch_requires_multi_touch() {
        let mut overlay = overlay_over(&CropConfig::default(), 1000.0, 1000.0);
        assert!(!overlay.pinch(500.0, 500.0, 200.0, 100.0));

        overlay.set_multi_touch_enabled(true);
        assert!(overlay.pinch(500.0, 500.0, 200.0, 100.0));
        assert_eq!(overlay.rect(), Rect::new(400.0, 450.0, 600.0, 550.0));

        // would start left of the view
        assert!(!overlay.pinch(50.0, 500.0, 200.0, 100.0));
        assert_eq!(overlay.rect(), Rect::new(400.0, 450.0, 600.0, 550.0));
    }

    #[test]
    fn test_aspect_ratio_setter_rejects_non_positive() {
        let mut overlay = overlay_over(&CropConfig::default(), 1000.0, 1000.0);
        assert!(overlay.set_aspect_ratio(AspectRatio::new(0, 1)).is_err());
        assert_eq!(overlay.aspect_ratio(), AspectRatio::new(1, 1));
    }

    #[test]
    fn test_locking_aspect_reinitializes() {
        let mut overlay = overlay_over(&CropConfig::default(), 1000.0, 500.0);
        overlay.set_aspect_ratio(AspectRatio::new(1, 1)).unwrap();
        overlay.set_fixed_aspect_ratio(true);
        let rect = overlay.rect();
        assert!((rect.width() - rect.height()).abs() < 1e-3);
        assert_eq!(rect.top, 50.0);
        assert_eq!(rect.bottom, 450.0);
    }

    #[test]
    fn test_straight_bounds_are_bounding_box() {
        let quad = Rect::new(10.0, 20.0, 300.0, 400.0).corners();
        let (bounds, rotated) = calculate_bounds(&quad, &Rect::new(50.0, 50.0, 100.0, 100.0));
        assert!(!rotated);
        assert_eq!(bounds, Rect::new(10.0, 20.0, 300.0, 400.0));
    }

    #[test]
    fn test_rotated_bounds_stay_inside_image() {
        let mut m = Matrix::IDENTITY;
        m.post_rotate(30.0, 500.0, 500.0);
        let quad = m.map_quad(&Rect::new(200.0, 200.0, 800.0, 800.0).corners());
        let window = Rect::new(400.0, 400.0, 600.0, 600.0);
        let (bounds, rotated) = calculate_bounds(&quad, &window);
        assert!(rotated);

        let outer = Rect::bounding(&quad);
        assert!(bounds.left > outer.left && bounds.right < outer.right);
        assert!(bounds.top > outer.top && bounds.bottom < outer.bottom);

        // the square window's diagonal corners land on the slanted edges,
        // so the symmetric bounds are centered on the image
        assert!((bounds.center_x() - 500.0).abs() < 1.0);
        assert!((bounds.center_y() - 500.0).abs() < 1.0);
        assert!(bounds.left <= window.left && bounds.right >= window.right);
    }
}
