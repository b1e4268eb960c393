//! Per-gesture crop window resizing and moving.
//!
//! A [`DragController`] lives for one gesture. It captures the offset between
//! the finger and the grabbed handle's anchor at gesture start so the window
//! does not jump to the finger, then turns each move event into a new crop
//! rect that honors, in this fixed order:
//!
//! 1. min/max window size,
//! 2. the locked aspect ratio,
//! 3. snapping to the image bounds,
//! 4. following the finger.
//!
//! When the finger pushes past the view or the image bounds, the movement is
//! damped (divided by 1.05) and part of the excess is folded back into the
//! captured offset, so the finger and the window do not drift apart while the
//! window is pinned.

use crate::geometry::{Point, Rect};

use super::handle::DragHandle;
use super::limits::CropWindowLimits;

/// Damping divisor applied to movement past the view or image bounds.
const OVERSHOOT_DAMPING: f32 = 1.05;

/// Environment a move is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConstraints {
    /// Displayed image bounds (axis-aligned, possibly shrunk for rotation).
    pub bounds: Rect,
    pub view_width: f32,
    pub view_height: f32,
    pub snap_radius: f32,
    /// Locked `width / height`, `None` for free resizing.
    pub aspect_ratio: Option<f32>,
}

/// Resizes or moves the crop window for one drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragController {
    handle: DragHandle,
    min_width: f32,
    min_height: f32,
    max_width: f32,
    max_height: f32,
    touch_offset: Point,
}

impl DragController {
    /// Start a gesture on `handle` with the finger at `(touch_x, touch_y)`.
    ///
    /// The effective size limits are sampled once here and stay fixed for the
    /// whole gesture.
    pub fn new(handle: DragHandle, limits: &CropWindowLimits, touch_x: f32, touch_y: f32) -> Self {
        let rect = limits.rect();
        let touch_offset = match handle {
            DragHandle::TopLeft => Point::new(rect.left - touch_x, rect.top - touch_y),
            DragHandle::TopRight => Point::new(rect.right - touch_x, rect.top - touch_y),
            DragHandle::BottomLeft => Point::new(rect.left - touch_x, rect.bottom - touch_y),
            DragHandle::BottomRight => Point::new(rect.right - touch_x, rect.bottom - touch_y),
            DragHandle::Left => Point::new(rect.left - touch_x, 0.0),
            DragHandle::Top => Point::new(0.0, rect.top - touch_y),
            DragHandle::Right => Point::new(rect.right - touch_x, 0.0),
            DragHandle::Bottom => Point::new(0.0, rect.bottom - touch_y),
            DragHandle::Center => {
                Point::new(rect.center_x() - touch_x, rect.center_y() - touch_y)
            }
        };

        Self {
            handle,
            min_width: limits.min_crop_width(),
            min_height: limits.min_crop_height(),
            max_width: limits.max_crop_width(),
            max_height: limits.max_crop_height(),
            touch_offset,
        }
    }

    pub fn handle(&self) -> DragHandle {
        self.handle
    }

    /// Current finger-to-anchor offset, including overshoot corrections.
    pub fn touch_offset(&self) -> Point {
        self.touch_offset
    }

    /// Apply a move of the finger to `(x, y)` to `rect` in place.
    pub fn move_to(&mut self, rect: &mut Rect, x: f32, y: f32, constraints: &DragConstraints) {
        let x = x + self.touch_offset.x;
        let y = y + self.touch_offset.y;

        if self.handle == DragHandle::Center {
            self.move_center(rect, x, y, constraints);
        } else if let Some(ratio) = constraints.aspect_ratio {
            self.move_with_fixed_aspect(rect, x, y, constraints, ratio);
        } else {
            self.move_with_free_aspect(rect, x, y, constraints);
        }
    }

    fn move_center(&mut self, rect: &mut Rect, x: f32, y: f32, c: &DragConstraints) {
        let mut dx = x - rect.center_x();
        let mut dy = y - rect.center_y();
        let bounds = &c.bounds;

        if rect.left + dx < 0.0
            || rect.right + dx > c.view_width
            || rect.left + dx < bounds.left
            || rect.right + dx > bounds.right
        {
            dx /= OVERSHOOT_DAMPING;
            self.touch_offset.x -= dx / 2.0;
        }
        if rect.top + dy < 0.0
            || rect.bottom + dy > c.view_height
            || rect.top + dy < bounds.top
            || rect.bottom + dy > bounds.bottom
        {
            dy /= OVERSHOOT_DAMPING;
            self.touch_offset.y -= dy / 2.0;
        }

        rect.offset(dx, dy);
        snap_edges_to_bounds(rect, bounds, c.snap_radius);
    }

    fn move_with_free_aspect(&mut self, rect: &mut Rect, x: f32, y: f32, c: &DragConstraints) {
        let free = DragConstraints {
            aspect_ratio: None,
            ..*c
        };
        let c = &free;

        match self.handle {
            DragHandle::TopLeft => {
                self.adjust_top(rect, y, c, false, false);
                self.adjust_left(rect, x, c, false, false);
            }
            DragHandle::TopRight => {
                self.adjust_top(rect, y, c, false, false);
                self.adjust_right(rect, x, c, false, false);
            }
            DragHandle::BottomLeft => {
                self.adjust_bottom(rect, y, c, false, false);
                self.adjust_left(rect, x, c, false, false);
            }
            DragHandle::BottomRight => {
                self.adjust_bottom(rect, y, c, false, false);
                self.adjust_right(rect, x, c, false, false);
            }
            DragHandle::Left => self.adjust_left(rect, x, c, false, false),
            DragHandle::Top => self.adjust_top(rect, y, c, false, false),
            DragHandle::Right => self.adjust_right(rect, x, c, false, false),
            DragHandle::Bottom => self.adjust_bottom(rect, y, c, false, false),
            DragHandle::Center => {}
        }
    }

    /// Corners compare the ratio implied by the touch point and the two fixed
    /// edges against the target; below target the vertical edge drives,
    /// otherwise the horizontal one does.
    fn move_with_fixed_aspect(
        &mut self,
        rect: &mut Rect,
        x: f32,
        y: f32,
        c: &DragConstraints,
        ratio: f32,
    ) {
        match self.handle {
            DragHandle::TopLeft => {
                if aspect_of(x, y, rect.right, rect.bottom) < ratio {
                    self.adjust_top(rect, y, c, true, false);
                    adjust_left_by_aspect(rect, ratio);
                } else {
                    self.adjust_left(rect, x, c, true, false);
                    adjust_top_by_aspect(rect, ratio);
                }
            }
            DragHandle::TopRight => {
                if aspect_of(rect.left, y, x, rect.bottom) < ratio {
                    self.adjust_top(rect, y, c, false, true);
                    adjust_right_by_aspect(rect, ratio);
                } else {
                    self.adjust_right(rect, x, c, true, false);
                    adjust_top_by_aspect(rect, ratio);
                }
            }
            DragHandle::BottomLeft => {
                if aspect_of(x, rect.top, rect.right, y) < ratio {
                    self.adjust_bottom(rect, y, c, true, false);
                    adjust_left_by_aspect(rect, ratio);
                } else {
                    self.adjust_left(rect, x, c, false, true);
                    adjust_bottom_by_aspect(rect, ratio);
                }
            }
            DragHandle::BottomRight => {
                if aspect_of(rect.left, rect.top, x, y) < ratio {
                    self.adjust_bottom(rect, y, c, false, true);
                    adjust_right_by_aspect(rect, ratio);
                } else {
                    self.adjust_right(rect, x, c, false, true);
                    adjust_bottom_by_aspect(rect, ratio);
                }
            }
            DragHandle::Left => {
                self.adjust_left(rect, x, c, true, true);
                adjust_top_bottom_by_aspect(rect, &c.bounds, ratio);
            }
            DragHandle::Top => {
                self.adjust_top(rect, y, c, true, true);
                adjust_left_right_by_aspect(rect, &c.bounds, ratio);
            }
            DragHandle::Right => {
                self.adjust_right(rect, x, c, true, true);
                adjust_top_bottom_by_aspect(rect, &c.bounds, ratio);
            }
            DragHandle::Bottom => {
                self.adjust_bottom(rect, y, c, true, true);
                adjust_left_right_by_aspect(rect, &c.bounds, ratio);
            }
            DragHandle::Center => {}
        }
    }

    /// Move the left edge. `top_moves`/`bottom_moves` say which horizontal
    /// edges will follow through the aspect ratio afterwards.
    fn adjust_left(
        &mut self,
        rect: &mut Rect,
        left: f32,
        c: &DragConstraints,
        top_moves: bool,
        bottom_moves: bool,
    ) {
        let bounds = &c.bounds;
        let snap = c.snap_radius;
        let mut new_left = left;

        if new_left < 0.0 {
            new_left /= OVERSHOOT_DAMPING;
            self.touch_offset.x -= new_left / 1.1;
        }
        if new_left < bounds.left {
            self.touch_offset.x -= (new_left - bounds.left) / 2.0;
        }
        if new_left - bounds.left < snap {
            new_left = bounds.left;
        }

        if rect.right - new_left < self.min_width {
            new_left = rect.right - self.min_width;
        }
        if rect.right - new_left > self.max_width {
            new_left = rect.right - self.max_width;
        }
        if new_left - bounds.left < snap {
            new_left = bounds.left;
        }

        if let Some(ratio) = c.aspect_ratio {
            let mut new_height = (rect.right - new_left) / ratio;

            if new_height < self.min_height {
                new_left = bounds.left.max(rect.right - self.min_height * ratio);
                new_height = (rect.right - new_left) / ratio;
            }
            if new_height > self.max_height {
                new_left = bounds.left.max(rect.right - self.max_height * ratio);
                new_height = (rect.right - new_left) / ratio;
            }

            if top_moves && bottom_moves {
                new_left = new_left.max(bounds.left.max(rect.right - bounds.height() * ratio));
            } else {
                if top_moves && rect.bottom - new_height < bounds.top {
                    new_left = bounds
                        .left
                        .max(rect.right - (rect.bottom - bounds.top) * ratio);
                    new_height = (rect.right - new_left) / ratio;
                }
                if bottom_moves && rect.top + new_height > bounds.bottom {
                    new_left = new_left.max(
                        bounds
                            .left
                            .max(rect.right - (bounds.bottom - rect.top) * ratio),
                    );
                }
            }
        }

        rect.left = new_left;
    }

    fn adjust_right(
        &mut self,
        rect: &mut Rect,
        right: f32,
        c: &DragConstraints,
        top_moves: bool,
        bottom_moves: bool,
    ) {
        let bounds = &c.bounds;
        let snap = c.snap_radius;
        let mut new_right = right;

        if new_right > c.view_width {
            new_right = c.view_width + (new_right - c.view_width) / OVERSHOOT_DAMPING;
            self.touch_offset.x -= (new_right - c.view_width) / 1.1;
        }
        if new_right > bounds.right {
            self.touch_offset.x -= (new_right - bounds.right) / 2.0;
        }
        if bounds.right - new_right < snap {
            new_right = bounds.right;
        }

        if new_right - rect.left < self.min_width {
            new_right = rect.left + self.min_width;
        }
        if new_right - rect.left > self.max_width {
            new_right = rect.left + self.max_width;
        }
        if bounds.right - new_right < snap {
            new_right = bounds.right;
        }

        if let Some(ratio) = c.aspect_ratio {
            let mut new_height = (new_right - rect.left) / ratio;

            if new_height < self.min_height {
                new_right = bounds.right.min(rect.left + self.min_height * ratio);
                new_height = (new_right - rect.left) / ratio;
            }
            if new_height > self.max_height {
                new_right = bounds.right.min(rect.left + self.max_height * ratio);
                new_height = (new_right - rect.left) / ratio;
            }

            if top_moves && bottom_moves {
                new_right =
                    new_right.min(bounds.right.min(rect.left + bounds.height() * ratio));
            } else {
                if top_moves && rect.bottom - new_height < bounds.top {
                    new_right = bounds
                        .right
                        .min(rect.left + (rect.bottom - bounds.top) * ratio);
                    new_height = (new_right - rect.left) / ratio;
                }
                if bottom_moves && rect.top + new_height > bounds.bottom {
                    new_right = new_right.min(
                        bounds
                            .right
                            .min(rect.left + (bounds.bottom - rect.top) * ratio),
                    );
                }
            }
        }

        rect.right = new_right;
    }

    fn adjust_top(
        &mut self,
        rect: &mut Rect,
        top: f32,
        c: &DragConstraints,
        left_moves: bool,
        right_moves: bool,
    ) {
        let bounds = &c.bounds;
        let snap = c.snap_radius;
        let mut new_top = top;

        if new_top < 0.0 {
            new_top /= OVERSHOOT_DAMPING;
            self.touch_offset.y -= new_top / 1.1;
        }
        if new_top < bounds.top {
            self.touch_offset.y -= (new_top - bounds.top) / 2.0;
        }
        if new_top - bounds.top < snap {
            new_top = bounds.top;
        }

        if rect.bottom - new_top < self.min_height {
            new_top = rect.bottom - self.min_height;
        }
        if rect.bottom - new_top > self.max_height {
            new_top = rect.bottom - self.max_height;
        }
        if new_top - bounds.top < snap {
            new_top = bounds.top;
        }

        if let Some(ratio) = c.aspect_ratio {
            let mut new_width = (rect.bottom - new_top) * ratio;

            if new_width < self.min_width {
                new_top = bounds.top.max(rect.bottom - self.min_width / ratio);
                new_width = (rect.bottom - new_top) * ratio;
            }
            if new_width > self.max_width {
                new_top = bounds.top.max(rect.bottom - self.max_width / ratio);
                new_width = (rect.bottom - new_top) * ratio;
            }

            if left_moves && right_moves {
                new_top = new_top.max(bounds.top.max(rect.bottom - bounds.width() / ratio));
            } else {
                if left_moves && rect.right - new_width < bounds.left {
                    new_top = bounds
                        .top
                        .max(rect.bottom - (rect.right - bounds.left) / ratio);
                    new_width = (rect.bottom - new_top) * ratio;
                }
                if right_moves && rect.left + new_width > bounds.right {
                    new_top = new_top.max(
                        bounds
                            .top
                            .max(rect.bottom - (bounds.right - rect.left) / ratio),
                    );
                }
            }
        }

        rect.top = new_top;
    }

    fn adjust_bottom(
        &mut self,
        rect: &mut Rect,
        bottom: f32,
        c: &DragConstraints,
        left_moves: bool,
        right_moves: bool,
    ) {
        let bounds = &c.bounds;
        let snap = c.snap_radius;
        let mut new_bottom = bottom;

        if new_bottom > c.view_height {
            new_bottom = c.view_height + (new_bottom - c.view_height) / OVERSHOOT_DAMPING;
            self.touch_offset.y -= (new_bottom - c.view_height) / 1.1;
        }
        if new_bottom > bounds.bottom {
            self.touch_offset.y -= (new_bottom - bounds.bottom) / 2.0;
        }
        if bounds.bottom - new_bottom < snap {
            new_bottom = bounds.bottom;
        }

        if new_bottom - rect.top < self.min_height {
            new_bottom = rect.top + self.min_height;
        }
        if new_bottom - rect.top > self.max_height {
            new_bottom = rect.top + self.max_height;
        }
        if bounds.bottom - new_bottom < snap {
            new_bottom = bounds.bottom;
        }

        if let Some(ratio) = c.aspect_ratio {
            let mut new_width = (new_bottom - rect.top) * ratio;

            if new_width < self.min_width {
                new_bottom = bounds.bottom.min(rect.top + self.min_width / ratio);
                new_width = (new_bottom - rect.top) * ratio;
            }
            if new_width > self.max_width {
                new_bottom = bounds.bottom.min(rect.top + self.max_width / ratio);
                new_width = (new_bottom - rect.top) * ratio;
            }

            if left_moves && right_moves {
                new_bottom =
                    new_bottom.min(bounds.bottom.min(rect.top + bounds.width() / ratio));
            } else {
                if left_moves && rect.right - new_width < bounds.left {
                    new_bottom = bounds
                        .bottom
                        .min(rect.top + (rect.right - bounds.left) / ratio);
                    new_width = (new_bottom - rect.top) * ratio;
                }
                if right_moves && rect.left + new_width > bounds.right {
                    new_bottom = new_bottom.min(
                        bounds
                            .bottom
                            .min(rect.top + (bounds.right - rect.left) / ratio),
                    );
                }
            }
        }

        rect.bottom = new_bottom;
    }
}

fn snap_edges_to_bounds(rect: &mut Rect, bounds: &Rect, margin: f32) {
    if rect.left < bounds.left + margin {
        rect.offset(bounds.left - rect.left, 0.0);
    }
    if rect.top < bounds.top + margin {
        rect.offset(0.0, bounds.top - rect.top);
    }
    if rect.right > bounds.right - margin {
        rect.offset(bounds.right - rect.right, 0.0);
    }
    if rect.bottom > bounds.bottom - margin {
        rect.offset(0.0, bounds.bottom - rect.bottom);
    }
}

#[inline]
fn aspect_of(left: f32, top: f32, right: f32, bottom: f32) -> f32 {
    (right - left) / (bottom - top)
}

fn adjust_left_by_aspect(rect: &mut Rect, ratio: f32) {
    rect.left = rect.right - rect.height() * ratio;
}

fn adjust_top_by_aspect(rect: &mut Rect, ratio: f32) {
    rect.top = rect.bottom - rect.width() / ratio;
}

fn adjust_right_by_aspect(rect: &mut Rect, ratio: f32) {
    rect.right = rect.left + rect.height() * ratio;
}

fn adjust_bottom_by_aspect(rect: &mut Rect, ratio: f32) {
    rect.bottom = rect.top + rect.width() / ratio;
}

/// Derive width from height around the current horizontal center, then slide
/// back inside the bounds.
fn adjust_left_right_by_aspect(rect: &mut Rect, bounds: &Rect, ratio: f32) {
    rect.inset((rect.width() - rect.height() * ratio) / 2.0, 0.0);
    if rect.left < bounds.left {
        rect.offset(bounds.left - rect.left, 0.0);
    }
    if rect.right > bounds.right {
        rect.offset(bounds.right - rect.right, 0.0);
    }
}

fn adjust_top_bottom_by_aspect(rect: &mut Rect, bounds: &Rect, ratio: f32) {
    rect.inset(0.0, (rect.height() - rect.width() / ratio) / 2.0);
    if rect.top < bounds.top {
        rect.offset(0.0, bounds.top - rect.top);
    }
    if rect.bottom > bounds.bottom {
        rect.offset(0.0, bounds.bottom - rect.bottom);
    }
}


// ============================================================================
// Property-based tests
// ============================================================================
