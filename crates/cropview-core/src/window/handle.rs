//! Touch hit-testing of crop window handles.

use serde::{Deserialize, Serialize};

use super::limits::window_fits_guidelines;
use crate::config::CropShape;
use crate::geometry::Rect;

/// Part of the crop window grabbed by a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DragHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Left,
    Top,
    Right,
    Bottom,
    Center,
}

/// Find the handle under a touch point.
///
/// Rectangles use the tolerance radius; ovals classify by a 6x6 cell grid
/// and ignore the radius. Returns `None` when nothing was hit, which callers
/// treat as "not a drag".
pub fn resolve_handle(
    x: f32,
    y: f32,
    rect: &Rect,
    touch_radius: f32,
    shape: CropShape,
) -> Option<DragHandle> {
    match shape {
        CropShape::Oval => Some(resolve_oval(x, y, rect)),
        CropShape::Rectangle => resolve_rectangle(x, y, rect, touch_radius),
    }
}

fn resolve_rectangle(x: f32, y: f32, rect: &Rect, radius: f32) -> Option<DragHandle> {
    let corners = [
        (rect.left, rect.top, DragHandle::TopLeft),
        (rect.right, rect.top, DragHandle::TopRight),
        (rect.left, rect.bottom, DragHandle::BottomLeft),
        (rect.right, rect.bottom, DragHandle::BottomRight),
    ];
    for (hx, hy, handle) in corners {
        if in_corner_zone(x, y, hx, hy, radius) {
            return Some(handle);
        }
    }

    // Small windows stay movable: the center wins over edges there
    let focus_center = !window_fits_guidelines(rect);
    let inside = in_center_zone(x, y, rect);
    if inside && focus_center {
        return Some(DragHandle::Center);
    }

    if in_horizontal_zone(x, y, rect.left, rect.right, rect.top, radius) {
        return Some(DragHandle::Top);
    }
    if in_horizontal_zone(x, y, rect.left, rect.right, rect.bottom, radius) {
        return Some(DragHandle::Bottom);
    }
    if in_vertical_zone(x, y, rect.left, rect.top, rect.bottom, radius) {
        return Some(DragHandle::Left);
    }
    if in_vertical_zone(x, y, rect.right, rect.top, rect.bottom, radius) {
        return Some(DragHandle::Right);
    }

    inside.then_some(DragHandle::Center)
}

fn resolve_oval(x: f32, y: f32, rect: &Rect) -> DragHandle {
    let cell_width = rect.width() / 6.0;
    let left_center = rect.left + cell_width;
    let right_center = rect.left + 5.0 * cell_width;

    let cell_height = rect.height() / 6.0;
    let top_center = rect.top + cell_height;
    let bottom_center = rect.top + 5.0 * cell_height;

    // column, then row
    let column = if x < left_center {
        0
    } else if x < right_center {
        1
    } else {
        2
    };
    let row = if y < top_center {
        0
    } else if y < bottom_center {
        1
    } else {
        2
    };

    match (column, row) {
        (0, 0) => DragHandle::TopLeft,
        (0, 1) => DragHandle::Left,
        (0, _) => DragHandle::BottomLeft,
        (1, 0) => DragHandle::Top,
        (1, 1) => DragHandle::Center,
        (1, _) => DragHandle::Bottom,
        (_, 0) => DragHandle::TopRight,
        (_, 1) => DragHandle::Right,
        _ => DragHandle::BottomRight,
    }
}

#[inline]
fn in_corner_zone(x: f32, y: f32, hx: f32, hy: f32, radius: f32) -> bool {
    (x - hx).abs() <= radius && (y - hy).abs() <= radius
}

#[inline]
fn in_horizontal_zone(x: f32, y: f32, x_start: f32, x_end: f32, hy: f32, radius: f32) -> bool {
    x > x_start && x < x_end && (y - hy).abs() <= radius
}

#[inline]
fn in_vertical_zone(x: f32, y: f32, hx: f32, y_start: f32, y_end: f32, radius: f32) -> bool {
    (x - hx).abs() <= radius && y > y_start && y < y_end
}

#[inline]
fn in_center_zone(x: f32, y: f32, rect: &Rect) -> bool {
    x > rect.left && x < rect.right && y > rect.top && y < rect.bottom
}


// ============================================================================
// Property-based tests
// ============================================================================
