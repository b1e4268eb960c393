//! Geometry primitives shared by the crop window engine.
//!
//! Everything here is pure and stateless. Two coordinate spaces are in play:
//!
//! - **Display space**: pixels of the hosting view, origin top-left, y axis down.
//! - **Source space**: pixels of the source bitmap (optionally multiplied by the
//!   decode sample size to reach original pixel space).
//!
//! Image outlines are passed around as a [`Quad`]: four corners stored as eight
//! floats `[x0, y0, x1, y1, x2, y2, x3, y3]` in the order top-left, top-right,
//! bottom-right, bottom-left of the unrotated bitmap.

mod matrix;

pub use matrix::Matrix;

use serde::{Deserialize, Serialize};

/// Four corner points stored as `[x0, y0, x1, y1, x2, y2, x3, y3]`.
pub type Quad = [f32; 8];

/// A point in display or source space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned floating point rectangle.
///
/// The crop window lives in display space as one of these. A well-formed rect
/// has `left <= right` and `top <= bottom`; [`Rect::EMPTY`] marks an
/// uninitialized crop window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// The zero rectangle.
    pub const EMPTY: Rect = Rect {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    /// True when the rect has no area (including inverted rects).
    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Translate the rect by `(dx, dy)`.
    pub fn offset(&mut self, dx: f32, dy: f32) {
        self.left += dx;
        self.right += dx;
        self.top += dy;
        self.bottom += dy;
    }

    /// Shrink the rect by `dx` on the left and right and `dy` on the top and
    /// bottom. Negative values grow it.
    pub fn inset(&mut self, dx: f32, dy: f32) {
        self.left += dx;
        self.right -= dx;
        self.top += dy;
        self.bottom -= dy;
    }

    /// Corners in quad order (top-left, top-right, bottom-right, bottom-left).
    pub fn corners(&self) -> Quad {
        [
            self.left,
            self.top,
            self.right,
            self.top,
            self.right,
            self.bottom,
            self.left,
            self.bottom,
        ]
    }

    /// Bounding box of a quad.
    pub fn bounding(points: &Quad) -> Rect {
        Rect {
            left: bounding_left(points),
            top: bounding_top(points),
            right: bounding_right(points),
            bottom: bounding_bottom(points),
        }
    }
}

/// Axis-aligned integer rectangle in source pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl IntRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// Locked crop aspect ratio, `x:y` (both components positive once validated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub x: i32,
    pub y: i32,
}

impl AspectRatio {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Width divided by height.
    #[inline]
    pub fn value(&self) -> f32 {
        self.x as f32 / self.y as f32
    }

    pub fn is_square(&self) -> bool {
        self.x == self.y
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self { x: 1, y: 1 }
    }
}

/// Smallest x coordinate of the quad.
pub fn bounding_left(points: &Quad) -> f32 {
    points[0].min(points[2]).min(points[4]).min(points[6])
}

/// Smallest y coordinate of the quad.
pub fn bounding_top(points: &Quad) -> f32 {
    points[1].min(points[3]).min(points[5]).min(points[7])
}

/// Largest x coordinate of the quad.
pub fn bounding_right(points: &Quad) -> f32 {
    points[0].max(points[2]).max(points[4]).max(points[6])
}

/// Largest y coordinate of the quad.
pub fn bounding_bottom(points: &Quad) -> f32 {
    points[1].max(points[3]).max(points[5]).max(points[7])
}

pub fn bounding_width(points: &Quad) -> f32 {
    bounding_right(points) - bounding_left(points)
}

pub fn bounding_height(points: &Quad) -> f32 {
    bounding_bottom(points) - bounding_top(points)
}

pub fn bounding_center_x(points: &Quad) -> f32 {
    (bounding_right(points) + bounding_left(points)) / 2.0
}

pub fn bounding_center_y(points: &Quad) -> f32 {
    (bounding_bottom(points) + bounding_top(points)) / 2.0
}

/// Integer rectangle covering a (possibly rotated) quad, clamped to the image.
///
/// Each edge is rounded to the nearest pixel after clamping to
/// `[0, image_width] x [0, image_height]`. When an aspect ratio is given the
/// result is passed through [`fix_rect_for_aspect_ratio`].
pub fn rect_from_points(
    points: &Quad,
    image_width: i32,
    image_height: i32,
    aspect_ratio: Option<AspectRatio>,
) -> IntRect {
    let left = bounding_left(points).max(0.0).round() as i32;
    let top = bounding_top(points).max(0.0).round() as i32;
    let right = bounding_right(points).min(image_width as f32).round() as i32;
    let bottom = bounding_bottom(points).min(image_height as f32).round() as i32;

    let mut rect = IntRect::new(left, top, right, bottom);
    if let Some(ratio) = aspect_ratio {
        fix_rect_for_aspect_ratio(&mut rect, ratio);
    }
    rect
}

/// Force a square crop when the locked ratio is 1:1.
///
/// The longer side is trimmed from its far edge (right or bottom). Other
/// ratios are left untouched.
pub fn fix_rect_for_aspect_ratio(rect: &mut IntRect, ratio: AspectRatio) {
    if ratio.is_square() && rect.width() != rect.height() {
        if rect.height() > rect.width() {
            rect.bottom -= rect.height() - rect.width();
        } else {
            rect.right -= rect.width() - rect.height();
        }
    }
}

/// Euclidean distance between corner `a` and corner `b` of a quad.
pub fn corner_distance(points: &Quad, a: usize, b: usize) -> f32 {
    let dx = points[b * 2] - points[a * 2];
    let dy = points[b * 2 + 1] - points[a * 2 + 1];
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Quad {
        // A square rotated by 45 degrees around (50, 50)
        [50.0, 0.0, 100.0, 50.0, 50.0, 100.0, 0.0, 50.0]
    }

    #[test]
    fn test_bounding_box_of_rotated_quad() {
        let quad = diamond();
        assert_eq!(bounding_left(&quad), 0.0);
        assert_eq!(bounding_top(&quad), 0.0);
        assert_eq!(bounding_right(&quad), 100.0);
        assert_eq!(bounding_bottom(&quad), 100.0);
        assert_eq!(bounding_center_x(&quad), 50.0);
        assert_eq!(bounding_center_y(&quad), 50.0);
        assert_eq!(bounding_width(&quad), 100.0);
        assert_eq!(bounding_height(&quad), 100.0);
    }

    #[test]
    fn test_rect_corners_round_trip() {
        let rect = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(Rect::bounding(&rect.corners()), rect);
    }

    #[test]
    fn test_rect_offset_and_inset() {
        let mut rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        rect.offset(10.0, 5.0);
        assert_eq!(rect, Rect::new(10.0, 5.0, 110.0, 55.0));

        rect.inset(10.0, 5.0);
        assert_eq!(rect, Rect::new(20.0, 10.0, 100.0, 50.0));
        assert_eq!(rect.width(), 80.0);
        assert_eq!(rect.height(), 40.0);
    }

    #[test]
    fn test_empty_rect() {
        assert!(Rect::EMPTY.is_empty());
        assert!(Rect::new(10.0, 10.0, 5.0, 20.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_rect_from_points_clamps_to_image() {
        let quad = Rect::new(-20.0, -5.0, 140.0, 90.0).corners();
        let rect = rect_from_points(&quad, 100, 80, None);
        assert_eq!(rect, IntRect::new(0, 0, 100, 80));
    }

    #[test]
    fn test_rect_from_points_rounds_edges() {
        let quad = Rect::new(10.4, 10.6, 50.5, 60.2).corners();
        let rect = rect_from_points(&quad, 100, 100, None);
        assert_eq!(rect, IntRect::new(10, 11, 51, 60));
    }

    #[test]
    fn test_square_ratio_trims_wide_rect() {
        let quad = Rect::new(0.0, 0.0, 120.0, 100.0).corners();
        let rect = rect_from_points(&quad, 200, 200, Some(AspectRatio::new(1, 1)));
        assert_eq!(rect, IntRect::new(0, 0, 100, 100));
    }

    #[test]
    fn test_square_ratio_trims_tall_rect() {
        let quad = Rect::new(10.0, 10.0, 60.0, 90.0).corners();
        let rect = rect_from_points(&quad, 200, 200, Some(AspectRatio::new(3, 3)));
        assert_eq!(rect, IntRect::new(10, 10, 60, 60));
    }

    #[test]
    fn test_non_square_ratio_left_untouched() {
        let quad = Rect::new(0.0, 0.0, 120.0, 100.0).corners();
        let rect = rect_from_points(&quad, 200, 200, Some(AspectRatio::new(16, 9)));
        assert_eq!(rect, IntRect::new(0, 0, 120, 100));
    }

    #[test]
    fn test_corner_distance() {
        let quad = diamond();
        let side = corner_distance(&quad, 0, 1);
        assert!((side - 50.0 * 2f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_aspect_ratio_value() {
        assert!((AspectRatio::new(16, 9).value() - 16.0 / 9.0).abs() < f32::EPSILON);
        assert!(AspectRatio::default().is_square());
    }
}
