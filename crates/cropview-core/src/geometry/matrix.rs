//! 2D affine matrix with post-multiplication semantics.
//!
//! The matrix maps source bitmap pixels into display space. Operations are
//! applied with `post_*` methods, which compose the new operation *after* the
//! existing transform (`M' = Op * M`). Rotation angles are in degrees and,
//! with the y axis pointing down, positive angles turn clockwise on screen.

use super::{Point, Quad, Rect};
use serde::{Deserialize, Serialize};

/// Affine transform `[a b c; d e f; 0 0 1]`.
///
/// A point maps as `x' = a*x + b*y + c`, `y' = d*x + e*y + f`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 1.0,
        f: 0.0,
    };

    pub fn translate(dx: f32, dy: f32) -> Self {
        Self {
            c: dx,
            f: dy,
            ..Self::IDENTITY
        }
    }

    /// Scale about the pivot `(px, py)`.
    pub fn scale(sx: f32, sy: f32, px: f32, py: f32) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: px - sx * px,
            d: 0.0,
            e: sy,
            f: py - sy * py,
        }
    }

    /// Rotate by `degrees` about the pivot `(px, py)`.
    pub fn rotate(degrees: f32, px: f32, py: f32) -> Self {
        let radians = degrees.to_radians();
        let (sin, cos) = snap_trig(radians.sin(), radians.cos());
        Self {
            a: cos,
            b: -sin,
            c: px - cos * px + sin * py,
            d: sin,
            e: cos,
            f: py - sin * px - cos * py,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    /// `self = other * self`.
    pub fn post_concat(&mut self, other: &Matrix) {
        *self = other.multiply(self);
    }

    pub fn post_translate(&mut self, dx: f32, dy: f32) {
        self.post_concat(&Matrix::translate(dx, dy));
    }

    pub fn post_scale(&mut self, sx: f32, sy: f32, px: f32, py: f32) {
        self.post_concat(&Matrix::scale(sx, sy, px, py));
    }

    pub fn post_rotate(&mut self, degrees: f32, px: f32, py: f32) {
        self.post_concat(&Matrix::rotate(degrees, px, py));
    }

    /// Matrix product `self * rhs` (apply `rhs` first, then `self`).
    pub fn multiply(&self, rhs: &Matrix) -> Matrix {
        Matrix {
            a: self.a * rhs.a + self.b * rhs.d,
            b: self.a * rhs.b + self.b * rhs.e,
            c: self.a * rhs.c + self.b * rhs.f + self.c,
            d: self.d * rhs.a + self.e * rhs.d,
            e: self.d * rhs.b + self.e * rhs.e,
            f: self.d * rhs.c + self.e * rhs.f + self.f,
        }
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Matrix> {
        let det = self.a * self.e - self.b * self.d;
        if det.abs() < f32::EPSILON * 1e-3 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Matrix {
            a: self.e * inv,
            b: -self.b * inv,
            c: (self.b * self.f - self.e * self.c) * inv,
            d: -self.d * inv,
            e: self.a * inv,
            f: (self.d * self.c - self.a * self.f) * inv,
        })
    }

    pub fn map_xy(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.b * y + self.c,
            self.d * x + self.e * y + self.f,
        )
    }

    pub fn map_point(&self, point: Point) -> Point {
        let (x, y) = self.map_xy(point.x, point.y);
        Point::new(x, y)
    }

    /// Map an interleaved `[x, y, x, y, ...]` slice in place.
    pub fn map_points_in_place(&self, points: &mut [f32]) {
        for pair in points.chunks_exact_mut(2) {
            let (x, y) = self.map_xy(pair[0], pair[1]);
            pair[0] = x;
            pair[1] = y;
        }
    }

    pub fn map_quad(&self, quad: &Quad) -> Quad {
        let mut out = *quad;
        self.map_points_in_place(&mut out);
        out
    }

    /// Bounding box of the mapped rect corners.
    pub fn map_rect(&self, rect: &Rect) -> Rect {
        Rect::bounding(&self.map_quad(&rect.corners()))
    }

    /// Horizontal scale factor (length of the mapped unit x vector).
    pub fn scale_x(&self) -> f32 {
        (self.a * self.a + self.d * self.d).sqrt()
    }

    /// Vertical scale factor (length of the mapped unit y vector).
    pub fn scale_y(&self) -> f32 {
        (self.b * self.b + self.e * self.e).sqrt()
    }
}

/// Snap values within float noise of 0 or +-1 so quarter turns stay exact.
fn snap_trig(sin: f32, cos: f32) -> (f32, f32) {
    const EPS: f32 = 1e-6;
    let snap = |v: f32| {
        if v.abs() < EPS {
            0.0
        } else if (v - 1.0).abs() < EPS {
            1.0
        } else if (v + 1.0).abs() < EPS {
            -1.0
        } else {
            v
        }
    };
    (snap(sin), snap(cos))
}


// ============================================================================
// Property-based tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: inverse undoes any non-degenerate composite transform.
        #[test]
        fn prop_inverse_round_trips(
            degrees in -360.0f32..360.0,
            scale in 0.1f32..8.0,
            (tx, ty) in (-500.0f32..500.0, -500.0f32..500.0),
            (x, y) in (-1000.0f32..1000.0, -1000.0f32..1000.0),
        ) {
            let mut m = Matrix::IDENTITY;
            m.post_translate(tx, ty);
            m.post_rotate(degrees, 10.0, 20.0);
            m.post_scale(scale, scale, 0.0, 0.0);

            let inv = m.invert().unwrap();
            let (mx, my) = m.map_xy(x, y);
            let (bx, by) = inv.map_xy(mx, my);
            let tol = 1e-2 * (1.0 + x.abs().max(y.abs()));
            prop_assert!((bx - x).abs() < tol);
            prop_assert!((by - y).abs() < tol);
        }

        /// Property: rotation preserves distances.
        #[test]
        fn prop_rotation_is_rigid(degrees in -720.0f32..720.0, (x, y) in (-100.0f32..100.0, -100.0f32..100.0)) {
            let m = Matrix::rotate(degrees, 0.0, 0.0);
            let (rx, ry) = m.map_xy(x, y);
            let before = (x * x + y * y).sqrt();
            let after = (rx * rx + ry * ry).sqrt();
            prop_assert!((before - after).abs() < 1e-2);
        }
    }
}
