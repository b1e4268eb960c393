//! Region extraction, rotation and flips of RGB bitmaps.
//!
//! Angles are in degrees and positive angles turn clockwise, the same
//! direction the display matrix uses. Right angles go through the `image`
//! crate's exact rotations; other angles use inverse mapping with bilinear
//! sampling onto an expanded canvas:
//!
//! ```text
//! src_x =  dx * cos(θ) + dy * sin(θ) + src_cx
//! src_y = -dx * sin(θ) + dy * cos(θ) + src_cy
//! ```

use crate::bitmap::DecodedImage;
use crate::geometry::IntRect;

/// Tolerance for treating an angle as a right angle.
const ANGLE_EPSILON: f64 = 0.001;

/// Copy the pixels inside `rect`, clamped to the image.
pub fn extract_region(image: &DecodedImage, rect: &IntRect) -> DecodedImage {
    let left = rect.left.clamp(0, image.width as i32) as u32;
    let top = rect.top.clamp(0, image.height as i32) as u32;
    let right = (rect.right.max(rect.left)).clamp(0, image.width as i32) as u32;
    let bottom = (rect.bottom.max(rect.top)).clamp(0, image.height as i32) as u32;

    if left == 0 && top == 0 && right == image.width && bottom == image.height {
        return image.clone();
    }

    let out_width = right - left;
    let out_height = bottom - top;
    let row_bytes = (out_width * 3) as usize;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    // row by row
    for y in top..bottom {
        let start = ((y * image.width + left) * 3) as usize;
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    DecodedImage {
        width: out_width,
        height: out_height,
        pixels: output,
    }
}

/// Size of the canvas holding the whole rotated image.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let normalized = degrees.rem_euclid(360.0);
    if normalized < ANGLE_EPSILON || (360.0 - normalized) < ANGLE_EPSILON {
        return (width, height);
    }
    if (normalized - 90.0).abs() < ANGLE_EPSILON || (normalized - 270.0).abs() < ANGLE_EPSILON {
        return (height, width);
    }
    if (normalized - 180.0).abs() < ANGLE_EPSILON {
        return (width, height);
    }

    let rad = normalized.to_radians();
    let (cos, sin) = (rad.cos().abs(), rad.sin().abs());
    let (w, h) = (width as f64, height as f64);

    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;
    (new_w.max(1), new_h.max(1))
}

/// Rotate clockwise about the image center, expanding the canvas.
///
/// Canvas pixels not covered by the source are black.
pub fn rotate_clockwise(image: &DecodedImage, degrees: f64) -> DecodedImage {
    let normalized = degrees.rem_euclid(360.0);
    let right_angle = [0.0, 90.0, 180.0, 270.0, 360.0]
        .into_iter()
        .find(|angle| (normalized - angle).abs() < ANGLE_EPSILON);

    if let Some(angle) = right_angle {
        let Some(rgb) = image.to_rgb_image() else {
            return image.clone();
        };
        let rotated = match angle as u32 {
            90 => image::imageops::rotate90(&rgb),
            180 => image::imageops::rotate180(&rgb),
            270 => image::imageops::rotate270(&rgb),
            _ => return image.clone(),
        };
        return DecodedImage::from_rgb_image(rotated);
    }

    let (dst_w, dst_h) = rotated_bounds(image.width, image.height, normalized);
    let rad = normalized.to_radians();
    let (cos, sin) = (rad.cos(), rad.sin());

    let src_cx = image.width as f64 / 2.0;
    let src_cy = image.height as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = vec![0u8; (dst_w * dst_h * 3) as usize];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            // pixel centers
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            let src_x = dx * cos + dy * sin + src_cx - 0.5;
            let src_y = -dx * sin + dy * cos + src_cy - 0.5;

            if let Some(pixel) = sample_bilinear(image, src_x, src_y) {
                let idx = ((dst_y * dst_w + dst_x) * 3) as usize;
                output[idx..idx + 3].copy_from_slice(&pixel);
            }
        }
    }

    DecodedImage {
        width: dst_w,
        height: dst_h,
        pixels: output,
    }
}

/// Mirror the image in place.
pub fn flip(image: DecodedImage, horizontally: bool, vertically: bool) -> DecodedImage {
    if !horizontally && !vertically {
        return image;
    }
    let Some(mut rgb) = image.to_rgb_image() else {
        return image;
    };
    if horizontally {
        image::imageops::flip_horizontal_in_place(&mut rgb);
    }
    if vertically {
        image::imageops::flip_vertical_in_place(&mut rgb);
    }
    DecodedImage::from_rgb_image(rgb)
}

/// Centered `width x height` region, clamped to the image.
pub fn center_crop(image: &DecodedImage, width: u32, height: u32) -> DecodedImage {
    let width = width.clamp(1, image.width.max(1));
    let height = height.clamp(1, image.height.max(1));
    let left = ((image.width - width) / 2) as i32;
    let top = ((image.height - height) / 2) as i32;
    extract_region(
        image,
        &IntRect::new(left, top, left + width as i32, top + height as i32),
    )
}

#[inline]
fn get_pixel_f64(image: &DecodedImage, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

/// Bilinear sample at pixel-center coordinates. `None` outside the image.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> Option<[u8; 3]> {
    let (w, h) = (image.width as f64, image.height as f64);
    if image.width == 0 || image.height == 0 || x < -0.5 || y < -0.5 || x > w - 0.5 || y > h - 0.5 {
        return None;
    }

    let x = x.clamp(0.0, w - 1.0);
    let y = y.clamp(0.0, h - 1.0);
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    Some(result)
}
