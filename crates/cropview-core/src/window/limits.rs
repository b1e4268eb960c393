//! Size limits of the crop window.
//!
//! The limits combine two sources:
//!
//! - **Window limits** in display pixels: a configured minimum and a maximum
//!   equal to the view size.
//! - **Result limits** in source pixels, converted to display pixels through
//!   the current scale factors (source px per display px).
//!
//! The effective minimum is the larger of the two minimums and the effective
//! maximum is the smaller of the two maximums.

use serde::{Deserialize, Serialize};

use crate::config::CropConfig;
use crate::geometry::Rect;

/// Windows narrower or shorter than this many display pixels hide their guidelines.
pub const GUIDELINES_MIN_SIZE: f32 = 100.0;

/// Crop window size limits plus the current crop window rect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropWindowLimits {
    rect: Rect,
    min_window_width: f32,
    min_window_height: f32,
    max_window_width: f32,
    max_window_height: f32,
    min_result_width: f32,
    min_result_height: f32,
    max_result_width: f32,
    max_result_height: f32,
    scale_factor_width: f32,
    scale_factor_height: f32,
}

impl Default for CropWindowLimits {
    fn default() -> Self {
        Self {
            rect: Rect::EMPTY,
            min_window_width: 0.0,
            min_window_height: 0.0,
            max_window_width: 0.0,
            max_window_height: 0.0,
            min_result_width: 0.0,
            min_result_height: 0.0,
            max_result_width: 0.0,
            max_result_height: 0.0,
            scale_factor_width: 1.0,
            scale_factor_height: 1.0,
        }
    }
}

impl CropWindowLimits {
    /// Limits seeded from the configured window and result sizes.
    pub fn from_config(config: &CropConfig) -> Self {
        let mut limits = Self::default();
        limits.apply_config(config);
        limits
    }

    /// Re-read the configured minimum window and min/max result sizes.
    pub fn apply_config(&mut self, config: &CropConfig) {
        self.min_window_width = config.min_crop_window_width;
        self.min_window_height = config.min_crop_window_height;
        self.set_result_limits(
            config.min_crop_result_width,
            config.min_crop_result_height,
            config.max_crop_result_width,
            config.max_crop_result_height,
        );
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn scale_factor_width(&self) -> f32 {
        self.scale_factor_width
    }

    pub fn scale_factor_height(&self) -> f32 {
        self.scale_factor_height
    }

    /// Display pixel to source pixel ratios.
    pub fn set_scale_factors(&mut self, width: f32, height: f32) {
        self.scale_factor_width = width;
        self.scale_factor_height = height;
    }

    /// Maximum window size in display pixels (the view size).
    pub fn set_window_limits(&mut self, max_width: f32, max_height: f32) {
        self.max_window_width = max_width;
        self.max_window_height = max_height;
    }

    pub fn set_min_result_size(&mut self, width: i32, height: i32) {
        self.min_result_width = width as f32;
        self.min_result_height = height as f32;
    }

    pub fn set_max_result_size(&mut self, width: i32, height: i32) {
        self.max_result_width = width as f32;
        self.max_result_height = height as f32;
    }

    pub fn set_result_limits(
        &mut self,
        min_width: i32,
        min_height: i32,
        max_width: i32,
        max_height: i32,
    ) {
        self.set_min_result_size(min_width, min_height);
        self.set_max_result_size(max_width, max_height);
    }

    pub fn min_crop_width(&self) -> f32 {
        self.min_window_width
            .max(self.min_result_width / self.scale_factor_width)
    }

    pub fn min_crop_height(&self) -> f32 {
        self.min_window_height
            .max(self.min_result_height / self.scale_factor_height)
    }

    pub fn max_crop_width(&self) -> f32 {
        self.max_window_width
            .min(self.max_result_width / self.scale_factor_width)
    }

    pub fn max_crop_height(&self) -> f32 {
        self.max_window_height
            .min(self.max_result_height / self.scale_factor_height)
    }

    /// Whether the current window is large enough to draw guidelines.
    pub fn guidelines_fit(&self) -> bool {
        window_fits_guidelines(&self.rect)
    }
}

/// `true` unless the rect is narrower or shorter than [`GUIDELINES_MIN_SIZE`].
pub fn window_fits_guidelines(rect: &Rect) -> bool {
    !(rect.width() < GUIDELINES_MIN_SIZE || rect.height() < GUIDELINES_MIN_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> CropWindowLimits {
        let mut limits = CropWindowLimits::from_config(&CropConfig::default());
        limits.set_window_limits(1000.0, 800.0);
        limits
    }

    #[test]
    fn test_effective_min_uses_larger_of_window_and_result() {
        let mut limits = limits();
        // 40 source px at 1:1 is below the 42 px window minimum
        assert_eq!(limits.min_crop_width(), 42.0);

        // at 0.5 source px per display px, 40 source px need 80 display px
        limits.set_scale_factors(0.5, 0.5);
        assert_eq!(limits.min_crop_width(), 80.0);
        assert_eq!(limits.min_crop_height(), 80.0);
    }

    #[test]
    fn test_effective_max_uses_smaller_of_window_and_result() {
        let mut limits = limits();
        assert_eq!(limits.max_crop_width(), 1000.0);
        assert_eq!(limits.max_crop_height(), 800.0);

        limits.set_max_result_size(300, 200);
        limits.set_scale_factors(2.0, 2.0);
        assert_eq!(limits.max_crop_width(), 150.0);
        assert_eq!(limits.max_crop_height(), 100.0);
    }

    #[test]
    fn test_guidelines_threshold() {
        let mut limits = limits();
        limits.set_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(limits.guidelines_fit());

        limits.set_rect(Rect::new(0.0, 0.0, 99.0, 300.0));
        assert!(!limits.guidelines_fit());

        limits.set_rect(Rect::new(0.0, 0.0, 300.0, 99.5));
        assert!(!limits.guidelines_fit());
    }

    #[test]
    fn test_apply_config_updates_result_limits() {
        let mut limits = limits();
        let config = CropConfig {
            min_crop_window_width: 10.0,
            min_crop_result_width: 120,
            ..Default::default()
        };
        limits.apply_config(&config);
        assert_eq!(limits.min_crop_width(), 120.0);
    }
}
