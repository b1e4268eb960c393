//! Crop component configuration.
//!
//! [`CropConfig`] is a flat bundle of named options. It deserializes from a
//! partial object (every field has a default), and must pass
//! [`CropConfig::validate`] before a [`CropSession`](crate::CropSession) can be
//! built from it. All distances are display pixels, all result sizes are source
//! pixels.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{AspectRatio, IntRect};

/// Configuration values rejected by [`CropConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Cannot set max zoom to a number < 0 (got {0})")]
    NegativeMaxZoom(f32),

    #[error("Cannot set touch radius value to a number < 0 (got {0})")]
    NegativeTouchRadius(f32),

    #[error("Cannot set snap radius value to a number < 0 (got {0})")]
    NegativeSnapRadius(f32),

    #[error("Cannot set initial crop window padding ratio outside [0, 0.5) (got {0})")]
    PaddingRatioOutOfRange(f32),

    #[error("Cannot set aspect ratio value to a number <= 0 (got {x}:{y})")]
    NonPositiveAspectRatio { x: i32, y: i32 },

    #[error("Cannot set {field} to a number < 0 (got {value})")]
    NegativeThickness { field: &'static str, value: f32 },

    #[error("Cannot set min crop window {axis} to a number < 0 (got {value})")]
    NegativeMinCropWindow { axis: &'static str, value: f32 },

    #[error("Cannot set min crop result {axis} to a number < 0 (got {value})")]
    NegativeMinCropResult { axis: &'static str, value: i32 },

    #[error("Cannot set max crop result {axis} smaller than min crop result {axis} ({max} < {min})")]
    MaxCropResultBelowMin {
        axis: &'static str,
        min: i32,
        max: i32,
    },

    #[error("Cannot set request {axis} to a number < 0 (got {value})")]
    NegativeRequestSize { axis: &'static str, value: i32 },

    #[error("Cannot set output quality outside [0, 100] (got {0})")]
    QualityOutOfRange(i32),

    #[error("Cannot set rotation degrees value outside [0, 360] (got {0})")]
    RotationOutOfRange(i32),

    #[error("Cannot set initial rotation outside [0, 360] (got {0})")]
    InitialRotationOutOfRange(i32),

    #[error("Image picker selection is missing")]
    MissingPicker,
}

/// Shape of the crop window. An oval is still bounded by its rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CropShape {
    #[default]
    Rectangle,
    Oval,
}

/// When the rule-of-thirds guidelines are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Guidelines {
    Off,
    #[default]
    OnTouch,
    On,
}

/// How the bitmap is fitted into the view before user zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaleType {
    /// Always scale to fit the view.
    #[default]
    FitCenter,
    /// Never auto-scale; zoom only.
    Center,
    /// Like `Center`, but auto-zoom may scale up.
    CenterCrop,
    /// Scale down to fit, never up.
    CenterInside,
}

/// Post-crop resize strategy applied by the crop executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestSizeOptions {
    /// Keep the cropped size.
    #[default]
    None,
    /// Power-of-two sub-sampling while both halves stay above the request.
    Sampling,
    /// Downscale only, preserving aspect ratio.
    ResizeInside,
    /// Scale up or down to fit inside the request, preserving aspect ratio.
    ResizeFit,
    /// Scale to the requested dimensions exactly.
    ResizeExact,
}

/// Encoding of the cropped output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

/// Image sources offered by the host's picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickerType {
    Camera,
    Gallery,
    #[default]
    CameraAndGallery,
}

/// Options for a crop session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropConfig {
    pub crop_shape: CropShape,
    /// Distance within which a dragged edge locks onto a bound.
    pub snap_radius: f32,
    /// Tolerance around handles for touch hit-testing.
    pub touch_radius: f32,
    pub guidelines: Guidelines,
    pub scale_type: ScaleType,
    pub auto_zoom_enabled: bool,
    pub multi_touch_enabled: bool,
    pub max_zoom: f32,
    /// Initial window inset as a fraction of the image size, in `[0, 0.5)`.
    pub initial_crop_window_padding_ratio: f32,
    pub fix_aspect_ratio: bool,
    pub aspect_ratio: AspectRatio,
    pub border_line_thickness: f32,
    pub border_corner_thickness: f32,
    pub border_corner_offset: f32,
    pub border_corner_length: f32,
    pub guidelines_thickness: f32,
    pub min_crop_window_width: f32,
    pub min_crop_window_height: f32,
    pub min_crop_result_width: i32,
    pub min_crop_result_height: i32,
    pub max_crop_result_width: i32,
    pub max_crop_result_height: i32,
    pub output_format: OutputFormat,
    pub output_quality: i32,
    pub output_request_width: i32,
    pub output_request_height: i32,
    pub output_request_options: RequestSizeOptions,
    /// Initial crop window in source pixels.
    pub initial_crop_window_rect: Option<IntRect>,
    /// Rotation applied once the image loads, overriding the image's own.
    pub initial_rotation: Option<i32>,
    pub allow_rotation: bool,
    pub allow_flipping: bool,
    pub allow_counter_rotation: bool,
    /// Step used by the rotate commands.
    pub rotation_degrees: i32,
    pub flip_horizontally: bool,
    pub flip_vertically: bool,
    pub picker: Option<PickerType>,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            crop_shape: CropShape::Rectangle,
            snap_radius: 3.0,
            touch_radius: 24.0,
            guidelines: Guidelines::OnTouch,
            scale_type: ScaleType::FitCenter,
            auto_zoom_enabled: true,
            multi_touch_enabled: false,
            max_zoom: 4.0,
            initial_crop_window_padding_ratio: 0.1,
            fix_aspect_ratio: false,
            aspect_ratio: AspectRatio::new(1, 1),
            border_line_thickness: 3.0,
            border_corner_thickness: 2.0,
            border_corner_offset: 5.0,
            border_corner_length: 14.0,
            guidelines_thickness: 1.0,
            min_crop_window_width: 42.0,
            min_crop_window_height: 42.0,
            min_crop_result_width: 40,
            min_crop_result_height: 40,
            max_crop_result_width: 99999,
            max_crop_result_height: 99999,
            output_format: OutputFormat::Jpeg,
            output_quality: 100,
            output_request_width: 0,
            output_request_height: 0,
            output_request_options: RequestSizeOptions::None,
            initial_crop_window_rect: None,
            initial_rotation: None,
            allow_rotation: true,
            allow_flipping: true,
            allow_counter_rotation: false,
            rotation_degrees: 90,
            flip_horizontally: false,
            flip_vertically: false,
            picker: Some(PickerType::CameraAndGallery),
        }
    }
}

impl CropConfig {
    /// Check every option against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found. Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_zoom < 0.0 {
            return Err(ConfigError::NegativeMaxZoom(self.max_zoom));
        }
        if self.touch_radius < 0.0 {
            return Err(ConfigError::NegativeTouchRadius(self.touch_radius));
        }
        if self.snap_radius < 0.0 {
            return Err(ConfigError::NegativeSnapRadius(self.snap_radius));
        }
        let padding = self.initial_crop_window_padding_ratio;
        if !(0.0..0.5).contains(&padding) {
            return Err(ConfigError::PaddingRatioOutOfRange(padding));
        }
        if self.aspect_ratio.x <= 0 || self.aspect_ratio.y <= 0 {
            return Err(ConfigError::NonPositiveAspectRatio {
                x: self.aspect_ratio.x,
                y: self.aspect_ratio.y,
            });
        }

        for (field, value) in [
            ("border line thickness", self.border_line_thickness),
            ("border corner thickness", self.border_corner_thickness),
            ("guidelines thickness", self.guidelines_thickness),
        ] {
            if value < 0.0 {
                return Err(ConfigError::NegativeThickness { field, value });
            }
        }

        for (axis, value) in [
            ("width", self.min_crop_window_width),
            ("height", self.min_crop_window_height),
        ] {
            if value < 0.0 {
                return Err(ConfigError::NegativeMinCropWindow { axis, value });
            }
        }

        for (axis, min, max) in [
            (
                "width",
                self.min_crop_result_width,
                self.max_crop_result_width,
            ),
            (
                "height",
                self.min_crop_result_height,
                self.max_crop_result_height,
            ),
        ] {
            if min < 0 {
                return Err(ConfigError::NegativeMinCropResult { axis, value: min });
            }
            if max < min {
                return Err(ConfigError::MaxCropResultBelowMin { axis, min, max });
            }
        }

        for (axis, value) in [
            ("width", self.output_request_width),
            ("height", self.output_request_height),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeRequestSize { axis, value });
            }
        }

        if !(0..=100).contains(&self.output_quality) {
            return Err(ConfigError::QualityOutOfRange(self.output_quality));
        }
        if !(0..=360).contains(&self.rotation_degrees) {
            return Err(ConfigError::RotationOutOfRange(self.rotation_degrees));
        }
        if let Some(degrees) = self.initial_rotation {
            if !(0..=360).contains(&degrees) {
                return Err(ConfigError::InitialRotationOutOfRange(degrees));
            }
        }
        if self.picker.is_none() {
            return Err(ConfigError::MissingPicker);
        }

        Ok(())
    }

    /// Locked aspect ratio as `width / height`, or `None` when unlocked.
    pub fn locked_aspect(&self) -> Option<f32> {
        self.fix_aspect_ratio.then(|| self.aspect_ratio.value())
    }
}
