//! Cropview Core - Interactive crop window engine
//!
//! This crate provides the geometry behind an embeddable image cropping
//! component: the crop window and its drag handles, the source-to-display
//! transform with rotation, flips and auto-zoom, the session state machine
//! hosts drive, and a pixel crop executor with output encoding.

pub mod bitmap;
pub mod config;
pub mod encode;
pub mod executor;
pub mod geometry;
pub mod handoff;
pub mod overlay;
pub mod session;
pub mod viewport;
pub mod window;

pub use bitmap::{calculate_sample_size, DecodedImage, FilterType, Orientation};
pub use config::{
    ConfigError, CropConfig, CropShape, Guidelines, OutputFormat, PickerType, RequestSizeOptions,
    ScaleType,
};
pub use encode::{encode, encode_jpeg, encode_png, EncodeError};
pub use executor::{crop_image, CropError, CropOutcome, CropRequest};
pub use geometry::{AspectRatio, IntRect, Matrix, Point, Quad, Rect};
pub use handoff::{HandoffCache, HandoffKey};
pub use overlay::CropOverlay;
pub use session::{
    CropResult, CropSelection, CropSession, CropTicket, FlipAxis, ImageSource, LoadError,
    LoadTicket, SessionEvent, SessionSnapshot, SessionState,
};
pub use viewport::ViewportTransform;
pub use window::{CropWindowLimits, DragHandle};
