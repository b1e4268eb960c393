//! The interactive crop window: size limits, handle hit-testing and dragging.

mod drag;
mod handle;
mod limits;

pub use drag::{DragConstraints, DragController};
pub use handle::{resolve_handle, DragHandle};
pub use limits::{window_fits_guidelines, CropWindowLimits, GUIDELINES_MIN_SIZE};
