//! Stateful per-stream driver.
//!
//! Runs the stages of one frame in order: colour masks, strips and spot
//! centroids, correspondence, side decoding, orientation, smoothing and
//! calibration. Every failure before orientation skips the frame and leaves
//! the tracker state unchanged.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::{CalibrationError, CodeError, DetectError};
pub use params::TrackerParams;
pub use pipeline::SpotTracker;
pub use result::FrameDetection;
