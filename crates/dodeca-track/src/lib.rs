//! High-level facade crate for the `dodeca-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry (`core`) and marker (`marker`) crates,
//! - (feature `image`) helpers that run the tracker on `image::RgbImage`
//!   frames and write masks as PNG,
//! - (feature `cli`) the `dodeca-track` binary.
//!
//! ## Quickstart
//!
//! ```no_run
//! use dodeca_track::{detect, SpotTracker, TrackerParams};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("frame.png")?.decode()?.to_rgb8();
//! let mut tracker = SpotTracker::new(TrackerParams::default());
//! let det = detect::track_rgb(&mut tracker, &img)?;
//! println!("face {}", det.side.face.get());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `dodeca_track::core`: frames, masks, homographies, orientation.
//! - `dodeca_track::marker`: the marker pipeline and `SpotTracker`.
//! - `dodeca_track::detect` (feature `image`): helpers from `image::RgbImage`.

pub use dodeca_core as core;
pub use dodeca_marker as marker;

pub use dodeca_core::{BgrImage, BgrImageView, Homography, Mask, OrientationParams};
pub use dodeca_marker::{
    DetectError, FaceIndex, FrameDetection, SpotMasks, SpotTracker, TrackerConfig, TrackerParams,
};

#[cfg(feature = "image")]
pub mod detect;

/// Install the `tracing` subscriber and route `log` records into it.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    dodeca_core::init_tracing(json);
    // no-op when the subscriber already installed the bridge
    let _ = tracing_log::LogTracer::init();
}
