//! Core types for colour-spot marker tracking.
//!
//! This crate knows nothing about the marker itself. It provides:
//! - BGR frame views and binary masks,
//! - homography estimation from point correspondences,
//! - weak-perspective orientation of a plane from its homography,
//! - logger initialisation shared by the binaries.
//!
//! Every geometric routine takes its inputs by reference and returns new
//! values; no point list handed in is ever modified.

mod error;
mod homography;
mod image;
mod logger;
mod orientation;

pub use error::{FrameError, GeometryError};
pub use homography::{estimate_homography, homography_from_4pt, Homography};
pub use image::{sample_channel_sum, BgrImage, BgrImageView, Mask};
pub use orientation::{estimate_orientation, OrientationParams, PlaneFrame};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{current_frame, init_with_level, FrameScope};
