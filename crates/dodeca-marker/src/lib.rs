//! Colour-spot dodecahedron marker tracking.
//!
//! Every face of the marker carries five colour spots on a regular pentagon,
//! one dark control spot and an 8-dot binary face code. One frame runs
//! through these stages:
//!
//! 1. `color_mask`: four colour masks and their union,
//! 2. `strips` / `spots`: row and column strips, blob centroids,
//! 3. `correspondence`: spot labelling and the face homography,
//! 4. `side_code`: control spot and face number,
//! 5. orientation (from `dodeca_core`), then `smoothing` and `calibration`.
//!
//! [`SpotTracker`] wires them together for a stream of frames.
//!
//! ```no_run
//! use dodeca_core::BgrImageView;
//! use dodeca_marker::{SpotTracker, TrackerParams};
//!
//! # fn frames() -> Vec<(usize, usize, Vec<u8>)> { Vec::new() }
//! let mut tracker = SpotTracker::new(TrackerParams::default());
//! for (width, height, bgr) in frames() {
//!     let Ok(view) = BgrImageView::new(width, height, &bgr) else { continue };
//!     if let Ok(det) = tracker.process_frame(&view) {
//!         println!("face {} at {:?}", det.side.face.get(), det.orientation.translation);
//!     }
//! }
//! ```

pub mod calibration;
pub mod color_mask;
pub mod correspondence;
pub mod descriptor;
mod io;
pub mod render;
pub mod side_code;
pub mod smoothing;
pub mod spots;
pub mod strips;
mod tracker;

pub use calibration::{
    CalibrationAccumulator, CalibrationReference, ReferenceAxis, RelativePose,
    CALIBRATION_SAMPLES,
};
pub use color_mask::{compute_mask, compute_masks, ChannelParams, ColorMaskParams, SpotColor, SpotMasks};
pub use correspondence::{
    check_order, resolve_correspondence, winding_sign, Correspondence, ExcludedSpot, ResolveParams,
};
pub use descriptor::{FaceIndex, MarkerDescriptor};
pub use io::{FrameReport, TrackIoError, TrackReport, TrackerConfig};
pub use render::{render_code, render_face};
pub use side_code::{
    decode_face_code, decode_side, encode_face_code, locate_control_spot, sample_code_bits,
    DecodeParams, SideReading,
};
pub use smoothing::{PosePoints, PoseSmoother, SlidingWindow, SmoothingParams};
pub use spots::{collect_five, locate_spots, locate_weight_centers, WeightCenter};
pub use strips::{scan_strips, ScanAxis, Strip};
pub use tracker::{
    CalibrationError, CodeError, DetectError, FrameDetection, SpotTracker, TrackerParams,
};
