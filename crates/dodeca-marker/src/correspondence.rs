//! Matching five detected spots to the five spots of the face descriptor.
//!
//! The first four detections are tried in each of the `ORDERINGS`; a 4-point
//! homography maps them onto the descriptor and the held-out fifth detection
//! must land on the remaining descriptor spot. Because the spots form a
//! regular pentagon the winner is only defined up to a symmetry of the
//! pentagon: `check_order` removes the reflection, the control spot read by
//! the side decoder removes the rotation.

use dodeca_core::{estimate_homography, homography_from_4pt, GeometryError, Homography};
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::descriptor::{ORDERINGS, SPOT_COUNT};
use crate::DetectError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Spot order after reversing the winding while keeping the first spot.
const REVERSED_WINDING: [usize; SPOT_COUNT] = [0, 4, 3, 2, 1];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolveParams {
    /// Largest accepted distance (face units, mm) between the held-out
    /// detection and its descriptor spot.
    pub max_distance: f64,
}

impl Default for ResolveParams {
    fn default() -> Self {
        Self { max_distance: 1.0 }
    }
}

/// Which descriptor spot is left out of the 4-point homography.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcludedSpot {
    /// Ordered detections map to spots 0..=3, the held-out one to spot 4.
    Fifth,
    /// Ordered detections map to spots 0, 1, 2, 4, the held-out one to spot 3.
    Fourth,
}

impl ExcludedSpot {
    const ALL: [ExcludedSpot; 2] = [ExcludedSpot::Fifth, ExcludedSpot::Fourth];

    /// `(descriptor targets of the ordered four, descriptor spot of the held-out one)`.
    fn assignment(self) -> ([usize; 4], usize) {
        match self {
            ExcludedSpot::Fifth => ([0, 1, 2, 3], 4),
            ExcludedSpot::Fourth => ([0, 1, 2, 4], 3),
        }
    }
}

/// Resolved detection-to-descriptor correspondence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    /// Detections in descriptor spot order.
    pub ordered: [Point2<f64>; SPOT_COUNT],
    /// `ordering[j]` is the index of the detection matched to spot `j`.
    pub ordering: [usize; SPOT_COUNT],
    /// Residual of the held-out detection, in face units.
    pub distance: f64,
    pub excluded: ExcludedSpot,
    /// Set when the winding had to be reversed.
    pub mirrored: bool,
    pub face_from_img: Homography,
    pub img_from_face: Homography,
}

/// Signed offset of the third point from the line through the first two.
///
/// The points are translated so the first one is the origin and rotated so
/// the second one lies on the positive x axis; the result is the third
/// point's y coordinate in that frame.
pub fn winding_sign(pts: &[Point2<f64>]) -> f64 {
    if pts.len() < 3 {
        return 0.0;
    }
    let d1 = pts[1] - pts[0];
    let d2 = pts[2] - pts[0];
    let len = d1.norm();
    if len < 1e-12 {
        return 0.0;
    }
    let (c, s) = (d1.x / len, d1.y / len);
    -s * d2.x + c * d2.y
}

/// Bring `ordered` to the winding of `canonical`.
///
/// Returns the corrected points and whether a reversal was applied. A
/// second application never reverses again.
pub fn check_order(
    ordered: &[Point2<f64>; SPOT_COUNT],
    canonical: &[Point2<f64>; SPOT_COUNT],
) -> ([Point2<f64>; SPOT_COUNT], bool) {
    let observed = winding_sign(ordered);
    let expected = winding_sign(canonical);
    if observed * expected < 0.0 {
        (REVERSED_WINDING.map(|i| ordered[i]), true)
    } else {
        (*ordered, false)
    }
}

struct Candidate {
    distance: f64,
    ordering: [usize; 4],
    excluded: ExcludedSpot,
}

/// Match five detections against the canonical face spots.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn resolve_correspondence(
    detected: &[Point2<f64>; SPOT_COUNT],
    canonical: &[Point2<f64>; SPOT_COUNT],
    params: &ResolveParams,
) -> Result<Correspondence, DetectError> {
    let held_out = detected[SPOT_COUNT - 1];
    let mut best: Option<Candidate> = None;

    for ordering in ORDERINGS {
        let src = ordering.map(|i| detected[i]);
        for excluded in ExcludedSpot::ALL {
            let (targets, held_spot) = excluded.assignment();
            let dst = targets.map(|j| canonical[j]);
            let face_from_img = match homography_from_4pt(&src, &dst) {
                Ok(h) => h,
                Err(err) => {
                    debug!("ordering {ordering:?}/{excluded:?}: {err}");
                    continue;
                }
            };
            let distance = (face_from_img.apply(held_out) - canonical[held_spot]).norm();
            if !distance.is_finite() {
                continue;
            }
            if best.as_ref().is_none_or(|b| distance < b.distance) {
                best = Some(Candidate {
                    distance,
                    ordering,
                    excluded,
                });
            }
        }
    }

    let best = best.ok_or(DetectError::CorrespondenceNotFound {
        best_distance: None,
    })?;
    if best.distance >= params.max_distance {
        return Err(DetectError::CorrespondenceNotFound {
            best_distance: Some(best.distance),
        });
    }

    let [a, b, c, d] = best.ordering;
    let mut ordering = [a, b, c, d, SPOT_COUNT - 1];
    if best.excluded == ExcludedSpot::Fourth {
        ordering.swap(3, 4);
    }

    let ordered = ordering.map(|i| detected[i]);
    let (ordered, mirrored) = check_order(&ordered, canonical);
    if mirrored {
        ordering = REVERSED_WINDING.map(|i| ordering[i]);
    }

    let (img_from_face, face_from_img) =
        face_homographies(canonical, &ordered).map_err(|err| {
            debug!("homography from resolved order failed: {err}");
            DetectError::CorrespondenceNotFound {
                best_distance: Some(best.distance),
            }
        })?;

    Ok(Correspondence {
        ordered,
        ordering,
        distance: best.distance,
        excluded: best.excluded,
        mirrored,
        face_from_img,
        img_from_face,
    })
}

/// `(img_from_face, face_from_img)` from all five ordered correspondences.
pub fn face_homographies(
    canonical: &[Point2<f64>; SPOT_COUNT],
    ordered: &[Point2<f64>; SPOT_COUNT],
) -> Result<(Homography, Homography), GeometryError> {
    let img_from_face = estimate_homography(canonical, ordered)?;
    let face_from_img = img_from_face.inverse().ok_or(GeometryError::Singular)?;
    Ok((img_from_face, face_from_img))
}
