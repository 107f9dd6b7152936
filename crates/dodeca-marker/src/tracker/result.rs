use dodeca_core::OrientationParams;
use serde::{Deserialize, Serialize};

use crate::calibration::RelativePose;
use crate::correspondence::Correspondence;
use crate::descriptor::FaceIndex;
use crate::side_code::SideReading;
use crate::smoothing::PosePoints;
use crate::spots::WeightCenter;

/// Output of one successfully processed frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameDetection {
    /// The five spot centroids in detection order.
    pub spots: Vec<WeightCenter>,
    /// Correspondence in the printed spot order of the decoded face.
    pub correspondence: Correspondence,
    pub side: SideReading,
    /// Face whose object geometry was used for the orientation.
    ///
    /// This is the face decoded on the previous successful frame; on the
    /// first detection it is the face decoded on this one.
    pub aligned_face: FaceIndex,
    pub orientation: OrientationParams,
    pub pose_points: PosePoints,
    /// Window mean of `pose_points`, once enough frames were seen.
    #[serde(default)]
    pub smoothed: Option<PosePoints>,
    /// Number of calibration samples held after this frame, if one was taken.
    #[serde(default)]
    pub calibration_sample: Option<usize>,
    /// Pose relative to the calibration reference, once calibrated.
    #[serde(default)]
    pub relative: Option<RelativePose>,
}
