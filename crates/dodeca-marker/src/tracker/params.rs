use serde::{Deserialize, Serialize};

use crate::color_mask::ColorMaskParams;
use crate::correspondence::ResolveParams;
use crate::side_code::DecodeParams;
use crate::smoothing::SmoothingParams;

/// Configuration of the per-stream tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerParams {
    /// Per-channel colour coefficients.
    #[serde(default)]
    pub color: ColorMaskParams,
    #[serde(default)]
    pub resolve: ResolveParams,
    #[serde(default)]
    pub decode: DecodeParams,
    #[serde(default)]
    pub smoothing: SmoothingParams,
}
