use dodeca_core::{estimate_orientation, BgrImageView, FrameScope, PlaneFrame};
use log::{debug, info, warn};

use super::{DetectError, FrameDetection, TrackerParams};
use crate::calibration::{CalibrationAccumulator, CalibrationReference};
use crate::color_mask::{compute_masks, SpotMasks};
use crate::correspondence::resolve_correspondence;
use crate::descriptor::{canonical_spots, FaceIndex, MarkerDescriptor};
use crate::side_code::{decode_side, rotate_to_printed_order};
use crate::smoothing::{PosePoints, PoseSmoother};
use crate::spots::{collect_five, locate_spots};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Tracks one marker across the frames of a single stream.
///
/// Frames must be handed in capture order; the tracker is not meant to be
/// shared between streams.
pub struct SpotTracker {
    params: TrackerParams,
    smoother: PoseSmoother,
    calibration: CalibrationAccumulator,
    reference: Option<CalibrationReference>,
    calibration_requested: bool,
    active_face: Option<FaceIndex>,
    masks: Option<SpotMasks>,
    frames: u64,
}

impl SpotTracker {
    pub fn new(params: TrackerParams) -> Self {
        Self {
            smoother: PoseSmoother::new(&params.smoothing),
            params,
            calibration: CalibrationAccumulator::new(),
            reference: None,
            calibration_requested: false,
            active_face: None,
            masks: None,
            frames: 0,
        }
    }

    #[inline]
    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    /// Masks computed for the most recent frame.
    #[inline]
    pub fn masks(&self) -> Option<&SpotMasks> {
        self.masks.as_ref()
    }

    /// Face decoded on the last successful frame.
    #[inline]
    pub fn active_face(&self) -> Option<FaceIndex> {
        self.active_face
    }

    #[inline]
    pub fn calibration(&self) -> &CalibrationAccumulator {
        &self.calibration
    }

    #[inline]
    pub fn reference(&self) -> Option<&CalibrationReference> {
        self.reference.as_ref()
    }

    /// Take a calibration sample on the next successful frame.
    ///
    /// Ignored once all samples are recorded.
    pub fn request_calibration_sample(&mut self) {
        if self.calibration.is_complete() {
            debug!("calibration already complete, trigger ignored");
            return;
        }
        self.calibration_requested = true;
    }

    /// Drop calibration samples and the reference built from them.
    pub fn reset_calibration(&mut self) {
        self.calibration.clear();
        self.reference = None;
        self.calibration_requested = false;
    }

    /// Run the full pipeline on one BGR frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(frame = self.frames, width = frame.width, height = frame.height))
    )]
    pub fn process_frame(
        &mut self,
        frame: &BgrImageView<'_>,
    ) -> Result<FrameDetection, DetectError> {
        let index = self.frames;
        self.frames += 1;
        let _scope = FrameScope::enter(index);
        let res = self.detect(frame);
        if let Err(err) = &res {
            debug!("frame skipped: {err}");
        }
        res
    }

    fn detect(&mut self, frame: &BgrImageView<'_>) -> Result<FrameDetection, DetectError> {
        if !frame.is_well_formed() {
            self.masks = None;
            return Err(DetectError::DetectionCountMismatch { found: 0 });
        }
        let masks = compute_masks(frame, &self.params.color);
        let spots = locate_spots(&masks);
        self.masks = Some(masks);

        let detected = collect_five(&spots)?;
        let canonical = canonical_spots();
        let resolved = resolve_correspondence(&detected, &canonical, &self.params.resolve)?;
        let side = decode_side(frame, &resolved.img_from_face, &self.params.decode)?;
        let correspondence = rotate_to_printed_order(&resolved, side.control_index);

        let aligned_face = self.active_face.unwrap_or(side.face);
        let descriptor = MarkerDescriptor::for_face(aligned_face);
        let orientation = PlaneFrame::fit(&descriptor.spots, &canonical)
            .and_then(|plane| estimate_orientation(&correspondence.img_from_face, &plane))
            .map_err(|err| {
                debug!("orientation failed: {err}");
                DetectError::CorrespondenceNotFound {
                    best_distance: Some(correspondence.distance),
                }
            })?;
        if self.active_face != Some(side.face) {
            debug!("active face {:?} -> {}", self.active_face, side.face.get());
        }
        self.active_face = Some(side.face);

        let pose_points =
            PosePoints::from_orientation(&orientation, self.params.smoothing.axis_length);
        let smoothed = self.smoother.push(pose_points);

        let calibration_sample = if std::mem::take(&mut self.calibration_requested)
            && self.calibration.add_sample(orientation)
        {
            if self.calibration.is_complete() {
                match self.calibration.reference() {
                    Ok(reference) => {
                        info!("calibration reference established");
                        self.reference = Some(reference);
                    }
                    Err(err) => warn!("calibration failed: {err}"),
                }
            }
            Some(self.calibration.len())
        } else {
            None
        };

        let relative = self
            .reference
            .as_ref()
            .map(|r| r.relative_pose(&orientation));

        Ok(FrameDetection {
            spots,
            correspondence,
            side,
            aligned_face,
            orientation,
            pose_points,
            smoothed,
            calibration_sample,
            relative,
        })
    }
}
