//! Neutral pose and rotation axes captured from user-triggered samples.
//!
//! Sample 0 is the neutral pose. Samples 1..=3 are taken after turning the
//! object about each of three axes; the relative rotation of each sample to
//! the neutral one gives a reference axis. Later poses are expressed as
//! twists about those axes.

use dodeca_core::OrientationParams;
use log::info;
use nalgebra::{Rotation3, Unit, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::CalibrationError;

pub const CALIBRATION_SAMPLES: usize = 4;

/// Relative rotations smaller than this (radians) do not define an axis.
const MIN_AXIS_ANGLE: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceAxis {
    /// Rotation axis in camera coordinates.
    pub axis: Unit<Vector3<f64>>,
    /// Angle swept while recording the sample.
    pub angle: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReference {
    /// Image position of the object origin in the neutral pose.
    pub origin: Vector2<f64>,
    pub neutral: Rotation3<f64>,
    pub axes: [ReferenceAxis; 3],
}

/// Pose relative to a calibration reference.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelativePose {
    /// Image offset of the object origin from the neutral position.
    pub offset: Vector2<f64>,
    /// Rotation about each reference axis, in radians.
    pub twist: [f64; 3],
}

impl CalibrationReference {
    pub fn relative_pose(&self, pose: &OrientationParams) -> RelativePose {
        let rel = pose.rotation * self.neutral.inverse();
        let v = rel.scaled_axis();
        RelativePose {
            offset: pose.translation - self.origin,
            twist: self.axes.map(|a| v.dot(&a.axis)),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CalibrationAccumulator {
    samples: Vec<OrientationParams>,
}

impl CalibrationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample. Returns `false` once all samples are taken.
    pub fn add_sample(&mut self, pose: OrientationParams) -> bool {
        if self.is_complete() {
            return false;
        }
        self.samples.push(pose);
        info!(
            "calibration sample {}/{} recorded",
            self.samples.len(),
            CALIBRATION_SAMPLES
        );
        true
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.samples.len() >= CALIBRATION_SAMPLES
    }

    pub fn samples(&self) -> &[OrientationParams] {
        &self.samples
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn reference(&self) -> Result<CalibrationReference, CalibrationError> {
        if !self.is_complete() {
            return Err(CalibrationError::Incomplete {
                required: CALIBRATION_SAMPLES,
                got: self.samples.len(),
            });
        }
        let neutral = &self.samples[0];
        let inv = neutral.rotation.inverse();
        let mut axes = [ReferenceAxis {
            axis: Vector3::x_axis(),
            angle: 0.0,
        }; 3];
        for (i, slot) in axes.iter_mut().enumerate() {
            let rel = self.samples[i + 1].rotation * inv;
            let (axis, angle) = rel
                .axis_angle()
                .filter(|(_, angle)| *angle > MIN_AXIS_ANGLE)
                .ok_or(CalibrationError::DegenerateAxis { axis: i + 1 })?;
            *slot = ReferenceAxis { axis, angle };
        }
        Ok(CalibrationReference {
            origin: neutral.translation,
            neutral: neutral.rotation,
            axes,
        })
    }
}
