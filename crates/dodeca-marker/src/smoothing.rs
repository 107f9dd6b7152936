//! Sliding-window averaging of the projected pose.

use std::collections::VecDeque;

use dodeca_core::OrientationParams;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    /// Number of frames averaged; output starts once the window is full.
    pub window: usize,
    /// Length of the drawn object axes, in object units (mm).
    pub axis_length: f64,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            window: 10,
            axis_length: 40.0,
        }
    }
}

/// Bounded FIFO; pushing into a full window drops the oldest entry.
#[derive(Clone, Debug)]
pub struct SlidingWindow<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> SlidingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Projected object origin followed by the tips of the x, y and z axes.
///
/// `x`/`y` are image pixels, `z` is scaled depth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PosePoints(pub [Point3<f64>; 4]);

impl PosePoints {
    pub fn from_orientation(pose: &OrientationParams, axis_length: f64) -> Self {
        let l = axis_length;
        Self([
            pose.project(&Point3::origin()),
            pose.project(&Point3::new(l, 0.0, 0.0)),
            pose.project(&Point3::new(0.0, l, 0.0)),
            pose.project(&Point3::new(0.0, 0.0, l)),
        ])
    }

    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.0[0]
    }

    /// Tip of object axis `i` (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn axis_tip(&self, i: usize) -> Point3<f64> {
        self.0[1 + i]
    }
}

/// Averages the last `window` pose point sets.
#[derive(Clone, Debug)]
pub struct PoseSmoother {
    window: SlidingWindow<PosePoints>,
}

impl PoseSmoother {
    pub fn new(params: &SmoothingParams) -> Self {
        Self {
            window: SlidingWindow::new(params.window),
        }
    }

    /// Add a sample; returns the window mean once the window is full.
    ///
    /// The mean is accumulated incrementally so a window of identical samples
    /// yields that sample bit for bit.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    pub fn push(&mut self, points: PosePoints) -> Option<PosePoints> {
        self.window.push(points);
        if !self.window.is_full() {
            return None;
        }
        let mut mean = [Vector3::<f64>::zeros(); 4];
        for (k, sample) in self.window.iter().enumerate() {
            let k = (k + 1) as f64;
            for (m, p) in mean.iter_mut().zip(sample.0.iter()) {
                *m += (p.coords - *m) / k;
            }
        }
        Some(PosePoints(mean.map(Point3::from)))
    }

    pub fn filled(&self) -> usize {
        self.window.len()
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Rotation3, Vector2};

    fn shifted(dx: f64) -> PosePoints {
        PosePoints([
            Point3::new(dx, 0.0, 0.0),
            Point3::new(dx + 1.0, 0.0, 0.0),
            Point3::new(dx, 1.0, 0.0),
            Point3::new(dx, 0.0, 1.0),
        ])
    }

    #[test]
    fn window_drops_oldest() {
        let mut w = SlidingWindow::new(3);
        for i in 0..5 {
            w.push(i);
        }
        assert!(w.is_full());
        assert_eq!(w.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn output_starts_when_window_is_full() {
        let mut s = PoseSmoother::new(&SmoothingParams::default());
        for i in 0..9 {
            assert!(s.push(shifted(i as f64)).is_none(), "frame {i}");
        }
        let mean = s.push(shifted(9.0)).expect("tenth frame");
        assert_relative_eq!(mean.origin().x, 4.5);
        assert_relative_eq!(mean.axis_tip(0).x, 5.5);

        // window now slides: samples 1..=10
        let mean = s.push(shifted(10.0)).expect("eleventh frame");
        assert_relative_eq!(mean.origin().x, 5.5);
    }

    #[test]
    fn identical_samples_average_to_themselves() {
        let sample = PosePoints([Point3::new(0.1, 0.7, 0.3); 4]);
        let mut s = PoseSmoother::new(&SmoothingParams::default());
        for _ in 0..9 {
            assert!(s.push(sample).is_none());
        }
        assert_eq!(s.push(sample), Some(sample));
    }

    #[test]
    fn reset_restarts_the_window() {
        let mut s = PoseSmoother::new(&SmoothingParams {
            window: 2,
            ..SmoothingParams::default()
        });
        s.push(shifted(0.0));
        assert!(s.push(shifted(2.0)).is_some());
        s.reset();
        assert_eq!(s.filled(), 0);
        assert!(s.push(shifted(4.0)).is_none());
    }

    #[test]
    fn pose_points_follow_the_projection() {
        let pose = OrientationParams {
            rotation: Rotation3::identity(),
            scale: 2.0,
            translation: Vector2::new(100.0, 50.0),
        };
        let pts = PosePoints::from_orientation(&pose, 40.0);
        assert_relative_eq!(pts.origin(), Point3::new(100.0, 50.0, 0.0));
        assert_relative_eq!(pts.axis_tip(0), Point3::new(180.0, 50.0, 0.0));
        assert_relative_eq!(pts.axis_tip(1), Point3::new(100.0, 130.0, 0.0));
        assert_relative_eq!(pts.axis_tip(2), Point3::new(100.0, 50.0, 80.0));
    }
}
