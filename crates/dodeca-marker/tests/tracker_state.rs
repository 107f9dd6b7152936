use dodeca_core::{BgrImage, BgrImageView, Homography};
use dodeca_marker::descriptor::SPOT_COLORS;
use dodeca_marker::{
    render_face, DetectError, FaceIndex, SmoothingParams, SpotTracker, TrackerParams,
    CALIBRATION_SAMPLES,
};
use nalgebra::Matrix3;

const SIZE: usize = 400;

fn camera(angle: f64) -> Homography {
    let (s, c) = angle.sin_cos();
    Homography::new(Matrix3::new(
        4.0 * c, -4.0 * s, 200.0, //
        4.0 * s, 4.0 * c, 200.0, //
        0.0, 0.0, 1.0,
    ))
}

fn frame(angle: f64, n: u8) -> BgrImage {
    let face = FaceIndex::new(n).expect("face index");
    render_face(SIZE, SIZE, &camera(angle), face, &SPOT_COLORS)
}

#[test]
fn decoded_face_aligns_the_next_frame() {
    let mut tracker = SpotTracker::new(TrackerParams::default());

    let first = tracker.process_frame(&frame(0.2, 2).view()).expect("frame 0");
    assert_eq!(first.aligned_face.get(), 2);
    assert_eq!(first.side.face.get(), 2);

    let second = tracker.process_frame(&frame(0.2, 7).view()).expect("frame 1");
    assert_eq!(second.aligned_face.get(), 2);
    assert_eq!(second.side.face.get(), 7);

    let third = tracker.process_frame(&frame(0.2, 7).view()).expect("frame 2");
    assert_eq!(third.aligned_face.get(), 7);
}

#[test]
fn skipped_frame_keeps_the_active_face() {
    let mut tracker = SpotTracker::new(TrackerParams::default());
    tracker.process_frame(&frame(0.0, 5).view()).expect("frame 0");
    let blank = BgrImage::filled(SIZE, SIZE, [128, 128, 128]);
    assert!(tracker.process_frame(&blank.view()).is_err());
    assert_eq!(tracker.active_face().map(FaceIndex::get), Some(5));
}

#[test]
fn smoothed_pose_appears_with_a_full_window() {
    let window = SmoothingParams::default().window;
    let mut tracker = SpotTracker::new(TrackerParams::default());
    let img = frame(0.6, 11);
    for i in 0..window - 1 {
        let det = tracker.process_frame(&img.view()).expect("detected");
        assert!(det.smoothed.is_none(), "frame {i}");
    }
    let det = tracker.process_frame(&img.view()).expect("detected");
    assert_eq!(det.smoothed, Some(det.pose_points));
}

#[test]
fn failed_frames_do_not_feed_the_smoother() {
    let params = TrackerParams {
        smoothing: SmoothingParams {
            window: 2,
            ..SmoothingParams::default()
        },
        ..TrackerParams::default()
    };
    let mut tracker = SpotTracker::new(params);
    let blank = BgrImage::filled(SIZE, SIZE, [128, 128, 128]);
    let img = frame(0.0, 1);
    assert!(tracker.process_frame(&img.view()).expect("f0").smoothed.is_none());
    assert!(tracker.process_frame(&blank.view()).is_err());
    assert!(tracker.process_frame(&img.view()).expect("f2").smoothed.is_some());
}

#[test]
fn calibration_stops_after_four_samples() {
    let mut tracker = SpotTracker::new(TrackerParams::default());
    let angles = [0.0, 0.3, 0.6, 0.9];
    for (i, angle) in angles.iter().enumerate() {
        tracker.request_calibration_sample();
        let det = tracker.process_frame(&frame(*angle, 6).view()).expect("detected");
        assert_eq!(det.calibration_sample, Some(i + 1));
    }
    assert!(tracker.calibration().is_complete());
    let reference = *tracker.reference().expect("reference established");

    // A fifth trigger changes nothing.
    tracker.request_calibration_sample();
    let det = tracker.process_frame(&frame(1.2, 6).view()).expect("detected");
    assert_eq!(det.calibration_sample, None);
    assert_eq!(tracker.calibration().len(), CALIBRATION_SAMPLES);
    assert_eq!(tracker.reference(), Some(&reference));
    let rel = det.relative.expect("relative pose");
    assert!(rel.twist.iter().all(|t| t.is_finite()));
}

#[test]
fn trigger_waits_for_a_detection() {
    let mut tracker = SpotTracker::new(TrackerParams::default());
    tracker.request_calibration_sample();
    let blank = BgrImage::filled(SIZE, SIZE, [128, 128, 128]);
    assert!(tracker.process_frame(&blank.view()).is_err());
    assert!(tracker.calibration().is_empty());
    let det = tracker.process_frame(&frame(0.0, 3).view()).expect("detected");
    assert_eq!(det.calibration_sample, Some(1));
}

#[test]
fn malformed_view_is_a_count_mismatch() {
    let mut tracker = SpotTracker::new(TrackerParams::default());
    let data = [0u8; 3];
    let view = BgrImageView {
        width: 10,
        height: 10,
        data: &data,
    };
    assert!(matches!(
        tracker.process_frame(&view),
        Err(DetectError::DetectionCountMismatch { found: 0 })
    ));
    assert!(tracker.masks().is_none());

    // The tracker keeps working afterwards.
    let det = tracker.process_frame(&frame(0.0, 4).view()).expect("detected");
    assert_eq!(det.side.face.get(), 4);
}
