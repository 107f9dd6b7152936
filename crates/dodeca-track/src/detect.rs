use crate::core::{BgrImage, FrameError, Mask};
use crate::marker::{DetectError, FrameDetection, SpotColor, SpotMasks, SpotTracker};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum TrackError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Detect(#[from] DetectError),
}

/// Reorder an `image::RgbImage` into the BGR layout the tracker reads.
pub fn bgr_from_rgb(img: &RgbImage) -> BgrImage {
    let mut data = Vec::with_capacity(img.as_raw().len());
    for px in img.pixels() {
        let [r, g, b] = px.0;
        data.extend_from_slice(&[b, g, r]);
    }
    BgrImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data,
    }
}

pub fn rgb_from_bgr(img: &BgrImage) -> RgbImage {
    let view = img.view();
    RgbImage::from_fn(img.width as u32, img.height as u32, |x, y| {
        let [b, g, r] = view.bgr(x as usize, y as usize);
        Rgb([r, g, b])
    })
}

pub fn mask_image(mask: &Mask) -> GrayImage {
    GrayImage::from_fn(mask.width as u32, mask.height as u32, |x, y| {
        Luma([mask.data[y as usize * mask.width + x as usize]])
    })
}

/// Run one tracker step on an RGB frame.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(tracker, img), fields(width = img.width(), height = img.height()))
)]
pub fn track_rgb(tracker: &mut SpotTracker, img: &RgbImage) -> Result<FrameDetection, TrackError> {
    let bgr = bgr_from_rgb(img);
    let view = crate::core::BgrImageView::new(bgr.width, bgr.height, &bgr.data)?;
    Ok(tracker.process_frame(&view)?)
}

fn mask_name(color: Option<SpotColor>) -> &'static str {
    match color {
        Some(SpotColor::Red) => "mask_red.png",
        Some(SpotColor::Green) => "mask_green.png",
        Some(SpotColor::Blue) => "mask_blue.png",
        Some(SpotColor::Yellow) => "mask_yellow.png",
        None => "mask_all.png",
    }
}

/// Write the four colour masks and their union as PNG files into `dir`.
pub fn save_masks(masks: &SpotMasks, dir: &Path) -> Result<Vec<PathBuf>, image::ImageError> {
    let mut written = Vec::with_capacity(5);
    let all = std::iter::once((None, &masks.all));
    for (color, mask) in masks.iter().map(|(c, m)| (Some(c), m)).chain(all) {
        let path = dir.join(mask_name(color));
        mask_image(mask).save(&path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::descriptor::SPOT_COLORS;
    use crate::marker::{render_face, FaceIndex, TrackerParams};
    use crate::Homography;
    use nalgebra::Matrix3;

    #[test]
    fn rgb_and_bgr_layouts_swap_channels() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(1, 0, Rgb([10, 20, 30]));
        let bgr = bgr_from_rgb(&img);
        assert_eq!(bgr.view().bgr(1, 0), [30, 20, 10]);
        assert_eq!(rgb_from_bgr(&bgr), img);
    }

    #[test]
    fn tracks_a_rendered_rgb_frame() {
        let h = Homography::new(Matrix3::new(
            4.0, 0.0, 200.0, //
            0.0, 4.0, 200.0, //
            0.0, 0.0, 1.0,
        ));
        let face = FaceIndex::new(8).expect("face");
        let frame = render_face(400, 400, &h, face, &SPOT_COLORS);
        let rgb = rgb_from_bgr(&frame);
        let mut tracker = SpotTracker::new(TrackerParams::default());
        let det = track_rgb(&mut tracker, &rgb).expect("detected");
        assert_eq!(det.side.face, face);

        let dir = tempfile::tempdir().expect("tempdir");
        let masks = tracker.masks().expect("masks");
        let written = save_masks(masks, dir.path()).expect("saved");
        assert_eq!(written.len(), 5);
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn empty_rgb_frame_is_a_frame_error() {
        let img = RgbImage::new(0, 0);
        let mut tracker = SpotTracker::new(TrackerParams::default());
        assert!(matches!(
            track_rgb(&mut tracker, &img),
            Err(TrackError::Frame(FrameError::InvalidDimensions { .. }))
        ));
    }
}
