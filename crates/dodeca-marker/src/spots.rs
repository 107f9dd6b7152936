//! Blob centroids from intersecting row and column strips.

use dodeca_core::Mask;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::color_mask::{SpotColor, SpotMasks};
use crate::descriptor::SPOT_COUNT;
use crate::strips::{scan_strips, ScanAxis, Strip};
use crate::DetectError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Pixel-count weighted centroid of one blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightCenter {
    pub x: i32,
    pub y: i32,
    /// First row of the bounding row strip; primary sort key of detections.
    pub row_start: usize,
    pub color: SpotColor,
    pub pixels: usize,
}

impl WeightCenter {
    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.x as f64, self.y as f64)
    }
}

/// Centroid of the set pixels inside the box `rows x cols`, if any.
fn weight_center(mask: &Mask, rows: Strip, cols: Strip, color: SpotColor) -> Option<WeightCenter> {
    let mut sum_x = 0u64;
    let mut sum_y = 0u64;
    let mut count = 0u64;
    for y in rows.first..=rows.last.min(mask.height.saturating_sub(1)) {
        for x in cols.first..=cols.last.min(mask.width.saturating_sub(1)) {
            if mask.is_set(x, y) {
                sum_x += x as u64;
                sum_y += y as u64;
                count += 1;
            }
        }
    }
    if count == 0 {
        return None;
    }
    let n = count as f64;
    Some(WeightCenter {
        x: (sum_x as f64 / n).round() as i32,
        y: (sum_y as f64 / n).round() as i32,
        row_start: rows.first,
        color,
        pixels: count as usize,
    })
}

/// Centroids of every non-empty (row strip, column strip) box of one mask.
pub fn locate_weight_centers(
    mask: &Mask,
    rows: &[Strip],
    cols: &[Strip],
    color: SpotColor,
) -> Vec<WeightCenter> {
    rows.iter()
        .flat_map(|&r| cols.iter().map(move |&c| (r, c)))
        .filter_map(|(r, c)| weight_center(mask, r, c, color))
        .collect()
}

/// Spot centroids across all four colour masks, ordered by `(row_start, x)`.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(masks)))]
pub fn locate_spots(masks: &SpotMasks) -> Vec<WeightCenter> {
    let mut out = Vec::new();
    for (color, mask) in masks.iter() {
        let rows = scan_strips(mask, ScanAxis::Rows);
        let cols = scan_strips(mask, ScanAxis::Columns);
        out.extend(locate_weight_centers(mask, &rows, &cols, color));
    }
    out.sort_by_key(|c| (c.row_start, c.x));
    out
}

/// Enforce the five-spot invariant and convert to points.
pub fn collect_five(spots: &[WeightCenter]) -> Result<[Point2<f64>; SPOT_COUNT], DetectError> {
    let pts: [WeightCenter; SPOT_COUNT] =
        spots
            .try_into()
            .map_err(|_| DetectError::DetectionCountMismatch {
                found: spots.len(),
            })?;
    Ok(pts.map(|c| c.point()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_mask::SpotMasks;

    fn empty_masks(w: usize, h: usize) -> SpotMasks {
        SpotMasks {
            red: Mask::new(w, h),
            green: Mask::new(w, h),
            blue: Mask::new(w, h),
            yellow: Mask::new(w, h),
            all: Mask::new(w, h),
        }
    }

    #[test]
    fn square_centroid_is_its_centre() {
        let mut mask = Mask::new(64, 64);
        mask.fill_rect(15, 15, 24, 24);
        let rows = scan_strips(&mask, ScanAxis::Rows);
        let cols = scan_strips(&mask, ScanAxis::Columns);
        let centers = locate_weight_centers(&mask, &rows, &cols, SpotColor::Red);
        assert_eq!(centers.len(), 1);
        assert_eq!((centers[0].x, centers[0].y), (20, 20));
        assert_eq!(centers[0].row_start, 15);
        assert_eq!(centers[0].pixels, 100);
    }

    #[test]
    fn diagonal_blobs_skip_empty_boxes() {
        let mut mask = Mask::new(64, 64);
        mask.fill_rect(5, 5, 12, 12);
        mask.fill_rect(40, 40, 47, 47);
        let rows = scan_strips(&mask, ScanAxis::Rows);
        let cols = scan_strips(&mask, ScanAxis::Columns);
        assert_eq!(rows.len() * cols.len(), 4);
        let centers = locate_weight_centers(&mask, &rows, &cols, SpotColor::Blue);
        assert_eq!(centers.len(), 2);
    }

    #[test]
    fn spots_from_all_channels_are_merged_and_sorted() {
        let mut masks = empty_masks(100, 100);
        masks.green.fill_rect(60, 10, 69, 19);
        masks.red.fill_rect(10, 10, 19, 19);
        masks.yellow.fill_rect(40, 70, 49, 79);
        let spots = locate_spots(&masks);
        let keys: Vec<(SpotColor, i32, i32)> = spots.iter().map(|s| (s.color, s.x, s.y)).collect();
        assert_eq!(
            keys,
            vec![
                (SpotColor::Red, 15, 15),
                (SpotColor::Green, 65, 15),
                (SpotColor::Yellow, 45, 75),
            ]
        );
    }

    #[test]
    fn wrong_count_is_a_mismatch() {
        let mut masks = empty_masks(100, 100);
        masks.red.fill_rect(10, 10, 19, 19);
        let spots = locate_spots(&masks);
        assert!(matches!(
            collect_five(&spots),
            Err(DetectError::DetectionCountMismatch { found: 1 })
        ));
        assert!(matches!(
            collect_five(&[]),
            Err(DetectError::DetectionCountMismatch { found: 0 })
        ));
    }
}
