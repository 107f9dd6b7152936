//! Synthetic frames of a single marker face.

use dodeca_core::{BgrImage, Homography};
use nalgebra::Point2;

use crate::color_mask::SpotColor;
use crate::descriptor::{
    canonical_spots, code_points, control_candidates, FaceIndex, CODE_BITS, CODE_DOT_RADIUS_MM,
    CONTROL_RADIUS_MM, SPOT_COUNT, SPOT_RADIUS_MM,
};
use crate::side_code::encode_face_code;

/// Radius of the white paper disc around the face centre.
pub const PAPER_RADIUS_MM: f64 = 40.0;

const BACKGROUND: [u8; 3] = [110, 110, 110];
const PAPER: [u8; 3] = [245, 245, 245];
const INK: [u8; 3] = [15, 15, 15];

/// Draw `face` through `img_from_face` onto a grey background.
pub fn render_face(
    width: usize,
    height: usize,
    img_from_face: &Homography,
    face: FaceIndex,
    colors: &[SpotColor; SPOT_COUNT],
) -> BgrImage {
    render_code(width, height, img_from_face, &encode_face_code(face), colors)
}

/// Like `render_face`, with explicit code bits.
pub fn render_code(
    width: usize,
    height: usize,
    img_from_face: &Homography,
    bits: &[bool; CODE_BITS],
    colors: &[SpotColor; SPOT_COUNT],
) -> BgrImage {
    let mut img = BgrImage::filled(width, height, BACKGROUND);
    let Some(face_from_img) = img_from_face.inverse() else {
        return img;
    };

    let spots = canonical_spots();
    let control = control_candidates()[0];
    let dots: Vec<Point2<f64>> = code_points()
        .into_iter()
        .zip(bits)
        .filter(|&(_, &set)| set)
        .map(|(p, _)| p)
        .collect();

    for y in 0..height {
        for x in 0..width {
            let p = face_from_img.apply(Point2::new(x as f64, y as f64));
            if let Some(color) = face_color(p, &spots, control, &dots, colors) {
                img.put(x, y, color);
            }
        }
    }
    img
}

fn face_color(
    p: Point2<f64>,
    spots: &[Point2<f64>; SPOT_COUNT],
    control: Point2<f64>,
    dots: &[Point2<f64>],
    colors: &[SpotColor; SPOT_COUNT],
) -> Option<[u8; 3]> {
    if !p.x.is_finite() || p.coords.norm() > PAPER_RADIUS_MM {
        return None;
    }
    if let Some(j) = spots.iter().position(|s| (p - s).norm() <= SPOT_RADIUS_MM) {
        return Some(colors[j].bgr());
    }
    if (p - control).norm() <= CONTROL_RADIUS_MM
        || dots.iter().any(|d| (p - d).norm() <= CODE_DOT_RADIUS_MM)
    {
        return Some(INK);
    }
    Some(PAPER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SPOT_COLORS;
    use nalgebra::Matrix3;

    #[test]
    fn spots_are_drawn_at_their_projections() {
        let h = Homography::new(Matrix3::new(
            3.0, 0.0, 120.0, //
            0.0, 3.0, 120.0, //
            0.0, 0.0, 1.0,
        ));
        let face = FaceIndex::new(5).expect("face");
        let img = render_face(240, 240, &h, face, &SPOT_COLORS);
        let view = img.view();
        for (s, color) in canonical_spots().iter().zip(SPOT_COLORS) {
            let q = h.apply(*s);
            assert_eq!(view.bgr(q.x as usize, q.y as usize), color.bgr());
        }
        assert_eq!(view.bgr(0, 0), BACKGROUND);
        let c = h.apply(control_candidates()[0]);
        assert_eq!(view.bgr(c.x.round() as usize, c.y.round() as usize), INK);
    }
}
