//! Control spot search and the 8-bit face code.
//!
//! Bit layout (index into `CODE_POINTS`):
//!
//! ```text
//!  b0 b1 b2
//!  b3    b4
//!  b5 b6 b7
//! ```
//!
//! `b1 + 2·b2 + 4·b5 + 8·b6` is the face number. `b0`, `b4` only enter the
//! parity; `b3`/`b7` are the control bits: with an even data sum `b7` must be
//! set, with an odd one `b3`.

use dodeca_core::{sample_channel_sum, BgrImageView, Homography};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::correspondence::Correspondence;
use crate::descriptor::{
    code_points, control_candidates, face_rotation, rotate_points, FaceIndex, CODE_BITS,
    CYCLIC_ROTATIONS, SPOT_COUNT,
};
use crate::{CodeError, DetectError};

#[cfg(feature = "tracing")]
use tracing::instrument;

const FACE_BITS: [(usize, u8); 4] = [(1, 1), (2, 2), (5, 4), (6, 8)];
const PARITY_BITS: [usize; 6] = [0, 1, 2, 4, 5, 6];
const EVEN_CONTROL: usize = 7;
const ODD_CONTROL: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodeParams {
    /// A code dot reads as set when its B+G+R sum is below this value.
    pub dark_limit: f32,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self { dark_limit: 300.0 }
    }
}

/// Decoded side of the marker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SideReading {
    pub face: FaceIndex,
    /// Number of 72° steps between the resolved and the printed spot order.
    pub control_index: usize,
    pub bits: [bool; CODE_BITS],
}

fn sample_at(frame: &BgrImageView<'_>, p: Point2<f64>) -> Result<f32, CodeError> {
    sample_channel_sum(frame, p.x as f32, p.y as f32).ok_or(CodeError::OutOfFrame)
}

/// Index of the darkest control candidate under `img_from_face`.
pub fn locate_control_spot(
    frame: &BgrImageView<'_>,
    img_from_face: &Homography,
) -> Result<usize, CodeError> {
    let mut best = (0, f32::INFINITY);
    for (k, c) in control_candidates().into_iter().enumerate() {
        let sum = sample_at(frame, img_from_face.apply(c))?;
        if sum < best.1 {
            best = (k, sum);
        }
    }
    Ok(best.0)
}

/// Read the eight code dots with the layout turned by `control_index` steps.
pub fn sample_code_bits(
    frame: &BgrImageView<'_>,
    img_from_face: &Homography,
    control_index: usize,
    params: &DecodeParams,
) -> Result<[bool; CODE_BITS], CodeError> {
    let pts = rotate_points(&code_points(), control_index);
    let mut bits = [false; CODE_BITS];
    for (bit, p) in bits.iter_mut().zip(pts) {
        *bit = sample_at(frame, img_from_face.apply(p))? < params.dark_limit;
    }
    Ok(bits)
}

fn parity_is_even(bits: &[bool; CODE_BITS]) -> bool {
    PARITY_BITS.iter().filter(|&&i| bits[i]).count() % 2 == 0
}

pub fn decode_face_code(bits: &[bool; CODE_BITS]) -> Result<FaceIndex, CodeError> {
    let control = if parity_is_even(bits) {
        EVEN_CONTROL
    } else {
        ODD_CONTROL
    };
    if !bits[control] {
        return Err(CodeError::ControlSum);
    }
    let value = FACE_BITS
        .iter()
        .filter(|(i, _)| bits[*i])
        .map(|(_, w)| w)
        .sum::<u8>();
    FaceIndex::new(value).ok_or(CodeError::FaceIndexOutOfRange(value))
}

/// Bits printed on `face`; `b0` and `b4` are left clear.
pub fn encode_face_code(face: FaceIndex) -> [bool; CODE_BITS] {
    let mut bits = [false; CODE_BITS];
    for (i, w) in FACE_BITS {
        bits[i] = face.get() & w != 0;
    }
    if parity_is_even(&bits) {
        bits[EVEN_CONTROL] = true;
    } else {
        bits[ODD_CONTROL] = true;
    }
    bits
}

/// Find the control spot and decode the face code of one resolved side.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn decode_side(
    frame: &BgrImageView<'_>,
    img_from_face: &Homography,
    params: &DecodeParams,
) -> Result<SideReading, DetectError> {
    let control_index = locate_control_spot(frame, img_from_face)?;
    let bits = sample_code_bits(frame, img_from_face, control_index, params)?;
    let face = decode_face_code(&bits)?;
    Ok(SideReading {
        face,
        control_index,
        bits,
    })
}

/// Re-express `corr` in the printed spot order of the face.
///
/// Spot `t` of the printed face is resolved spot `t + k`, and the printed
/// face plane is the resolved one turned by `k·72°`.
pub fn rotate_to_printed_order(corr: &Correspondence, control_index: usize) -> Correspondence {
    let k = control_index % SPOT_COUNT;
    let shift = CYCLIC_ROTATIONS[k];
    let turn = Homography::new(face_rotation(k));
    let img_from_face = corr.img_from_face.compose(&turn);
    let back = Homography::new(face_rotation(SPOT_COUNT - k));
    Correspondence {
        ordered: shift.map(|i| corr.ordered[i]),
        ordering: shift.map(|i| corr.ordering[i]),
        img_from_face,
        face_from_img: back.compose(&corr.face_from_img),
        ..*corr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dodeca_core::BgrImage;

    #[test]
    fn every_face_code_round_trips() {
        for face in FaceIndex::all() {
            let bits = encode_face_code(face);
            assert_eq!(decode_face_code(&bits), Ok(face));
            assert!(!bits[0] && !bits[4]);
            assert!(bits[3] ^ bits[7], "exactly one control bit for {face:?}");
        }
    }

    #[test]
    fn single_data_bit_flip_breaks_the_control_sum() {
        for face in FaceIndex::all() {
            for i in PARITY_BITS {
                let mut bits = encode_face_code(face);
                bits[i] = !bits[i];
                assert_eq!(decode_face_code(&bits), Err(CodeError::ControlSum));
            }
        }
    }

    #[test]
    fn face_number_out_of_range() {
        // face value 0, even parity
        let mut bits = [false; CODE_BITS];
        bits[EVEN_CONTROL] = true;
        assert_eq!(
            decode_face_code(&bits),
            Err(CodeError::FaceIndexOutOfRange(0))
        );
        // 1 + 4 + 8 + 2 = 15, even parity
        let mut bits = [false; CODE_BITS];
        for (i, _) in FACE_BITS {
            bits[i] = true;
        }
        bits[EVEN_CONTROL] = true;
        assert_eq!(
            decode_face_code(&bits),
            Err(CodeError::FaceIndexOutOfRange(15))
        );
    }

    #[test]
    fn darkest_candidate_wins() {
        // 3 px per mm, face centre at (100, 100).
        let h = Homography::new(nalgebra::Matrix3::new(
            3.0, 0.0, 100.0, //
            0.0, 3.0, 100.0, //
            0.0, 0.0, 1.0,
        ));
        let mut img = BgrImage::filled(200, 200, [255, 255, 255]);
        let c = h.apply(control_candidates()[2]);
        for dy in -3..=3 {
            for dx in -3..=3 {
                img.put(
                    (c.x.round() as i64 + dx) as usize,
                    (c.y.round() as i64 + dy) as usize,
                    [0, 0, 0],
                );
            }
        }
        assert_eq!(locate_control_spot(&img.view(), &h), Ok(2));
    }

    #[test]
    fn samples_off_frame_are_reported() {
        let h = Homography::new(nalgebra::Matrix3::new(
            3.0, 0.0, 0.0, //
            0.0, 3.0, 0.0, //
            0.0, 0.0, 1.0,
        ));
        let img = BgrImage::filled(50, 50, [255, 255, 255]);
        assert_eq!(
            locate_control_spot(&img.view(), &h),
            Err(CodeError::OutOfFrame)
        );
    }

    #[test]
    fn printed_order_shifts_points_and_homography() {
        let canonical = crate::descriptor::canonical_spots();
        let h = Homography::new(nalgebra::Matrix3::new(
            2.0, 0.1, 90.0, //
            -0.1, 2.0, 80.0, //
            0.0005, 0.0, 1.0,
        ));
        let inv = h.inverse().expect("invertible");
        let corr = Correspondence {
            ordered: canonical.map(|p| h.apply(p)),
            ordering: [0, 1, 2, 3, 4],
            distance: 0.0,
            excluded: crate::correspondence::ExcludedSpot::Fifth,
            mirrored: false,
            face_from_img: inv,
            img_from_face: h,
        };
        for k in 0..SPOT_COUNT {
            let turned = rotate_to_printed_order(&corr, k);
            for t in 0..SPOT_COUNT {
                let via_h = turned.img_from_face.apply(canonical[t]);
                assert!((via_h - turned.ordered[t]).norm() < 1e-4, "k={k} t={t}");
                let back = turned.face_from_img.apply(turned.ordered[t]);
                assert!((back - canonical[t]).norm() < 1e-4, "k={k} t={t}");
            }
        }
    }
}
