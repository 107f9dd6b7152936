//! Static marker geometry and permutation tables.
//!
//! All face-plane coordinates are in millimetres, x right and y down when the
//! face is seen from outside. Spot `j` of a face sits at angle `-90° + 72°·j`
//! on a circle of radius 30 mm, so the five spots form a regular pentagon.

use nalgebra::{Matrix3, Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::color_mask::SpotColor;

pub const SPOT_COUNT: usize = 5;
pub const CODE_BITS: usize = 8;
pub const FACE_COUNT: usize = 12;

/// Printed radius of a colour spot.
pub const SPOT_RADIUS_MM: f64 = 4.5;
/// Printed radius of the dark control spot.
pub const CONTROL_RADIUS_MM: f64 = 3.0;
/// Printed radius of a code dot.
pub const CODE_DOT_RADIUS_MM: f64 = 2.2;

/// Colour-spot positions of the canonical face.
pub const CANONICAL_SPOTS: [[f64; 2]; SPOT_COUNT] = [
    [0.000000, -30.000000],
    [28.531695, -9.270510],
    [17.633558, 24.270510],
    [-17.633558, 24.270510],
    [-28.531695, -9.270510],
];

/// Printed colour of each spot, by spot index.
pub const SPOT_COLORS: [SpotColor; SPOT_COUNT] = [
    SpotColor::Red,
    SpotColor::Green,
    SpotColor::Blue,
    SpotColor::Red,
    SpotColor::Yellow,
];

/// Candidate locations of the always-dark control spot (radius 20 mm,
/// between neighbouring colour spots). Only candidate 0 is printed.
pub const CONTROL_CANDIDATES: [[f64; 2]; SPOT_COUNT] = [
    [11.755705, -16.180340],
    [19.021130, 6.180340],
    [0.000000, 20.000000],
    [-19.021130, 6.180340],
    [-11.755705, -16.180340],
];

/// Code dot layout: 3x3 grid of 7 mm pitch without its centre, row-major.
pub const CODE_POINTS: [[f64; 2]; CODE_BITS] = [
    [-7.0, -7.0],
    [0.0, -7.0],
    [7.0, -7.0],
    [-7.0, 0.0],
    [7.0, 0.0],
    [-7.0, 7.0],
    [0.0, 7.0],
    [7.0, 7.0],
];

/// Orderings of the first four detected spots tried during correspondence
/// search; the fifth detection is held out. Together with the two held-out
/// assignments they cover every labelling of a regular pentagon up to its
/// symmetries.
pub const ORDERINGS: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [0, 1, 3, 2],
    [0, 2, 1, 3],
    [0, 2, 3, 1],
    [0, 3, 1, 2],
    [0, 3, 2, 1],
];

/// Row `k`: spot order after turning the face by `k` steps of 72°.
pub const CYCLIC_ROTATIONS: [[usize; SPOT_COUNT]; SPOT_COUNT] = [
    [0, 1, 2, 3, 4],
    [1, 2, 3, 4, 0],
    [2, 3, 4, 0, 1],
    [3, 4, 0, 1, 2],
    [4, 0, 1, 2, 3],
];

/// `(sin, cos)` of `k·72°`.
pub const SIN_COS: [(f64, f64); SPOT_COUNT] = [
    (0.000000000, 1.000000000),
    (0.951056516, 0.309016994),
    (0.587785252, -0.809016994),
    (-0.587785252, -0.809016994),
    (-0.951056516, 0.309016994),
];

/// Object-space spot positions of the twelve faces of a dodecahedron centred
/// at the origin (inradius 68.82 mm, edge 61.8 mm). Each side is side 01 turned
/// by one of the solid's rotations, so spot order matches `CANONICAL_SPOTS`.
pub const COLOR_SPOTS_SIDES: [[[f64; 3]; SPOT_COUNT]; FACE_COUNT] = [
    // side 01
    [
        [0.0000, 10.6608, 74.3130],
        [-28.5317, 28.2944, 63.4148],
        [-17.6336, 56.8261, 45.7813],
        [17.6336, 56.8261, 45.7813],
        [28.5317, 28.2944, 63.4148],
    ],
    // side 02
    [
        [-17.6336, 56.8261, -45.7813],
        [-28.5317, 28.2944, -63.4148],
        [0.0000, 10.6608, -74.3130],
        [28.5317, 28.2944, -63.4148],
        [17.6336, 56.8261, -45.7813],
    ],
    // side 03
    [
        [0.0000, -10.6608, 74.3130],
        [28.5317, -28.2944, 63.4148],
        [17.6336, -56.8261, 45.7813],
        [-17.6336, -56.8261, 45.7813],
        [-28.5317, -28.2944, 63.4148],
    ],
    // side 04
    [
        [-17.6336, -56.8261, -45.7813],
        [17.6336, -56.8261, -45.7813],
        [28.5317, -28.2944, -63.4148],
        [0.0000, -10.6608, -74.3130],
        [-28.5317, -28.2944, -63.4148],
    ],
    // side 05
    [
        [28.2944, 63.4148, 28.5317],
        [10.6608, 74.3130, 0.0000],
        [28.2944, 63.4149, -28.5317],
        [56.8261, 45.7813, -17.6335],
        [56.8261, 45.7813, 17.6335],
    ],
    // side 06
    [
        [28.2944, -63.4148, 28.5317],
        [56.8261, -45.7813, 17.6335],
        [56.8261, -45.7813, -17.6335],
        [28.2944, -63.4149, -28.5317],
        [10.6608, -74.3130, 0.0000],
    ],
    // side 07
    [
        [-28.2944, 63.4148, 28.5317],
        [-56.8261, 45.7813, 17.6335],
        [-56.8261, 45.7813, -17.6335],
        [-28.2944, 63.4149, -28.5317],
        [-10.6608, 74.3130, 0.0000],
    ],
    // side 08
    [
        [-28.2944, -63.4148, 28.5317],
        [-10.6608, -74.3130, 0.0000],
        [-28.2944, -63.4149, -28.5317],
        [-56.8261, -45.7813, -17.6335],
        [-56.8261, -45.7813, 17.6335],
    ],
    // side 09
    [
        [45.7813, -17.6336, 56.8261],
        [45.7813, 17.6336, 56.8261],
        [63.4148, 28.5317, 28.2944],
        [74.3130, 0.0000, 10.6608],
        [63.4148, -28.5317, 28.2944],
    ],
    // side 10
    [
        [74.3130, 0.0000, -10.6608],
        [63.4148, 28.5317, -28.2944],
        [45.7813, 17.6336, -56.8261],
        [45.7813, -17.6336, -56.8261],
        [63.4148, -28.5317, -28.2944],
    ],
    // side 11
    [
        [-45.7813, -17.6336, 56.8261],
        [-63.4148, -28.5317, 28.2944],
        [-74.3130, 0.0000, 10.6608],
        [-63.4148, 28.5317, 28.2944],
        [-45.7813, 17.6336, 56.8261],
    ],
    // side 12
    [
        [-74.3130, 0.0000, -10.6608],
        [-63.4148, -28.5317, -28.2944],
        [-45.7813, -17.6336, -56.8261],
        [-45.7813, 17.6336, -56.8261],
        [-63.4148, 28.5317, -28.2944],
    ],
];

/// One of the twelve faces, numbered 1..=12.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FaceIndex(u8);

impl FaceIndex {
    pub fn new(index: u8) -> Option<Self> {
        (1..=FACE_COUNT as u8)
            .contains(&index)
            .then_some(Self(index))
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = FaceIndex> {
        (1..=FACE_COUNT as u8).map(FaceIndex)
    }
}

impl TryFrom<u8> for FaceIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("face index {value} outside 1..={FACE_COUNT}"))
    }
}

impl From<FaceIndex> for u8 {
    fn from(face: FaceIndex) -> Self {
        face.0
    }
}

/// Reference geometry of one face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerDescriptor {
    pub face: FaceIndex,
    /// Object-space spot positions in canonical spot order.
    pub spots: [Point3<f64>; SPOT_COUNT],
}

impl MarkerDescriptor {
    pub fn for_face(face: FaceIndex) -> Self {
        let table = &COLOR_SPOTS_SIDES[face.get() as usize - 1];
        Self {
            face,
            spots: table.map(|[x, y, z]| Point3::new(x, y, z)),
        }
    }
}

#[inline]
fn to_points<const N: usize>(table: &[[f64; 2]; N]) -> [Point2<f64>; N] {
    table.map(|[x, y]| Point2::new(x, y))
}

pub fn canonical_spots() -> [Point2<f64>; SPOT_COUNT] {
    to_points(&CANONICAL_SPOTS)
}

pub fn control_candidates() -> [Point2<f64>; SPOT_COUNT] {
    to_points(&CONTROL_CANDIDATES)
}

pub fn code_points() -> [Point2<f64>; CODE_BITS] {
    to_points(&CODE_POINTS)
}

/// Homogeneous face-plane rotation by `k·72°` about the face centre.
pub fn face_rotation(k: usize) -> Matrix3<f64> {
    let (s, c) = SIN_COS[k % SPOT_COUNT];
    Matrix3::new(
        c, -s, 0.0, //
        s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Rotate face-plane points by `k·72°`, returning a new array.
pub fn rotate_points<const N: usize>(pts: &[Point2<f64>; N], k: usize) -> [Point2<f64>; N] {
    let (s, c) = SIN_COS[k % SPOT_COUNT];
    pts.map(|p| Point2::new(p.x * c - p.y * s, p.x * s + p.y * c))
}
