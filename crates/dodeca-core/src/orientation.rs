//! Weak-perspective orientation from a plane-to-image homography.
//!
//! Camera frame convention: x right, y down, z forward (into the scene).
//! Plane coordinates use the same x/y orientation as the image, so a plane
//! seen head-on has identity rotation.

use crate::{GeometryError, Homography};
use nalgebra::{Matrix2, Matrix3, Matrix3x2, Point2, Point3, Rotation3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Orientation of a rigid object relative to the camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientationParams {
    /// Camera-from-object rotation.
    pub rotation: Rotation3<f64>,
    /// Image pixels per object unit.
    pub scale: f64,
    /// Image position of the object origin.
    pub translation: Vector2<f64>,
}

impl OrientationParams {
    /// Project an object point. `x`/`y` are image coordinates, `z` is the
    /// scaled depth relative to the object origin (positive away from the camera).
    #[inline]
    pub fn project(&self, p: &Point3<f64>) -> Point3<f64> {
        let q = (self.rotation * p.coords) * self.scale;
        Point3::new(q.x + self.translation.x, q.y + self.translation.y, q.z)
    }

    /// `(roll, pitch, yaw)` of the camera-from-object rotation, in radians.
    pub fn euler_angles(&self) -> (f64, f64, f64) {
        self.rotation.euler_angles()
    }
}

/// Orthonormal frame of a planar point set, expressed in object coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneFrame {
    /// Object-space position of the plane origin.
    pub origin: Point3<f64>,
    /// Object-from-plane rotation; columns are the plane x, y and normal axes.
    pub rotation: Rotation3<f64>,
}

impl PlaneFrame {
    /// Fit the plane frame from object points and their known in-plane coordinates.
    pub fn fit(object: &[Point3<f64>], plane: &[Point2<f64>]) -> Result<Self, GeometryError> {
        if object.len() != plane.len() {
            return Err(GeometryError::LengthMismatch {
                src: object.len(),
                dst: plane.len(),
            });
        }
        if object.len() < 3 {
            return Err(GeometryError::TooFewPoints {
                required: 3,
                got: object.len(),
            });
        }

        let n = object.len() as f64;
        let x_mean = object.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / n;
        let u_mean = plane.iter().fold(Vector2::zeros(), |acc, p| acc + p.coords) / n;

        // Least squares for X - x_mean = B (u - u_mean), B is 3x2.
        let mut xu = Matrix3x2::<f64>::zeros();
        let mut uu = Matrix2::<f64>::zeros();
        for (x, u) in object.iter().zip(plane) {
            let dx = x.coords - x_mean;
            let du = u.coords - u_mean;
            xu += dx * du.transpose();
            uu += du * du.transpose();
        }
        let uu_inv = uu.try_inverse().ok_or(GeometryError::Degenerate)?;
        let b = xu * uu_inv;

        let ex = b.column(0).into_owned();
        let ex_norm = ex.norm();
        if ex_norm < 1e-12 {
            return Err(GeometryError::Degenerate);
        }
        let ex = ex / ex_norm;
        let ey = b.column(1).into_owned();
        let ey = ey - ex * ex.dot(&ey);
        let ey_norm = ey.norm();
        if ey_norm < 1e-12 {
            return Err(GeometryError::Degenerate);
        }
        let ey = ey / ey_norm;
        let ez = ex.cross(&ey);

        let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[ex, ey, ez]));
        let origin = Point3::from(x_mean - b * u_mean);
        Ok(Self { origin, rotation })
    }
}

/// Estimate the object orientation from an image-from-plane homography.
///
/// The affine part of `img_from_plane` at the plane origin is decomposed into
/// a scale and the first two rows of a rotation. The remaining depth sign
/// ambiguity is resolved with the projective row of the homography: the
/// plane recedes towards the side where `h31 x + h32 y` grows.
pub fn estimate_orientation(
    img_from_plane: &Homography,
    frame: &PlaneFrame,
) -> Result<OrientationParams, GeometryError> {
    let h = img_from_plane.h;
    if h[(2, 2)].abs() < 1e-12 {
        return Err(GeometryError::Singular);
    }
    let h = h / h[(2, 2)];

    let (tx, ty) = (h[(0, 2)], h[(1, 2)]);
    let (h31, h32) = (h[(2, 0)], h[(2, 1)]);
    let j11 = h[(0, 0)] - tx * h31;
    let j12 = h[(0, 1)] - tx * h32;
    let j21 = h[(1, 0)] - ty * h31;
    let j22 = h[(1, 1)] - ty * h32;

    let p = j11 * j11 + j21 * j21;
    let q = j12 * j12 + j22 * j22;
    let c = j11 * j12 + j21 * j22;
    let det2 = p * q - c * c;
    if det2 < 1e-18 || j11 * j22 - j12 * j21 <= 0.0 {
        // Zero area or a mirrored mapping: no proper rotation explains it.
        return Err(GeometryError::Degenerate);
    }

    // k = 1/s^2 solves (1 - kp)(1 - kq) = k^2 c^2; the smaller root keeps
    // both out-of-plane components real.
    let disc = ((p + q) * (p + q) - 4.0 * det2).max(0.0);
    let k = ((p + q) - disc.sqrt()) / (2.0 * det2);
    if !(k.is_finite() && k > 0.0) {
        return Err(GeometryError::Degenerate);
    }
    let scale = 1.0 / k.sqrt();

    let r31 = (1.0 - k * p).max(0.0).sqrt();
    let r32_mag = (1.0 - k * q).max(0.0).sqrt();
    let r32 = if r31 > 1e-9 && c > 0.0 {
        -r32_mag
    } else {
        r32_mag
    };
    let (r31, r32) = if r31 * h31 + r32 * h32 < 0.0 {
        (-r31, -r32)
    } else {
        (r31, r32)
    };

    let col1 = Vector3::new(j11 / scale, j21 / scale, r31);
    let col2 = Vector3::new(j12 / scale, j22 / scale, r32);
    let col3 = col1.cross(&col2);
    let cam_from_plane = Rotation3::from_matrix(&Matrix3::from_columns(&[col1, col2, col3]));

    let rotation = cam_from_plane * frame.rotation.inverse();
    let origin_offset = (rotation * (-frame.origin.coords)) * scale;
    let translation = Vector2::new(tx + origin_offset.x, ty + origin_offset.y);

    Ok(OrientationParams {
        rotation,
        scale,
        translation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_frame() -> PlaneFrame {
        let plane: Vec<Point2<f64>> = (0..5)
            .map(|j| {
                let t = (-90.0 + 72.0 * j as f64).to_radians();
                Point2::new(30.0 * t.cos(), 30.0 * t.sin())
            })
            .collect();
        let object: Vec<Point3<f64>> = plane.iter().map(|p| Point3::new(p.x, p.y, 0.0)).collect();
        PlaneFrame::fit(&object, &plane).expect("frame")
    }

    #[test]
    fn plane_frame_recovers_offset_axes() {
        let plane = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
        ];
        // Plane x maps to object y, plane y to object -x, origin at z = 5.
        let object: Vec<Point3<f64>> = plane
            .iter()
            .map(|u| Point3::new(-u.y, u.x, 5.0))
            .collect();
        let frame = PlaneFrame::fit(&object, &plane).expect("frame");
        assert_relative_eq!(frame.origin, Point3::new(0.0, 0.0, 5.0), epsilon = 1e-9);
        let ex = frame.rotation * Vector3::x();
        assert_relative_eq!(ex, Vector3::y(), epsilon = 1e-9);
        let ez = frame.rotation * Vector3::z();
        assert_relative_eq!(ez, Vector3::z(), epsilon = 1e-9);
    }

    #[test]
    fn frontal_view_has_identity_rotation() {
        let h = Homography::new(Matrix3::new(
            3.0, 0.0, 160.0, //
            0.0, 3.0, 120.0, //
            0.0, 0.0, 1.0,
        ));
        let o = estimate_orientation(&h, &flat_frame()).expect("orientation");
        assert_relative_eq!(o.scale, 3.0, epsilon = 1e-9);
        assert_relative_eq!(o.translation, Vector2::new(160.0, 120.0), epsilon = 1e-9);
        assert_relative_eq!(o.rotation.angle(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn tilt_sign_follows_perspective_row() {
        let truth = Rotation3::from_euler_angles(0.0, 0.4, 0.0);
        let m = truth.matrix();
        let s = 2.5;
        let tz = 500.0;
        let h = Homography::new(Matrix3::new(
            s * m[(0, 0)],
            s * m[(0, 1)],
            0.0,
            s * m[(1, 0)],
            s * m[(1, 1)],
            0.0,
            m[(2, 0)] / tz,
            m[(2, 1)] / tz,
            1.0,
        ));
        let o = estimate_orientation(&h, &flat_frame()).expect("orientation");
        assert_relative_eq!(o.scale, s, epsilon = 1e-9);
        assert_relative_eq!(o.rotation.angle_to(&truth), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn projection_applies_scale_and_translation() {
        let o = OrientationParams {
            rotation: Rotation3::identity(),
            scale: 2.0,
            translation: Vector2::new(10.0, 20.0),
        };
        let p = o.project(&Point3::new(1.0, -1.0, 3.0));
        assert_relative_eq!(p, Point3::new(12.0, 18.0, 6.0));
    }

    #[test]
    fn mirrored_mapping_is_rejected() {
        let h = Homography::new(Matrix3::new(
            -3.0, 0.0, 0.0, //
            0.0, 3.0, 0.0, //
            0.0, 0.0, 1.0,
        ));
        assert_eq!(
            estimate_orientation(&h, &flat_frame()),
            Err(GeometryError::Degenerate)
        );
    }
}
