//! Interchangeable orientation representations.
//!
//! One rotation, several faces: unit quaternion (canonical), axis-angle,
//! ZYX-intrinsic Euler angles, 3x3 rotation matrix, and orientation vector
//! (a direction plus a roll about it). [`Orientation`] remembers which
//! representation it was constructed from so that serialisation can emit the
//! same form, while all algebra goes through the quaternion.

use crate::error::{Result, SpatialError};
use crate::quaternion::Quaternion;
use crate::vector::Vector3;
use serde::{Deserialize, Serialize};

/// Axis-angle rotation (R4AA): `theta` radians about a unit axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisAngle {
    /// Rotation angle in radians.
    pub theta: f64,
    /// Axis X component.
    pub x: f64,
    /// Axis Y component.
    pub y: f64,
    /// Axis Z component.
    pub z: f64,
}

impl AxisAngle {
    /// Create an axis-angle rotation, normalising the axis.
    ///
    /// A zero-length axis is rejected unless the angle is also zero, in
    /// which case the rotation is the identity about +Z.
    pub fn new(theta: f64, axis: Vector3) -> Result<Self> {
        if axis.norm2() < 1e-16 {
            if theta.abs() < 1e-12 {
                return Ok(Self {
                    theta: 0.0,
                    x: 0.0,
                    y: 0.0,
                    z: 1.0,
                });
            }
            return Err(SpatialError::ZeroAxis);
        }
        let a = axis.normalized();
        Ok(Self {
            theta,
            x: a.x,
            y: a.y,
            z: a.z,
        })
    }

    /// The rotation axis.
    #[inline]
    pub fn axis(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Convert to the canonical quaternion.
    #[inline]
    pub fn quaternion(&self) -> Quaternion {
        Quaternion::from_axis_angle(self.theta, self.axis())
    }
}

/// Euler angles, ZYX intrinsic: yaw about Z, then pitch about the new Y,
/// then roll about the new X. All radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    /// Roll about X, radians.
    pub roll: f64,
    /// Pitch about Y, radians.
    pub pitch: f64,
    /// Yaw about Z, radians.
    pub yaw: f64,
}

impl EulerAngles {
    /// Create Euler angles.
    #[inline]
    pub const fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Convert to the canonical quaternion.
    pub fn quaternion(&self) -> Quaternion {
        let (sr, cr) = (self.roll / 2.0).sin_cos();
        let (sp, cp) = (self.pitch / 2.0).sin_cos();
        let (sy, cy) = (self.yaw / 2.0).sin_cos();
        Quaternion::new(
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        )
        .canonicalized()
    }

    /// Recover Euler angles from a quaternion. Pitch is clamped into
    /// `[-pi/2, pi/2]`; at the gimbal singularity roll and yaw are not
    /// unique and roll absorbs the freedom.
    pub fn from_quaternion(q: &Quaternion) -> Self {
        let q = q.normalized();
        let roll = (2.0 * (q.w * q.x + q.y * q.z)).atan2(1.0 - 2.0 * (q.x * q.x + q.y * q.y));
        let pitch = (2.0 * (q.w * q.y - q.z * q.x)).clamp(-1.0, 1.0).asin();
        let yaw = (2.0 * (q.w * q.z + q.x * q.y)).atan2(1.0 - 2.0 * (q.y * q.y + q.z * q.z));
        Self { roll, pitch, yaw }
    }
}

/// Row-major 3x3 rotation matrix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationMatrix {
    /// Rows of the matrix.
    pub rows: [[f64; 3]; 3],
}

impl RotationMatrix {
    /// Identity matrix.
    pub const IDENTITY: RotationMatrix = RotationMatrix {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Build from a quaternion by the standard construction.
    pub fn from_quaternion(q: &Quaternion) -> Self {
        let q = q.normalized();
        let (w, x, y, z) = (q.w, q.x, q.y, q.z);
        Self {
            rows: [
                [
                    1.0 - 2.0 * (y * y + z * z),
                    2.0 * (x * y - w * z),
                    2.0 * (x * z + w * y),
                ],
                [
                    2.0 * (x * y + w * z),
                    1.0 - 2.0 * (x * x + z * z),
                    2.0 * (y * z - w * x),
                ],
                [
                    2.0 * (x * z - w * y),
                    2.0 * (y * z + w * x),
                    1.0 - 2.0 * (x * x + y * y),
                ],
            ],
        }
    }

    /// Extract the quaternion, picking the largest diagonal pivot to stay
    /// numerically stable near 180-degree rotations.
    pub fn quaternion(&self) -> Quaternion {
        let m = &self.rows;
        let trace = m[0][0] + m[1][1] + m[2][2];
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Quaternion::new(
                0.25 * s,
                (m[2][1] - m[1][2]) / s,
                (m[0][2] - m[2][0]) / s,
                (m[1][0] - m[0][1]) / s,
            )
        } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
            let s = (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
            Quaternion::new(
                (m[2][1] - m[1][2]) / s,
                0.25 * s,
                (m[0][1] + m[1][0]) / s,
                (m[0][2] + m[2][0]) / s,
            )
        } else if m[1][1] > m[2][2] {
            let s = (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
            Quaternion::new(
                (m[0][2] - m[2][0]) / s,
                (m[0][1] + m[1][0]) / s,
                0.25 * s,
                (m[1][2] + m[2][1]) / s,
            )
        } else {
            let s = (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
            Quaternion::new(
                (m[1][0] - m[0][1]) / s,
                (m[0][2] + m[2][0]) / s,
                (m[1][2] + m[2][1]) / s,
                0.25 * s,
            )
        };
        q.normalized().canonicalized()
    }

    /// The i-th row as a vector.
    #[inline]
    pub fn row(&self, i: usize) -> Vector3 {
        Vector3::new(self.rows[i][0], self.rows[i][1], self.rows[i][2])
    }
}

/// Orientation vector: the unit direction that +Z maps to under the
/// rotation, plus the remaining roll `theta` about that direction. Radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientationVector {
    /// Roll about the pointing direction, radians.
    pub theta: f64,
    /// Direction X component.
    pub ox: f64,
    /// Direction Y component.
    pub oy: f64,
    /// Direction Z component.
    pub oz: f64,
}

/// [`OrientationVector`] with `theta` in degrees. Exists only at the config
/// boundary; converted on the way in and out.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientationVectorDegrees {
    /// Roll about the pointing direction, degrees.
    pub theta: f64,
    /// Direction X component.
    pub ox: f64,
    /// Direction Y component.
    pub oy: f64,
    /// Direction Z component.
    pub oz: f64,
}

impl OrientationVector {
    /// Create an orientation vector, normalising the direction. A zero
    /// direction is rejected.
    pub fn new(theta: f64, direction: Vector3) -> Result<Self> {
        if direction.norm2() < 1e-16 {
            return Err(SpatialError::ZeroAxis);
        }
        let d = direction.normalized();
        Ok(Self {
            theta,
            ox: d.x,
            oy: d.y,
            oz: d.z,
        })
    }

    /// The pointing direction.
    #[inline]
    pub fn direction(&self) -> Vector3 {
        Vector3::new(self.ox, self.oy, self.oz)
    }

    /// Convert to the canonical quaternion: first the minimal rotation
    /// taking +Z onto the direction, then the roll about it.
    pub fn quaternion(&self) -> Quaternion {
        let tilt = min_rotation_z_to(self.direction());
        let roll = Quaternion::from_axis_angle(self.theta, Vector3::Z);
        tilt.mul(&roll).canonicalized()
    }

    /// Decompose a quaternion into direction-plus-roll.
    pub fn from_quaternion(q: &Quaternion) -> Self {
        let q = q.normalized();
        let dir = q.rotate_vector(Vector3::Z);
        let tilt = min_rotation_z_to(dir);
        // The residual maps +Z to itself, so it is a pure roll about Z.
        let residual = tilt.conjugate().mul(&q);
        let theta = 2.0 * residual.z.atan2(residual.w);
        let theta = if theta > std::f64::consts::PI {
            theta - 2.0 * std::f64::consts::PI
        } else if theta <= -std::f64::consts::PI {
            theta + 2.0 * std::f64::consts::PI
        } else {
            theta
        };
        Self {
            theta,
            ox: dir.x,
            oy: dir.y,
            oz: dir.z,
        }
    }

    /// Degrees flavour for the config boundary.
    pub fn to_degrees(&self) -> OrientationVectorDegrees {
        OrientationVectorDegrees {
            theta: self.theta.to_degrees(),
            ox: self.ox,
            oy: self.oy,
            oz: self.oz,
        }
    }
}

impl OrientationVectorDegrees {
    /// Radians flavour used everywhere inside the library.
    pub fn to_radians(&self) -> Result<OrientationVector> {
        OrientationVector::new(
            self.theta.to_radians(),
            Vector3::new(self.ox, self.oy, self.oz),
        )
    }
}

/// Minimal rotation carrying +Z onto `dir` (assumed non-zero, normalised
/// here). Antiparallel directions rotate pi about X.
fn min_rotation_z_to(dir: Vector3) -> Quaternion {
    let d = dir.normalized();
    let dot = d.z.clamp(-1.0, 1.0);
    if dot > 1.0 - 1e-12 {
        Quaternion::IDENTITY
    } else if dot < -1.0 + 1e-12 {
        Quaternion::from_axis_angle(std::f64::consts::PI, Vector3::X)
    } else {
        let axis = Vector3::Z.cross(&d).normalized();
        Quaternion::from_axis_angle(dot.acos(), axis)
    }
}

/// One rotation in whichever representation it was constructed with.
///
/// The variant is preserved so serialisation emits the same representation;
/// [`Orientation::quaternion`] is the single conversion point the algebra
/// uses.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Orientation {
    /// Unit quaternion.
    Quaternion(Quaternion),
    /// Axis-angle (R4AA).
    AxisAngle(AxisAngle),
    /// ZYX-intrinsic Euler angles.
    Euler(EulerAngles),
    /// Rotation matrix.
    Matrix(RotationMatrix),
    /// Orientation vector, radians.
    Vector(OrientationVector),
    /// Orientation vector, degrees.
    VectorDegrees(OrientationVectorDegrees),
}

impl Orientation {
    /// The identity rotation (as a quaternion).
    pub const IDENTITY: Orientation = Orientation::Quaternion(Quaternion::IDENTITY);

    /// Canonical quaternion for this orientation.
    pub fn quaternion(&self) -> Quaternion {
        match self {
            Orientation::Quaternion(q) => q.normalized().canonicalized(),
            Orientation::AxisAngle(aa) => aa.quaternion(),
            Orientation::Euler(e) => e.quaternion(),
            Orientation::Matrix(m) => m.quaternion(),
            Orientation::Vector(ov) => ov.quaternion(),
            Orientation::VectorDegrees(ovd) => match ovd.to_radians() {
                Ok(ov) => ov.quaternion(),
                // Degenerate stored direction; unreachable through constructors.
                Err(_) => Quaternion::IDENTITY,
            },
        }
    }

    /// View as axis-angle.
    pub fn axis_angle(&self) -> AxisAngle {
        let (theta, axis) = self.quaternion().to_axis_angle();
        AxisAngle {
            theta,
            x: axis.x,
            y: axis.y,
            z: axis.z,
        }
    }

    /// View as Euler angles.
    pub fn euler_angles(&self) -> EulerAngles {
        EulerAngles::from_quaternion(&self.quaternion())
    }

    /// View as a rotation matrix.
    pub fn rotation_matrix(&self) -> RotationMatrix {
        RotationMatrix::from_quaternion(&self.quaternion())
    }

    /// View as an orientation vector (radians).
    pub fn orientation_vector(&self) -> OrientationVector {
        OrientationVector::from_quaternion(&self.quaternion())
    }

    /// Rotational distance to another orientation, via canonical
    /// quaternions.
    #[inline]
    pub fn angular_distance(&self, other: &Orientation) -> f64 {
        self.quaternion().angular_distance(&other.quaternion())
    }

    /// Approximate equality under an angular-distance epsilon.
    #[inline]
    pub fn approx_eq(&self, other: &Orientation, epsilon: f64) -> bool {
        self.angular_distance(other) < epsilon
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::IDENTITY
    }
}

impl From<Quaternion> for Orientation {
    fn from(q: Quaternion) -> Self {
        Orientation::Quaternion(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn test_axis_angle_rejects_zero_axis() {
        assert!(AxisAngle::new(1.0, Vector3::ZERO).is_err());
        // Zero angle about a zero axis is just the identity.
        let aa = AxisAngle::new(0.0, Vector3::ZERO).unwrap();
        assert!(aa.quaternion().approx_eq(&Quaternion::IDENTITY, 1e-12));
    }

    #[test]
    fn test_axis_angle_normalises_axis() {
        let aa = AxisAngle::new(FRAC_PI_2, Vector3::new(0.0, 0.0, 10.0)).unwrap();
        assert!((aa.axis().norm() - 1.0).abs() < 1e-12);
        let v = aa.quaternion().rotate_vector(Vector3::X);
        assert!(v.approx_eq(&Vector3::Y, 1e-12));
    }

    #[test]
    fn test_euler_roundtrip() {
        let e = EulerAngles::new(0.1, -0.4, 1.1);
        let back = EulerAngles::from_quaternion(&e.quaternion());
        assert!((e.roll - back.roll).abs() < 1e-10);
        assert!((e.pitch - back.pitch).abs() < 1e-10);
        assert!((e.yaw - back.yaw).abs() < 1e-10);
    }

    #[test]
    fn test_euler_yaw_only_matches_axis_angle() {
        let e = EulerAngles::new(0.0, 0.0, FRAC_PI_2);
        let q = Quaternion::from_axis_angle(FRAC_PI_2, Vector3::Z);
        assert!(e.quaternion().approx_eq(&q, 1e-12));
    }

    #[test]
    fn test_matrix_roundtrip() {
        for q in [
            Quaternion::from_axis_angle(0.3, Vector3::new(1.0, 1.0, 0.0).normalized()),
            Quaternion::from_axis_angle(PI - 1e-3, Vector3::X),
            Quaternion::IDENTITY,
        ] {
            let back = RotationMatrix::from_quaternion(&q).quaternion();
            assert!(q.approx_eq(&back, 1e-9));
        }
    }

    #[test]
    fn test_matrix_rows_are_rotated_basis() {
        let q = Quaternion::from_axis_angle(FRAC_PI_2, Vector3::Z);
        let m = RotationMatrix::from_quaternion(&q);
        // Column 0 is the image of X: (0, 1, 0).
        assert!((m.rows[1][0] - 1.0).abs() < 1e-12);
        assert!(m.rows[0][0].abs() < 1e-12);
    }

    #[test]
    fn test_orientation_vector_roundtrip() {
        for q in [
            Quaternion::from_axis_angle(0.8, Vector3::new(1.0, -2.0, 0.5).normalized()),
            Quaternion::from_axis_angle(FRAC_PI_4, Vector3::X),
            Quaternion::from_axis_angle(PI, Vector3::Z),
            Quaternion::IDENTITY,
        ] {
            let ov = OrientationVector::from_quaternion(&q);
            assert!(ov.quaternion().approx_eq(&q, 1e-9));
        }
    }

    #[test]
    fn test_orientation_vector_direction_is_image_of_z() {
        let q = Quaternion::from_axis_angle(FRAC_PI_2, Vector3::X);
        let ov = OrientationVector::from_quaternion(&q);
        // +Z rotated a quarter turn about X points along -Y.
        assert!(ov.direction().approx_eq(&-Vector3::Y, 1e-12));
    }

    #[test]
    fn test_orientation_vector_rejects_zero_direction() {
        assert!(OrientationVector::new(0.5, Vector3::ZERO).is_err());
    }

    #[test]
    fn test_orientation_vector_degrees_boundary() {
        let ov = OrientationVector::new(FRAC_PI_2, Vector3::X).unwrap();
        let deg = ov.to_degrees();
        assert!((deg.theta - 90.0).abs() < 1e-9);
        let back = deg.to_radians().unwrap();
        assert!((back.theta - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_orientation_preserves_representation() {
        let o = Orientation::Euler(EulerAngles::new(0.1, 0.2, 0.3));
        assert!(matches!(o, Orientation::Euler(_)));
        // All views agree on the underlying rotation.
        let q = o.quaternion();
        assert!(o.axis_angle().quaternion().approx_eq(&q, 1e-10));
        assert!(o.rotation_matrix().quaternion().approx_eq(&q, 1e-10));
        assert!(o.orientation_vector().quaternion().approx_eq(&q, 1e-10));
    }

    #[test]
    fn test_orientation_approx_eq_across_representations() {
        let a = Orientation::AxisAngle(AxisAngle::new(FRAC_PI_2, Vector3::Z).unwrap());
        let b = Orientation::Euler(EulerAngles::new(0.0, 0.0, FRAC_PI_2));
        assert!(a.approx_eq(&b, 1e-10));
    }
}
