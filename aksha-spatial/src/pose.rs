//! Rigid-body transforms.
//!
//! A [`Pose`] combines a translation (millimetres) with an orientation.
//! Poses form a group: composition is associative with [`Pose::IDENTITY`]
//! as the unit and [`Pose::inverse`] as the inverse.

use crate::orientation::Orientation;
use crate::quaternion::Quaternion;
use crate::vector::Vector3;
use serde::{Deserialize, Serialize};

/// Default epsilon for translation comparison, millimetres.
pub const TRANSLATION_EPSILON: f64 = 1e-8;

/// Default epsilon for orientation comparison, radians. Looser than the
/// translational one: quaternion round-trips lose a few bits more.
pub const ORIENTATION_EPSILON: f64 = 1e-6;

/// A rigid-body transform: rotate by `orientation`, then translate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation in millimetres.
    pub translation: Vector3,
    /// Orientation, in whichever representation it was built with.
    pub orientation: Orientation,
}

impl Pose {
    /// The identity (zero) pose.
    pub const IDENTITY: Pose = Pose {
        translation: Vector3::ZERO,
        orientation: Orientation::IDENTITY,
    };

    /// Create a pose from translation and orientation.
    #[inline]
    pub const fn new(translation: Vector3, orientation: Orientation) -> Self {
        Self {
            translation,
            orientation,
        }
    }

    /// Pure translation.
    #[inline]
    pub const fn from_translation(translation: Vector3) -> Self {
        Self {
            translation,
            orientation: Orientation::IDENTITY,
        }
    }

    /// Pure rotation.
    #[inline]
    pub const fn from_orientation(orientation: Orientation) -> Self {
        Self {
            translation: Vector3::ZERO,
            orientation,
        }
    }

    /// Canonical quaternion of this pose's orientation.
    #[inline]
    pub fn quaternion(&self) -> Quaternion {
        self.orientation.quaternion()
    }

    /// Compose `self * other`: apply `other` in `self`'s coordinates.
    ///
    /// The result's orientation is always in quaternion representation.
    pub fn compose(&self, other: &Pose) -> Pose {
        let q = self.quaternion();
        Pose {
            translation: self.translation + q.rotate_vector(other.translation),
            orientation: Orientation::Quaternion(q.mul(&other.quaternion()).canonicalized()),
        }
    }

    /// Group inverse: `p.compose(&p.inverse())` is the identity.
    pub fn inverse(&self) -> Pose {
        let qinv = self.quaternion().conjugate();
        Pose {
            translation: -qinv.rotate_vector(self.translation),
            orientation: Orientation::Quaternion(qinv.canonicalized()),
        }
    }

    /// Map a point from this pose's coordinates to the parent's.
    #[inline]
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        self.translation + self.quaternion().rotate_vector(p)
    }

    /// Blend between two poses: linear on translation, slerp on
    /// orientation. `t` is clamped to `[0, 1]`.
    pub fn interpolate(a: &Pose, b: &Pose, t: f64) -> Pose {
        let t = t.clamp(0.0, 1.0);
        let ta = a.translation;
        let tb = b.translation;
        Pose {
            translation: ta + (tb - ta) * t,
            orientation: Orientation::Quaternion(a.quaternion().slerp(&b.quaternion(), t)),
        }
    }

    /// Approximate equality with a caller-supplied epsilon applied to both
    /// the translation (mm) and the orientation (radians of angular
    /// distance).
    #[inline]
    pub fn approx_eq(&self, other: &Pose, epsilon: f64) -> bool {
        self.translation.approx_eq(&other.translation, epsilon)
            && self.orientation.approx_eq(&other.orientation, epsilon)
    }

    /// Approximate equality under the library's default epsilons.
    #[inline]
    pub fn almost_coincident(&self, other: &Pose) -> bool {
        self.translation
            .approx_eq(&other.translation, TRANSLATION_EPSILON)
            && self
                .orientation
                .approx_eq(&other.orientation, ORIENTATION_EPSILON)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::IDENTITY
    }
}

impl std::ops::Mul for Pose {
    type Output = Pose;

    #[inline]
    fn mul(self, rhs: Pose) -> Pose {
        self.compose(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::AxisAngle;
    use std::f64::consts::FRAC_PI_2;

    fn rot_z(theta: f64) -> Orientation {
        Orientation::AxisAngle(AxisAngle::new(theta, Vector3::Z).unwrap())
    }

    #[test]
    fn test_identity_composition() {
        let p = Pose::new(Vector3::new(1.0, 2.0, 3.0), rot_z(0.5));
        assert!(p.compose(&Pose::IDENTITY).approx_eq(&p, 1e-12));
        assert!(Pose::IDENTITY.compose(&p).approx_eq(&p, 1e-12));
    }

    #[test]
    fn test_compose_rotates_translation() {
        // Quarter turn about Z, then step 1mm along local X: lands on +Y.
        let a = Pose::from_orientation(rot_z(FRAC_PI_2));
        let b = Pose::from_translation(Vector3::X);
        let c = a.compose(&b);
        assert!(c.translation.approx_eq(&Vector3::Y, 1e-12));
    }

    #[test]
    fn test_inverse() {
        let p = Pose::new(Vector3::new(4.0, -2.0, 7.0), rot_z(1.1));
        assert!(p.compose(&p.inverse()).approx_eq(&Pose::IDENTITY, 1e-12));
        assert!(p.inverse().compose(&p).approx_eq(&Pose::IDENTITY, 1e-12));
    }

    #[test]
    fn test_transform_point() {
        let p = Pose::new(Vector3::new(1.0, 0.0, 0.0), rot_z(FRAC_PI_2));
        let q = p.transform_point(Vector3::X);
        assert!(q.approx_eq(&Vector3::new(1.0, 1.0, 0.0), 1e-12));
    }

    #[test]
    fn test_interpolate_endpoints_and_midpoint() {
        let a = Pose::from_translation(Vector3::ZERO);
        let b = Pose::new(Vector3::new(2.0, 0.0, 0.0), rot_z(FRAC_PI_2));
        assert!(Pose::interpolate(&a, &b, 0.0).approx_eq(&a, 1e-12));
        assert!(Pose::interpolate(&a, &b, 1.0).approx_eq(&b, 1e-9));
        let mid = Pose::interpolate(&a, &b, 0.5);
        assert!(mid.translation.approx_eq(&Vector3::new(1.0, 0.0, 0.0), 1e-12));
        assert!(mid.orientation.approx_eq(&rot_z(FRAC_PI_2 / 2.0), 1e-9));
    }

    #[test]
    fn test_almost_coincident_default_epsilons() {
        let p = Pose::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let mut q = p;
        q.translation.x += 1e-10;
        assert!(p.almost_coincident(&q));
        q.translation.x += 1e-6;
        assert!(!p.almost_coincident(&q));
    }
}
