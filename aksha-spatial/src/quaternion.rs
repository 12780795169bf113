//! Unit quaternion rotations.
//!
//! The quaternion is the canonical orientation representation for the whole
//! stack; every other representation converts through it. Hamilton
//! convention, scalar part first.

use crate::vector::Vector3;
use serde::{Deserialize, Serialize};

/// A rotation as a unit quaternion `(w, x, y, z)`.
///
/// Constructors that build rotations (`from_axis_angle`) always produce unit
/// quaternions on the `w >= 0` hemisphere; `q` and `-q` encode the same
/// rotation, and canonicalising avoids sign-flip artifacts when comparing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    /// Scalar component.
    pub w: f64,
    /// X component of the vector part.
    pub x: f64,
    /// Y component of the vector part.
    pub y: f64,
    /// Z component of the vector part.
    pub z: f64,
}

impl Quaternion {
    /// Identity rotation.
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a quaternion from raw components. No normalisation is applied.
    #[inline]
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `theta` radians about `axis`.
    ///
    /// The axis is assumed to be unit length; callers that accept user axes
    /// normalise (and reject zero) before getting here.
    #[inline]
    pub fn from_axis_angle(theta: f64, axis: Vector3) -> Self {
        let half = theta / 2.0;
        let s = half.sin();
        Quaternion::new(half.cos(), axis.x * s, axis.y * s, axis.z * s).canonicalized()
    }

    /// Recover `(theta, axis)`, with theta in `[0, pi]` on the canonical
    /// hemisphere. The identity rotation reports a zero angle about +Z.
    pub fn to_axis_angle(&self) -> (f64, Vector3) {
        let q = self.canonicalized().normalized();
        let s2 = 1.0 - q.w * q.w;
        if s2 < 1e-16 {
            return (0.0, Vector3::Z);
        }
        let s = s2.sqrt();
        let theta = 2.0 * q.w.clamp(-1.0, 1.0).acos();
        (theta, Vector3::new(q.x / s, q.y / s, q.z / s))
    }

    /// Squared norm.
    #[inline]
    pub fn norm2(&self) -> f64 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Rescale to unit length. Degenerate near-zero quaternions collapse to
    /// the identity rather than dividing by zero.
    #[inline]
    pub fn normalized(&self) -> Quaternion {
        let n2 = self.norm2();
        if n2 < 1e-18 {
            return Quaternion::IDENTITY;
        }
        let inv = 1.0 / n2.sqrt();
        Quaternion::new(self.w * inv, self.x * inv, self.y * inv, self.z * inv)
    }

    /// Flip onto the `w >= 0` hemisphere.
    #[inline]
    pub fn canonicalized(&self) -> Quaternion {
        if self.w < 0.0 {
            Quaternion::new(-self.w, -self.x, -self.y, -self.z)
        } else {
            *self
        }
    }

    /// Conjugate. For unit quaternions this is the inverse rotation.
    #[inline]
    pub fn conjugate(&self) -> Quaternion {
        Quaternion::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Hamilton product `self * other` (apply `other` first, then `self`).
    #[inline]
    pub fn mul(&self, o: &Quaternion) -> Quaternion {
        Quaternion::new(
            self.w * o.w - self.x * o.x - self.y * o.y - self.z * o.z,
            self.w * o.x + self.x * o.w + self.y * o.z - self.z * o.y,
            self.w * o.y - self.x * o.z + self.y * o.w + self.z * o.x,
            self.w * o.z + self.x * o.y - self.y * o.x + self.z * o.w,
        )
    }

    /// Rotate a vector, computed as `v + 2w(q x v) + 2(q x (q x v))`.
    #[inline]
    pub fn rotate_vector(&self, v: Vector3) -> Vector3 {
        let qv = Vector3::new(self.x, self.y, self.z);
        let uv = qv.cross(&v);
        let uuv = qv.cross(&uv);
        v + uv * (2.0 * self.w) + uuv * 2.0
    }

    /// Four-component dot product.
    #[inline]
    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Angular distance between the two rotations, in radians. Insensitive
    /// to hemisphere.
    #[inline]
    pub fn angular_distance(&self, other: &Quaternion) -> f64 {
        2.0 * self.dot(other).abs().min(1.0).acos()
    }

    /// Approximate rotational equality: angular distance below `epsilon`.
    #[inline]
    pub fn approx_eq(&self, other: &Quaternion, epsilon: f64) -> bool {
        self.angular_distance(other) < epsilon
    }

    /// Spherical linear interpolation from `self` (t = 0) to `other`
    /// (t = 1), always along the shorter arc.
    pub fn slerp(&self, other: &Quaternion, t: f64) -> Quaternion {
        let mut b = *other;
        let mut dot = self.dot(other);
        if dot < 0.0 {
            b = Quaternion::new(-b.w, -b.x, -b.y, -b.z);
            dot = -dot;
        }
        // Nearly parallel rotations: fall back to a normalised lerp.
        if dot > 0.9995 {
            return Quaternion::new(
                self.w + (b.w - self.w) * t,
                self.x + (b.x - self.x) * t,
                self.y + (b.y - self.y) * t,
                self.z + (b.z - self.z) * t,
            )
            .normalized();
        }
        let theta0 = dot.clamp(-1.0, 1.0).acos();
        let theta = theta0 * t;
        let sin0 = theta0.sin();
        let sa = ((1.0 - t) * theta0).sin() / sin0;
        let sb = theta.sin() / sin0;
        Quaternion::new(
            self.w * sa + b.w * sb,
            self.x * sa + b.x * sb,
            self.y * sa + b.y * sb,
            self.z * sa + b.z * sb,
        )
        .normalized()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::IDENTITY
    }
}

impl std::ops::Mul for Quaternion {
    type Output = Quaternion;

    #[inline]
    fn mul(self, rhs: Self) -> Quaternion {
        Quaternion::mul(&self, &rhs)
    }
}
