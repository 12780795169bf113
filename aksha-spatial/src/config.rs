//! Boundary records for orientations and geometries.
//!
//! The wire format is JSON-shaped. Orientations are tagged
//! `{type, value}` where `type` is one of `ov_degrees`, `ov_radians`,
//! `euler_angles`, `axis_angles`, `quaternion`, `r4aa`; all are accepted on
//! input, and output emits the representation the orientation was
//! constructed with. Geometry dimensions are full extents in millimetres on
//! the wire (half-extents internally).

use crate::error::{Result, SpatialError};
use crate::geometry::{Geometry, GeometryKind};
use crate::orientation::{
    AxisAngle, EulerAngles, Orientation, OrientationVector, OrientationVectorDegrees,
};
use crate::pose::Pose;
use crate::quaternion::Quaternion;
use crate::vector::Vector3;
use serde::{Deserialize, Serialize};

/// A rotation axis on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Axis X component.
    pub x: f64,
    /// Axis Y component.
    pub y: f64,
    /// Axis Z component.
    pub z: f64,
}

impl AxisConfig {
    /// Create an axis record.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// As a vector (not normalised; consumers normalise on construction).
    #[inline]
    pub fn vector(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<Vector3> for AxisConfig {
    fn from(v: Vector3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// Serialised orientation, tagged by representation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OrientationConfig {
    /// Orientation vector with theta in degrees.
    OvDegrees(OrientationVectorDegrees),
    /// Orientation vector with theta in radians.
    OvRadians(OrientationVector),
    /// ZYX-intrinsic Euler angles, radians.
    EulerAngles(EulerAngles),
    /// Axis-angle, radians. Alias of `r4aa` kept for older configs.
    AxisAngles(AxisAngle),
    /// Unit quaternion components.
    Quaternion(Quaternion),
    /// Axis-angle, radians.
    R4aa(AxisAngle),
}

impl OrientationConfig {
    /// Build the config record for an orientation, preserving the
    /// representation it was constructed with. Rotation matrices have no
    /// wire form and are emitted as quaternions.
    pub fn from_orientation(o: &Orientation) -> Self {
        match o {
            Orientation::Quaternion(q) => OrientationConfig::Quaternion(*q),
            Orientation::AxisAngle(aa) => OrientationConfig::R4aa(*aa),
            Orientation::Euler(e) => OrientationConfig::EulerAngles(*e),
            Orientation::Matrix(m) => OrientationConfig::Quaternion(m.quaternion()),
            Orientation::Vector(ov) => OrientationConfig::OvRadians(*ov),
            Orientation::VectorDegrees(ovd) => OrientationConfig::OvDegrees(*ovd),
        }
    }

    /// Parse into an [`Orientation`], validating axes and directions.
    pub fn to_orientation(&self) -> Result<Orientation> {
        match self {
            OrientationConfig::OvDegrees(ovd) => {
                // Validate the direction by going through the radians form.
                ovd.to_radians()?;
                Ok(Orientation::VectorDegrees(*ovd))
            }
            OrientationConfig::OvRadians(ov) => {
                let ov = OrientationVector::new(ov.theta, ov.direction())?;
                Ok(Orientation::Vector(ov))
            }
            OrientationConfig::EulerAngles(e) => Ok(Orientation::Euler(*e)),
            OrientationConfig::AxisAngles(aa) | OrientationConfig::R4aa(aa) => {
                let aa = AxisAngle::new(aa.theta, aa.axis())?;
                Ok(Orientation::AxisAngle(aa))
            }
            OrientationConfig::Quaternion(q) => {
                Ok(Orientation::Quaternion(q.normalized().canonicalized()))
            }
        }
    }
}

/// Shape tag of a serialised geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryTypeConfig {
    /// Rectangular box.
    Box,
    /// Sphere.
    Sphere,
    /// Capsule.
    Capsule,
    /// Single point.
    Point,
}

/// Serialised geometry. Box dimensions (`x`, `y`, `z`) are full extents.
///
/// Mesh and point-cloud geometries are runtime-only and have no config
/// form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Shape tag.
    #[serde(rename = "type")]
    pub kind: GeometryTypeConfig,
    /// Box full extent along X, millimetres.
    #[serde(default)]
    pub x: f64,
    /// Box full extent along Y, millimetres.
    #[serde(default)]
    pub y: f64,
    /// Box full extent along Z, millimetres.
    #[serde(default)]
    pub z: f64,
    /// Sphere or capsule radius, millimetres.
    #[serde(default)]
    pub r: f64,
    /// Capsule end-to-end length, millimetres.
    #[serde(default)]
    pub l: f64,
    /// Placement translation relative to the owning frame.
    #[serde(default)]
    pub translation_offset: Vector3,
    /// Placement orientation relative to the owning frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation_offset: Option<OrientationConfig>,
    /// Geometry label; empty means "inherit the owning frame's name".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

impl GeometryConfig {
    /// Build the config record for a geometry.
    pub fn from_geometry(g: &Geometry) -> Result<Self> {
        let mut cfg = GeometryConfig {
            kind: GeometryTypeConfig::Point,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            r: 0.0,
            l: 0.0,
            translation_offset: g.pose.translation,
            orientation_offset: Some(OrientationConfig::from_orientation(&g.pose.orientation)),
            label: g.label.clone(),
        };
        match &g.kind {
            GeometryKind::Box { half_extents } => {
                cfg.kind = GeometryTypeConfig::Box;
                cfg.x = half_extents.x * 2.0;
                cfg.y = half_extents.y * 2.0;
                cfg.z = half_extents.z * 2.0;
            }
            GeometryKind::Sphere { radius } => {
                cfg.kind = GeometryTypeConfig::Sphere;
                cfg.r = *radius;
            }
            GeometryKind::Capsule { radius, length } => {
                cfg.kind = GeometryTypeConfig::Capsule;
                cfg.r = *radius;
                cfg.l = *length;
            }
            GeometryKind::Point => {}
            GeometryKind::Mesh { .. } | GeometryKind::PointCloud { .. } => {
                return Err(SpatialError::GeometryConfigUnsupported(g.kind_name()));
            }
        }
        Ok(cfg)
    }

    /// Parse into a [`Geometry`], validating dimensions.
    pub fn to_geometry(&self) -> Result<Geometry> {
        let orientation = match &self.orientation_offset {
            Some(cfg) => cfg.to_orientation()?,
            None => Orientation::IDENTITY,
        };
        let pose = Pose::new(self.translation_offset, orientation);
        match self.kind {
            GeometryTypeConfig::Box => Geometry::new_box(
                pose,
                Vector3::new(self.x / 2.0, self.y / 2.0, self.z / 2.0),
                self.label.clone(),
            ),
            GeometryTypeConfig::Sphere => Geometry::new_sphere(pose, self.r, self.label.clone()),
            GeometryTypeConfig::Capsule => {
                Geometry::new_capsule(pose, self.r, self.l, self.label.clone())
            }
            GeometryTypeConfig::Point => Ok(Geometry::new_point(pose, self.label.clone())),
        }
    }
}
