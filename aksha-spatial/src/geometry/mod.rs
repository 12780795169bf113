//! Geometric primitives that populate reference frames.
//!
//! A [`Geometry`] is a labelled shape at an internal pose (its placement
//! relative to whatever frame owns it). Geometries are value-semantic:
//! [`Geometry::transform`] returns a new geometry and never mutates.
//!
//! Supported shapes: box, sphere, capsule, point, triangle mesh, and
//! point-cloud reference. Pairwise collision predicates live in
//! [`collision`].

pub mod collision;

pub use collision::collides;

use crate::error::{Result, SpatialError};
use crate::pose::Pose;
use crate::vector::Vector3;
use serde::{Deserialize, Serialize};

/// A triangle, vertices in the owning geometry's local coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// First vertex.
    pub a: Vector3,
    /// Second vertex.
    pub b: Vector3,
    /// Third vertex.
    pub c: Vector3,
}

impl Triangle {
    /// Create a triangle.
    #[inline]
    pub const fn new(a: Vector3, b: Vector3, c: Vector3) -> Self {
        Self { a, b, c }
    }

    /// Non-unit normal (`(b-a) x (c-a)`).
    #[inline]
    pub fn normal(&self) -> Vector3 {
        (self.b - self.a).cross(&(self.c - self.a))
    }
}

/// The shape of a geometry. Closed set; collision support is pairwise per
/// variant (see [`collision::collides`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GeometryKind {
    /// Rectangular box described by its half-extents along local X/Y/Z.
    Box {
        /// Half-extents, millimetres.
        half_extents: Vector3,
    },
    /// Sphere centred at the geometry pose.
    Sphere {
        /// Radius, millimetres.
        radius: f64,
    },
    /// Capsule aligned with the local Z axis, centred at the geometry pose.
    /// `length` is the full end-to-end length including both caps.
    Capsule {
        /// Cap radius, millimetres.
        radius: f64,
        /// End-to-end length, millimetres.
        length: f64,
    },
    /// A single point.
    Point,
    /// Triangle mesh in local coordinates.
    Mesh {
        /// Triangles of the mesh.
        triangles: Vec<Triangle>,
    },
    /// Reference to a captured point cloud. Carried through transforms for
    /// bookkeeping; not collidable.
    PointCloud {
        /// Points in local coordinates.
        points: Vec<Vector3>,
    },
}

impl GeometryKind {
    /// Human-readable kind name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Box { .. } => "box",
            GeometryKind::Sphere { .. } => "sphere",
            GeometryKind::Capsule { .. } => "capsule",
            GeometryKind::Point => "point",
            GeometryKind::Mesh { .. } => "mesh",
            GeometryKind::PointCloud { .. } => "point cloud",
        }
    }
}

/// A labelled shape at a pose.
///
/// The label defaults to the owning frame's name when left empty; the frame
/// layer fills it in at query time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// The shape.
    pub kind: GeometryKind,
    /// Placement relative to the owning frame.
    pub pose: Pose,
    /// Label identifying this geometry in collision reports.
    pub label: String,
}

impl Geometry {
    /// Box from half-extents. All half-extents must be positive.
    pub fn new_box(pose: Pose, half_extents: Vector3, label: impl Into<String>) -> Result<Self> {
        if half_extents.x <= 0.0 || half_extents.y <= 0.0 || half_extents.z <= 0.0 {
            return Err(SpatialError::InvalidDimensions(format!(
                "box half-extents must be positive, got ({}, {}, {})",
                half_extents.x, half_extents.y, half_extents.z
            )));
        }
        Ok(Self {
            kind: GeometryKind::Box { half_extents },
            pose,
            label: label.into(),
        })
    }

    /// Sphere of the given radius.
    pub fn new_sphere(pose: Pose, radius: f64, label: impl Into<String>) -> Result<Self> {
        if radius <= 0.0 {
            return Err(SpatialError::InvalidDimensions(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        Ok(Self {
            kind: GeometryKind::Sphere { radius },
            pose,
            label: label.into(),
        })
    }

    /// Capsule along local Z. `length` is end-to-end and must be at least
    /// `2 * radius` (a shorter capsule is a sphere).
    pub fn new_capsule(
        pose: Pose,
        radius: f64,
        length: f64,
        label: impl Into<String>,
    ) -> Result<Self> {
        if radius <= 0.0 {
            return Err(SpatialError::InvalidDimensions(format!(
                "capsule radius must be positive, got {radius}"
            )));
        }
        if length < 2.0 * radius {
            return Err(SpatialError::InvalidDimensions(format!(
                "capsule length {length} must be at least twice the radius {radius}"
            )));
        }
        Ok(Self {
            kind: GeometryKind::Capsule { radius, length },
            pose,
            label: label.into(),
        })
    }

    /// A single point.
    pub fn new_point(pose: Pose, label: impl Into<String>) -> Self {
        Self {
            kind: GeometryKind::Point,
            pose,
            label: label.into(),
        }
    }

    /// Triangle mesh. Must contain at least one triangle.
    pub fn new_mesh(pose: Pose, triangles: Vec<Triangle>, label: impl Into<String>) -> Result<Self> {
        if triangles.is_empty() {
            return Err(SpatialError::InvalidDimensions(
                "mesh must contain at least one triangle".to_owned(),
            ));
        }
        Ok(Self {
            kind: GeometryKind::Mesh { triangles },
            pose,
            label: label.into(),
        })
    }

    /// Point-cloud reference.
    pub fn new_point_cloud(pose: Pose, points: Vec<Vector3>, label: impl Into<String>) -> Self {
        Self {
            kind: GeometryKind::PointCloud { points },
            pose,
            label: label.into(),
        }
    }

    /// The geometry's label.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace the label.
    #[inline]
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Return a copy placed at `pose` composed with the internal pose. The
    /// label is preserved.
    pub fn transform(&self, pose: &Pose) -> Geometry {
        Geometry {
            kind: self.kind.clone(),
            pose: pose.compose(&self.pose),
            label: self.label.clone(),
        }
    }

    /// Shape name, for error messages.
    #[inline]
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::{AxisAngle, Orientation};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_constructors_validate_dimensions() {
        assert!(Geometry::new_box(Pose::IDENTITY, Vector3::new(1.0, -1.0, 1.0), "").is_err());
        assert!(Geometry::new_sphere(Pose::IDENTITY, 0.0, "").is_err());
        assert!(Geometry::new_capsule(Pose::IDENTITY, 2.0, 3.0, "").is_err());
        assert!(Geometry::new_capsule(Pose::IDENTITY, 2.0, 4.0, "").is_ok());
        assert!(Geometry::new_mesh(Pose::IDENTITY, vec![], "").is_err());
    }

    #[test]
    fn test_transform_is_value_semantic() {
        let g = Geometry::new_sphere(
            Pose::from_translation(Vector3::new(1.0, 0.0, 0.0)),
            2.0,
            "ball",
        )
        .unwrap();
        let rot = Pose::from_orientation(Orientation::AxisAngle(
            AxisAngle::new(FRAC_PI_2, Vector3::Z).unwrap(),
        ));
        let moved = g.transform(&rot);
        // Original untouched, label carried over, pose composed.
        assert!(g
            .pose
            .translation
            .approx_eq(&Vector3::new(1.0, 0.0, 0.0), 1e-12));
        assert_eq!(moved.label(), "ball");
        assert!(moved
            .pose
            .translation
            .approx_eq(&Vector3::new(0.0, 1.0, 0.0), 1e-12));
    }

    #[test]
    fn test_kind_names() {
        let p = Geometry::new_point(Pose::IDENTITY, "p");
        assert_eq!(p.kind_name(), "point");
        let pc = Geometry::new_point_cloud(Pose::IDENTITY, vec![Vector3::ZERO], "pc");
        assert_eq!(pc.kind_name(), "point cloud");
    }
}
