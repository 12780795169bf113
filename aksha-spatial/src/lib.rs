//! # Aksha-Spatial: Rigid-Body Algebra and Collision Geometry
//!
//! The mathematical substrate of the Aksha kinematics stack: poses,
//! interchangeable orientation representations, and the geometric
//! primitives that populate reference frames.
//!
//! ## Conventions
//!
//! - Translations in millimetres, angles in radians
//! - Right-handed coordinate frames
//! - Unit quaternion (Hamilton, `w >= 0` hemisphere) as the canonical
//!   orientation; axis-angle, ZYX-intrinsic Euler angles, rotation matrix,
//!   and orientation vector all convert through it
//! - Poses and geometries are value types; transforming returns a copy
//!
//! ## Quick Start
//!
//! ```rust
//! use aksha_spatial::{AxisAngle, Orientation, Pose, Vector3};
//! use std::f64::consts::FRAC_PI_2;
//!
//! // A quarter turn about Z, then a step along the rotated X axis.
//! let turn = Pose::from_orientation(Orientation::AxisAngle(
//!     AxisAngle::new(FRAC_PI_2, Vector3::Z).unwrap(),
//! ));
//! let step = Pose::from_translation(Vector3::X);
//! let combined = turn.compose(&step);
//! assert!(combined.translation.approx_eq(&Vector3::Y, 1e-12));
//! ```
//!
//! ## Modules
//!
//! - [`vector`]: 3D vectors and points
//! - [`quaternion`]: unit quaternion rotations
//! - [`orientation`]: interchangeable orientation representations
//! - [`pose`]: rigid-body transforms under composition
//! - [`geometry`]: labelled shape primitives and pairwise collision
//! - [`config`]: JSON-shaped boundary records for orientations/geometries

pub mod config;
pub mod error;
pub mod geometry;
pub mod orientation;
pub mod pose;
pub mod quaternion;
pub mod vector;

pub use config::{AxisConfig, GeometryConfig, GeometryTypeConfig, OrientationConfig};
pub use error::{Result, SpatialError};
pub use geometry::{collides, Geometry, GeometryKind, Triangle};
pub use orientation::{
    AxisAngle, EulerAngles, Orientation, OrientationVector, OrientationVectorDegrees,
    RotationMatrix,
};
pub use pose::{Pose, ORIENTATION_EPSILON, TRANSLATION_EPSILON};
pub use quaternion::Quaternion;
pub use vector::Vector3;
