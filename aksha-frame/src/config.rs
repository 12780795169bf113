//! Link and joint config records.
//!
//! The external form is JSON-shaped. Revolute joint limits are degrees on
//! the wire and radians internally; prismatic joints are millimetres on
//! both sides. The conversion happens here and nowhere else.
//!
//! Round-trip law: parsing a config, building the frame, serialising it
//! back, and re-parsing yields a frame that compares `almost_equals` to the
//! original.

use crate::error::{FrameError, Result};
use crate::frame::{Frame, Limit};
use aksha_spatial::{
    AxisConfig, GeometryConfig, Orientation, OrientationConfig, Pose, Vector3,
};
use serde::{Deserialize, Serialize};

/// Serialised static frame: a fixed link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Frame name.
    pub id: String,
    /// Parent frame name; consumed by whoever assembles the system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Translation relative to the parent, millimetres.
    #[serde(default)]
    pub translation: Vector3,
    /// Orientation relative to the parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<OrientationConfig>,
    /// Attached geometry, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryConfig>,
}

impl LinkConfig {
    /// Build the static frame this record describes.
    pub fn to_frame(&self) -> Result<Frame> {
        let orientation = match &self.orientation {
            Some(cfg) => cfg.to_orientation()?,
            None => Orientation::IDENTITY,
        };
        let pose = Pose::new(self.translation, orientation);
        match &self.geometry {
            Some(cfg) => Ok(Frame::new_static_with_geometry(
                self.id.clone(),
                pose,
                cfg.to_geometry()?,
            )),
            None => Ok(Frame::new_static(self.id.clone(), pose)),
        }
    }
}

/// Kind of a single-DoF joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointType {
    /// Rotation about an axis; wire units are degrees.
    Revolute,
    /// Translation along an axis; wire units are millimetres.
    Prismatic,
}

/// Serialised single-DoF frame: a joint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointConfig {
    /// Frame name.
    pub id: String,
    /// Parent frame name; consumed by whoever assembles the system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Joint kind.
    #[serde(rename = "type")]
    pub joint_type: JointType,
    /// Motion axis (normalised on frame construction).
    pub axis: AxisConfig,
    /// Upper limit: degrees for revolute, millimetres for prismatic.
    pub max: f64,
    /// Lower limit: degrees for revolute, millimetres for prismatic.
    pub min: f64,
    /// Attached geometry; only prismatic joints may carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryConfig>,
}

impl JointConfig {
    /// Build the rotational or translational frame this record describes,
    /// converting wire units to internal ones.
    pub fn to_frame(&self) -> Result<Frame> {
        match self.joint_type {
            JointType::Revolute => {
                if self.geometry.is_some() {
                    return Err(FrameError::RotationalFrameGeometry(self.id.clone()));
                }
                Frame::new_rotational(
                    self.id.clone(),
                    self.axis.vector(),
                    Limit::new(self.min.to_radians(), self.max.to_radians()),
                )
            }
            JointType::Prismatic => {
                let geometry = self
                    .geometry
                    .as_ref()
                    .map(GeometryConfig::to_geometry)
                    .transpose()?;
                Frame::new_translational_with_geometry(
                    self.id.clone(),
                    self.axis.vector(),
                    Limit::new(self.min, self.max),
                    geometry,
                )
            }
        }
    }
}

/// A whole-frame config record: either a link or a joint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameConfig {
    /// A joint record (distinguished by its `type`/`axis` fields).
    Joint(JointConfig),
    /// A link record.
    Link(LinkConfig),
}

impl FrameConfig {
    /// Build the frame this record describes.
    pub fn to_frame(&self) -> Result<Frame> {
        match self {
            FrameConfig::Link(cfg) => cfg.to_frame(),
            FrameConfig::Joint(cfg) => cfg.to_frame(),
        }
    }

    /// The parent named by this record, if any.
    pub fn parent(&self) -> Option<&str> {
        match self {
            FrameConfig::Link(cfg) => cfg.parent.as_deref(),
            FrameConfig::Joint(cfg) => cfg.parent.as_deref(),
        }
    }
}

impl Frame {
    /// Serialise this frame to its config record.
    ///
    /// Static frames become links, rotational and translational frames
    /// become joints (degrees on the wire for revolute limits). Mobile-2D
    /// frames and wrappers have no config representation.
    pub fn to_config(&self) -> Result<FrameConfig> {
        match self {
            Frame::Static(_) | Frame::TailGeometryStatic(_) => {
                let pose = self.fixed_pose().expect("static frames have a fixed pose");
                let geometry = self
                    .static_geometry()
                    .map(GeometryConfig::from_geometry)
                    .transpose()
                    .map_err(FrameError::from)?;
                Ok(FrameConfig::Link(LinkConfig {
                    id: self.name().to_owned(),
                    parent: None,
                    translation: pose.translation,
                    orientation: Some(OrientationConfig::from_orientation(&pose.orientation)),
                    geometry,
                }))
            }
            Frame::Translational(_) => {
                let (axis, limit, geometry) = self
                    .translational_parts()
                    .expect("translational frame has parts");
                let geometry = geometry
                    .map(GeometryConfig::from_geometry)
                    .transpose()
                    .map_err(FrameError::from)?;
                Ok(FrameConfig::Joint(JointConfig {
                    id: self.name().to_owned(),
                    parent: None,
                    joint_type: JointType::Prismatic,
                    axis: AxisConfig::from(*axis),
                    max: limit.max,
                    min: limit.min,
                    geometry,
                }))
            }
            Frame::Rotational(_) => {
                let (axis, limit) = self.rotational_parts().expect("rotational frame has parts");
                Ok(FrameConfig::Joint(JointConfig {
                    id: self.name().to_owned(),
                    parent: None,
                    joint_type: JointType::Revolute,
                    axis: AxisConfig::from(*axis),
                    max: limit.max.to_degrees(),
                    min: limit.min.to_degrees(),
                    geometry: None,
                }))
            }
            Frame::Mobile2D(_) | Frame::Named { .. } | Frame::NoGeometry(_) => {
                Err(FrameError::UnserializableFrame(self.name().to_owned()))
            }
        }
    }
}
