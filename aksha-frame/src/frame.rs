//! Reference frames.
//!
//! A [`Frame`] is a named coordinate system with zero or more degrees of
//! freedom. Feeding it an input vector produces the pose that carries the
//! frame's coordinates into its parent's. The set of variants is closed:
//! clients that need to re-tag a subtree wrap frames ([`Frame::named`],
//! [`Frame::without_geometry`]) rather than extend the hierarchy.
//!
//! Out-of-range inputs are tolerated: [`Frame::transform`] still computes
//! the pose and returns the violation alongside it, so planners can probe
//! beyond the limits without special-casing.

use crate::error::{FrameError, Result};
use aksha_spatial::{AxisAngle, Geometry, Orientation, Pose, SpatialError, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A scalar degree-of-freedom value: radians for revolute frames,
/// millimetres for translational ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Input(pub f64);

impl Input {
    /// The raw value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Input {
    fn from(v: f64) -> Self {
        Input(v)
    }
}

/// Wrap raw values as inputs.
pub fn floats_to_inputs(values: &[f64]) -> Vec<Input> {
    values.iter().map(|&v| Input(v)).collect()
}

/// Unwrap inputs to raw values.
pub fn inputs_to_floats(inputs: &[Input]) -> Vec<f64> {
    inputs.iter().map(|i| i.0).collect()
}

/// Motion limits of one degree of freedom. Either bound may be infinite.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Limit {
    /// Create a limit.
    #[inline]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A limit that allows any value.
    pub const UNBOUNDED: Limit = Limit {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };
}

/// Compare two limit lists component-wise under an epsilon.
pub fn limits_almost_equal(a: &[Limit], b: &[Limit], epsilon: f64) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            float_almost_equal(x.min, y.min, epsilon) && float_almost_equal(x.max, y.max, epsilon)
        })
}

#[inline]
fn float_almost_equal(a: f64, b: f64, epsilon: f64) -> bool {
    a == b || (a - b).abs() < epsilon
}

/// Stand-in bound used when sampling a degree of freedom whose limit is
/// infinite.
pub const DEFAULT_INFINITE_BOUND: f64 = 999.0;

/// Default epsilon for frame equality comparisons.
pub const FRAME_EPSILON: f64 = 1e-5;

/// Geometries expressed in the coordinate system of a named frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometriesInFrame {
    frame_name: String,
    geometries: Vec<Geometry>,
}

impl GeometriesInFrame {
    /// Create a new set of geometries tagged with the frame they live in.
    pub fn new(frame_name: impl Into<String>, geometries: Vec<Geometry>) -> Self {
        Self {
            frame_name: frame_name.into(),
            geometries,
        }
    }

    /// Name of the frame the geometries are expressed in.
    #[inline]
    pub fn frame_name(&self) -> &str {
        &self.frame_name
    }

    /// The geometries.
    #[inline]
    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    /// Consume into the geometry list.
    pub fn into_geometries(self) -> Vec<Geometry> {
        self.geometries
    }

    /// Re-express every geometry by `pose` and tag the result with a new
    /// frame name.
    pub fn transform_to(&self, pose: &Pose, frame_name: impl Into<String>) -> GeometriesInFrame {
        GeometriesInFrame {
            frame_name: frame_name.into(),
            geometries: self.geometries.iter().map(|g| g.transform(pose)).collect(),
        }
    }
}

/// Fixed frame: zero DoF, constant pose, optional geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticFrame {
    name: String,
    pose: Pose,
    geometry: Option<Geometry>,
}

/// One-DoF frame translating along a unit axis.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslationalFrame {
    name: String,
    axis: Vector3,
    limits: [Limit; 1],
    geometry: Option<Geometry>,
}

/// One-DoF frame rotating about a unit axis. Carries no geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct RotationalFrame {
    name: String,
    axis: Vector3,
    limits: [Limit; 1],
}

/// Two-DoF frame translating in the z = 0 plane.
#[derive(Clone, Debug, PartialEq)]
pub struct Mobile2DFrame {
    name: String,
    limits: [Limit; 2],
    geometry: Option<Geometry>,
}

/// A named coordinate system with zero or more degrees of freedom.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// Fixed pose, geometry (if any) at the frame origin.
    Static(StaticFrame),
    /// Fixed pose, geometry placed at the frame's endpoint (the pose
    /// already applied).
    TailGeometryStatic(StaticFrame),
    /// Translation along a unit axis.
    Translational(TranslationalFrame),
    /// Rotation about a unit axis.
    Rotational(RotationalFrame),
    /// Planar translation at z = 0.
    Mobile2D(Mobile2DFrame),
    /// Renames the inner frame; everything else delegates.
    Named {
        /// The wrapped frame.
        inner: Box<Frame>,
        /// The overriding name.
        name: String,
    },
    /// Delegates the transform but reports no geometry.
    NoGeometry(Box<Frame>),
}

impl Frame {
    // ── constructors ────────────────────────────────────────────────────

    /// Fixed frame at `pose` relative to its parent.
    pub fn new_static(name: impl Into<String>, pose: Pose) -> Frame {
        Frame::Static(StaticFrame {
            name: name.into(),
            pose,
            geometry: None,
        })
    }

    /// Fixed frame with no translation or rotation.
    pub fn new_zero_static(name: impl Into<String>) -> Frame {
        Frame::new_static(name, Pose::IDENTITY)
    }

    /// Fixed frame with an attached geometry at its origin.
    pub fn new_static_with_geometry(
        name: impl Into<String>,
        pose: Pose,
        geometry: Geometry,
    ) -> Frame {
        Frame::Static(StaticFrame {
            name: name.into(),
            pose,
            geometry: Some(geometry),
        })
    }

    /// Fixed frame whose geometry sits at the frame's endpoint rather than
    /// its origin. Used for links whose volume hangs off the far end.
    pub fn new_tail_geometry_static(
        name: impl Into<String>,
        pose: Pose,
        geometry: Geometry,
    ) -> Frame {
        Frame::TailGeometryStatic(StaticFrame {
            name: name.into(),
            pose,
            geometry: Some(geometry),
        })
    }

    /// Fixed frame inheriting the name and geometry of an existing frame.
    pub fn static_from_frame(frame: &Frame, pose: Pose) -> Frame {
        let geometry = match frame {
            Frame::Static(sf) | Frame::TailGeometryStatic(sf) => sf.geometry.clone(),
            Frame::Translational(tf) => tf.geometry.clone(),
            Frame::Mobile2D(mf) => mf.geometry.clone(),
            _ => None,
        };
        Frame::Static(StaticFrame {
            name: frame.name().to_owned(),
            pose,
            geometry,
        })
    }

    /// Fixed frame at a point, identity rotation.
    pub fn from_point(name: impl Into<String>, point: Vector3) -> Frame {
        Frame::new_static(name, Pose::from_translation(point))
    }

    /// Translational frame along `axis` (normalised; zero axis rejected).
    pub fn new_translational(
        name: impl Into<String>,
        axis: Vector3,
        limit: Limit,
    ) -> Result<Frame> {
        Frame::new_translational_with_geometry(name, axis, limit, None)
    }

    /// Translational frame with an optional attached geometry.
    pub fn new_translational_with_geometry(
        name: impl Into<String>,
        axis: Vector3,
        limit: Limit,
        geometry: Option<Geometry>,
    ) -> Result<Frame> {
        if axis.norm2() < 1e-16 {
            return Err(SpatialError::ZeroAxis.into());
        }
        Ok(Frame::Translational(TranslationalFrame {
            name: name.into(),
            axis: axis.normalized(),
            limits: [limit],
            geometry,
        }))
    }

    /// Rotational frame about `axis` (normalised; zero axis rejected).
    pub fn new_rotational(name: impl Into<String>, axis: Vector3, limit: Limit) -> Result<Frame> {
        if axis.norm2() < 1e-16 {
            return Err(SpatialError::ZeroAxis.into());
        }
        Ok(Frame::Rotational(RotationalFrame {
            name: name.into(),
            axis: axis.normalized(),
            limits: [limit],
        }))
    }

    /// Mobile planar frame. Exactly two limits (x, y) are required.
    pub fn new_mobile_2d(
        name: impl Into<String>,
        limits: &[Limit],
        geometry: Option<Geometry>,
    ) -> Result<Frame> {
        if limits.len() != 2 {
            return Err(FrameError::IncorrectInputLength {
                got: limits.len(),
                want: 2,
            });
        }
        Ok(Frame::Mobile2D(Mobile2DFrame {
            name: name.into(),
            limits: [limits[0], limits[1]],
            geometry,
        }))
    }

    /// Wrap a frame under a new name; all other behaviour passes through.
    pub fn named(frame: Frame, name: impl Into<String>) -> Frame {
        Frame::Named {
            inner: Box::new(frame),
            name: name.into(),
        }
    }

    /// Wrap a frame so it reports no geometry.
    pub fn without_geometry(frame: Frame) -> Frame {
        Frame::NoGeometry(Box::new(frame))
    }

    // ── shared operations ───────────────────────────────────────────────

    /// The frame's name.
    pub fn name(&self) -> &str {
        match self {
            Frame::Static(sf) | Frame::TailGeometryStatic(sf) => &sf.name,
            Frame::Translational(tf) => &tf.name,
            Frame::Rotational(rf) => &rf.name,
            Frame::Mobile2D(mf) => &mf.name,
            Frame::Named { name, .. } => name,
            Frame::NoGeometry(inner) => inner.name(),
        }
    }

    /// Per-DoF limits; the length is the frame's DoF count. Empty for
    /// frames that do not move.
    pub fn dof(&self) -> &[Limit] {
        match self {
            Frame::Static(_) | Frame::TailGeometryStatic(_) => &[],
            Frame::Translational(tf) => &tf.limits,
            Frame::Rotational(rf) => &rf.limits,
            Frame::Mobile2D(mf) => &mf.limits,
            Frame::Named { inner, .. } => inner.dof(),
            Frame::NoGeometry(inner) => inner.dof(),
        }
    }

    /// Pose carrying this frame's coordinates into its parent's, for the
    /// given inputs.
    ///
    /// A wrong-length input vector is fatal. Out-of-range values are not:
    /// the pose is computed without clamping and the violation is returned
    /// next to it.
    pub fn transform(&self, inputs: &[Input]) -> Result<(Pose, Option<FrameError>)> {
        match self {
            Frame::Static(sf) | Frame::TailGeometryStatic(sf) => {
                validate_inputs(&[], inputs)?;
                Ok((sf.pose, None))
            }
            Frame::Translational(tf) => {
                let oob = validate_inputs(&tf.limits, inputs)?;
                let pose = Pose::from_translation(tf.axis * inputs[0].0);
                Ok((pose, oob))
            }
            Frame::Rotational(rf) => {
                let oob = validate_inputs(&rf.limits, inputs)?;
                let aa = AxisAngle {
                    theta: inputs[0].0,
                    x: rf.axis.x,
                    y: rf.axis.y,
                    z: rf.axis.z,
                };
                Ok((Pose::from_orientation(Orientation::AxisAngle(aa)), oob))
            }
            Frame::Mobile2D(mf) => {
                let oob = validate_inputs(&mf.limits, inputs)?;
                let pose = Pose::from_translation(Vector3::new(inputs[0].0, inputs[1].0, 0.0));
                Ok((pose, oob))
            }
            Frame::Named { inner, .. } => inner.transform(inputs),
            Frame::NoGeometry(inner) => inner.transform(inputs),
        }
    }

    /// The frame's geometries placed for the given inputs. Like
    /// [`Frame::transform`], placement is expressed in the parent's
    /// coordinates: a plain static frame keeps its geometry at the near end
    /// of the link, the tail variant moves it to the endpoint, and moving
    /// frames carry it with the current input. Empty when the frame has no
    /// geometry. Unlabelled geometries inherit the frame's name.
    pub fn geometries(&self, inputs: &[Input]) -> Result<(GeometriesInFrame, Option<FrameError>)> {
        match self {
            Frame::Static(sf) => {
                validate_inputs(&[], inputs)?;
                Ok((
                    placed_geometries(&sf.name, sf.geometry.as_ref(), &Pose::IDENTITY),
                    None,
                ))
            }
            Frame::TailGeometryStatic(sf) => {
                validate_inputs(&[], inputs)?;
                Ok((
                    placed_geometries(&sf.name, sf.geometry.as_ref(), &sf.pose),
                    None,
                ))
            }
            Frame::Translational(tf) => {
                let (pose, oob) = self.transform(inputs)?;
                Ok((placed_geometries(&tf.name, tf.geometry.as_ref(), &pose), oob))
            }
            // Rotational frames never carry geometry.
            Frame::Rotational(rf) => {
                let (_, oob) = self.transform(inputs)?;
                Ok((GeometriesInFrame::new(rf.name.clone(), vec![]), oob))
            }
            Frame::Mobile2D(mf) => {
                let (pose, oob) = self.transform(inputs)?;
                Ok((placed_geometries(&mf.name, mf.geometry.as_ref(), &pose), oob))
            }
            Frame::Named { inner, name } => {
                let (gif, oob) = inner.geometries(inputs)?;
                Ok((GeometriesInFrame::new(name.clone(), gif.geometries), oob))
            }
            Frame::NoGeometry(inner) => {
                let (_, oob) = inner.transform(inputs)?;
                Ok((GeometriesInFrame::new(inner.name().to_owned(), vec![]), oob))
            }
        }
    }

    /// Approximate equality: same variant, same name, and all numeric
    /// fields within `epsilon`.
    pub fn approx_eq(&self, other: &Frame, epsilon: f64) -> bool {
        match (self, other) {
            (Frame::Static(a), Frame::Static(b))
            | (Frame::TailGeometryStatic(a), Frame::TailGeometryStatic(b)) => {
                a.name == b.name && a.pose.approx_eq(&b.pose, epsilon)
            }
            (Frame::Translational(a), Frame::Translational(b)) => {
                a.name == b.name
                    && limits_almost_equal(&a.limits, &b.limits, epsilon)
                    && a.axis.approx_eq(&b.axis, epsilon)
            }
            (Frame::Rotational(a), Frame::Rotational(b)) => {
                a.name == b.name
                    && limits_almost_equal(&a.limits, &b.limits, epsilon)
                    && a.axis.approx_eq(&b.axis, epsilon)
            }
            (Frame::Mobile2D(a), Frame::Mobile2D(b)) => {
                a.name == b.name && limits_almost_equal(&a.limits, &b.limits, epsilon)
            }
            (
                Frame::Named { inner: a, name: an },
                Frame::Named { inner: b, name: bn },
            ) => an == bn && a.approx_eq(b, epsilon),
            (Frame::NoGeometry(a), Frame::NoGeometry(b)) => a.approx_eq(b, epsilon),
            _ => false,
        }
    }

    /// [`Frame::approx_eq`] under the default epsilon.
    #[inline]
    pub fn almost_equals(&self, other: &Frame) -> bool {
        self.approx_eq(other, FRAME_EPSILON)
    }

    /// The fixed pose of a static frame; `None` for moving variants.
    pub fn fixed_pose(&self) -> Option<&Pose> {
        match self {
            Frame::Static(sf) | Frame::TailGeometryStatic(sf) => Some(&sf.pose),
            Frame::Named { inner, .. } | Frame::NoGeometry(inner) => inner.fixed_pose(),
            _ => None,
        }
    }

    pub(crate) fn translational_parts(&self) -> Option<(&Vector3, &Limit, Option<&Geometry>)> {
        match self {
            Frame::Translational(tf) => Some((&tf.axis, &tf.limits[0], tf.geometry.as_ref())),
            _ => None,
        }
    }

    pub(crate) fn rotational_parts(&self) -> Option<(&Vector3, &Limit)> {
        match self {
            Frame::Rotational(rf) => Some((&rf.axis, &rf.limits[0])),
            _ => None,
        }
    }

    pub(crate) fn static_geometry(&self) -> Option<&Geometry> {
        match self {
            Frame::Static(sf) | Frame::TailGeometryStatic(sf) => sf.geometry.as_ref(),
            _ => None,
        }
    }
}

/// Attach the default label and place a frame's geometry at `pose`.
fn placed_geometries(
    name: &str,
    geometry: Option<&Geometry>,
    pose: &Pose,
) -> GeometriesInFrame {
    let geometries = match geometry {
        Some(g) => {
            let mut placed = g.transform(pose);
            if placed.label().is_empty() {
                placed.set_label(name);
            }
            vec![placed]
        }
        None => vec![],
    };
    GeometriesInFrame::new(name.to_owned(), geometries)
}

/// Check an input vector against limits. Length mismatches are fatal;
/// out-of-range values come back as a tolerated error (all violations
/// combined).
fn validate_inputs(limits: &[Limit], inputs: &[Input]) -> Result<Option<FrameError>> {
    if inputs.len() != limits.len() {
        return Err(FrameError::IncorrectInputLength {
            got: inputs.len(),
            want: limits.len(),
        });
    }
    let mut violations = Vec::new();
    for (i, (input, limit)) in inputs.iter().zip(limits).enumerate() {
        if input.0 < limit.min || input.0 > limit.max {
            violations.push(FrameError::OutOfBounds {
                joint: i,
                value: input.0,
                min: limit.min,
                max: limit.max,
            });
        }
    }
    Ok(FrameError::combined(violations))
}

/// Sample uniform random inputs within a frame's limits. Infinite bounds
/// fall back to [`DEFAULT_INFINITE_BOUND`].
pub fn random_frame_inputs<R: Rng>(frame: &Frame, rng: &mut R) -> Vec<Input> {
    frame
        .dof()
        .iter()
        .map(|limit| {
            let (l, u) = finite_bounds(limit);
            Input(rng.gen::<f64>() * (u - l) + l)
        })
        .collect()
}

/// Sample random inputs restricted to the central `fraction` of each
/// limit's span.
pub fn restricted_random_frame_inputs<R: Rng>(
    frame: &Frame,
    rng: &mut R,
    fraction: f64,
) -> Vec<Input> {
    frame
        .dof()
        .iter()
        .map(|limit| {
            let (l, u) = finite_bounds(limit);
            let span = u - l;
            Input(fraction * span * rng.gen::<f64>() + l + span * (1.0 - fraction) / 2.0)
        })
        .collect()
}

fn finite_bounds(limit: &Limit) -> (f64, f64) {
    let l = if limit.min == f64::NEG_INFINITY {
        -DEFAULT_INFINITE_BOUND
    } else {
        limit.min
    };
    let u = if limit.max == f64::INFINITY {
        DEFAULT_INFINITE_BOUND
    } else {
        limit.max
    };
    (l, u)
}
