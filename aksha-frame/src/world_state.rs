//! Per-query snapshots of the world outside the robot.
//!
//! A [`WorldState`] bundles obstacle geometries (each tagged with the frame
//! they live in) with optional ad-hoc transforms: extra named static frames
//! that augment a system for the duration of a single query without
//! mutating it. World states are immutable once constructed; callers build
//! a fresh one per query.

use crate::error::{FrameError, Result};
use crate::frame::{Frame, GeometriesInFrame};
use crate::inputs::FrameSystemInputs;
use crate::system::FrameSystem;
use aksha_spatial::{collides, Geometry, GeometryKind, Pose};
use std::collections::HashSet;

/// An ad-hoc frame supplied at query time: `name` at `pose` relative to
/// `parent`.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameTransform {
    name: String,
    parent: String,
    pose: Pose,
}

impl FrameTransform {
    /// Create an ad-hoc transform.
    pub fn new(name: impl Into<String>, parent: impl Into<String>, pose: Pose) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            pose,
        }
    }

    /// The frame name this transform introduces.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent frame the pose is relative to.
    #[inline]
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// The pose relative to the parent.
    #[inline]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }
}

/// Immutable snapshot of external geometries and ad-hoc transforms.
#[derive(Clone, Debug, Default)]
pub struct WorldState {
    obstacles: Vec<GeometriesInFrame>,
    transforms: Vec<FrameTransform>,
}

impl WorldState {
    /// Build a world state. Duplicate transform names are rejected, as is
    /// an obstacle point cloud that carries no points (there is nothing to
    /// collide against).
    pub fn new(obstacles: Vec<GeometriesInFrame>, transforms: Vec<FrameTransform>) -> Result<Self> {
        let mut seen = HashSet::new();
        for t in &transforms {
            if !seen.insert(t.name.as_str()) {
                return Err(FrameError::DuplicateFrame(t.name.clone()));
            }
        }
        for gif in &obstacles {
            for g in gif.geometries() {
                if let GeometryKind::PointCloud { points } = &g.kind {
                    if points.is_empty() {
                        return Err(FrameError::MissingIntrinsics(g.label().to_owned()));
                    }
                }
            }
        }
        Ok(Self {
            obstacles,
            transforms,
        })
    }

    /// The obstacle sets, as supplied.
    #[inline]
    pub fn obstacles(&self) -> &[GeometriesInFrame] {
        &self.obstacles
    }

    /// The ad-hoc transforms, as supplied.
    #[inline]
    pub fn transforms(&self) -> &[FrameTransform] {
        &self.transforms
    }

    /// Every obstacle re-expressed in `target`'s coordinate system.
    ///
    /// The ad-hoc transforms are visible while resolving (obstacles may
    /// live in them), but `system` itself is left untouched. Limit
    /// violations along the resolution paths are combined and returned
    /// beside the result.
    pub fn obstacles_in_frame(
        &self,
        system: &FrameSystem,
        inputs: &FrameSystemInputs,
        target: &str,
    ) -> Result<(Vec<GeometriesInFrame>, Option<FrameError>)> {
        // Augment a scratch copy so the ad-hoc frames resolve like any
        // other; the caller's system is never mutated.
        let mut scratch = system.clone();
        for t in &self.transforms {
            scratch.add_frame(Frame::new_static(t.name.clone(), t.pose), &t.parent)?;
        }

        let mut resolved = Vec::with_capacity(self.obstacles.len());
        let mut oob = None;
        for gif in &self.obstacles {
            let (pose, hop_oob) = scratch.transform(inputs, gif.frame_name(), target)?;
            oob = FrameError::merge(oob, hop_oob);
            resolved.push(gif.transform_to(&pose, target));
        }
        Ok((resolved, oob))
    }
}

/// All-pairs collision sweep over a resolved geometry set, returning the
/// label pairs that intersect. Unsupported geometry pairs are fatal.
pub fn check_collisions(geometries: &[Geometry]) -> Result<Vec<(String, String)>> {
    let mut hits = Vec::new();
    for (i, a) in geometries.iter().enumerate() {
        for b in &geometries[i + 1..] {
            if collides(a, b)? {
                hits.push((a.label().to_owned(), b.label().to_owned()));
            }
        }
    }
    Ok(hits)
}
