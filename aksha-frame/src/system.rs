//! The frame system: a rooted tree of named frames.
//!
//! Every system has a single built-in root named [`WORLD`]. Frames are
//! owned by the system, names are unique, and every non-root frame has
//! exactly one parent that must already exist at insertion time. Queries
//! ([`FrameSystem::transform`], [`FrameSystem::geometries`]) take `&self`
//! and are pure; mutation requires `&mut self` and the system provides no
//! internal locking.

use crate::error::{FrameError, Result};
use crate::frame::{Frame, GeometriesInFrame, Input};
use crate::inputs::FrameSystemInputs;
use aksha_spatial::Pose;
use std::collections::HashMap;

/// Name of the root frame of every system.
pub const WORLD: &str = "world";

/// A rooted tree of frames keyed by name.
#[derive(Clone, Debug)]
pub struct FrameSystem {
    frames: HashMap<String, Frame>,
    parents: HashMap<String, String>,
}

impl FrameSystem {
    /// An empty system containing only the world frame.
    pub fn new() -> Self {
        let mut frames = HashMap::new();
        frames.insert(WORLD.to_owned(), Frame::new_zero_static(WORLD));
        Self {
            frames,
            parents: HashMap::new(),
        }
    }

    /// Is a frame of this name present?
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.frames.contains_key(name)
    }

    /// Look up a frame by name.
    #[inline]
    pub fn frame(&self, name: &str) -> Option<&Frame> {
        self.frames.get(name)
    }

    /// Names of all frames except the world root, sorted for determinism.
    pub fn frame_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .frames
            .keys()
            .filter(|n| *n != WORLD)
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// Parent name of a frame; `None` for the world root.
    pub fn parent(&self, name: &str) -> Result<Option<&str>> {
        if !self.contains(name) {
            return Err(FrameError::UnknownFrame(name.to_owned()));
        }
        Ok(self.parents.get(name).map(String::as_str))
    }

    /// Names of a frame's direct children.
    pub fn children(&self, name: &str) -> Vec<&str> {
        let mut kids: Vec<&str> = self
            .parents
            .iter()
            .filter(|(_, p)| p.as_str() == name)
            .map(|(c, _)| c.as_str())
            .collect();
        kids.sort_unstable();
        kids
    }

    /// Insert a frame under `parent`.
    ///
    /// Fails if the name is taken (or is `world`), if the parent is absent,
    /// or if the insertion would close a cycle (re-adding a frame under one
    /// of its own descendants).
    pub fn add_frame(&mut self, frame: Frame, parent: &str) -> Result<()> {
        let name = frame.name().to_owned();
        if name == WORLD {
            return Err(FrameError::WorldImmutable);
        }
        if !self.contains(parent) {
            return Err(FrameError::UnknownFrame(parent.to_owned()));
        }
        if self.contains(&name) {
            // Distinguish a plain duplicate from a would-be cycle: the
            // requested parent already descending from (or being) this
            // frame.
            if parent == name || self.ancestors(parent)?.iter().any(|a| *a == name) {
                return Err(FrameError::CycleDetected(name));
            }
            return Err(FrameError::DuplicateFrame(name));
        }
        log::debug!("adding frame {name} under {parent}");
        self.parents.insert(name.clone(), parent.to_owned());
        self.frames.insert(name, frame);
        Ok(())
    }

    /// Replace a frame of the same name in place, keeping its parent and
    /// children.
    pub fn replace_frame(&mut self, frame: Frame) -> Result<()> {
        let name = frame.name();
        if name == WORLD {
            return Err(FrameError::WorldImmutable);
        }
        if !self.contains(name) {
            return Err(FrameError::UnknownFrame(name.to_owned()));
        }
        self.frames.insert(name.to_owned(), frame);
        Ok(())
    }

    /// Remove a frame and its whole subtree.
    pub fn remove_frame(&mut self, name: &str) -> Result<()> {
        if name == WORLD {
            return Err(FrameError::WorldImmutable);
        }
        if !self.contains(name) {
            return Err(FrameError::UnknownFrame(name.to_owned()));
        }
        let subtree = self.subtree_names(name);
        log::debug!("removing {} frame(s) rooted at {name}", subtree.len());
        for n in subtree {
            self.frames.remove(&n);
            self.parents.remove(&n);
        }
        Ok(())
    }

    /// Path of names from `name` up to the world root, child first.
    pub fn traceback_frame(&self, name: &str) -> Result<Vec<String>> {
        let mut path = vec![name.to_owned()];
        path.extend(self.ancestors(name)?);
        Ok(path)
    }

    /// Pose of `source` expressed in `target`'s coordinate system.
    ///
    /// Walks both frames up to their lowest common ancestor, composing
    /// child-to-ancestor transforms on the source side and the inverse on
    /// the target side. Limit violations anywhere along the path are
    /// combined and returned beside the (still valid) pose.
    pub fn transform(
        &self,
        inputs: &FrameSystemInputs,
        source: &str,
        target: &str,
    ) -> Result<(Pose, Option<FrameError>)> {
        if !self.contains(source) {
            return Err(FrameError::UnknownFrame(source.to_owned()));
        }
        if !self.contains(target) {
            return Err(FrameError::UnknownFrame(target.to_owned()));
        }
        if source == target {
            return Ok((Pose::IDENTITY, None));
        }

        let path_source = self.traceback_frame(source)?;
        let path_target = self.traceback_frame(target)?;
        // Both paths end at world; strip the shared tail above the lowest
        // common ancestor so neither side composes through it.
        let common = path_source
            .iter()
            .rev()
            .zip(path_target.iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        let source_hops = &path_source[..path_source.len() - common];
        let target_hops = &path_target[..path_target.len() - common];

        let mut oob = None;
        let ancestor_from_source = self.compose_hops(inputs, source_hops, &mut oob)?;
        let ancestor_from_target = self.compose_hops(inputs, target_hops, &mut oob)?;
        let pose = ancestor_from_target
            .inverse()
            .compose(&ancestor_from_source);
        Ok((pose, oob))
    }

    /// Every geometry along the path from `frame_name` to the world root,
    /// re-expressed in `frame_name`'s coordinate system.
    ///
    /// A frame places its own geometries in its parent's coordinates (its
    /// transform maps into the parent; the tail-geometry static variant
    /// exists exactly because of this), so each hop composes with the pose
    /// of the hop's parent.
    pub fn geometries(
        &self,
        inputs: &FrameSystemInputs,
        frame_name: &str,
    ) -> Result<(GeometriesInFrame, Option<FrameError>)> {
        let path = self.traceback_frame(frame_name)?;
        let mut collected = Vec::new();
        let mut oob = None;
        for hop in &path {
            // The world root never carries geometry.
            let Some(parent) = self.parents.get(hop) else {
                continue;
            };
            let frame = &self.frames[hop];
            let (gif, hop_oob) = frame.geometries(self.inputs_for(inputs, frame)?)?;
            oob = FrameError::merge(oob, hop_oob);
            if gif.geometries().is_empty() {
                continue;
            }
            let (pose, pose_oob) = self.transform(inputs, parent, frame_name)?;
            oob = FrameError::merge(oob, pose_oob);
            collected.extend(gif.transform_to(&pose, frame_name).into_geometries());
        }
        Ok((GeometriesInFrame::new(frame_name.to_owned(), collected), oob))
    }

    /// Graft every frame of `other` under `attach_to`, transferring
    /// ownership. Frames whose parent was `other`'s world root hang off
    /// `attach_to`. Any name collision fails the whole merge before
    /// anything is moved.
    pub fn merge(&mut self, other: FrameSystem, attach_to: &str) -> Result<()> {
        if !self.contains(attach_to) {
            return Err(FrameError::UnknownFrame(attach_to.to_owned()));
        }
        for name in other.frames.keys() {
            if name != WORLD && self.contains(name) {
                return Err(FrameError::DuplicateFrame(name.clone()));
            }
        }
        log::debug!(
            "merging {} frame(s) under {attach_to}",
            other.frames.len() - 1
        );
        let FrameSystem { frames, parents } = other;
        for (name, frame) in frames {
            if name == WORLD {
                continue;
            }
            let parent = match parents.get(&name) {
                Some(p) if p != WORLD => p.clone(),
                _ => attach_to.to_owned(),
            };
            self.parents.insert(name.clone(), parent);
            self.frames.insert(name, frame);
        }
        Ok(())
    }

    /// Split off the subtree rooted at `root` as a new system, removing it
    /// from this one. In the new system `root` hangs directly off world.
    pub fn divide(&mut self, root: &str) -> Result<FrameSystem> {
        if root == WORLD {
            return Err(FrameError::WorldImmutable);
        }
        if !self.contains(root) {
            return Err(FrameError::UnknownFrame(root.to_owned()));
        }
        let subtree = self.subtree_names(root);
        log::debug!("dividing {} frame(s) rooted at {root}", subtree.len());
        let mut split = FrameSystem::new();
        for name in subtree {
            let frame = self.frames.remove(&name).expect("subtree name present");
            let parent = self.parents.remove(&name).expect("subtree parent present");
            let parent = if name == root { WORLD.to_owned() } else { parent };
            split.parents.insert(name.clone(), parent);
            split.frames.insert(name, frame);
        }
        Ok(split)
    }

    /// The input slice a frame consumes: zero-DoF frames need no entry in
    /// the map, moving frames must have one.
    pub(crate) fn inputs_for<'a>(
        &self,
        inputs: &'a FrameSystemInputs,
        frame: &Frame,
    ) -> Result<&'a [Input]> {
        if frame.dof().is_empty() {
            return Ok(&[]);
        }
        inputs
            .get(frame.name())
            .map(Vec::as_slice)
            .ok_or_else(|| FrameError::MissingFrameInputs(frame.name().to_owned()))
    }

    /// Compose child-to-ancestor transforms for a child-first hop list.
    fn compose_hops(
        &self,
        inputs: &FrameSystemInputs,
        hops: &[String],
        oob: &mut Option<FrameError>,
    ) -> Result<Pose> {
        let mut acc = Pose::IDENTITY;
        for hop in hops.iter().rev() {
            let frame = &self.frames[hop];
            let (pose, hop_oob) = frame.transform(self.inputs_for(inputs, frame)?)?;
            *oob = FrameError::merge(oob.take(), hop_oob);
            acc = acc.compose(&pose);
        }
        Ok(acc)
    }

    /// Names of the subtree rooted at `name` (inclusive).
    fn subtree_names(&self, name: &str) -> Vec<String> {
        let mut stack = vec![name.to_owned()];
        let mut out = Vec::new();
        while let Some(current) = stack.pop() {
            for (child, parent) in &self.parents {
                if parent == &current {
                    stack.push(child.clone());
                }
            }
            out.push(current);
        }
        out
    }

    /// Ancestor names of `name`, nearest first, ending at world.
    fn ancestors(&self, name: &str) -> Result<Vec<String>> {
        if !self.contains(name) {
            return Err(FrameError::UnknownFrame(name.to_owned()));
        }
        let mut out = Vec::new();
        let mut current = name;
        while let Some(parent) = self.parents.get(current) {
            out.push(parent.clone());
            current = parent;
        }
        Ok(out)
    }
}

impl Default for FrameSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Limit;
    use aksha_spatial::Vector3;
    use std::f64::consts::FRAC_PI_2;

    fn translated(name: &str, v: Vector3) -> Frame {
        Frame::new_static(name, Pose::from_translation(v))
    }

    #[test]
    fn test_new_system_has_world() {
        let fs = FrameSystem::new();
        assert!(fs.contains(WORLD));
        assert!(fs.frame_names().is_empty());
        assert_eq!(fs.parent(WORLD).unwrap(), None);
    }

    #[test]
    fn test_add_and_lookup() {
        let mut fs = FrameSystem::new();
        fs.add_frame(translated("a", Vector3::X), WORLD).unwrap();
        fs.add_frame(translated("b", Vector3::Y), "a").unwrap();
        assert_eq!(fs.parent("b").unwrap(), Some("a"));
        assert_eq!(fs.children("a"), vec!["b"]);
        assert_eq!(fs.frame_names(), vec!["a", "b"]);
        assert!(fs.frame("a").is_some());
        assert!(fs.frame("nope").is_none());
    }

    #[test]
    fn test_add_rejects_duplicates_world_and_missing_parent() {
        let mut fs = FrameSystem::new();
        fs.add_frame(translated("a", Vector3::X), WORLD).unwrap();
        assert!(matches!(
            fs.add_frame(translated("a", Vector3::Y), WORLD),
            Err(FrameError::DuplicateFrame(_))
        ));
        assert!(matches!(
            fs.add_frame(translated(WORLD, Vector3::X), "a"),
            Err(FrameError::WorldImmutable)
        ));
        assert!(matches!(
            fs.add_frame(translated("c", Vector3::X), "ghost"),
            Err(FrameError::UnknownFrame(_))
        ));
    }

    #[test]
    fn test_cycle_detection() {
        let mut fs = FrameSystem::new();
        fs.add_frame(translated("a", Vector3::X), WORLD).unwrap();
        fs.add_frame(translated("b", Vector3::Y), "a").unwrap();
        // Re-adding a under its own descendant closes a loop.
        assert!(matches!(
            fs.add_frame(translated("a", Vector3::X), "b"),
            Err(FrameError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_traceback() {
        let mut fs = FrameSystem::new();
        fs.add_frame(translated("a", Vector3::X), WORLD).unwrap();
        fs.add_frame(translated("b", Vector3::Y), "a").unwrap();
        assert_eq!(fs.traceback_frame("b").unwrap(), vec!["b", "a", WORLD]);
        assert_eq!(fs.traceback_frame(WORLD).unwrap(), vec![WORLD]);
        assert!(fs.traceback_frame("ghost").is_err());
    }

    #[test]
    fn test_transform_static_chain() {
        let mut fs = FrameSystem::new();
        fs.add_frame(translated("a", Vector3::new(1.0, 0.0, 0.0)), WORLD)
            .unwrap();
        fs.add_frame(translated("b", Vector3::new(0.0, 2.0, 0.0)), "a")
            .unwrap();
        let inputs = FrameSystemInputs::new();
        let (pose, oob) = fs.transform(&inputs, "b", WORLD).unwrap();
        assert!(oob.is_none());
        assert!(pose
            .translation
            .approx_eq(&Vector3::new(1.0, 2.0, 0.0), 1e-12));
    }

    #[test]
    fn test_transform_same_frame_is_identity() {
        let mut fs = FrameSystem::new();
        fs.add_frame(translated("a", Vector3::X), WORLD).unwrap();
        let (pose, _) = fs.transform(&FrameSystemInputs::new(), "a", "a").unwrap();
        assert!(pose.approx_eq(&Pose::IDENTITY, 1e-12));
    }

    #[test]
    fn test_transform_is_inverse_of_swapped() {
        let mut fs = FrameSystem::new();
        fs.add_frame(translated("a", Vector3::new(3.0, -1.0, 2.0)), WORLD)
            .unwrap();
        fs.add_frame(
            Frame::new_rotational("j", Vector3::Z, Limit::UNBOUNDED).unwrap(),
            "a",
        )
        .unwrap();
        fs.add_frame(translated("b", Vector3::new(0.0, 5.0, 0.0)), "j")
            .unwrap();
        let mut inputs = FrameSystemInputs::new();
        inputs.insert("j".to_owned(), vec![Input(0.7)]);
        let (ab, _) = fs.transform(&inputs, "a", "b").unwrap();
        let (ba, _) = fs.transform(&inputs, "b", "a").unwrap();
        assert!(ab.compose(&ba).approx_eq(&Pose::IDENTITY, 1e-10));
    }

    #[test]
    fn test_transform_composes_across_branches() {
        // world -> a -> b, world -> c; b in c equals (b in a-composed-world) read from c.
        let mut fs = FrameSystem::new();
        fs.add_frame(translated("a", Vector3::new(1.0, 0.0, 0.0)), WORLD)
            .unwrap();
        fs.add_frame(translated("b", Vector3::new(0.0, 1.0, 0.0)), "a")
            .unwrap();
        fs.add_frame(translated("c", Vector3::new(0.0, 0.0, 1.0)), WORLD)
            .unwrap();
        let inputs = FrameSystemInputs::new();
        let (bc, _) = fs.transform(&inputs, "b", "c").unwrap();
        assert!(bc
            .translation
            .approx_eq(&Vector3::new(1.0, 1.0, -1.0), 1e-12));
        // Invariant: transform(a, c) = transform(a, b) ∘ transform(b, c).
        let (ac, _) = fs.transform(&inputs, "a", "c").unwrap();
        let (ab, _) = fs.transform(&inputs, "a", "b").unwrap();
        assert!(bc.compose(&ab).approx_eq(&ac, 1e-12));
    }

    #[test]
    fn test_revolute_joint_scenario() {
        // world -> J (rotational about z) -> T (translate +1 on x):
        // with J at pi/2 the tool sits at (0, 1, 0) in world.
        let mut fs = FrameSystem::new();
        fs.add_frame(
            Frame::new_rotational("J", Vector3::Z, Limit::UNBOUNDED).unwrap(),
            WORLD,
        )
        .unwrap();
        fs.add_frame(translated("T", Vector3::X), "J").unwrap();
        let mut inputs = FrameSystemInputs::new();
        inputs.insert("J".to_owned(), vec![Input(FRAC_PI_2)]);
        let (pose, oob) = fs.transform(&inputs, "T", WORLD).unwrap();
        assert!(oob.is_none());
        assert!(pose
            .translation
            .approx_eq(&Vector3::new(0.0, 1.0, 0.0), 1e-12));
    }

    #[test]
    fn test_missing_inputs_for_moving_frame_is_fatal() {
        let mut fs = FrameSystem::new();
        fs.add_frame(
            Frame::new_rotational("j", Vector3::Z, Limit::UNBOUNDED).unwrap(),
            WORLD,
        )
        .unwrap();
        fs.add_frame(translated("t", Vector3::X), "j").unwrap();
        let err = fs
            .transform(&FrameSystemInputs::new(), "t", WORLD)
            .unwrap_err();
        assert!(matches!(err, FrameError::MissingFrameInputs(_)));
    }

    #[test]
    fn test_oob_propagates_but_pose_is_returned() {
        let mut fs = FrameSystem::new();
        fs.add_frame(
            Frame::new_translational("slide", Vector3::X, Limit::new(0.0, 10.0)).unwrap(),
            WORLD,
        )
        .unwrap();
        let mut inputs = FrameSystemInputs::new();
        inputs.insert("slide".to_owned(), vec![Input(15.0)]);
        let (pose, oob) = fs.transform(&inputs, "slide", WORLD).unwrap();
        assert!(pose
            .translation
            .approx_eq(&Vector3::new(15.0, 0.0, 0.0), 1e-12));
        assert!(oob.unwrap().is_oob());
    }

    #[test]
    fn test_remove_subtree_restores_structure() {
        let mut fs = FrameSystem::new();
        fs.add_frame(translated("keep", Vector3::X), WORLD).unwrap();
        let names_before: Vec<String> =
            fs.frame_names().into_iter().map(String::from).collect();

        fs.add_frame(translated("sub", Vector3::Y), WORLD).unwrap();
        fs.add_frame(translated("leaf", Vector3::Z), "sub").unwrap();
        fs.remove_frame("sub").unwrap();

        let names_after: Vec<String> =
            fs.frame_names().into_iter().map(String::from).collect();
        assert_eq!(names_after, names_before);
        assert!(!fs.contains("leaf"));
        assert!(matches!(
            fs.remove_frame(WORLD),
            Err(FrameError::WorldImmutable)
        ));
    }

    #[test]
    fn test_geometries_collects_along_path() {
        let ball = |label: &str| {
            aksha_spatial::Geometry::new_sphere(Pose::IDENTITY, 1.0, label).unwrap()
        };
        let mut fs = FrameSystem::new();
        fs.add_frame(
            Frame::new_static_with_geometry(
                "base",
                Pose::from_translation(Vector3::new(5.0, 0.0, 0.0)),
                ball("base-hull"),
            ),
            WORLD,
        )
        .unwrap();
        fs.add_frame(
            Frame::new_static_with_geometry(
                "tool",
                Pose::from_translation(Vector3::new(0.0, 2.0, 0.0)),
                ball("tool-hull"),
            ),
            "base",
        )
        .unwrap();
        let inputs = FrameSystemInputs::new();
        let (gif, oob) = fs.geometries(&inputs, "tool").unwrap();
        assert!(oob.is_none());
        assert_eq!(gif.frame_name(), "tool");
        assert_eq!(gif.geometries().len(), 2);
        // base's geometry sits in world coordinates at the world origin;
        // the tool is at (5, 2, 0) in world, so the hull reads (-5, -2, 0).
        let base_geom = gif
            .geometries()
            .iter()
            .find(|g| g.label() == "base-hull")
            .unwrap();
        assert!(base_geom
            .pose
            .translation
            .approx_eq(&Vector3::new(-5.0, -2.0, 0.0), 1e-12));
        // tool's geometry sits at base's origin, (0, -2, 0) from the tool.
        let tool_geom = gif
            .geometries()
            .iter()
            .find(|g| g.label() == "tool-hull")
            .unwrap();
        assert!(tool_geom
            .pose
            .translation
            .approx_eq(&Vector3::new(0.0, -2.0, 0.0), 1e-12));
    }

    #[test]
    fn test_merge_and_divide() {
        let mut fs = FrameSystem::new();
        fs.add_frame(translated("mount", Vector3::X), WORLD).unwrap();

        let mut arm = FrameSystem::new();
        arm.add_frame(translated("shoulder", Vector3::Y), WORLD)
            .unwrap();
        arm.add_frame(translated("elbow", Vector3::Z), "shoulder")
            .unwrap();

        fs.merge(arm, "mount").unwrap();
        assert_eq!(fs.parent("shoulder").unwrap(), Some("mount"));
        assert_eq!(fs.parent("elbow").unwrap(), Some("shoulder"));

        // Name collisions fail before any mutation.
        let mut clash = FrameSystem::new();
        clash.add_frame(translated("mount", Vector3::X), WORLD).unwrap();
        clash.add_frame(translated("extra", Vector3::Y), WORLD).unwrap();
        assert!(matches!(
            fs.merge(clash, WORLD),
            Err(FrameError::DuplicateFrame(_))
        ));
        assert!(!fs.contains("extra"));

        // Divide pulls the subtree back out.
        let split = fs.divide("shoulder").unwrap();
        assert!(!fs.contains("shoulder"));
        assert!(!fs.contains("elbow"));
        assert!(fs.contains("mount"));
        assert_eq!(split.parent("shoulder").unwrap(), Some(WORLD));
        assert_eq!(split.parent("elbow").unwrap(), Some("shoulder"));
    }

    #[test]
    fn test_replace_frame_keeps_children() {
        let mut fs = FrameSystem::new();
        fs.add_frame(translated("a", Vector3::X), WORLD).unwrap();
        fs.add_frame(translated("b", Vector3::Y), "a").unwrap();
        fs.replace_frame(translated("a", Vector3::Z)).unwrap();
        assert_eq!(fs.parent("b").unwrap(), Some("a"));
        let (pose, _) = fs
            .transform(&FrameSystemInputs::new(), "a", WORLD)
            .unwrap();
        assert!(pose.translation.approx_eq(&Vector3::Z, 1e-12));
        assert!(matches!(
            fs.replace_frame(translated("ghost", Vector3::X)),
            Err(FrameError::UnknownFrame(_))
        ));
    }

    #[test]
    fn test_unknown_endpoints_error() {
        let fs = FrameSystem::new();
        assert!(matches!(
            fs.transform(&FrameSystemInputs::new(), "ghost", WORLD),
            Err(FrameError::UnknownFrame(_))
        ));
        assert!(matches!(
            fs.transform(&FrameSystemInputs::new(), WORLD, "ghost"),
            Err(FrameError::UnknownFrame(_))
        ));
    }
}
