//! Solver frames: synthetic frames aggregating every degree of freedom on a
//! path, consumed by motion planners.
//!
//! A planner optimises one flat input vector. The solver frame maps that
//! vector onto the moving frames between a `move_frame` and a `goal_frame`
//! (through their lowest common ancestor) and reports the resulting pose of
//! the one in the other, so the planner never touches the tree directly.

use crate::error::{FrameError, Result};
use crate::frame::{Frame, Input, Limit};
use crate::inputs::FrameSystemInputs;
use crate::system::FrameSystem;
use aksha_spatial::Pose;

/// A virtual frame whose DoF is the union of the DoFs along the path from
/// `move_frame` to `goal_frame`.
#[derive(Clone, Debug)]
pub struct SolverFrame {
    name: String,
    goal_name: String,
    /// Frames from the move side up to (exclusive) the common ancestor,
    /// child first.
    move_chain: Vec<Frame>,
    /// Frames from the goal side up to (exclusive) the common ancestor,
    /// child first.
    goal_chain: Vec<Frame>,
    /// Names of the moving frames, in flat-input order.
    dof_names: Vec<String>,
    limits: Vec<Limit>,
    start: Vec<Input>,
}

impl SolverFrame {
    /// Build a solver frame over the path between `move_frame` and
    /// `goal_frame`. `start` must supply inputs for every moving frame on
    /// the path; it becomes the planner's seed configuration.
    pub fn new(
        system: &FrameSystem,
        move_frame: &str,
        goal_frame: &str,
        start: &FrameSystemInputs,
    ) -> Result<Self> {
        let path_move = system.traceback_frame(move_frame)?;
        let path_goal = system.traceback_frame(goal_frame)?;
        let common = path_move
            .iter()
            .rev()
            .zip(path_goal.iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        let clone_chain = |path: &[String]| -> Vec<Frame> {
            path.iter()
                .map(|n| system.frame(n).expect("path frame present").clone())
                .collect()
        };
        let move_chain = clone_chain(&path_move[..path_move.len() - common]);
        let goal_chain = clone_chain(&path_goal[..path_goal.len() - common]);

        let mut dof_names = Vec::new();
        let mut limits = Vec::new();
        for frame in move_chain.iter().chain(&goal_chain) {
            if !frame.dof().is_empty() {
                dof_names.push(frame.name().to_owned());
                limits.extend_from_slice(frame.dof());
            }
        }

        let mut solver = Self {
            name: move_frame.to_owned(),
            goal_name: goal_frame.to_owned(),
            move_chain,
            goal_chain,
            dof_names,
            limits,
            start: Vec::new(),
        };
        solver.start = solver.from_input_map(start)?;
        Ok(solver)
    }

    /// The solver frame's name (the move frame's).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The goal frame's name.
    #[inline]
    pub fn goal_name(&self) -> &str {
        &self.goal_name
    }

    /// Aggregated limits; the length is the solver frame's DoF count.
    #[inline]
    pub fn dof(&self) -> &[Limit] {
        &self.limits
    }

    /// The seed configuration, flat.
    #[inline]
    pub fn start_inputs(&self) -> &[Input] {
        &self.start
    }

    /// Pose of the move frame in the goal frame's coordinates for a flat
    /// input vector. Limit violations are combined and returned beside the
    /// pose, exactly as for a concrete frame.
    pub fn transform(&self, inputs: &[Input]) -> Result<(Pose, Option<FrameError>)> {
        if inputs.len() != self.limits.len() {
            return Err(FrameError::IncorrectInputLength {
                got: inputs.len(),
                want: self.limits.len(),
            });
        }
        let mut cursor = 0usize;
        let mut oob = None;
        let mut compose_chain = |chain: &[Frame]| -> Result<Pose> {
            // Flat inputs are distributed child-first, but composition runs
            // root-to-child; slice per frame first, then fold in reverse.
            let mut slices = Vec::with_capacity(chain.len());
            for frame in chain {
                let dof = frame.dof().len();
                slices.push(&inputs[cursor..cursor + dof]);
                cursor += dof;
            }
            let mut acc = Pose::IDENTITY;
            for (frame, slice) in chain.iter().zip(&slices).rev() {
                let (pose, hop_oob) = frame.transform(slice)?;
                oob = FrameError::merge(oob.take(), hop_oob);
                acc = acc.compose(&pose);
            }
            Ok(acc)
        };
        let ancestor_from_move = compose_chain(&self.move_chain)?;
        let ancestor_from_goal = compose_chain(&self.goal_chain)?;
        let pose = ancestor_from_goal.inverse().compose(&ancestor_from_move);
        Ok((pose, oob))
    }

    /// Spread a flat input vector back into a per-frame input map.
    pub fn to_input_map(&self, inputs: &[Input]) -> Result<FrameSystemInputs> {
        if inputs.len() != self.limits.len() {
            return Err(FrameError::IncorrectInputLength {
                got: inputs.len(),
                want: self.limits.len(),
            });
        }
        let mut map = FrameSystemInputs::new();
        let mut cursor = 0usize;
        for frame in self.move_chain.iter().chain(&self.goal_chain) {
            let dof = frame.dof().len();
            if dof > 0 {
                map.insert(
                    frame.name().to_owned(),
                    inputs[cursor..cursor + dof].to_vec(),
                );
                cursor += dof;
            }
        }
        Ok(map)
    }

    /// Flatten a per-frame input map into the solver's input order.
    pub fn from_input_map(&self, map: &FrameSystemInputs) -> Result<Vec<Input>> {
        let mut flat = Vec::with_capacity(self.limits.len());
        for frame in self.move_chain.iter().chain(&self.goal_chain) {
            let dof = frame.dof().len();
            if dof == 0 {
                continue;
            }
            let entry = map
                .get(frame.name())
                .ok_or_else(|| FrameError::MissingFrameInputs(frame.name().to_owned()))?;
            if entry.len() != dof {
                return Err(FrameError::IncorrectInputLength {
                    got: entry.len(),
                    want: dof,
                });
            }
            flat.extend_from_slice(entry);
        }
        Ok(flat)
    }
}
