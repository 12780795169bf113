//! # Aksha-Frame: Reference-Frame Trees for Robots
//!
//! Models a robot and its surroundings as a tree of named coordinate
//! frames, computes the pose of any frame in terms of any other, and
//! collects the geometries that populate those frames. Higher-level
//! services (motion planning, collision checking, visualisation) build on
//! this crate; the spatial algebra itself lives in [`aksha_spatial`].
//!
//! ## Quick Start
//!
//! ```rust
//! use aksha_frame::{Frame, FrameSystem, FrameSystemInputs, Input, Limit, WORLD};
//! use aksha_spatial::Vector3;
//! use std::f64::consts::FRAC_PI_2;
//!
//! // world -> shoulder (revolute about Z) -> hand (100mm along X).
//! let mut system = FrameSystem::new();
//! system
//!     .add_frame(
//!         Frame::new_rotational("shoulder", Vector3::Z, Limit::new(-3.2, 3.2)).unwrap(),
//!         WORLD,
//!     )
//!     .unwrap();
//! system
//!     .add_frame(
//!         Frame::new_static(
//!             "hand",
//!             aksha_spatial::Pose::from_translation(Vector3::new(100.0, 0.0, 0.0)),
//!         ),
//!         "shoulder",
//!     )
//!     .unwrap();
//!
//! // With the shoulder at a quarter turn the hand points along +Y.
//! let mut inputs = FrameSystemInputs::new();
//! inputs.insert("shoulder".to_owned(), vec![Input(FRAC_PI_2)]);
//! let (pose, oob) = system.transform(&inputs, "hand", WORLD).unwrap();
//! assert!(oob.is_none());
//! assert!(pose.translation.approx_eq(&Vector3::new(0.0, 100.0, 0.0), 1e-9));
//! ```
//!
//! ## Tolerated limit violations
//!
//! Out-of-range inputs are not fatal: transforms still compute the
//! unclamped pose and hand back the violation beside it (tagged with
//! [`OOB_ERR_STRING`]). Exploratory planners ignore it; execution-time
//! validators treat it as failure.
//!
//! ## Concurrency
//!
//! Synchronous and thread-compatible, not thread-safe: queries take
//! `&self` and are pure, mutation requires `&mut self`, and callers own
//! the locking discipline.
//!
//! ## Modules
//!
//! - [`frame`]: the closed frame sum type and input sampling
//! - [`system`]: the rooted tree and transform composition
//! - [`solver`]: path-aggregated virtual frames for planners
//! - [`world_state`]: per-query obstacle snapshots
//! - [`inputs`]: input maps and interpolation
//! - [`config`]: link/joint config records and round-trip encoding

pub mod config;
pub mod error;
pub mod frame;
pub mod inputs;
pub mod solver;
pub mod system;
pub mod world_state;

pub use config::{FrameConfig, JointConfig, JointType, LinkConfig};
pub use error::{FrameError, Result, OOB_ERR_STRING};
pub use frame::{
    floats_to_inputs, inputs_to_floats, limits_almost_equal, random_frame_inputs,
    restricted_random_frame_inputs, Frame, GeometriesInFrame, Input, Limit,
    DEFAULT_INFINITE_BOUND, FRAME_EPSILON,
};
pub use inputs::{interpolate_inputs, start_positions, FrameSystemInputs};
pub use solver::SolverFrame;
pub use system::{FrameSystem, WORLD};
pub use world_state::{check_collisions, FrameTransform, WorldState};
