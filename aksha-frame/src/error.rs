//! Error types for aksha-frame.
//!
//! Two severities flow out of this crate. Structural and input-shape
//! problems (unknown frame, duplicate name, cycle, wrong input length) are
//! fatal and travel in the `Err` channel. Limit violations are tolerated:
//! the computation proceeds and the violation is handed back next to the
//! valid result, tagged with [`OOB_ERR_STRING`] so callers can check for it
//! without matching variants.

use aksha_spatial::SpatialError;
use thiserror::Error;

/// Substring present in every out-of-bounds error message. Callers decide
/// whether to tolerate these (exploratory planners do) or fail on them
/// (execution-time validators do).
pub const OOB_ERR_STRING: &str = "input out of bounds";

/// Errors produced by frames, frame systems, and their configs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("input length mismatch: got {got} inputs, want {want}")]
    IncorrectInputLength {
        /// Number of inputs supplied.
        got: usize,
        /// DoF count of the frame.
        want: usize,
    },

    #[error("joint {joint} input out of bounds: {value:.5} needs to be within range [{min:.5}, {max:.5}]")]
    OutOfBounds {
        /// Index of the violating degree of freedom.
        joint: usize,
        /// The supplied value.
        value: f64,
        /// Lower limit.
        min: f64,
        /// Upper limit.
        max: f64,
    },

    /// Union of several errors collected along a transform path.
    #[error("{}", combined_message(.0))]
    Combined(Vec<FrameError>),

    #[error("unknown frame: {0}")]
    UnknownFrame(String),

    #[error("duplicate frame: {0}")]
    DuplicateFrame(String),

    #[error("cycle detected at frame: {0}")]
    CycleDetected(String),

    #[error("no inputs supplied for frame: {0}")]
    MissingFrameInputs(String),

    #[error("frame {0} has no config representation")]
    UnserializableFrame(String),

    #[error("rotational frame {0} cannot carry geometry")]
    RotationalFrameGeometry(String),

    #[error("missing intrinsics: point cloud {0} carries no points")]
    MissingIntrinsics(String),

    #[error("the world frame cannot be added, replaced, or removed")]
    WorldImmutable,

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

impl FrameError {
    /// Collapse a list of errors: none stays none, one stays itself,
    /// several become [`FrameError::Combined`].
    pub fn combined(mut errors: Vec<FrameError>) -> Option<FrameError> {
        match errors.len() {
            0 => None,
            1 => Some(errors.remove(0)),
            _ => Some(FrameError::Combined(errors)),
        }
    }

    /// Merge two optional errors into one.
    pub fn merge(a: Option<FrameError>, b: Option<FrameError>) -> Option<FrameError> {
        match (a, b) {
            (None, e) | (e, None) => e,
            (Some(FrameError::Combined(mut v)), Some(b)) => {
                v.push(b);
                Some(FrameError::Combined(v))
            }
            (Some(a), Some(b)) => Some(FrameError::Combined(vec![a, b])),
        }
    }

    /// Is this error (or any member of a combined error) an out-of-bounds
    /// violation?
    pub fn is_oob(&self) -> bool {
        match self {
            FrameError::OutOfBounds { .. } => true,
            FrameError::Combined(errors) => errors.iter().any(FrameError::is_oob),
            _ => false,
        }
    }
}

fn combined_message(errors: &[FrameError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, FrameError>;
