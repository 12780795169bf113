//! Error types for aksha-spatial.

use thiserror::Error;

/// Errors produced by spatial constructions and collision queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpatialError {
    #[error("cannot use zero-length vector as an axis or direction")]
    ZeroAxis,

    #[error("invalid geometry dimensions: {0}")]
    InvalidDimensions(String),

    #[error("geometry collision unsupported between {a} and {b}")]
    CollisionUnsupported {
        /// First geometry kind.
        a: &'static str,
        /// Second geometry kind.
        b: &'static str,
    },

    #[error("geometry of kind {0} has no config representation")]
    GeometryConfigUnsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, SpatialError>;
