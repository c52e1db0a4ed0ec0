//! Error types for drishti-geom.

use thiserror::Error;

/// Crate error type.
///
/// Structural errors are recoverable: a failing operation returns the
/// error and leaves the value it was called on unchanged. Geometric
/// out-of-range conditions (points outside the grid, unreachable path
/// targets) are absorbed by sentinels and never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeomError {
    #[error("graph has no edges")]
    EmptyGraph,

    #[error("weight count {actual} does not match edge count {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("graph was mutated without construct(); CSR offsets are stale")]
    NotConstructed,
}

pub type Result<T> = std::result::Result<T, GeomError>;
