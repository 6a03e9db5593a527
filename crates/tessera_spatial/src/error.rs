//! # Spatial Error Types

use tessera_shared::Rect;
use thiserror::Error;

/// Errors raised by the spatial index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpatialError {
    /// Bounds with zero or negative extent, or non-finite coordinates.
    #[error("degenerate bounds ({}, {})-({}, {})", .0.min.x, .0.min.y, .0.max.x, .0.max.y)]
    DegenerateBounds(Rect),

    /// A structural check of the tree failed.
    #[error("tree invariant violated at node {node}: {reason}")]
    InvariantViolation {
        /// Offending node index.
        node: u32,
        /// What was wrong.
        reason: &'static str,
    },
}

/// Result type for spatial operations.
pub type SpatialResult<T> = Result<T, SpatialError>;
