//! # Navigation Error Types

use tessera_shared::Cell;
use thiserror::Error;

/// Errors raised by grids and the pathfinder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// No sequence of open cells connects start and goal.
    #[error("no path from {start:?} to {goal:?}")]
    UnreachableGoal {
        /// Search origin.
        start: Cell,
        /// Requested destination.
        goal: Cell,
    },

    /// The goal cell itself is blocked.
    #[error("goal {0:?} is blocked")]
    BlockedGoal(Cell),

    /// A cell lies outside the grid.
    #[error("cell {0:?} is outside the grid")]
    OutOfBounds(Cell),

    /// Rows of different lengths were given to build a grid.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
}

/// Result type for navigation operations.
pub type NavResult<T> = Result<T, NavError>;
