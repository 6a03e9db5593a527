//! # TESSERA Nav
//!
//! Grid navigation:
//! - [`Grid`]: row-major cell array, `0` open and anything else blocked
//! - [`GridPathfinder`]: deterministic 4-connected A* with reusable scratch
//! - [`TargetFollow`] + [`TargetFollowSystem`]: steer entities along paths
//!
//! Grid coordinates are `(column, row)` with `(0, 0)` at the top-left;
//! [`cell_at`] maps world positions to cells for a given cell size.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod astar;
pub mod error;
pub mod follow;
pub mod grid;

pub use astar::GridPathfinder;
pub use error::{NavError, NavResult};
pub use follow::{FollowState, FollowTarget, SharedPathfinder, TargetFollow, TargetFollowSystem};
pub use grid::{cell_at, Grid};
