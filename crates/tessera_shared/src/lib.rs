//! # TESSERA Shared
//!
//! Common plain-data types used by every kernel crate.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER hold kernel state. Only `Pod` data and constants
//! belong here; anything that owns entities, trees or grids lives in the
//! crate that owns that concern.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{
    AABB_DISPLACEMENT_MULTIPLIER, AABB_MARGIN, DEFAULT_ENTITY_CAPACITY, MAX_COMPONENT_TYPES,
    MAX_SUBSTEPS, NAV_CELL_SIZE, TICK_RATE,
};
pub use math::{Cell, Rect, Vec2};
