//! # Kernel Constants
//!
//! Values baked into every kernel crate. Changing them changes memory layout
//! (component slot arrays, filter width), so they live in one place.

// =============================================================================
// COMPONENT STORAGE
// =============================================================================

/// Maximum number of distinct component types.
///
/// Every entity carries a fixed slot array of this length and a filter with
/// one bit per type, so the value must fit in the filter's `u64`.
pub const MAX_COMPONENT_TYPES: usize = 64;

/// Entity slots reserved up front when a world is created with defaults.
pub const DEFAULT_ENTITY_CAPACITY: usize = 1024;

// =============================================================================
// TIMING
// =============================================================================

/// Default fixed simulation rate (ticks per second).
pub const TICK_RATE: u32 = 60;

/// Upper bound on catch-up ticks run by one driver step.
pub const MAX_SUBSTEPS: u32 = 8;

// =============================================================================
// SPATIAL / NAVIGATION
// =============================================================================

/// Default margin added on every side of a proxy's tight bounds.
pub const AABB_MARGIN: f32 = 4.0;

/// Default multiplier applied to a proxy's displacement when predicting motion.
pub const AABB_DISPLACEMENT_MULTIPLIER: f32 = 2.0;

/// Default edge length of a navigation grid cell, in world units.
pub const NAV_CELL_SIZE: f32 = 32.0;

const _: () = assert!(MAX_COMPONENT_TYPES <= u64::BITS as usize);
