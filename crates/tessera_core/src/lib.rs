//! # TESSERA Core Engine
//!
//! The entity kernel of the TESSERA simulation stack:
//! - Generational entity handles that never alias a reused slot
//! - Per-entity component slots with a 64-bit membership filter
//! - A world that runs systems once per tick with deferred structural changes
//! - Typed, synchronous observers for movement and lifecycle events
//!
//! ## Architecture Rules
//!
//! 1. **One simulation thread** - nothing here locks or spawns
//! 2. **Handles, not references** - collaborators store `Entity`, never `&T`
//! 3. **No mid-pass mutation** - enable/disable/destroy wait for the next flush
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{MovementSystem, Position, Velocity, World};
//!
//! let mut world = World::new();
//! world.add_system(MovementSystem, MovementSystem::required());
//!
//! let e = world.create_entity();
//! world.add_component(e, Position::new(0.0, 0.0));
//! world.add_component(e, Velocity::new(1.0, 0.0));
//! world.enable_entity(e);
//! world.update(1.0 / 60.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod components;
pub mod ecs;
pub mod error;

pub use components::{MovementSystem, Position, Velocity};
pub use ecs::{
    Component, ComponentRegistry, ComponentStore, ComponentTypeId, ComponentsFilter, Entity,
    EntityId, EntityRegistry, FlushStats, SubscriptionId, System, World, WorldEvent, WorldId,
    WorldObserver, WorldView,
};
pub use error::{EcsError, EcsResult};
