//! # Entity Component System
//!
//! Generational entity handles, fixed-slot component storage and a world
//! that schedules systems over them.
//!
//! ## Design Philosophy
//!
//! - Handles carry a generation, so stale references are detected, never followed
//! - Each entity owns one slot per component kind, mirrored by a 64-bit filter
//! - Structural changes requested during a tick are applied at the next flush
//! - Observers are notified synchronously, in subscription order

mod component;
mod entity;
mod events;
mod registry;
mod storage;
mod system;
mod world;

pub use component::{Component, ComponentTypeId, ComponentsFilter};
pub use entity::{Entity, EntityId, EntityRegistry, WorldId};
pub use events::{SubscriptionId, WorldEvent, WorldObserver, WorldView};
pub use registry::ComponentRegistry;
pub use storage::ComponentStore;
pub use system::System;
pub use world::{FlushStats, World};
