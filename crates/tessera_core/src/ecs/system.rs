//! # Systems
//!
//! A system is per-tick logic run against every enabled entity whose
//! component filter covers the system's required filter.

use super::component::ComponentsFilter;
use super::entity::Entity;
use super::world::World;

/// Per-tick logic registered with a [`World`].
///
/// The entity slice is gathered right before the call and stays the same for
/// its whole duration. Structural changes requested from inside `update`
/// (enable, disable, destroy) are deferred to the next tick, so every entity
/// in the slice stays valid until the tick ends.
pub trait System {
    /// Runs once per tick.
    fn update(&mut self, world: &mut World, entities: &[Entity], delta_time: f32);

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A registered system plus its requirement and reusable entity buffer.
pub(crate) struct ScheduledSystem {
    pub(crate) system: Box<dyn System>,
    pub(crate) required: ComponentsFilter,
    pub(crate) entities: Vec<Entity>,
}

impl ScheduledSystem {
    pub(crate) fn new(system: Box<dyn System>, required: ComponentsFilter) -> Self {
        Self {
            system,
            required,
            entities: Vec::new(),
        }
    }
}
