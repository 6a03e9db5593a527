//! # World Notifications
//!
//! Typed, synchronous fan-out of entity lifecycle and movement events.
//!
//! ```text
//! World mutation ──> Observers::emit ──> observer 1 ──> observer 2 ──> ... ──> call returns
//! ```
//!
//! Observers run inside the mutating call, in subscription order, and see a
//! read-only [`WorldView`]. By the time the call that triggered an event
//! returns, every observer has processed it.

use tessera_shared::Vec2;

use super::component::{Component, ComponentsFilter};
use super::entity::{Entity, EntityRegistry};
use super::storage::ComponentStore;

/// Events emitted by a [`World`](super::World).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorldEvent {
    /// A collaborator moved the entity by `offset`.
    EntityMoved {
        /// Entity that moved.
        entity: Entity,
        /// Displacement applied this step.
        offset: Vec2,
    },

    /// The entity started participating in system iteration.
    EntityEnabled(Entity),

    /// The entity stopped participating in system iteration.
    EntityDisabled(Entity),

    /// The entity is about to be torn down. Its components are still readable.
    EntityDestroyed(Entity),
}

impl WorldEvent {
    /// Entity the event is about.
    #[must_use]
    pub const fn entity(&self) -> Entity {
        match *self {
            Self::EntityMoved { entity, .. }
            | Self::EntityEnabled(entity)
            | Self::EntityDisabled(entity)
            | Self::EntityDestroyed(entity) => entity,
        }
    }
}

/// Read-only access to world state handed to observers.
#[derive(Clone, Copy)]
pub struct WorldView<'w> {
    registry: &'w EntityRegistry,
    store: &'w ComponentStore,
    enabled: &'w [bool],
}

impl<'w> WorldView<'w> {
    pub(crate) fn new(
        registry: &'w EntityRegistry,
        store: &'w ComponentStore,
        enabled: &'w [bool],
    ) -> Self {
        Self {
            registry,
            store,
            enabled,
        }
    }

    /// Checks if a handle refers to a live entity.
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.registry.is_valid(entity)
    }

    /// Checks if a live entity currently participates in system iteration.
    #[must_use]
    pub fn is_enabled(&self, entity: Entity) -> bool {
        self.is_valid(entity)
            && self
                .enabled
                .get(entity.index() as usize)
                .copied()
                .unwrap_or(false)
    }

    /// Component of a live entity, if present.
    #[must_use]
    pub fn component<C: Component>(&self, entity: Entity) -> Option<&'w C> {
        if !self.is_valid(entity) {
            return None;
        }
        self.store.get_typed(entity)
    }

    /// Checks whether a live entity holds `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.components_filter(entity).contains(C::TYPE_ID)
    }

    /// Filter of a live entity; empty for invalid handles.
    #[must_use]
    pub fn components_filter(&self, entity: Entity) -> ComponentsFilter {
        if !self.is_valid(entity) {
            return ComponentsFilter::EMPTY;
        }
        self.store.filter(entity)
    }
}

/// Receives world notifications.
pub trait WorldObserver {
    /// Handles one event. Runs synchronously inside the mutating world call.
    fn on_event(&mut self, event: &WorldEvent, world: &WorldView<'_>);
}

impl<F> WorldObserver for F
where
    F: FnMut(&WorldEvent, &WorldView<'_>),
{
    fn on_event(&mut self, event: &WorldEvent, world: &WorldView<'_>) {
        self(event, world);
    }
}

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

/// Ordered list of observers.
#[derive(Default)]
pub(crate) struct Observers {
    entries: Vec<(SubscriptionId, Box<dyn WorldObserver>)>,
    next_id: u32,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Box<dyn WorldObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn emit(&mut self, event: &WorldEvent, view: &WorldView<'_>) {
        for (_, observer) in &mut self.entries {
            observer.on_event(event, view);
        }
    }
}
