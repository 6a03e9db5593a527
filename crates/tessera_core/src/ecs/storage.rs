//! # Component Storage
//!
//! Per-entity, per-type storage with O(1) access:
//! - Each entity index owns a fixed array of `MAX_COMPONENT_TYPES` slots
//! - A [`ComponentsFilter`] mirrors which slots are occupied
//! - Slots own their component instances exclusively
//!
//! The store trusts the caller on handle validity; [`World`](super::World)
//! checks generations before delegating here.

use std::any::Any;

use tessera_shared::MAX_COMPONENT_TYPES;

use super::component::{Component, ComponentTypeId, ComponentsFilter};
use super::entity::Entity;

type ComponentSlots = [Option<Box<dyn Any>>; MAX_COMPONENT_TYPES];

/// Slots and filter of one entity index.
struct EntityComponents {
    components: Box<ComponentSlots>,
    filter: ComponentsFilter,
}

impl EntityComponents {
    fn new() -> Self {
        Self {
            components: Box::new(std::array::from_fn(|_| None)),
            filter: ComponentsFilter::EMPTY,
        }
    }

    fn clear(&mut self) {
        for id in self.filter.iter() {
            self.components[id.index()] = None;
        }
        self.filter.clear();
    }
}

/// Storage for every component of every entity.
///
/// # Invariant
///
/// For each entity index, filter bit `t` is set iff slot `t` holds a value.
pub struct ComponentStore {
    entries: Vec<EntityComponents>,
}

impl ComponentStore {
    /// Creates storage for entity indices below `size`.
    #[must_use]
    pub fn new(size: usize) -> Self {
        let mut store = Self {
            entries: Vec::with_capacity(size),
        };
        store.resize(size);
        store
    }

    /// Number of entity indices the storage can address.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entity index is addressable.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Grows storage to address entity indices below `size`. Never shrinks.
    pub fn resize(&mut self, size: usize) {
        if size > self.entries.len() {
            self.entries.resize_with(size, EntityComponents::new);
        }
    }

    /// Drops every stored component and every slot array.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn entry(&self, entity: Entity) -> Option<&EntityComponents> {
        self.entries.get(entity.index() as usize)
    }

    fn entry_mut(&mut self, entity: Entity) -> Option<&mut EntityComponents> {
        self.entries.get_mut(entity.index() as usize)
    }

    fn entry_for_write(&mut self, entity: Entity) -> &mut EntityComponents {
        let len = self.entries.len();
        match self.entries.get_mut(entity.index() as usize) {
            Some(entry) => entry,
            None => panic!("component storage has {len} slots, {entity} is outside it"),
        }
    }

    /// Stores `component` in slot `type_id`, replacing any previous value.
    ///
    /// # Panics
    ///
    /// Panics if the entity index is beyond the storage (see [`resize`](Self::resize)).
    pub fn add(
        &mut self,
        entity: Entity,
        component: Box<dyn Any>,
        type_id: ComponentTypeId,
    ) -> &mut dyn Any {
        let entry = self.entry_for_write(entity);
        entry.filter.insert(type_id);
        &mut **entry.components[type_id.index()].insert(component)
    }

    /// Typed form of [`add`](Self::add).
    pub fn insert<C: Component>(&mut self, entity: Entity, component: C) -> &mut C {
        match self.add(entity, Box::new(component), C::TYPE_ID).downcast_mut::<C>() {
            Some(component) => component,
            None => unreachable!("slot {} was just filled with {}", C::TYPE_ID, C::NAME),
        }
    }

    /// Drops the component in slot `type_id`. Returns `false` if it was empty.
    pub fn remove(&mut self, entity: Entity, type_id: ComponentTypeId) -> bool {
        let Some(entry) = self.entry_mut(entity) else {
            return false;
        };
        entry.filter.remove(type_id);
        entry.components[type_id.index()].take().is_some()
    }

    /// Drops every component of the entity and zeroes its filter.
    pub fn remove_all(&mut self, entity: Entity) {
        if let Some(entry) = self.entry_mut(entity) {
            entry.clear();
        }
    }

    /// Component in slot `type_id`, if present.
    #[must_use]
    pub fn get(&self, entity: Entity, type_id: ComponentTypeId) -> Option<&dyn Any> {
        self.entry(entity)?.components[type_id.index()].as_deref()
    }

    /// Mutable component in slot `type_id`, if present.
    pub fn get_mut(&mut self, entity: Entity, type_id: ComponentTypeId) -> Option<&mut dyn Any> {
        self.entry_mut(entity)?.components[type_id.index()].as_deref_mut()
    }

    /// Typed lookup; `None` when the component is absent.
    #[must_use]
    pub fn get_typed<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.get(entity, C::TYPE_ID)?.downcast_ref()
    }

    /// Typed mutable lookup; `None` when the component is absent.
    pub fn get_typed_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.get_mut(entity, C::TYPE_ID)?.downcast_mut()
    }

    /// Checks whether slot `type_id` is occupied.
    #[must_use]
    pub fn has(&self, entity: Entity, type_id: ComponentTypeId) -> bool {
        self.filter(entity).contains(type_id)
    }

    /// Every component of the entity with its type id, in id order.
    #[must_use]
    pub fn get_all(&self, entity: Entity) -> Vec<(ComponentTypeId, &dyn Any)> {
        let Some(entry) = self.entry(entity) else {
            return Vec::new();
        };
        entry
            .filter
            .iter()
            .filter_map(|id| entry.components[id.index()].as_deref().map(|c| (id, c)))
            .collect()
    }

    /// Filter of the entity; empty for indices beyond the storage.
    #[must_use]
    pub fn filter(&self, entity: Entity) -> ComponentsFilter {
        self.entry(entity)
            .map_or(ComponentsFilter::EMPTY, |entry| entry.filter)
    }
}

impl Default for ComponentStore {
    fn default() -> Self {
        Self::new(0)
    }
}
