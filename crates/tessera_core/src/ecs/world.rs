//! # ECS World
//!
//! The central container for entities, components, systems and observers.
//!
//! ## Tick Structure
//!
//! ```text
//! update(dt)
//!   ├─ flush      enable / disable / destroy requests, in request order
//!   ├─ gather     enabled entities whose filter covers the system's filter
//!   └─ run        each system once, in registration order
//! ```
//!
//! Structural changes requested during a tick only become visible at the next
//! flush, so a system never sees an entity vanish half-way through a pass.

use std::any::Any;
use std::mem;

use tessera_shared::{Vec2, DEFAULT_ENTITY_CAPACITY};
use tracing::{debug, info, trace};

use super::component::{Component, ComponentTypeId, ComponentsFilter};
use super::entity::{Entity, EntityRegistry, WorldId};
use super::events::{Observers, SubscriptionId, WorldEvent, WorldObserver, WorldView};
use super::storage::ComponentStore;
use super::system::{ScheduledSystem, System};
use crate::error::{EcsError, EcsResult};

/// A structural change waiting for the next flush.
#[derive(Clone, Copy, Debug)]
enum PendingChange {
    Enable(Entity),
    Disable(Entity),
    Destroy(Entity),
}

/// Counts of changes applied by one flush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Entities that became enabled.
    pub enabled: usize,
    /// Entities that became disabled.
    pub disabled: usize,
    /// Entities torn down.
    pub destroyed: usize,
    /// Requests dropped because the entity was gone or already in the state.
    pub skipped: usize,
}

/// The ECS World - container for all simulation state.
///
/// # Handle validity
///
/// Mutating calls (`add_component`, `enable_entity`, `notify_moved`, ...)
/// panic when handed a stale, foreign or null handle: that is a lifecycle
/// bug in the caller. Read accessors return `None` / `false` instead.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new();
/// world.add_system(MovementSystem, MovementSystem::required());
///
/// let e = world.create_entity();
/// world.add_component(e, Position::new(10.0, 10.0));
/// world.add_component(e, Velocity::new(1.0, 0.0));
/// world.enable_entity(e);
///
/// world.update(1.0 / 60.0);
/// ```
pub struct World {
    id: WorldId,
    registry: EntityRegistry,
    store: ComponentStore,
    /// Enabled flag per entity index; same length as `store`.
    enabled: Vec<bool>,
    enabled_count: usize,
    pending: Vec<PendingChange>,

    // =========================================================================
    // Scheduling
    // =========================================================================
    systems: Vec<ScheduledSystem>,
    observers: Observers,
    updating: bool,
    tick_count: u64,
}

impl World {
    /// Creates an empty world with the default entity capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ENTITY_CAPACITY)
    }

    /// Creates an empty world with storage for `capacity` entities.
    ///
    /// The world grows past `capacity` on demand.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let id = WorldId::next();
        info!(world = id.get(), capacity, "world created");

        Self {
            id,
            registry: EntityRegistry::with_capacity(id, capacity),
            store: ComponentStore::new(capacity),
            enabled: vec![false; capacity],
            enabled_count: 0,
            pending: Vec::new(),
            systems: Vec::new(),
            observers: Observers::default(),
            updating: false,
            tick_count: 0,
        }
    }

    /// Process-unique id stamped on every handle this world issues.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> WorldId {
        self.id
    }

    /// Number of live entities, enabled or not.
    #[inline]
    #[must_use]
    pub const fn entity_count(&self) -> usize {
        self.registry.alive_count()
    }

    /// Number of enabled entities.
    #[inline]
    #[must_use]
    pub const fn enabled_count(&self) -> usize {
        self.enabled_count
    }

    /// Number of completed `update` calls.
    #[inline]
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Number of structural changes waiting for the next flush.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Read-only view of the world, the same one observers receive.
    #[must_use]
    pub fn view(&self) -> WorldView<'_> {
        WorldView::new(&self.registry, &self.store, &self.enabled)
    }

    // =========================================================================
    // Entity Lifecycle
    // =========================================================================

    /// Creates a new, disabled entity. Takes effect immediately.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.registry.create();
        let needed = self.registry.slot_count();
        if needed > self.store.len() {
            let grown = needed.max(self.store.len() * 2);
            self.store.resize(grown);
            self.enabled.resize(grown, false);
        }
        trace!(%entity, "entity created");
        entity
    }

    /// Requests that the entity join system iteration at the next flush.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid in this world.
    pub fn enable_entity(&mut self, entity: Entity) {
        self.assert_valid(entity);
        self.pending.push(PendingChange::Enable(entity));
    }

    /// Requests that the entity leave system iteration at the next flush.
    /// Its components are kept.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid in this world.
    pub fn disable_entity(&mut self, entity: Entity) {
        self.assert_valid(entity);
        self.pending.push(PendingChange::Disable(entity));
    }

    /// Requests destruction of the entity at the next flush.
    ///
    /// Until then the entity stays valid and readable, including by systems
    /// that run later in the current tick.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid in this world.
    pub fn destroy_entity(&mut self, entity: Entity) {
        self.assert_valid(entity);
        self.pending.push(PendingChange::Destroy(entity));
    }

    /// Requests destruction of every live entity at the next flush.
    pub fn destroy_all_entities(&mut self) {
        let pending = &mut self.pending;
        pending.extend(self.registry.iter_alive().map(PendingChange::Destroy));
    }

    /// Checks if a handle refers to a live entity of this world.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.registry.is_valid(entity)
    }

    /// Checks if a live entity currently participates in system iteration.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self, entity: Entity) -> bool {
        self.is_valid(entity) && self.enabled[entity.index() as usize]
    }

    /// Iterates over live entities in index order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.registry.iter_alive()
    }

    /// Applies pending structural changes outside of `update`.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a running system. Changes requested
    /// during a tick are applied when the next tick starts.
    pub fn refresh(&mut self) -> FlushStats {
        assert!(!self.updating, "World::refresh called from inside a system");
        self.flush()
    }

    fn assert_valid(&self, entity: Entity) {
        if !self.registry.is_valid(entity) {
            panic!("{}", EcsError::InvalidEntity(entity));
        }
    }

    fn flush(&mut self) -> FlushStats {
        let mut stats = FlushStats::default();
        if self.pending.is_empty() {
            return stats;
        }

        let mut pending = mem::take(&mut self.pending);
        for change in pending.drain(..) {
            match change {
                PendingChange::Enable(entity) => {
                    if !self.is_valid(entity) || self.enabled[entity.index() as usize] {
                        stats.skipped += 1;
                        continue;
                    }
                    self.enabled[entity.index() as usize] = true;
                    self.enabled_count += 1;
                    stats.enabled += 1;
                    self.emit(WorldEvent::EntityEnabled(entity));
                }
                PendingChange::Disable(entity) => {
                    if !self.is_enabled(entity) {
                        stats.skipped += 1;
                        continue;
                    }
                    self.enabled[entity.index() as usize] = false;
                    self.enabled_count -= 1;
                    stats.disabled += 1;
                    self.emit(WorldEvent::EntityDisabled(entity));
                }
                PendingChange::Destroy(entity) => {
                    if !self.is_valid(entity) {
                        stats.skipped += 1;
                        continue;
                    }
                    // Observers read components before teardown.
                    self.emit(WorldEvent::EntityDestroyed(entity));

                    let index = entity.index() as usize;
                    if self.enabled[index] {
                        self.enabled[index] = false;
                        self.enabled_count -= 1;
                    }
                    self.store.remove_all(entity);
                    self.registry.destroy(entity);
                    stats.destroyed += 1;
                    trace!(%entity, "entity destroyed");
                }
            }
        }
        // Observers only get a read-only view, so nothing was queued meanwhile.
        self.pending = pending;

        debug!(
            world = self.id.get(),
            enabled = stats.enabled,
            disabled = stats.disabled,
            destroyed = stats.destroyed,
            skipped = stats.skipped,
            "flushed structural changes"
        );
        stats
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Adds (or replaces) a component.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid in this world.
    pub fn add_component<C: Component>(&mut self, entity: Entity, component: C) -> &mut C {
        self.assert_valid(entity);
        self.store.insert(entity, component)
    }

    /// Adds (or replaces) a default-constructed component.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid in this world.
    pub fn add_default_component<C: Component + Default>(&mut self, entity: Entity) -> &mut C {
        self.add_component(entity, C::default())
    }

    /// Adds an already boxed component under `type_id`.
    ///
    /// The caller guarantees that the box holds the type registered under
    /// `type_id`; [`ComponentRegistry`](super::ComponentRegistry) does.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid in this world.
    pub fn add_component_boxed(
        &mut self,
        entity: Entity,
        type_id: ComponentTypeId,
        component: Box<dyn Any>,
    ) -> &mut dyn Any {
        self.assert_valid(entity);
        self.store.add(entity, component, type_id)
    }

    /// Removes a component. Returns `false` if it was absent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid in this world.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> bool {
        self.assert_valid(entity);
        self.store.remove(entity, C::TYPE_ID)
    }

    /// Component of a live entity; `None` if absent or the handle is invalid.
    #[must_use]
    pub fn component<C: Component>(&self, entity: Entity) -> Option<&C> {
        if !self.is_valid(entity) {
            return None;
        }
        self.store.get_typed(entity)
    }

    /// Mutable component of a live entity; `None` if absent or the handle is invalid.
    pub fn component_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        if !self.is_valid(entity) {
            return None;
        }
        self.store.get_typed_mut(entity)
    }

    /// Component of a live entity, with absence reported as an error value.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] for a bad handle,
    /// [`EcsError::ComponentAbsent`] when the entity lacks `C`.
    pub fn require_component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        if !self.is_valid(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        self.store
            .get_typed(entity)
            .ok_or(EcsError::ComponentAbsent {
                entity,
                component: C::NAME,
            })
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

    /// Every component of a live entity, in id order.
    #[must_use]
    pub fn components(&self, entity: Entity) -> Vec<(ComponentTypeId, &dyn Any)> {
        if !self.is_valid(entity) {
            return Vec::new();
        }
        self.store.get_all(entity)
    }

    // =========================================================================
    // Systems and Observers
    // =========================================================================

    /// Registers a system run against enabled entities covering `required`.
    ///
    /// A system added while a tick is running first runs on the next tick.
    pub fn add_system<S: System + 'static>(&mut self, system: S, required: ComponentsFilter) {
        debug!(system = system.name(), ?required, "system registered");
        self.systems
            .push(ScheduledSystem::new(Box::new(system), required));
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Subscribes an observer to world events.
    pub fn subscribe<O: WorldObserver + 'static>(&mut self, observer: O) -> SubscriptionId {
        self.observers.subscribe(Box::new(observer))
    }

    /// Subscribes a closure to world events.
    pub fn subscribe_fn<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&WorldEvent, &WorldView<'_>) + 'static,
    {
        self.observers.subscribe(Box::new(observer))
    }

    /// Removes an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Number of subscribed observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Reports that a collaborator moved the entity by `offset`.
    ///
    /// Observers run before this returns.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid in this world.
    pub fn notify_moved(&mut self, entity: Entity, offset: Vec2) {
        self.assert_valid(entity);
        self.emit(WorldEvent::EntityMoved { entity, offset });
    }

    fn emit(&mut self, event: WorldEvent) {
        let view = WorldView::new(&self.registry, &self.store, &self.enabled);
        self.observers.emit(&event, &view);
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advances the world by one tick.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a running system.
    pub fn update(&mut self, delta_time: f32) {
        assert!(!self.updating, "World::update called from inside a system");

        self.flush();

        self.updating = true;
        let mut systems = mem::take(&mut self.systems);
        for scheduled in &mut systems {
            let ScheduledSystem {
                system,
                required,
                entities,
            } = scheduled;

            entities.clear();
            let enabled = &self.enabled;
            let store = &self.store;
            entities.extend(self.registry.iter_alive().filter(|&entity| {
                enabled[entity.index() as usize] && store.filter(entity).contains_all(*required)
            }));

            trace!(system = system.name(), count = entities.len(), "running system");
            system.update(self, entities, delta_time);
        }
        self.updating = false;

        let added = mem::replace(&mut self.systems, systems);
        self.systems.extend(added);
        self.tick_count += 1;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::components::{MovementSystem, Position, Velocity};

    /// Records the entities it saw each tick.
    struct Recorder {
        seen: Rc<RefCell<Vec<Vec<Entity>>>>,
    }

    impl System for Recorder {
        fn update(&mut self, _world: &mut World, entities: &[Entity], _delta_time: f32) {
            self.seen.borrow_mut().push(entities.to_vec());
        }
    }

    fn recorder(world: &mut World, required: ComponentsFilter) -> Rc<RefCell<Vec<Vec<Entity>>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        world.add_system(Recorder { seen: Rc::clone(&seen) }, required);
        seen
    }

    #[test]
    fn test_remove_component_scenario() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position::new(10.0, 10.0));
        world.add_component(e, Velocity::new(1.0, 0.0));

        assert!(world.remove_component::<Velocity>(e));

        assert!(!world.has_component::<Velocity>(e));
        assert!(world.has_component::<Position>(e));
        assert_eq!(world.component::<Position>(e).map(|p| p.x), Some(10.0));
    }

    #[test]
    fn test_entities_start_disabled() {
        let mut world = World::new();
        let seen = recorder(&mut world, ComponentsFilter::EMPTY);

        let e = world.create_entity();
        world.update(0.1);
        assert!(seen.borrow()[0].is_empty());
        assert!(!world.is_enabled(e));

        world.enable_entity(e);
        world.update(0.1);
        assert_eq!(seen.borrow()[1], vec![e]);
        assert_eq!(world.enabled_count(), 1);
    }

    #[test]
    fn test_filter_selects_entities() {
        let mut world = World::new();
        let seen = recorder(&mut world, MovementSystem::required());

        let mover = world.create_entity();
        world.add_component(mover, Position::default());
        world.add_component(mover, Velocity::new(1.0, 1.0));
        world.enable_entity(mover);

        let still = world.create_entity();
        world.add_component(still, Position::default());
        world.enable_entity(still);

        world.update(0.1);
        assert_eq!(seen.borrow()[0], vec![mover]);
    }

    #[test]
    fn test_destroy_is_deferred_to_next_flush() {
        struct Destroyer;
        impl System for Destroyer {
            fn update(&mut self, world: &mut World, entities: &[Entity], _dt: f32) {
                for &e in entities {
                    world.destroy_entity(e);
                }
            }
        }

        let mut world = World::new();
        world.add_system(Destroyer, ComponentsFilter::of::<Position>());
        let seen = recorder(&mut world, ComponentsFilter::of::<Position>());

        let e = world.create_entity();
        world.add_component(e, Position::new(1.0, 2.0));
        world.enable_entity(e);

        world.update(0.1);
        // The later system still saw the entity in the tick that destroyed it.
        assert_eq!(seen.borrow()[0], vec![e]);
        assert!(world.is_valid(e));
        assert_eq!(world.component::<Position>(e), Some(&Position::new(1.0, 2.0)));

        world.update(0.1);
        assert!(!world.is_valid(e));
        assert!(seen.borrow()[1].is_empty());
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    #[should_panic(expected = "World::refresh called from inside a system")]
    fn test_refresh_inside_tick_panics() {
        struct EagerDestroyer;
        impl System for EagerDestroyer {
            fn update(&mut self, world: &mut World, entities: &[Entity], _dt: f32) {
                if let Some(&first) = entities.first() {
                    world.destroy_entity(first);
                    world.refresh();
                }
            }
        }

        let mut world = World::new();
        world.add_system(EagerDestroyer, ComponentsFilter::of::<Position>());
        for _ in 0..3 {
            let e = world.create_entity();
            world.add_component(e, Position::default());
            world.enable_entity(e);
        }
        world.update(0.1);
    }

    #[test]
    fn test_destroyed_handle_stays_invalid_after_reuse() {
        let mut world = World::new();
        let e = world.create_entity();
        world.destroy_entity(e);
        world.refresh();

        let reused = world.create_entity();
        assert_eq!(reused.index(), e.index());
        assert_ne!(reused.generation(), e.generation());
        assert!(!world.is_valid(e));
        assert!(world.component::<Position>(e).is_none());
        assert!(!world.has_component::<Position>(reused));
    }

    #[test]
    fn test_stale_requests_are_skipped_at_flush() {
        let mut world = World::new();
        let e = world.create_entity();
        world.destroy_entity(e);
        world.destroy_entity(e);
        world.enable_entity(e);

        let stats = world.refresh();
        assert_eq!(stats.destroyed, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(world.enabled_count(), 0);
    }

    #[test]
    #[should_panic(expected = "invalid entity handle")]
    fn test_mutating_stale_handle_panics() {
        let mut world = World::new();
        let e = world.create_entity();
        world.destroy_entity(e);
        world.refresh();
        world.add_component(e, Position::default());
    }

    #[test]
    #[should_panic(expected = "invalid entity handle")]
    fn test_foreign_handle_panics() {
        let mut a = World::new();
        let mut b = World::new();
        let e = a.create_entity();
        b.enable_entity(e);
    }

    #[test]
    fn test_require_component_reports_absence() {
        let mut world = World::new();
        let e = world.create_entity();

        assert_eq!(
            world.require_component::<Velocity>(e),
            Err(EcsError::ComponentAbsent {
                entity: e,
                component: Velocity::NAME,
            })
        );
        world.add_component(e, Velocity::new(2.0, 0.0));
        assert!(world.require_component::<Velocity>(e).is_ok());
    }

    #[test]
    fn test_observers_see_state_when_event_fires() {
        let mut world = World::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&log);
        world.subscribe_fn(move |event, view| {
            let e = event.entity();
            let state = (
                *event,
                view.is_valid(e),
                view.is_enabled(e),
                view.component::<Position>(e).copied(),
            );
            sink.borrow_mut().push(state);
        });

        let e = world.create_entity();
        world.add_component(e, Position::new(3.0, 4.0));
        world.enable_entity(e);
        assert!(log.borrow().is_empty());

        world.refresh();
        world.notify_moved(e, Vec2::new(1.0, 0.0));
        world.disable_entity(e);
        world.destroy_entity(e);
        world.refresh();

        let p = Some(Position::new(3.0, 4.0));
        assert_eq!(
            *log.borrow(),
            vec![
                (WorldEvent::EntityEnabled(e), true, true, p),
                (
                    WorldEvent::EntityMoved {
                        entity: e,
                        offset: Vec2::new(1.0, 0.0)
                    },
                    true,
                    true,
                    p
                ),
                (WorldEvent::EntityDisabled(e), true, false, p),
                (WorldEvent::EntityDestroyed(e), true, false, p),
            ]
        );
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut world = World::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = world.subscribe_fn(move |_, _| *sink.borrow_mut() += 1);

        let e = world.create_entity();
        world.notify_moved(e, Vec2::ZERO);
        assert!(world.unsubscribe(id));
        assert!(!world.unsubscribe(id));
        world.notify_moved(e, Vec2::ZERO);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(world.observer_count(), 0);
    }

    #[test]
    fn test_system_added_mid_tick_runs_next_tick() {
        struct Spawner {
            seen: Rc<RefCell<Vec<Vec<Entity>>>>,
            done: bool,
        }
        impl System for Spawner {
            fn update(&mut self, world: &mut World, _entities: &[Entity], _dt: f32) {
                if !self.done {
                    self.done = true;
                    world.add_system(
                        Recorder {
                            seen: Rc::clone(&self.seen),
                        },
                        ComponentsFilter::EMPTY,
                    );
                }
            }
        }

        let mut world = World::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        world.add_system(
            Spawner {
                seen: Rc::clone(&seen),
                done: false,
            },
            ComponentsFilter::EMPTY,
        );

        world.update(0.1);
        assert!(seen.borrow().is_empty());
        assert_eq!(world.system_count(), 2);

        world.update(0.1);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_destroy_all_entities() {
        let mut world = World::with_capacity(2);
        let handles: Vec<_> = (0..5).map(|_| world.create_entity()).collect();
        for &e in &handles {
            world.add_component(e, Position::default());
            world.enable_entity(e);
        }
        world.refresh();
        assert_eq!(world.enabled_count(), 5);

        world.destroy_all_entities();
        let stats = world.refresh();
        assert_eq!(stats.destroyed, 5);
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.enabled_count(), 0);
        assert!(handles.iter().all(|&e| !world.is_valid(e)));
    }

    #[test]
    fn test_movement_system_integrates_and_notifies() {
        let mut world = World::new();
        world.add_system(MovementSystem, MovementSystem::required());

        let moves = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&moves);
        world.subscribe_fn(move |event, _| {
            if let WorldEvent::EntityMoved { offset, .. } = *event {
                sink.borrow_mut().push(offset);
            }
        });

        let e = world.create_entity();
        world.add_component(e, Position::new(10.0, 10.0));
        world.add_component(e, Velocity::new(2.0, -4.0));
        world.enable_entity(e);

        world.update(0.5);

        assert_eq!(world.component::<Position>(e), Some(&Position::new(11.0, 8.0)));
        assert_eq!(*moves.borrow(), vec![Vec2::new(1.0, -2.0)]);
        assert_eq!(world.tick_count(), 1);
    }
}
