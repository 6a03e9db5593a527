//! # Entity Management
//!
//! Entities are lightweight handles consisting of:
//! - An index into component arrays
//! - A generation counter for safe reuse
//! - The id of the world that issued them

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Packed index + generation pair.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into component arrays
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

static NEXT_WORLD_ID: AtomicU32 = AtomicU32::new(0);

/// Identifies the world that owns an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct WorldId(u32);

impl WorldId {
    /// Owner of the null entity; never handed out to a world.
    pub const NONE: Self = Self(u32::MAX);

    /// Hands out a process-unique world id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logging.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Handle to an entity.
///
/// Two handles are equal iff index, generation and owning world match. A
/// handle whose generation no longer matches its slot refers to a destroyed
/// entity; it is only ever compared, never dereferenced.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    id: EntityId,
    world: WorldId,
}

impl Entity {
    /// Handle that is never valid in any world.
    pub const NULL: Self = Self {
        id: EntityId::NULL,
        world: WorldId::NONE,
    };

    /// Builds a handle from its parts.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId, world: WorldId) -> Self {
        Self { id, world }
    }

    /// Packed index + generation.
    #[inline]
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.id
    }

    /// Slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.id.index()
    }

    /// Slot generation at the time the handle was issued.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.id.generation()
    }

    /// Owning world.
    #[inline]
    #[must_use]
    pub const fn world(self) -> WorldId {
        self.world
    }

    /// Checks if this is the null handle.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.id.is_null()
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Entity(null)");
        }
        write!(
            f,
            "Entity({}v{}@w{})",
            self.index(),
            self.generation(),
            self.world.get()
        )
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Per-index bookkeeping.
#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Allocates and recycles entity indices.
///
/// Destroying an entity bumps its slot's generation before the index goes
/// back on the free list, so an old handle can never alias the entity that
/// later reuses the index.
pub struct EntityRegistry {
    owner: WorldId,
    slots: Vec<Slot>,
    free_indices: Vec<u32>,
    alive_count: usize,
}

impl EntityRegistry {
    /// Creates an empty registry issuing handles owned by `owner`.
    #[must_use]
    pub fn new(owner: WorldId) -> Self {
        Self::with_capacity(owner, 0)
    }

    /// Creates an empty registry with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(owner: WorldId, capacity: usize) -> Self {
        Self {
            owner,
            slots: Vec::with_capacity(capacity),
            free_indices: Vec::with_capacity(capacity),
            alive_count: 0,
        }
    }

    /// World id stamped on issued handles.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> WorldId {
        self.owner
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Number of slots ever allocated (live + free).
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Allocates a handle, reusing a free index when one is available.
    pub fn create(&mut self) -> Entity {
        let index = if let Some(index) = self.free_indices.pop() {
            index
        } else {
            let index = u32::try_from(self.slots.len())
                .ok()
                .filter(|&i| i != u32::MAX)
                .unwrap_or_else(|| panic!("entity index space exhausted"));
            self.slots.push(Slot::default());
            index
        };

        let slot = &mut self.slots[index as usize];
        slot.alive = true;
        self.alive_count += 1;

        Entity::new(EntityId::new(index, slot.generation), self.owner)
    }

    /// Destroys an entity.
    ///
    /// Returns `false` without touching anything if the handle is stale, from
    /// another world, or already dead.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.is_valid(entity) {
            return false;
        }

        let slot = &mut self.slots[entity.index() as usize];
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.alive_count -= 1;
        self.free_indices.push(entity.index());

        true
    }

    /// Checks if a handle refers to a live entity of this registry.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        if entity.world() != self.owner {
            return false;
        }
        self.slots
            .get(entity.index() as usize)
            .is_some_and(|slot| slot.alive && slot.generation == entity.generation())
    }

    /// Iterates over all live entities in index order.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        let owner = self.owner;
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            slot.alive
                .then(|| Entity::new(EntityId::new(index as u32, slot.generation), owner))
        })
    }

    /// Destroys every live entity.
    ///
    /// Generations are bumped as in [`destroy`](Self::destroy), so handles
    /// issued before the clear stay invalid forever.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.alive {
                slot.alive = false;
                slot.generation = slot.generation.wrapping_add(1);
                self.free_indices.push(index as u32);
            }
        }
        self.alive_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_roundtrip() {
        let id = EntityId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
    }

    #[test]
    fn test_create_destroy_reuses_index_with_new_generation() {
        let mut registry = EntityRegistry::new(WorldId::next());

        let first = registry.create();
        assert!(registry.is_valid(first));
        assert_eq!(registry.alive_count(), 1);

        assert!(registry.destroy(first));
        assert!(!registry.is_valid(first));

        let second = registry.create();
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert_ne!(second, first);
        assert!(!registry.is_valid(first));
        assert!(registry.is_valid(second));
    }

    #[test]
    fn test_destroy_stale_handle_is_noop() {
        let mut registry = EntityRegistry::new(WorldId::next());
        let e = registry.create();
        assert!(registry.destroy(e));
        assert!(!registry.destroy(e));

        let reused = registry.create();
        assert!(!registry.destroy(e));
        assert!(registry.is_valid(reused));
        assert_eq!(registry.alive_count(), 1);
    }

    #[test]
    fn test_foreign_and_null_handles_are_invalid() {
        let mut a = EntityRegistry::new(WorldId::next());
        let b = EntityRegistry::new(WorldId::next());
        let e = a.create();

        assert!(!b.is_valid(e));
        assert!(!a.is_valid(Entity::NULL));
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut registry = EntityRegistry::new(WorldId::next());
        let handles: Vec<_> = (0..8).map(|_| registry.create()).collect();

        registry.clear();

        assert_eq!(registry.alive_count(), 0);
        assert!(handles.iter().all(|&e| !registry.is_valid(e)));
        assert_eq!(registry.iter_alive().count(), 0);

        let fresh = registry.create();
        assert!(handles.iter().all(|&e| e != fresh));
    }
}
