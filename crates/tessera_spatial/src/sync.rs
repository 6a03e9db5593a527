//! # World ↔ Tree Synchronization
//!
//! [`ProxySync`] is a world observer that keeps one tree proxy per enabled
//! entity holding both [`Position`] and [`Extent`].
//!
//! ```text
//! EntityEnabled   -> insert proxy
//! EntityMoved     -> move proxy (insert if the entity just became trackable,
//!                    remove if its bounds became degenerate)
//! EntityDisabled  -> remove proxy
//! EntityDestroyed -> remove proxy
//! ```
//!
//! The tree is shared with readers through [`SharedTree`]. Do not hold a
//! borrow of it across a world call that can emit events.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use tessera_core::{Component, Entity, Position, SubscriptionId, World, WorldEvent, WorldObserver, WorldView};
use tessera_shared::{Rect, Vec2};
use tracing::{debug, warn};

use crate::tree::{DynamicAabbTree, ProxyId};

/// Tree of entity proxies shared between the sync observer and its readers.
pub type SharedTree = Rc<RefCell<DynamicAabbTree<Entity>>>;

/// Half-size of an entity's bounds around its [`Position`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Extent {
    /// Half of the width.
    pub half_width: f32,
    /// Half of the height.
    pub half_height: f32,
}

impl Component for Extent {
    const ID: u8 = 2;
    const NAME: &'static str = "extent";
}

impl Extent {
    /// Creates an extent from half sizes.
    #[inline]
    #[must_use]
    pub const fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    /// Creates an extent from a full width and height.
    #[inline]
    #[must_use]
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(width * 0.5, height * 0.5)
    }

    /// Bounds centered on `position`.
    #[must_use]
    pub fn bounds_at(self, position: Position) -> Rect {
        let half = Vec2::new(self.half_width, self.half_height);
        let center = position.as_vec2();
        Rect::new(center - half, center + half)
    }
}

/// Current bounds of an entity, if it has both components.
#[must_use]
pub fn entity_bounds(view: &WorldView<'_>, entity: Entity) -> Option<Rect> {
    let position = view.component::<Position>(entity)?;
    let extent = view.component::<Extent>(entity)?;
    Some(extent.bounds_at(*position))
}

/// Observer keeping the shared tree in step with the world.
pub struct ProxySync {
    tree: SharedTree,
    proxies: HashMap<Entity, ProxyId>,
}

impl ProxySync {
    /// Creates a sync over `tree` tracking nothing yet.
    #[must_use]
    pub fn new(tree: SharedTree) -> Self {
        Self {
            tree,
            proxies: HashMap::new(),
        }
    }

    /// Creates a sync, inserts proxies for entities that are already
    /// enabled, and subscribes it to `world`.
    pub fn attach(world: &mut World, tree: SharedTree) -> SubscriptionId {
        let mut sync = Self::new(tree);
        let view = world.view();
        for entity in world.entities().filter(|&e| view.is_enabled(e)) {
            sync.track(&view, entity);
        }
        debug!(tracked = sync.proxies.len(), "proxy sync attached");
        world.subscribe(sync)
    }

    /// Number of entities with a proxy.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.proxies.len()
    }

    /// Proxy of a tracked entity.
    #[must_use]
    pub fn proxy_of(&self, entity: Entity) -> Option<ProxyId> {
        self.proxies.get(&entity).copied()
    }

    fn track(&mut self, view: &WorldView<'_>, entity: Entity) {
        if self.proxies.contains_key(&entity) {
            return;
        }
        let Some(bounds) = entity_bounds(view, entity) else {
            return;
        };
        match self.tree.borrow_mut().insert(bounds, entity) {
            Ok(id) => {
                self.proxies.insert(entity, id);
            }
            Err(err) => warn!(%entity, %err, "entity not indexed"),
        }
    }

    fn untrack(&mut self, entity: Entity) {
        if let Some(id) = self.proxies.remove(&entity) {
            self.tree.borrow_mut().remove_proxy(id);
        }
    }

    fn moved(&mut self, view: &WorldView<'_>, entity: Entity, offset: Vec2) {
        let Some(&id) = self.proxies.get(&entity) else {
            if view.is_enabled(entity) {
                self.track(view, entity);
            }
            return;
        };

        let Some(bounds) = entity_bounds(view, entity) else {
            // Lost Position or Extent since it was indexed.
            self.untrack(entity);
            return;
        };
        let moved = self.tree.borrow_mut().move_proxy(id, bounds, offset);
        if let Err(err) = moved {
            // Re-indexed by the next move with valid bounds.
            warn!(%entity, %err, "entity dropped from index");
            self.untrack(entity);
        }
    }
}

impl WorldObserver for ProxySync {
    fn on_event(&mut self, event: &WorldEvent, world: &WorldView<'_>) {
        match *event {
            WorldEvent::EntityEnabled(entity) => self.track(world, entity),
            WorldEvent::EntityMoved { entity, offset } => self.moved(world, entity, offset),
            WorldEvent::EntityDisabled(entity) | WorldEvent::EntityDestroyed(entity) => {
                self.untrack(entity);
            }
        }
    }
}
