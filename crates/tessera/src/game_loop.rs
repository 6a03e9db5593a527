//! # Fixed-Step Driver
//!
//! ```text
//! step(dt):
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. ACCUMULATE                                                       │
//! │    └─ Add wall-clock dt (clamped) to the tick accumulator           │
//! │                                                                     │
//! │ 2. TICK (repeated while a whole tick is banked, up to max_substeps) │
//! │    ├─ Flush deferred enable/disable/destroy                         │
//! │    ├─ TargetFollowSystem: plan paths, write Velocity                │
//! │    └─ MovementSystem: integrate Position, notify movement           │
//! │         └─ ProxySync refits the AABB tree                           │
//! │         └─ ChannelObserver forwards to the EventBus                 │
//! │                                                                     │
//! │ 3. REPORT                                                           │
//! │    └─ FrameStats: ticks run, backlog dropped, interpolation alpha   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering, input and audio live outside; they read the world between
//! steps and consume the event bus.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tessera_core::{Entity, MovementSystem, SubscriptionId, World};
use tessera_nav::{Grid, GridPathfinder, SharedPathfinder, TargetFollow, TargetFollowSystem};
use tessera_shared::Rect;
use tessera_spatial::{DynamicAabbTree, ProxySync, SharedTree};
use tracing::{debug, info};

use crate::config::{ConfigResult, KernelConfig};
use crate::events::{ChannelObserver, EventBus, EventReceiver};

/// Longest wall-clock step accepted, in seconds. Longer pauses (debugger,
/// window drag) are not replayed.
pub const MAX_FRAME_SECONDS: f32 = 0.25;

/// What one [`GameLoop::step`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// Simulation ticks run during this step.
    pub ticks: u32,
    /// True when `max_substeps` was hit and the remaining backlog discarded.
    pub saturated: bool,
    /// Fraction of a tick left banked, for render interpolation.
    pub alpha: f32,
    /// Live entities after the step.
    pub entities: usize,
    /// Enabled entities after the step.
    pub enabled: usize,
    /// Proxies in the spatial index after the step.
    pub proxies: usize,
}

/// Totals over every recorded frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames stepped.
    pub frames: u64,
    /// Ticks run.
    pub ticks: u64,
    /// Most ticks a single frame ran.
    pub max_ticks_per_frame: u32,
    /// Frames that hit `max_substeps`.
    pub saturated_frames: u64,
}

impl LoopStats {
    /// Adds one frame.
    pub fn record(&mut self, frame: &FrameStats) {
        self.frames += 1;
        self.ticks += u64::from(frame.ticks);
        self.max_ticks_per_frame = self.max_ticks_per_frame.max(frame.ticks);
        if frame.saturated {
            self.saturated_frames += 1;
        }
    }

    /// Mean ticks per frame.
    #[must_use]
    pub fn avg_ticks_per_frame(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.ticks as f64 / self.frames as f64
    }
}

/// Owns the world and its collaborators and advances them at a fixed rate.
pub struct GameLoop {
    world: World,
    tree: SharedTree,
    pathfinder: SharedPathfinder,
    events: EventBus,
    proxy_sync: SubscriptionId,
    config: KernelConfig,
    tick_seconds: f32,
    accumulator: f32,
    frame_count: u64,
    stats: LoopStats,
}

impl GameLoop {
    /// Builds the kernel described by `config`.
    ///
    /// The world starts empty with target following and movement registered
    /// in that order, the spatial index attached, and an open navigation grid.
    ///
    /// # Errors
    ///
    /// Returns the first problem found by [`KernelConfig::validate`].
    pub fn new(config: KernelConfig) -> ConfigResult<Self> {
        config.validate()?;

        let mut world = World::with_capacity(config.world.capacity);
        let tree: SharedTree = Rc::new(RefCell::new(DynamicAabbTree::with_capacity(
            config.spatial,
            config.world.capacity,
        )));
        let pathfinder: SharedPathfinder = Rc::new(RefCell::new(GridPathfinder::new(Grid::new(
            config.navigation.width,
            config.navigation.height,
        ))));

        world.add_system(
            TargetFollowSystem::new(Rc::clone(&pathfinder), config.navigation.cell_size),
            TargetFollowSystem::required(),
        );
        world.add_system(MovementSystem, MovementSystem::required());
        let proxy_sync = ProxySync::attach(&mut world, Rc::clone(&tree));

        let events = EventBus::new(config.game_loop.event_capacity);
        world.subscribe(ChannelObserver::new(events.sender()));

        info!(
            tick_rate = config.game_loop.tick_rate,
            capacity = config.world.capacity,
            grid_width = config.navigation.width,
            grid_height = config.navigation.height,
            "game loop created"
        );

        Ok(Self {
            world,
            tree,
            pathfinder,
            events,
            proxy_sync,
            tick_seconds: config.tick_seconds(),
            config,
            accumulator: 0.0,
            frame_count: 0,
            stats: LoopStats::default(),
        })
    }

    /// Advances by `delta_seconds` of wall-clock time, running as many fixed
    /// ticks as fit.
    ///
    /// Negative or non-finite input counts as zero; input above
    /// [`MAX_FRAME_SECONDS`] is clamped.
    pub fn step(&mut self, delta_seconds: f32) -> FrameStats {
        let delta = if delta_seconds.is_finite() {
            delta_seconds.clamp(0.0, MAX_FRAME_SECONDS)
        } else {
            0.0
        };
        self.accumulator += delta;

        let mut ticks = 0;
        while self.accumulator >= self.tick_seconds && ticks < self.config.game_loop.max_substeps {
            self.tick();
            self.accumulator -= self.tick_seconds;
            ticks += 1;
        }

        let saturated = self.accumulator >= self.tick_seconds;
        if saturated {
            debug!(
                frame = self.frame_count,
                backlog = self.accumulator,
                "tick backlog dropped"
            );
            self.accumulator %= self.tick_seconds;
        }

        let stats = FrameStats {
            frame: self.frame_count,
            ticks,
            saturated,
            alpha: self.accumulator / self.tick_seconds,
            entities: self.world.entity_count(),
            enabled: self.world.enabled_count(),
            proxies: self.tree.borrow().len(),
        };
        self.frame_count += 1;
        self.stats.record(&stats);
        stats
    }

    /// Runs exactly one fixed tick, ignoring the accumulator.
    pub fn tick(&mut self) {
        self.world.update(self.tick_seconds);
    }

    /// Entities whose tight bounds overlap `region`, in tree visit order.
    #[must_use]
    pub fn query_region(&self, region: &Rect) -> Vec<Entity> {
        let mut hits = Vec::new();
        self.tree.borrow().query_tight(region, |_, &entity| {
            hits.push(entity);
            true
        });
        hits
    }

    /// Replaces the navigation grid. Every follower plans afresh on its next
    /// tick.
    pub fn set_navigation_grid(&mut self, grid: Grid<u32>) {
        self.pathfinder.borrow_mut().set_grid(grid);

        let followers: Vec<Entity> = self
            .world
            .entities()
            .filter(|&e| self.world.has_component::<TargetFollow>(e))
            .collect();
        for entity in &followers {
            if let Some(follow) = self.world.component_mut::<TargetFollow>(*entity) {
                follow.replan();
            }
        }
        debug!(followers = followers.len(), "followers reset after grid swap");
    }

    /// The simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world, for spawning and editing between steps.
    #[must_use]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Read access to the spatial index.
    ///
    /// # Panics
    ///
    /// Panics if called while the index is being updated, which only happens
    /// from inside a world observer.
    #[must_use]
    pub fn tree(&self) -> Ref<'_, DynamicAabbTree<Entity>> {
        self.tree.borrow()
    }

    /// Shared handle to the pathfinder, for direct path queries.
    #[must_use]
    pub fn pathfinder(&self) -> SharedPathfinder {
        Rc::clone(&self.pathfinder)
    }

    /// Subscription of the spatial index on the world.
    #[must_use]
    pub const fn proxy_sync(&self) -> SubscriptionId {
        self.proxy_sync
    }

    /// Creates a receiver on the outbound event bus.
    #[must_use]
    pub fn event_receiver(&self) -> EventReceiver {
        self.events.receiver()
    }

    /// The configuration the loop was built from.
    #[must_use]
    pub const fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Length of one tick in seconds.
    #[must_use]
    pub const fn tick_seconds(&self) -> f32 {
        self.tick_seconds
    }

    /// Frames stepped so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Totals over all frames.
    #[must_use]
    pub const fn stats(&self) -> &LoopStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, GameLoopConfig};
    use tessera_core::{Position, Velocity};
    use tessera_shared::Cell;
    use tessera_spatial::Extent;

    fn config(tick_rate: u32, max_substeps: u32) -> KernelConfig {
        KernelConfig {
            game_loop: GameLoopConfig {
                tick_rate,
                max_substeps,
                ..GameLoopConfig::default()
            },
            ..KernelConfig::default()
        }
    }

    #[test]
    fn test_new_wires_systems_and_observers() {
        let game = GameLoop::new(KernelConfig::default()).unwrap();
        assert_eq!(game.world().system_count(), 2);
        assert_eq!(game.world().observer_count(), 2);
        assert_eq!(game.frame_count(), 0);
        assert!(game.tree().is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = GameLoop::new(config(0, 4));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_step_runs_whole_ticks_and_banks_remainder() {
        let mut game = GameLoop::new(config(10, 8)).unwrap();

        let stats = game.step(0.25);
        assert_eq!(stats.ticks, 2);
        assert!(!stats.saturated);
        assert!(stats.alpha > 0.4 && stats.alpha < 0.6);

        let stats = game.step(0.06);
        assert_eq!(stats.ticks, 1);
        assert_eq!(game.world().tick_count(), 3);
        assert_eq!(game.stats().frames, 2);
    }

    #[test]
    fn test_step_drops_backlog_beyond_max_substeps() {
        let mut game = GameLoop::new(config(60, 4)).unwrap();

        let stats = game.step(0.2);
        assert_eq!(stats.ticks, 4);
        assert!(stats.saturated);
        assert!(stats.alpha < 1.0);

        // The dropped backlog is not replayed.
        let stats = game.step(0.0);
        assert_eq!(stats.ticks, 0);
        assert_eq!(game.stats().saturated_frames, 1);
    }

    #[test]
    fn test_step_ignores_bad_deltas() {
        let mut game = GameLoop::new(config(60, 8)).unwrap();
        assert_eq!(game.step(-1.0).ticks, 0);
        assert_eq!(game.step(f32::NAN).ticks, 0);
        assert_eq!(game.step(f32::INFINITY).ticks, 0);
        assert_eq!(game.world().tick_count(), 0);
    }

    #[test]
    fn test_moving_entity_is_found_by_region_query() {
        let mut game = GameLoop::new(config(10, 8)).unwrap();
        let world = game.world_mut();
        let e = world.create_entity();
        world.add_component(e, Position::new(0.0, 0.0));
        world.add_component(e, Velocity::new(100.0, 0.0));
        world.add_component(e, Extent::new(1.0, 1.0));
        world.enable_entity(e);

        // One tick flushes the enable and moves 10 units.
        game.tick();
        assert_eq!(
            game.world().component::<Position>(e),
            Some(&Position::new(10.0, 0.0))
        );
        assert_eq!(game.query_region(&Rect::from_min_max(8.0, -2.0, 12.0, 2.0)), vec![e]);
        assert!(game.query_region(&Rect::from_min_max(-2.0, -2.0, 2.0, 2.0)).is_empty());
    }

    #[test]
    fn test_grid_swap_resets_follower_paths() {
        let mut game = GameLoop::new(KernelConfig::default()).unwrap();
        let cell = game.config().navigation.cell_size;
        let world = game.world_mut();
        let e = world.create_entity();
        world.add_component(e, Position::from(Cell::new(0, 0).center(cell)));
        world.add_component(e, Velocity::default());
        world.add_component(
            e,
            TargetFollow::new(
                tessera_nav::FollowTarget::Point(Cell::new(6, 0).center(cell)),
                32.0,
                4.0,
            ),
        );
        world.enable_entity(e);

        game.tick();
        let follow = game.world().component::<TargetFollow>(e).unwrap();
        assert_eq!(follow.goal(), Some(Cell::new(6, 0)));

        game.set_navigation_grid(Grid::new(8, 8));
        let follow = game.world().component::<TargetFollow>(e).unwrap();
        assert_eq!(follow.goal(), None);
        assert_eq!(game.pathfinder().borrow().grid().width(), 8);
    }
}
