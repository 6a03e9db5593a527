//! # Target Following
//!
//! [`TargetFollow`] makes an entity walk toward another entity or a fixed
//! point along grid paths. [`TargetFollowSystem`] plans with a shared
//! [`GridPathfinder`] and steers by writing the entity's [`Velocity`];
//! [`MovementSystem`](tessera_core::MovementSystem) does the moving.
//!
//! Register the follow system before the movement system so the velocity it
//! writes is applied in the same tick.

use std::cell::RefCell;
use std::rc::Rc;

use tessera_core::{Component, ComponentsFilter, Entity, Position, System, Velocity, World};
use tessera_shared::{Cell, Vec2};
use tracing::{debug, trace};

use crate::astar::GridPathfinder;
use crate::grid::cell_at;

/// Pathfinder shared between follow systems and whoever swaps its grid.
pub type SharedPathfinder = Rc<RefCell<GridPathfinder>>;

/// A reached follower stays put until its target drifts beyond
/// `min_distance` times this factor.
const REACHED_HYSTERESIS: f32 = 1.5;

/// How far from a blocked target cell to look for open ground, in cells.
const GOAL_SEARCH_RADIUS: u32 = 1;

/// What a follower walks toward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FollowTarget {
    /// Another entity's [`Position`], re-read every tick.
    Entity(Entity),
    /// A fixed world-space point.
    Point(Vec2),
}

/// Progress of a follower.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FollowState {
    /// No target set.
    #[default]
    Idle,
    /// Walking along a path.
    Following,
    /// Within `min_distance` of the target.
    Reached,
    /// The target is gone or cannot be reached.
    Lost,
}

/// Follow behaviour of one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetFollow {
    target: Option<FollowTarget>,
    /// Distance at which the target counts as reached.
    pub min_distance: f32,
    /// Walking speed in world units per second.
    pub speed: f32,
    /// Remaining cells, goal first and next waypoint last.
    path: Vec<Cell>,
    state: FollowState,
}

impl Component for TargetFollow {
    const ID: u8 = 3;
    const NAME: &'static str = "target_follow";
}

impl Default for TargetFollow {
    fn default() -> Self {
        Self {
            target: None,
            min_distance: 8.0,
            speed: 64.0,
            path: Vec::new(),
            state: FollowState::Idle,
        }
    }
}

impl TargetFollow {
    /// Follows `target` at `speed` until within `min_distance`.
    #[must_use]
    pub fn new(target: FollowTarget, speed: f32, min_distance: f32) -> Self {
        Self {
            target: Some(target),
            min_distance,
            speed,
            path: Vec::new(),
            state: FollowState::Following,
        }
    }

    /// Current target.
    #[must_use]
    pub const fn target(&self) -> Option<FollowTarget> {
        self.target
    }

    /// Replaces the target and drops the current path.
    pub fn set_target(&mut self, target: FollowTarget) {
        self.target = Some(target);
        self.path.clear();
        self.state = FollowState::Following;
    }

    /// Stops following.
    pub fn clear_target(&mut self) {
        self.target = None;
        self.path.clear();
        self.state = FollowState::Idle;
    }

    /// Drops the current path so the next tick plans afresh. Needed after the
    /// grid changes under an unchanged goal.
    pub fn replan(&mut self) {
        self.path.clear();
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> FollowState {
        self.state
    }

    /// Remaining waypoints in walking order.
    pub fn waypoints(&self) -> impl Iterator<Item = Cell> + '_ {
        self.path.iter().rev().copied()
    }

    /// Cell the current path leads to.
    #[must_use]
    pub fn goal(&self) -> Option<Cell> {
        self.path.first().copied()
    }

    fn stop(&mut self, state: FollowState) {
        self.path.clear();
        self.state = state;
    }
}

/// Plans and steers every enabled entity with [`TargetFollow`].
pub struct TargetFollowSystem {
    pathfinder: SharedPathfinder,
    cell_size: f32,
}

impl TargetFollowSystem {
    /// Creates the system over a shared pathfinder and grid cell size.
    #[must_use]
    pub fn new(pathfinder: SharedPathfinder, cell_size: f32) -> Self {
        Self {
            pathfinder,
            cell_size,
        }
    }

    /// Components an entity needs to follow.
    #[must_use]
    pub const fn required() -> ComponentsFilter {
        ComponentsFilter::of::<Position>()
            .with::<Velocity>()
            .with::<TargetFollow>()
    }

    fn resolve(world: &World, target: FollowTarget) -> Option<Vec2> {
        match target {
            FollowTarget::Point(point) => Some(point),
            FollowTarget::Entity(entity) => world.component::<Position>(entity).map(|p| p.as_vec2()),
        }
    }

    /// Steering for one follower. Returns the velocity to apply.
    fn steer(&self, follow: &mut TargetFollow, position: Vec2, target: Vec2) -> Vec2 {
        let distance = position.distance(target);
        if follow.state == FollowState::Reached
            && distance < follow.min_distance * REACHED_HYSTERESIS
        {
            return Vec2::ZERO;
        }
        if distance <= follow.min_distance {
            follow.stop(FollowState::Reached);
            return Vec2::ZERO;
        }

        let start = cell_at(position, self.cell_size);
        let target_cell = cell_at(target, self.cell_size);
        let mut pathfinder = self.pathfinder.borrow_mut();
        let Some(goal) = pathfinder.nearest_open_cell(target_cell, GOAL_SEARCH_RADIUS) else {
            follow.stop(FollowState::Lost);
            return Vec2::ZERO;
        };

        if follow.goal() != Some(goal) {
            let mut path = pathfinder.find_path(start, goal);
            debug!(?start, ?goal, len = path.len(), "follower replanned");
            if path.is_empty() {
                follow.stop(FollowState::Lost);
                return Vec2::ZERO;
            }
            path.reverse();
            // The follower already stands in the start cell.
            if path.len() > 1 {
                path.pop();
            }
            follow.path = path;
        }
        drop(pathfinder);

        let arrive_radius = self.cell_size / 4.0;
        while let Some(&next) = follow.path.last() {
            if follow.path.len() > 1 && position.distance(next.center(self.cell_size)) < arrive_radius {
                follow.path.pop();
            } else {
                break;
            }
        }

        // Inside the goal cell, head for the target itself.
        let waypoint = match follow.path.last() {
            Some(&next) if follow.path.len() > 1 || next != target_cell => next.center(self.cell_size),
            _ => target,
        };

        follow.state = FollowState::Following;
        (waypoint - position).normalized_or_zero() * follow.speed
    }
}

impl System for TargetFollowSystem {
    fn update(&mut self, world: &mut World, entities: &[Entity], _delta_time: f32) {
        for &entity in entities {
            let Some(position) = world.component::<Position>(entity).map(|p| p.as_vec2()) else {
                continue;
            };
            let Some(follow) = world.component::<TargetFollow>(entity) else {
                continue;
            };
            let Some(target) = follow.target else {
                continue;
            };
            let resolved = Self::resolve(world, target);

            let Some(follow) = world.component_mut::<TargetFollow>(entity) else {
                continue;
            };
            let velocity = match resolved {
                Some(target_position) => self.steer(follow, position, target_position),
                None => {
                    trace!(%entity, "follow target lost");
                    follow.stop(FollowState::Lost);
                    Vec2::ZERO
                }
            };

            if let Some(v) = world.component_mut::<Velocity>(entity) {
                *v = Velocity::from(velocity);
            }
        }
    }

    fn name(&self) -> &str {
        "target_follow"
    }
}
