//! # Built-in Motion Components
//!
//! Position and velocity in 2D world space, plus the system that integrates
//! one into the other.

use bytemuck::{Pod, Zeroable};
use tessera_shared::Vec2;

use crate::ecs::{Component, ComponentsFilter, Entity, System, World};

/// Position component for entities.
///
/// Represents a 2D position in world space, in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Position {
    /// X coordinate in world space.
    pub x: f32,
    /// Y coordinate in world space.
    pub y: f32,
}

impl Component for Position {
    const ID: u8 = 0;
    const NAME: &'static str = "position";
}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Position as a vector.
    #[inline]
    #[must_use]
    pub const fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Returns the squared distance to another position.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<Vec2> for Position {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Velocity component for entities, in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Velocity {
    /// X velocity.
    pub dx: f32,
    /// Y velocity.
    pub dy: f32,
}

impl Component for Velocity {
    const ID: u8 = 1;
    const NAME: &'static str = "velocity";
}

impl Velocity {
    /// Creates a new velocity.
    #[inline]
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Velocity as a vector.
    #[inline]
    #[must_use]
    pub const fn as_vec2(self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }
}

impl From<Vec2> for Velocity {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Integrates `Position` by `Velocity` and reports each non-zero step through
/// [`World::notify_moved`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MovementSystem;

impl MovementSystem {
    /// Components an entity needs to be moved.
    #[must_use]
    pub const fn required() -> ComponentsFilter {
        ComponentsFilter::of::<Position>().with::<Velocity>()
    }
}

impl System for MovementSystem {
    fn update(&mut self, world: &mut World, entities: &[Entity], delta_time: f32) {
        for &entity in entities {
            let Some(velocity) = world.component::<Velocity>(entity).copied() else {
                continue;
            };
            let offset = velocity.as_vec2() * delta_time;
            if offset == Vec2::ZERO {
                continue;
            }
            let Some(position) = world.component_mut::<Position>(entity) else {
                continue;
            };
            position.x += offset.x;
            position.y += offset.y;
            world.notify_moved(entity, offset);
        }
    }

    fn name(&self) -> &str {
        "movement"
    }
}
