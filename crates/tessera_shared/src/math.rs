//! Mathematical types shared by every kernel crate.
//!
//! Everything here is plain old data: `Copy`, `Pod`, and serializable so the
//! same values can flow through config files and component storage.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 2D Vector - positions, offsets, displacements
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Returns the unit vector pointing the same way, or zero for a zero vector.
    #[must_use]
    pub fn normalized_or_zero(self) -> Self {
        let len = self.length();
        if len > f32::EPSILON {
            self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    /// True when both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

// =============================================================================
// RECT (Axis-Aligned Bounding Box)
// =============================================================================

/// Axis-aligned rectangle given by its minimum and maximum corners.
///
/// Overlap tests are inclusive: rectangles that share only an edge overlap.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum corner (left, top).
    pub min: Vec2,
    /// Maximum corner (right, bottom).
    pub max: Vec2,
}

impl Rect {
    /// Creates a rectangle from its corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a rectangle from corner coordinates.
    #[must_use]
    pub const fn from_min_max(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self::new(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
    }

    /// Creates a rectangle from a position and a size.
    #[must_use]
    pub fn from_origin_size(origin: Vec2, width: f32, height: f32) -> Self {
        Self::new(origin, Vec2::new(origin.x + width, origin.y + height))
    }

    /// Width along X.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height along Y.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    /// Perimeter; the 2D analogue of surface area used by tree cost heuristics.
    #[must_use]
    pub fn perimeter(&self) -> f32 {
        2.0 * (self.width() + self.height())
    }

    /// True when the rectangle has finite corners and strictly positive extent.
    #[must_use]
    pub fn is_proper(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.width() > 0.0 && self.height() > 0.0
    }

    /// Checks whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains(&self, other: &Rect) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Checks whether a point lies inside this rectangle.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.min.x <= point.x && point.x <= self.max.x && self.min.y <= point.y && point.y <= self.max.y
    }

    /// Checks if this rectangle overlaps another.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Smallest rectangle enclosing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    /// Grows every side by `margin`.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Rect {
        Rect::new(
            Vec2::new(self.min.x - margin, self.min.y - margin),
            Vec2::new(self.max.x + margin, self.max.y + margin),
        )
    }

    /// Stretches the rectangle along `displacement`, only on the side it points to.
    #[must_use]
    pub fn extended_by(&self, displacement: Vec2) -> Rect {
        let mut out = *self;
        if displacement.x < 0.0 {
            out.min.x += displacement.x;
        } else {
            out.max.x += displacement.x;
        }
        if displacement.y < 0.0 {
            out.min.y += displacement.y;
        } else {
            out.max.y += displacement.y;
        }
        out
    }

    /// Moves the rectangle by `delta`.
    #[must_use]
    pub fn translated(&self, delta: Vec2) -> Rect {
        Rect::new(self.min + delta, self.max + delta)
    }
}

// =============================================================================
// CELL (Integer grid coordinate)
// =============================================================================

/// Integer coordinate of a grid cell.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct Cell {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Cell {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four axis neighbours in a fixed order: up, down, left, right.
    pub const NEIGHBOR_OFFSETS: [Cell; 4] = [
        Cell::new(0, -1),
        Cell::new(0, 1),
        Cell::new(-1, 0),
        Cell::new(1, 0),
    ];

    /// Returns this cell moved by `offset`, saturating at the `i32` range.
    #[must_use]
    pub const fn offset(self, offset: Cell) -> Cell {
        Cell::new(
            self.x.saturating_add(offset.x),
            self.y.saturating_add(offset.y),
        )
    }

    /// Manhattan distance between two cells.
    #[must_use]
    pub const fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Center of this cell in world space for square cells of `cell_size`.
    #[must_use]
    pub fn center(self, cell_size: f32) -> Vec2 {
        Vec2::new(
            (self.x as f32 + 0.5) * cell_size,
            (self.y as f32 + 0.5) * cell_size,
        )
    }
}
