//! # A* Pathfinder
//!
//! 4-connected A* over a [`Grid<u32>`] of weights: `0` is open, anything
//! else is blocked. Every step costs 1 and the heuristic is the Manhattan
//! distance, so returned paths are shortest.
//!
//! ## Determinism
//!
//! Neighbours are expanded up, down, left, right. Among open entries with
//! equal `f`, the one pushed first is expanded first. The same grid and
//! query always give the same path.
//!
//! ## Scratch memory
//!
//! Per-cell `g`, parent and closed marks live in vectors sized to the grid
//! and stamped with a search epoch, so starting a search does not clear them.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tessera_shared::Cell;
use tracing::{info, trace};

use crate::error::{NavError, NavResult};
use crate::grid::Grid;

const NO_PARENT: u32 = u32::MAX;

/// An entry in the open list.
#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: u32,
    /// Push order; breaks `f` ties first-in first-out.
    seq: u64,
    g: u32,
    index: u32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    // BinaryHeap is a max-heap: smallest (f, seq) must compare greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Per-cell search state, valid only where `visited == epoch`.
#[derive(Default)]
struct Scratch {
    epoch: u32,
    visited: Vec<u32>,
    closed: Vec<u32>,
    g: Vec<u32>,
    parent: Vec<u32>,
}

impl Scratch {
    fn reset(&mut self, len: usize) {
        self.epoch = 0;
        self.visited.clear();
        self.visited.resize(len, 0);
        self.closed.clear();
        self.closed.resize(len, 0);
        self.g.clear();
        self.g.resize(len, 0);
        self.parent.clear();
        self.parent.resize(len, NO_PARENT);
    }

    /// Starts a new search epoch.
    fn begin(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            // Stamps from 2^32 searches ago would look current.
            self.visited.fill(0);
            self.closed.fill(0);
            self.epoch = 1;
        }
    }

    #[inline]
    fn g(&self, index: usize) -> Option<u32> {
        (self.visited[index] == self.epoch).then(|| self.g[index])
    }

    #[inline]
    fn is_closed(&self, index: usize) -> bool {
        self.closed[index] == self.epoch
    }
}

/// Grid A* with reusable scratch memory.
pub struct GridPathfinder {
    grid: Grid<u32>,
    scratch: Scratch,
    open: BinaryHeap<OpenEntry>,
    last_expanded: usize,
}

impl GridPathfinder {
    /// Creates a pathfinder over `grid`.
    #[must_use]
    pub fn new(grid: Grid<u32>) -> Self {
        let mut scratch = Scratch::default();
        scratch.reset(grid.len());
        Self {
            grid,
            scratch,
            open: BinaryHeap::new(),
            last_expanded: 0,
        }
    }

    /// Replaces the weight grid. Search state sized to the old grid is dropped.
    pub fn set_grid(&mut self, grid: Grid<u32>) {
        info!(width = grid.width(), height = grid.height(), "navigation grid replaced");
        self.scratch.reset(grid.len());
        self.grid = grid;
    }

    /// Current weight grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid<u32> {
        &self.grid
    }

    /// Sets the weight of one cell. Returns `false` if it is outside the grid.
    pub fn set_weight(&mut self, cell: Cell, weight: u32) -> bool {
        self.grid.set(cell, weight)
    }

    /// True for blocked cells and cells outside the grid.
    #[must_use]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.grid.get(cell).map_or(true, |&weight| weight != 0)
    }

    /// Cells expanded by the most recent search.
    #[must_use]
    pub const fn last_expanded(&self) -> usize {
        self.last_expanded
    }

    /// Shortest path from `start` to `goal`, both inclusive.
    ///
    /// Returns an empty path when the goal is blocked, outside the grid, or
    /// not connected to the start. A blocked start cell is searched from
    /// anyway so an agent standing on a wall can still walk off it.
    pub fn find_path(&mut self, start: Cell, goal: Cell) -> Vec<Cell> {
        match self.try_find_path(start, goal) {
            Ok(path) => path,
            Err(err) => {
                trace!(%err, "no path");
                Vec::new()
            }
        }
    }

    /// Like [`find_path`](Self::find_path), naming why no path exists.
    ///
    /// # Errors
    ///
    /// [`NavError::OutOfBounds`] for a start or goal outside the grid,
    /// [`NavError::BlockedGoal`] for a blocked goal,
    /// [`NavError::UnreachableGoal`] when the search exhausts the open list.
    pub fn try_find_path(&mut self, start: Cell, goal: Cell) -> NavResult<Vec<Cell>> {
        self.last_expanded = 0;
        let start_index = self.grid.index(start).ok_or(NavError::OutOfBounds(start))?;
        let goal_index = self.grid.index(goal).ok_or(NavError::OutOfBounds(goal))?;
        if self.is_blocked(goal) {
            return Err(NavError::BlockedGoal(goal));
        }
        if start == goal {
            return Ok(vec![start]);
        }

        self.scratch.begin();
        self.open.clear();
        let mut seq = 0u64;

        self.scratch.visited[start_index] = self.scratch.epoch;
        self.scratch.g[start_index] = 0;
        self.scratch.parent[start_index] = NO_PARENT;
        self.open.push(OpenEntry {
            f: start.manhattan(goal),
            seq,
            g: 0,
            index: start_index as u32,
        });

        while let Some(entry) = self.open.pop() {
            let index = entry.index as usize;
            if self.scratch.is_closed(index) || self.scratch.g(index) != Some(entry.g) {
                continue;
            }
            self.scratch.closed[index] = self.scratch.epoch;
            self.last_expanded += 1;

            if index == goal_index {
                return Ok(self.reconstruct(goal_index));
            }

            let cell = self.grid.cell_of(index);
            let next_g = entry.g + 1;
            for offset in Cell::NEIGHBOR_OFFSETS {
                let neighbor = cell.offset(offset);
                let Some(neighbor_index) = self.grid.index(neighbor) else {
                    continue;
                };
                if self.grid.get(neighbor) != Some(&0) || self.scratch.is_closed(neighbor_index) {
                    continue;
                }
                if self.scratch.g(neighbor_index).is_some_and(|g| g <= next_g) {
                    continue;
                }

                self.scratch.visited[neighbor_index] = self.scratch.epoch;
                self.scratch.g[neighbor_index] = next_g;
                self.scratch.parent[neighbor_index] = entry.index;
                seq += 1;
                self.open.push(OpenEntry {
                    f: next_g + neighbor.manhattan(goal),
                    seq,
                    g: next_g,
                    index: neighbor_index as u32,
                });
            }
        }

        Err(NavError::UnreachableGoal { start, goal })
    }

    fn reconstruct(&self, goal_index: usize) -> Vec<Cell> {
        let mut path = Vec::with_capacity(self.scratch.g[goal_index] as usize + 1);
        let mut index = goal_index as u32;
        while index != NO_PARENT {
            path.push(self.grid.cell_of(index as usize));
            index = self.scratch.parent[index as usize];
        }
        path.reverse();
        path
    }

    /// Closest open cell to `cell` by Manhattan distance, at most
    /// `max_radius` away. Returns `cell` itself when it is open.
    ///
    /// Cells at equal distance are tried left to right, top to bottom.
    /// Returns `None` when the grid lies entirely beyond `max_radius`.
    #[must_use]
    pub fn nearest_open_cell(&self, cell: Cell, max_radius: u32) -> Option<Cell> {
        if !self.is_blocked(cell) {
            return Some(cell);
        }
        let (width, height) = (self.grid.width(), self.grid.height());
        if width == 0 || height == 0 {
            return None;
        }
        let clamped = Cell::new(
            cell.x.clamp(0, (width - 1) as i32),
            cell.y.clamp(0, (height - 1) as i32),
        );
        if cell.manhattan(clamped) > max_radius {
            return None;
        }
        let max_radius = max_radius.min(self.grid.width() + self.grid.height()) as i32;
        for radius in 1..=max_radius {
            for dx in -radius..=radius {
                let dy = radius - dx.abs();
                let upper = cell.offset(Cell::new(dx, -dy));
                if !self.is_blocked(upper) {
                    return Some(upper);
                }
                let lower = cell.offset(Cell::new(dx, dy));
                if dy != 0 && !self.is_blocked(lower) {
                    return Some(lower);
                }
            }
        }
        None
    }
}
