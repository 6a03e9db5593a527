//! # Cell Grid
//!
//! Dense row-major 2D array addressed by [`Cell`]. Cell `(x, y)` lives at
//! `y * width + x`; `(0, 0)` is the top-left corner.

use tessera_shared::{Cell, Vec2};

use crate::error::{NavError, NavResult};

/// Cell containing a world-space position for square cells of `cell_size`.
///
/// Positions left of or above the origin map to negative cells.
#[must_use]
pub fn cell_at(position: Vec2, cell_size: f32) -> Cell {
    Cell::new(
        (position.x / cell_size).floor() as i32,
        (position.y / cell_size).floor() as i32,
    )
}

/// Row-major grid of `T`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a grid filled with `T::default()`.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, T::default())
    }

    /// Resizes the grid, keeping cells that lie inside both the old and the
    /// new extent and defaulting the rest.
    pub fn resize(&mut self, width: u32, height: u32) {
        let mut resized = Self::new(width, height);
        for y in 0..self.height.min(height) {
            for x in 0..self.width.min(width) {
                let cell = Cell::new(x as i32, y as i32);
                if let (Some(from), Some(to)) = (self.index(cell), resized.index(cell)) {
                    resized.cells[to] = self.cells[from].clone();
                }
            }
        }
        *self = resized;
    }

    /// Resets every cell to `T::default()`.
    pub fn clear(&mut self) {
        self.cells.fill(T::default());
    }
}

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    #[must_use]
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width as usize * height as usize],
        }
    }

    /// Builds a grid from rows, top row first.
    ///
    /// # Errors
    ///
    /// [`NavError::RaggedGrid`] if the rows differ in length.
    pub fn from_rows(rows: &[Vec<T>]) -> NavResult<Self> {
        let expected = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(expected * rows.len());
        for (row, values) in rows.iter().enumerate() {
            if values.len() != expected {
                return Err(NavError::RaggedGrid {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }

        Ok(Self {
            width: expected as u32,
            height: rows.len() as u32,
            cells,
        })
    }
}

impl<T> Grid<T> {
    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the grid has no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Checks whether a cell lies inside the grid.
    #[inline]
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    /// Flat index of a cell inside the grid.
    #[inline]
    #[must_use]
    pub fn index(&self, cell: Cell) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.y as usize * self.width as usize + cell.x as usize)
    }

    /// Cell at a flat index.
    #[inline]
    #[must_use]
    pub fn cell_of(&self, index: usize) -> Cell {
        let width = self.width.max(1) as usize;
        Cell::new((index % width) as i32, (index / width) as i32)
    }

    /// Value of a cell.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.index(cell).map(|i| &self.cells[i])
    }

    /// Mutable value of a cell.
    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
        self.index(cell).map(|i| &mut self.cells[i])
    }

    /// Sets a cell. Returns `false` if the cell is outside the grid.
    pub fn set(&mut self, cell: Cell, value: T) -> bool {
        match self.get_mut(cell) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Cell containing `position` if it lies inside the grid.
    #[must_use]
    pub fn cell_at(&self, position: Vec2, cell_size: f32) -> Option<Cell> {
        let cell = cell_at(position, cell_size);
        self.contains(cell).then_some(cell)
    }

    /// Iterates over cells and their values in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, value)| (self.cell_of(i), value))
    }
}

impl Grid<u32> {
    /// Parses a weight grid from text: `#` is a wall (weight 1), any other
    /// character is open floor. Blank lines and surrounding whitespace are
    /// ignored.
    ///
    /// # Errors
    ///
    /// [`NavError::RaggedGrid`] if the lines differ in length.
    pub fn from_ascii(text: &str) -> NavResult<Self> {
        let rows: Vec<Vec<u32>> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().map(|c| u32::from(c == '#')).collect())
            .collect();
        Self::from_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing_is_row_major() {
        let mut grid: Grid<u32> = Grid::new(4, 3);
        assert!(grid.set(Cell::new(3, 1), 9));
        assert_eq!(grid.index(Cell::new(3, 1)), Some(7));
        assert_eq!(grid.get(Cell::new(3, 1)), Some(&9));
        assert_eq!(grid.cell_of(7), Cell::new(3, 1));

        assert!(!grid.set(Cell::new(4, 0), 1));
        assert!(grid.get(Cell::new(-1, 0)).is_none());
        assert!(grid.get(Cell::new(0, 3)).is_none());
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert_eq!(
            Grid::from_rows(&[vec![0u32, 0], vec![0]]),
            Err(NavError::RaggedGrid {
                row: 1,
                expected: 2,
                found: 1,
            })
        );
        let grid = Grid::from_rows(&[vec![1u32, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.get(Cell::new(0, 1)), Some(&4));
    }

    #[test]
    fn test_cell_at_uses_both_axes() {
        assert_eq!(cell_at(Vec2::new(70.0, 5.0), 32.0), Cell::new(2, 0));
        assert_eq!(cell_at(Vec2::new(5.0, 70.0), 32.0), Cell::new(0, 2));
        assert_eq!(cell_at(Vec2::new(-1.0, 0.0), 32.0), Cell::new(-1, 0));

        let grid: Grid<u32> = Grid::new(2, 2);
        assert_eq!(grid.cell_at(Vec2::new(40.0, 40.0), 32.0), Some(Cell::new(1, 1)));
        assert_eq!(grid.cell_at(Vec2::new(70.0, 0.0), 32.0), None);
    }

    #[test]
    fn test_resize_keeps_overlap() {
        let mut grid = Grid::from_rows(&[vec![1u32, 2], vec![3, 4]]).unwrap();
        grid.resize(3, 1);
        assert_eq!(grid.iter().map(|(_, &v)| v).collect::<Vec<_>>(), vec![1, 2, 0]);

        grid.clear();
        assert!(grid.iter().all(|(_, &v)| v == 0));
    }

    #[test]
    fn test_from_ascii() {
        let grid = Grid::from_ascii(
            "
            ..#
            .##
            ",
        )
        .unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.get(Cell::new(2, 0)), Some(&1));
        assert_eq!(grid.get(Cell::new(0, 1)), Some(&0));
    }
}
