//! Grid geometry: passable cells, 4-neighbour adjacency, facing directions.
//!
//! Coordinates are `(x, y)` with the origin at the top-left corner, `x`
//! growing to the right and `y` growing downward. A cell is also addressed
//! by its linear index `y * width + x`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// A grid coordinate. `x` is the column, `y` the row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell.
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Agent facing. The discriminants are the wire indices callers exchange.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Dir {
    East = 0,
    West = 1,
    South = 2,
    North = 3,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::East, Dir::West, Dir::South, Dir::North];

    /// Unit step this facing points along, as `(dx, dy)`.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Dir::East => (1, 0),
            Dir::West => (-1, 0),
            Dir::South => (0, 1),
            Dir::North => (0, -1),
        }
    }

    /// Facing that points from `from` to an adjacent `to`, if they are
    /// distinct 4-neighbours.
    pub fn between(from: Cell, to: Cell) -> Option<Dir> {
        let dx = i64::from(to.x) - i64::from(from.x);
        let dy = i64::from(to.y) - i64::from(from.y);
        Dir::ALL.into_iter().find(|d| d.delta() == (dx, dy))
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::East => Dir::West,
            Dir::West => Dir::East,
            Dir::South => Dir::North,
            Dir::North => Dir::South,
        }
    }

    /// The two facings a quarter turn away.
    pub fn perpendicular(self) -> [Dir; 2] {
        match self {
            Dir::East | Dir::West => [Dir::South, Dir::North],
            Dir::South | Dir::North => [Dir::East, Dir::West],
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Dir> {
        Dir::ALL.get(index).copied()
    }
}

static NEXT_GRID_ID: AtomicU64 = AtomicU64::new(0);

/// Immutable rectangular grid of passable and blocked cells.
///
/// Each grid carries an opaque `id`, unique per construction, which keyed
/// caches use instead of hashing the full cell content.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    passable: Vec<bool>,
    id: u64,
}

impl Grid {
    /// Build a grid from a rectangular matrix of cell codes: `0` is free,
    /// anything else is blocked.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Grid, PlanError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(PlanError::InvalidInput("grid must be non-empty".into()));
        }
        let width = rows[0].len();
        let mut passable = Vec::with_capacity(width * rows.len());
        for row in rows {
            if row.len() != width {
                return Err(PlanError::InvalidInput("grid must be rectangular".into()));
            }
            passable.extend(row.iter().map(|&cell| cell == 0));
        }
        Ok(Grid {
            width: width as u32,
            height: rows.len() as u32,
            passable,
            id: NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Opaque cache handle, unique per constructed grid.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Total number of cells, passable or not.
    pub fn cell_count(&self) -> usize {
        self.passable.len()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Whether the cell is in bounds and free of obstacles.
    pub fn passable(&self, cell: Cell) -> bool {
        self.contains(cell) && self.passable[self.index(cell)]
    }

    pub fn passable_index(&self, index: usize) -> bool {
        self.passable[index]
    }

    /// Linear index `y * width + x`.
    pub fn index(&self, cell: Cell) -> usize {
        (cell.y * self.width + cell.x) as usize
    }

    pub fn cell_at(&self, index: usize) -> Cell {
        Cell::new(index as u32 % self.width, index as u32 / self.width)
    }

    /// The passable cell one step along `dir`, if any.
    pub fn step(&self, cell: Cell, dir: Dir) -> Option<Cell> {
        let (dx, dy) = dir.delta();
        let x = i64::from(cell.x) + dx;
        let y = i64::from(cell.y) + dy;
        if x < 0 || y < 0 {
            return None;
        }
        let next = Cell::new(x as u32, y as u32);
        self.passable(next).then_some(next)
    }

    /// The at-most-4 passable neighbours of a cell.
    pub fn neighbours(&self, cell: Cell) -> Vec<Cell> {
        Dir::ALL
            .into_iter()
            .filter_map(|dir| self.step(cell, dir))
            .collect()
    }

    /// Undirected passable edges as linear index pairs with `a < b`, in
    /// row-major order.
    pub fn passable_edges(&self) -> Vec<(u32, u32)> {
        let mut edges = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = Cell::new(x, y);
                if !self.passable(cell) {
                    continue;
                }
                let index = self.index(cell) as u32;
                if x + 1 < self.width && self.passable(Cell::new(x + 1, y)) {
                    edges.push((index, index + 1));
                }
                if y + 1 < self.height && self.passable(Cell::new(x, y + 1)) {
                    edges.push((index, index + self.width));
                }
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_and_empty_grids() {
        assert!(Grid::from_rows(&[]).is_err());
        assert!(Grid::from_rows(&[vec![]]).is_err());
        assert!(Grid::from_rows(&[vec![0, 0], vec![0]]).is_err());
    }

    #[test]
    fn passability_and_neighbours() {
        let grid = Grid::from_rows(&[vec![0, 1, 0], vec![0, 0, 0]]).expect("grid");
        assert!(grid.passable(Cell::new(0, 0)));
        assert!(!grid.passable(Cell::new(1, 0)));
        assert!(!grid.passable(Cell::new(3, 0)));

        let mut around = grid.neighbours(Cell::new(1, 1));
        around.sort();
        // (1,0) is blocked and (1,2) is out of bounds.
        assert_eq!(around, vec![Cell::new(0, 1), Cell::new(2, 1)]);
    }

    #[test]
    fn edges_skip_obstacles() {
        let grid = Grid::from_rows(&[vec![0, 1], vec![0, 0]]).expect("grid");
        let edges = grid.passable_edges();
        // (0,0)-(0,1) and (0,1)-(1,1); nothing touches the blocked corner.
        assert_eq!(edges, vec![(0, 2), (2, 3)]);
    }

    #[test]
    fn facing_algebra() {
        assert_eq!(Dir::between(Cell::new(1, 1), Cell::new(2, 1)), Some(Dir::East));
        assert_eq!(Dir::between(Cell::new(1, 1), Cell::new(1, 0)), Some(Dir::North));
        assert_eq!(Dir::between(Cell::new(1, 1), Cell::new(1, 1)), None);
        assert_eq!(Dir::East.opposite(), Dir::West);
        assert_eq!(Dir::South.perpendicular(), [Dir::East, Dir::West]);
        for dir in Dir::ALL {
            assert_eq!(Dir::from_index(dir.index()), Some(dir));
        }
    }
}
