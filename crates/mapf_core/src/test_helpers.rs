//! Shared test fixtures: compact grid literals, plan validators, and random
//! instance generators.
//!
//! Validators treat a path that ends early as parked on its last cell, so
//! padded and unpadded trajectories check the same way.

use rand::rngs::StdRng;
use rand::Rng;

use crate::grid::{Cell, Grid};

/// Build a grid from string rows: `.` or `0` is free, anything else blocked.
pub fn grid_from(rows: &[&str]) -> Grid {
    let matrix: Vec<Vec<u8>> = rows
        .iter()
        .map(|row| {
            row.chars()
                .map(|ch| u8::from(ch != '.' && ch != '0'))
                .collect()
        })
        .collect();
    Grid::from_rows(&matrix).expect("test grid must be rectangular")
}

pub fn cells(pairs: &[(u32, u32)]) -> Vec<Cell> {
    pairs.iter().map(|&(x, y)| Cell::new(x, y)).collect()
}

fn position(path: &[Cell], t: usize) -> Cell {
    path[t.min(path.len() - 1)]
}

/// No two agents share a cell at any step.
pub fn no_vertex_conflict(paths: &[Vec<Cell>]) -> bool {
    let Some(span) = paths.iter().map(Vec::len).max() else {
        return true;
    };
    for t in 0..span {
        let mut seen = std::collections::HashSet::new();
        for path in paths {
            if path.is_empty() {
                continue;
            }
            if !seen.insert(position(path, t)) {
                return false;
            }
        }
    }
    true
}

/// No two agents trade cells across the same edge in one step.
pub fn no_edge_conflict(paths: &[Vec<Cell>]) -> bool {
    let Some(span) = paths.iter().map(Vec::len).max() else {
        return true;
    };
    for t in 1..span {
        let mut used = std::collections::HashMap::new();
        for (agent, path) in paths.iter().enumerate() {
            if path.is_empty() {
                continue;
            }
            let prev = position(path, t - 1);
            let curr = position(path, t);
            if let Some(&other) = used.get(&(curr, prev)) {
                if other != agent && prev != curr {
                    return false;
                }
            }
            used.insert((prev, curr), agent);
        }
    }
    true
}

/// Every step stays on the grid and moves at most one cell.
pub fn unit_steps(grid: &Grid, paths: &[Vec<Cell>]) -> bool {
    paths.iter().all(|path| {
        path.iter().all(|&cell| grid.passable(cell))
            && path
                .windows(2)
                .all(|pair| pair[0].manhattan(pair[1]) <= 1)
    })
}

/// Assert the three collision-freedom invariants at once.
pub fn assert_plan_valid(grid: &Grid, paths: &[Vec<Cell>]) {
    assert!(unit_steps(grid, paths), "plan leaves the grid or jumps");
    assert!(no_vertex_conflict(paths), "plan has a vertex conflict");
    assert!(no_edge_conflict(paths), "plan has an edge conflict");
}

/// Random grid with roughly `wall_ratio` blocked cells.
pub fn random_grid(rng: &mut StdRng, width: u32, height: u32, wall_ratio: f64) -> Grid {
    let rows: Vec<Vec<u8>> = (0..height)
        .map(|_| {
            (0..width)
                .map(|_| u8::from(rng.gen::<f64>() < wall_ratio))
                .collect()
        })
        .collect();
    Grid::from_rows(&rows).expect("generated grid is rectangular")
}

/// Up to `count` distinct passable cells, in random order; fewer if the grid
/// is too crowded.
pub fn random_free_cells(rng: &mut StdRng, grid: &Grid, count: usize) -> Vec<Cell> {
    let mut free: Vec<Cell> = (0..grid.cell_count())
        .filter(|&index| grid.passable_index(index))
        .map(|index| grid.cell_at(index))
        .collect();
    for i in (1..free.len()).rev() {
        free.swap(i, rng.gen_range(0..=i));
    }
    free.truncate(count);
    free
}
