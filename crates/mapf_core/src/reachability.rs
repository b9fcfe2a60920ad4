//! Grid reachability: multi-source BFS distance fields with an LRU memo,
//! plus the oriented shortest-time query used by rotation-aware planning.
//!
//! Distance fields are keyed by `(grid id, sorted sources)` in a global LRU
//! cache. Values are deterministic, so concurrent writers may race freely
//! (last writer wins).

use std::collections::{HashSet, VecDeque};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};

use lru::LruCache;
use pathfinding::directed::bfs::bfs;

use crate::grid::{Cell, Dir, Grid};

/// Marker for cells no source can reach.
pub const UNREACHABLE: i32 = -1;

/// Step-count distance from the nearest of `sources` to every cell, indexed
/// by `y * width + x`; unreachable cells hold [`UNREACHABLE`]. Blocked or
/// out-of-bounds sources are ignored.
pub fn multi_source_bfs(grid: &Grid, sources: &[Cell]) -> Vec<i32> {
    let mut dist = vec![UNREACHABLE; grid.cell_count()];
    let mut queue = VecDeque::new();
    for &source in sources {
        if !grid.passable(source) {
            continue;
        }
        let index = grid.index(source);
        if dist[index] == UNREACHABLE {
            dist[index] = 0;
            queue.push_back(source);
        }
    }
    while let Some(cell) = queue.pop_front() {
        let here = dist[grid.index(cell)];
        for next in grid.neighbours(cell) {
            let slot = &mut dist[grid.index(next)];
            if *slot == UNREACHABLE {
                *slot = here + 1;
                queue.push_back(next);
            }
        }
    }
    dist
}

/// Global distance-field cache (64 fields; one field is a few KB per 1k cells).
fn distance_cache() -> &'static Mutex<LruCache<(u64, Vec<u32>), Arc<Vec<i32>>>> {
    static CACHE: OnceLock<Mutex<LruCache<(u64, Vec<u32>), Arc<Vec<i32>>>>> = OnceLock::new();
    CACHE.get_or_init(|| {
        Mutex::new(LruCache::new(
            NonZeroUsize::new(64).expect("cache size must be non-zero"),
        ))
    })
}

/// [`multi_source_bfs`] with memoization keyed by the grid's opaque id and
/// the deduplicated, sorted source set.
pub fn cached_multi_source_bfs(grid: &Grid, sources: &[Cell]) -> Arc<Vec<i32>> {
    let mut key_sources: Vec<u32> = sources
        .iter()
        .filter(|&&cell| grid.passable(cell))
        .map(|&cell| grid.index(cell) as u32)
        .collect();
    key_sources.sort_unstable();
    key_sources.dedup();
    let key = (grid.id(), key_sources);

    let mut cache = distance_cache().lock().unwrap();
    cache
        .get_or_insert(key, || Arc::new(multi_source_bfs(grid, sources)))
        .clone()
}

/// Largest distance any of `cells` has in `dist`, or `None` if one of them
/// is unreachable. An empty slice yields `Some(0)`.
pub fn max_distance_to(grid: &Grid, dist: &[i32], cells: &[Cell]) -> Option<u32> {
    let mut worst = 0u32;
    for &cell in cells {
        let d = dist[grid.index(cell)];
        if d < 0 {
            return None;
        }
        worst = worst.max(d as u32);
    }
    Some(worst)
}

/// The cells among `cells` that `dist` marks unreachable.
pub fn unreachable_cells(grid: &Grid, dist: &[i32], cells: &[Cell]) -> Vec<Cell> {
    cells
        .iter()
        .copied()
        .filter(|&cell| dist[grid.index(cell)] < 0)
        .collect()
}

/// The k-th smallest distance (1-based) among the reachable entries of
/// `cells`, or `None` if fewer than `k` are reachable. `k = 0` yields
/// `Some(0)`.
pub fn kth_smallest_distance(grid: &Grid, dist: &[i32], cells: &[Cell], k: usize) -> Option<u32> {
    if k == 0 {
        return Some(0);
    }
    let mut reachable: Vec<u32> = cells
        .iter()
        .filter_map(|&cell| u32::try_from(dist[grid.index(cell)]).ok())
        .collect();
    if reachable.len() < k {
        return None;
    }
    reachable.sort_unstable();
    Some(reachable[k - 1])
}

/// Fewest timesteps for one agent at `start` facing `facing` to stand on any
/// of `targets`, moving only along its facing and turning 90° per step.
/// `None` if no target is reachable.
pub fn shortest_time_with_rotation(
    grid: &Grid,
    start: Cell,
    facing: Dir,
    targets: &[Cell],
) -> Option<u32> {
    let goal: HashSet<Cell> = targets.iter().copied().collect();
    if goal.is_empty() {
        return None;
    }
    let route = bfs(
        &(start, facing),
        |&(cell, dir)| {
            let mut next: Vec<(Cell, Dir)> = dir
                .perpendicular()
                .into_iter()
                .map(|turned| (cell, turned))
                .collect();
            if let Some(ahead) = grid.step(cell, dir) {
                next.push((ahead, dir));
            }
            next
        },
        |&(cell, _)| goal.contains(&cell),
    )?;
    Some((route.len() - 1) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walled_grid() -> Grid {
        // Vertical wall at x = 1 splits the columns.
        Grid::from_rows(&[vec![0, 1, 0], vec![0, 1, 0]]).expect("grid")
    }

    #[test]
    fn bfs_respects_walls() {
        let grid = walled_grid();
        let dist = multi_source_bfs(&grid, &[Cell::new(0, 0)]);
        assert_eq!(dist[grid.index(Cell::new(0, 0))], 0);
        assert_eq!(dist[grid.index(Cell::new(0, 1))], 1);
        assert_eq!(dist[grid.index(Cell::new(2, 0))], UNREACHABLE);
        assert_eq!(dist[grid.index(Cell::new(2, 1))], UNREACHABLE);
    }

    #[test]
    fn bfs_takes_the_nearest_source() {
        let grid = Grid::from_rows(&[vec![0, 0, 0, 0]]).expect("grid");
        let dist = multi_source_bfs(&grid, &[Cell::new(0, 0), Cell::new(3, 0)]);
        assert_eq!(dist[grid.index(Cell::new(1, 0))], 1);
        assert_eq!(dist[grid.index(Cell::new(2, 0))], 1);
    }

    #[test]
    fn cached_field_matches_uncached() {
        let grid = walled_grid();
        let sources = [Cell::new(0, 1), Cell::new(0, 0)];
        let cached = cached_multi_source_bfs(&grid, &sources);
        assert_eq!(*cached, multi_source_bfs(&grid, &sources));
        // Source order must not change the key.
        let again = cached_multi_source_bfs(&grid, &[Cell::new(0, 0), Cell::new(0, 1)]);
        assert!(Arc::ptr_eq(&cached, &again));
    }

    #[test]
    fn distance_summaries() {
        let grid = walled_grid();
        let dist = multi_source_bfs(&grid, &[Cell::new(0, 0)]);
        let cells = [Cell::new(0, 1), Cell::new(2, 0)];
        assert_eq!(max_distance_to(&grid, &dist, &cells), None);
        assert_eq!(max_distance_to(&grid, &dist, &cells[..1]), Some(1));
        assert_eq!(max_distance_to(&grid, &dist, &[]), Some(0));
        assert_eq!(unreachable_cells(&grid, &dist, &cells), vec![Cell::new(2, 0)]);
        assert_eq!(kth_smallest_distance(&grid, &dist, &cells, 1), Some(1));
        assert_eq!(kth_smallest_distance(&grid, &dist, &cells, 2), None);
    }

    #[test]
    fn oriented_shortest_time_charges_turns() {
        let grid = Grid::from_rows(&[vec![0, 0, 0]]).expect("grid");
        let target = [Cell::new(2, 0)];
        assert_eq!(
            shortest_time_with_rotation(&grid, Cell::new(0, 0), Dir::East, &target),
            Some(2)
        );
        assert_eq!(
            shortest_time_with_rotation(&grid, Cell::new(0, 0), Dir::South, &target),
            Some(3)
        );
        // A half turn takes two quarter turns.
        assert_eq!(
            shortest_time_with_rotation(&grid, Cell::new(0, 0), Dir::West, &target),
            Some(4)
        );
    }
}
