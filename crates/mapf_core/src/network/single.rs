//! Single-target network: every agent must stand on some target cell at the
//! final layer, within per-target capacities, avoiding reserved cells and
//! moves.

use std::collections::BTreeMap;

use super::CellNet;
use crate::grid::{Cell, Grid};
use crate::reservations::Reservations;

pub(crate) fn build(
    grid: &Grid,
    starts: &[Cell],
    targets: &[Cell],
    caps: &[u32],
    horizon: u32,
    reservations: &Reservations,
) -> CellNet {
    let (mut net, edges) = CellNet::empty(grid, horizon);

    // Capacity per distinct target cell; duplicate entries add up.
    let mut target_caps: BTreeMap<u32, i64> = BTreeMap::new();
    for (cell, &cap) in targets.iter().zip(caps) {
        *target_caps.entry(grid.index(*cell) as u32).or_insert(0) += i64::from(cap);
    }

    // Occupancy arcs. At the final layer a target cell holds up to its
    // capacity; everywhere else a cell holds one agent.
    for index in 0..grid.cell_count() as u32 {
        if !grid.passable_index(index as usize) {
            continue;
        }
        let cell = grid.cell_at(index as usize);
        for t in 0..=horizon {
            if reservations.vertex_reserved(cell, t) {
                continue;
            }
            let cap = if t == horizon {
                target_caps.get(&index).copied().unwrap_or(1).max(1)
            } else {
                1
            };
            net.graph
                .add_arc(net.cell_in(index, t), net.cell_out(index, t), cap);
        }
    }

    net.add_wait_arcs(grid);
    net.add_move_gadgets(grid, &edges, Some(reservations));

    for (&index, &cap) in &target_caps {
        if cap > 0 {
            net.graph
                .add_arc(net.cell_out(index, horizon), CellNet::SINK, cap);
        }
    }

    net.add_source_arcs(grid, starts);
    net
}
