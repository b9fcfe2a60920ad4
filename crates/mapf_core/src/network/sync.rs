//! Synchronized two-stage network: every agent stands on a pickup cell at
//! the rendezvous step tau and on a drop cell at the final layer.
//!
//! The start-to-pickup and pickup-to-drop halves share the tau layer: only
//! pickup cells keep their occupancy arc there, each a one-agent slot, so a
//! single max flow solves both halves jointly.

use std::collections::{BTreeMap, HashSet};

use super::CellNet;
use crate::grid::{Cell, Grid};

pub(crate) fn build(
    grid: &Grid,
    starts: &[Cell],
    pickups: &[Cell],
    drops: &[Cell],
    drop_caps: &[u32],
    horizon: u32,
    tau: u32,
) -> CellNet {
    let (mut net, edges) = CellNet::empty(grid, horizon);

    let pickup_slots: HashSet<u32> = pickups
        .iter()
        .map(|&cell| grid.index(cell) as u32)
        .collect();
    let mut drop_capacity: BTreeMap<u32, i64> = BTreeMap::new();
    for (cell, &cap) in drops.iter().zip(drop_caps) {
        *drop_capacity.entry(grid.index(*cell) as u32).or_insert(0) += i64::from(cap);
    }

    for index in 0..grid.cell_count() as u32 {
        if !grid.passable_index(index as usize) {
            continue;
        }
        for t in 0..=horizon {
            if t == tau && !pickup_slots.contains(&index) {
                // The rendezvous layer only passes agents standing on a pickup.
                continue;
            }
            let cap = if t == horizon && t != tau {
                drop_capacity.get(&index).copied().unwrap_or(1).max(1)
            } else {
                1
            };
            net.graph
                .add_arc(net.cell_in(index, t), net.cell_out(index, t), cap);
        }
    }

    net.add_wait_arcs(grid);
    net.add_move_gadgets(grid, &edges, None);

    for (&index, &cap) in &drop_capacity {
        if cap > 0 {
            net.graph
                .add_arc(net.cell_out(index, horizon), CellNet::SINK, cap);
        }
    }

    net.add_source_arcs(grid, starts);
    net
}
