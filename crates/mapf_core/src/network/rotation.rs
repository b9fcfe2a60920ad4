//! Rotation-aware network: each cell expands into four oriented states.
//!
//! A move is only offered along the current facing; turning 90° costs one
//! step, so a half turn costs two. Waits keep the facing. Move gadgets stay
//! per grid edge, one bottleneck regardless of orientation, so cell swaps
//! remain excluded; a reserved cell removes all four oriented occupancy
//! arcs at that step.

use std::collections::BTreeMap;

use crate::flow::FlowGraph;
use crate::grid::{Cell, Dir, Grid};
use crate::reservations::Reservations;

/// Node roles inside the oriented network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RotNode {
    Source,
    Sink,
    In { cell: u32, dir: Dir, t: u32 },
    Out { cell: u32, dir: Dir, t: u32 },
    GadgetIn { edge: u32, t: u32 },
    GadgetOut { edge: u32, t: u32 },
    Collector { target: u32 },
}

pub(crate) struct RotNet {
    pub graph: FlowGraph,
    pub horizon: u32,
    cells: u32,
    edge_count: u32,
    gadget_base: u32,
    collector_base: u32,
}

impl RotNet {
    pub const SOURCE: u32 = 0;
    pub const SINK: u32 = 1;

    pub fn source(&self) -> u32 {
        Self::SOURCE
    }

    pub fn sink(&self) -> u32 {
        Self::SINK
    }

    pub fn state_in(&self, cell: u32, dir: Dir, t: u32) -> u32 {
        2 + 2 * ((t * self.cells + cell) * 4 + dir.index() as u32)
    }

    pub fn state_out(&self, cell: u32, dir: Dir, t: u32) -> u32 {
        self.state_in(cell, dir, t) + 1
    }

    fn gadget_in(&self, edge: u32, t: u32) -> u32 {
        self.gadget_base + 2 * (t * self.edge_count + edge)
    }

    pub fn classify(&self, node: u32) -> RotNode {
        match node {
            Self::SOURCE => RotNode::Source,
            Self::SINK => RotNode::Sink,
            n if n < self.gadget_base => {
                let slot = (n - 2) / 2;
                let dir = Dir::from_index((slot % 4) as usize).expect("facing index in range");
                let cell_t = slot / 4;
                let cell = cell_t % self.cells;
                let t = cell_t / self.cells;
                if (n - 2) % 2 == 0 {
                    RotNode::In { cell, dir, t }
                } else {
                    RotNode::Out { cell, dir, t }
                }
            }
            n if n < self.collector_base => {
                let slot = (n - self.gadget_base) / 2;
                let edge = slot % self.edge_count;
                let t = slot / self.edge_count;
                if (n - self.gadget_base) % 2 == 0 {
                    RotNode::GadgetIn { edge, t }
                } else {
                    RotNode::GadgetOut { edge, t }
                }
            }
            n => RotNode::Collector {
                target: n - self.collector_base,
            },
        }
    }
}

pub(crate) fn build(
    grid: &Grid,
    starts: &[Cell],
    start_dirs: &[Dir],
    targets: &[Cell],
    caps: &[u32],
    horizon: u32,
    reservations: &Reservations,
) -> RotNet {
    let cells = grid.cell_count() as u32;
    let edges = grid.passable_edges();
    let edge_count = edges.len() as u32;
    let gadget_base = 2 + 8 * cells * (horizon + 1);
    let collector_base = gadget_base + 2 * edge_count * horizon;

    // Capacity per distinct target cell; duplicate entries add up.
    let mut target_caps: BTreeMap<u32, i64> = BTreeMap::new();
    for (cell, &cap) in targets.iter().zip(caps) {
        *target_caps.entry(grid.index(*cell) as u32).or_insert(0) += i64::from(cap);
    }

    let node_count = collector_base + target_caps.len() as u32;
    let mut net = RotNet {
        graph: FlowGraph::with_nodes(node_count as usize),
        horizon,
        cells,
        edge_count,
        gadget_base,
        collector_base,
    };

    // Oriented occupancy, waits, and quarter turns.
    for index in 0..cells {
        if !grid.passable_index(index as usize) {
            continue;
        }
        let cell = grid.cell_at(index as usize);
        for t in 0..=horizon {
            if reservations.vertex_reserved(cell, t) {
                continue;
            }
            for dir in Dir::ALL {
                net.graph
                    .add_arc(net.state_in(index, dir, t), net.state_out(index, dir, t), 1);
                if t < horizon {
                    let from = net.state_out(index, dir, t);
                    net.graph.add_arc(from, net.state_in(index, dir, t + 1), 1);
                    for turned in dir.perpendicular() {
                        net.graph.add_arc(from, net.state_in(index, turned, t + 1), 1);
                    }
                }
            }
        }
    }

    // Move gadgets: entry only along the facing that crosses the edge; the
    // exit restores the geometric facing on the far side.
    for (edge, &(a, b)) in edges.iter().enumerate() {
        let (cell_a, cell_b) = (grid.cell_at(a as usize), grid.cell_at(b as usize));
        let ahead = Dir::between(cell_a, cell_b).expect("edge endpoints are adjacent");
        let back = ahead.opposite();
        for t in 0..horizon {
            if reservations.edge_reserved(cell_a, cell_b, t) {
                continue;
            }
            let g_in = net.gadget_in(edge as u32, t);
            let g_out = g_in + 1;
            net.graph.add_arc(net.state_out(a, ahead, t), g_in, 1);
            net.graph.add_arc(net.state_out(b, back, t), g_in, 1);
            net.graph.add_arc(g_in, g_out, 1);
            net.graph.add_arc(g_out, net.state_in(b, ahead, t + 1), 1);
            net.graph.add_arc(g_out, net.state_in(a, back, t + 1), 1);
        }
    }

    // Drain: a target accepts arrivals in any facing, bounded by its capacity.
    for (slot, (&index, &cap)) in target_caps.iter().enumerate() {
        if cap == 0 {
            continue;
        }
        let collector = collector_base + slot as u32;
        for dir in Dir::ALL {
            net.graph
                .add_arc(net.state_out(index, dir, horizon), collector, 1);
        }
        net.graph.add_arc(collector, RotNet::SINK, cap);
    }

    for (&start, &dir) in starts.iter().zip(start_dirs) {
        let to = net.state_in(grid.index(start) as u32, dir, 0);
        net.graph.add_arc(RotNet::SOURCE, to, 1);
    }

    net
}
