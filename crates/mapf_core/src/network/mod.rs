//! Time-expanded flow networks whose unit capacities encode the collision
//! rules.
//!
//! Each timestep contributes a layer of per-cell in/out node pairs; the arc
//! between a pair is the cell's occupancy and carries at most one agent.
//! Moves between adjacent cells pass through a shared per-edge gadget (two
//! entry arcs, a unit bottleneck, two exit arcs), so two agents can never
//! trade cells across the same edge in one step. A pair of plain directed
//! arcs would let them slip past each other; the shared bottleneck is what
//! rules the swap out.

pub(crate) mod extract;
pub(crate) mod rotation;
pub(crate) mod single;
pub(crate) mod sync;

use crate::flow::FlowGraph;
use crate::grid::{Cell, Grid};
use crate::reservations::Reservations;

/// Node roles inside a cell-state network, recovered from a node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellNode {
    Source,
    Sink,
    In { cell: u32, t: u32 },
    Out { cell: u32, t: u32 },
    GadgetIn { edge: u32, t: u32 },
    GadgetOut { edge: u32, t: u32 },
}

/// Time-expanded network over plain cells (single-target and synchronized
/// two-stage modes).
pub(crate) struct CellNet {
    pub graph: FlowGraph,
    pub horizon: u32,
    cells: u32,
    edge_count: u32,
    gadget_base: u32,
}

impl CellNet {
    pub const SOURCE: u32 = 0;
    pub const SINK: u32 = 1;

    pub fn source(&self) -> u32 {
        Self::SOURCE
    }

    pub fn sink(&self) -> u32 {
        Self::SINK
    }

    pub fn empty(grid: &Grid, horizon: u32) -> (CellNet, Vec<(u32, u32)>) {
        let cells = grid.cell_count() as u32;
        let edges = grid.passable_edges();
        let edge_count = edges.len() as u32;
        let gadget_base = 2 + 2 * cells * (horizon + 1);
        let node_count = gadget_base + 2 * edge_count * horizon;
        let net = CellNet {
            graph: FlowGraph::with_nodes(node_count as usize),
            horizon,
            cells,
            edge_count,
            gadget_base,
        };
        (net, edges)
    }

    pub fn cell_in(&self, cell: u32, t: u32) -> u32 {
        2 + 2 * (t * self.cells + cell)
    }

    pub fn cell_out(&self, cell: u32, t: u32) -> u32 {
        self.cell_in(cell, t) + 1
    }

    fn gadget_in(&self, edge: u32, t: u32) -> u32 {
        self.gadget_base + 2 * (t * self.edge_count + edge)
    }

    pub fn classify(&self, node: u32) -> CellNode {
        match node {
            Self::SOURCE => CellNode::Source,
            Self::SINK => CellNode::Sink,
            n if n < self.gadget_base => {
                let slot = (n - 2) / 2;
                let cell = slot % self.cells;
                let t = slot / self.cells;
                if (n - 2) % 2 == 0 {
                    CellNode::In { cell, t }
                } else {
                    CellNode::Out { cell, t }
                }
            }
            n => {
                let slot = (n - self.gadget_base) / 2;
                let edge = slot % self.edge_count;
                let t = slot / self.edge_count;
                if (n - self.gadget_base) % 2 == 0 {
                    CellNode::GadgetIn { edge, t }
                } else {
                    CellNode::GadgetOut { edge, t }
                }
            }
        }
    }

    /// Wait arcs: stay in place across one step.
    pub fn add_wait_arcs(&mut self, grid: &Grid) {
        for index in 0..grid.cell_count() as u32 {
            if !grid.passable_index(index as usize) {
                continue;
            }
            for t in 0..self.horizon {
                let from = self.cell_out(index, t);
                let to = self.cell_in(index, t + 1);
                self.graph.add_arc(from, to, 1);
            }
        }
    }

    /// Shared move gadgets for every grid edge and step. A reserved edge
    /// removes the whole gadget at that step, blocking both directions.
    pub fn add_move_gadgets(
        &mut self,
        grid: &Grid,
        edges: &[(u32, u32)],
        reservations: Option<&Reservations>,
    ) {
        for (edge, &(a, b)) in edges.iter().enumerate() {
            let (cell_a, cell_b) = (grid.cell_at(a as usize), grid.cell_at(b as usize));
            for t in 0..self.horizon {
                if let Some(reserved) = reservations {
                    if reserved.edge_reserved(cell_a, cell_b, t) {
                        continue;
                    }
                }
                let g_in = self.gadget_in(edge as u32, t);
                let g_out = g_in + 1;
                self.graph.add_arc(self.cell_out(a, t), g_in, 1);
                self.graph.add_arc(self.cell_out(b, t), g_in, 1);
                self.graph.add_arc(g_in, g_out, 1);
                self.graph.add_arc(g_out, self.cell_in(b, t + 1), 1);
                self.graph.add_arc(g_out, self.cell_in(a, t + 1), 1);
            }
        }
    }

    /// One unit of supply per agent at its start cell.
    pub fn add_source_arcs(&mut self, grid: &Grid, starts: &[Cell]) {
        for &start in starts {
            let to = self.cell_in(grid.index(start) as u32, 0);
            self.graph.add_arc(Self::SOURCE, to, 1);
        }
    }
}
