//! Path recovery: walk one saturated unit per agent forward through the
//! network, consuming flow as it goes.
//!
//! Layers only ever point forward in time, so the networks are DAGs and a
//! forward walk terminates; agents are traced in index order, which fixes
//! how interchangeable units are attributed.

use super::rotation::{RotNet, RotNode};
use super::{CellNet, CellNode};
use crate::flow::FlowGraph;
use crate::grid::{Cell, Dir, Grid};

/// Per-arc flow budget, decremented as agents consume it.
struct FlowUse {
    remaining: Vec<i64>,
}

impl FlowUse {
    fn new(graph: &FlowGraph) -> Self {
        let remaining = (0..graph.arc_count() as u32)
            .map(|id| if id % 2 == 0 { graph.flow(id).max(0) } else { 0 })
            .collect();
        Self { remaining }
    }

    /// Consume one unit on some forward arc out of `node`; returns the arc.
    fn step_from(&mut self, graph: &FlowGraph, node: u32) -> Option<u32> {
        for &id in &graph.adj[node as usize] {
            if id % 2 == 0 && self.remaining[id as usize] > 0 {
                self.remaining[id as usize] -= 1;
                return Some(id);
            }
        }
        None
    }

    /// Consume one unit on the arc `from -> to`.
    fn step_to(&mut self, graph: &FlowGraph, from: u32, to: u32) -> bool {
        for &id in &graph.adj[from as usize] {
            if id % 2 == 0 && graph.arc_target(id) == to && self.remaining[id as usize] > 0 {
                self.remaining[id as usize] -= 1;
                return true;
            }
        }
        false
    }
}

/// Recover one cell sequence of length `horizon + 1` per agent from a
/// saturated cell network.
pub(crate) fn trace_cell_paths(net: &CellNet, grid: &Grid, starts: &[Cell]) -> Vec<Vec<Cell>> {
    let mut budget = FlowUse::new(&net.graph);
    starts
        .iter()
        .map(|&start| {
            let mut cell = grid.index(start) as u32;
            let entry = net.cell_in(cell, 0);
            let took = budget.step_to(&net.graph, CellNet::SOURCE, entry);
            debug_assert!(took, "every agent receives one unit of supply");

            let mut path = Vec::with_capacity(net.horizon as usize + 1);
            path.push(start);
            for t in 0..net.horizon {
                consume_occupancy(&net.graph, &mut budget, net.cell_in(cell, t));
                let id = budget
                    .step_from(&net.graph, net.cell_out(cell, t))
                    .expect("saturated flow leaves every occupied cell");
                cell = match net.classify(net.graph.arc_target(id)) {
                    CellNode::In { cell, .. } => cell,
                    CellNode::GadgetIn { .. } => {
                        let exit = cross_gadget(&net.graph, &mut budget, net.graph.arc_target(id));
                        match net.classify(exit) {
                            CellNode::In { cell, .. } => cell,
                            _ => unreachable!("gadgets exit into a cell layer"),
                        }
                    }
                    _ => unreachable!("cells hand over to a wait arc or a gadget"),
                };
                path.push(grid.cell_at(cell as usize));
            }
            consume_occupancy(&net.graph, &mut budget, net.cell_in(cell, net.horizon));
            let drain = budget
                .step_from(&net.graph, net.cell_out(cell, net.horizon))
                .expect("agents finish on a draining cell");
            debug_assert_eq!(net.graph.arc_target(drain), CellNet::SINK);
            path
        })
        .collect()
}

/// Recover cell and facing sequences per agent from a saturated oriented
/// network.
pub(crate) fn trace_oriented_paths(
    net: &RotNet,
    grid: &Grid,
    starts: &[Cell],
    start_dirs: &[Dir],
) -> (Vec<Vec<Cell>>, Vec<Vec<Dir>>) {
    let mut budget = FlowUse::new(&net.graph);
    let mut paths = Vec::with_capacity(starts.len());
    let mut facings = Vec::with_capacity(starts.len());
    for (&start, &dir) in starts.iter().zip(start_dirs) {
        let mut cell = grid.index(start) as u32;
        let mut facing = dir;
        let entry = net.state_in(cell, facing, 0);
        let took = budget.step_to(&net.graph, RotNet::SOURCE, entry);
        debug_assert!(took, "every agent receives one unit of supply");

        let mut path = Vec::with_capacity(net.horizon as usize + 1);
        let mut dirs = Vec::with_capacity(net.horizon as usize + 1);
        path.push(start);
        dirs.push(facing);
        for t in 0..net.horizon {
            consume_occupancy(&net.graph, &mut budget, net.state_in(cell, facing, t));
            let id = budget
                .step_from(&net.graph, net.state_out(cell, facing, t))
                .expect("saturated flow leaves every occupied state");
            let next = match net.classify(net.graph.arc_target(id)) {
                RotNode::In { cell, dir, .. } => (cell, dir),
                RotNode::GadgetIn { .. } => {
                    let exit = cross_gadget(&net.graph, &mut budget, net.graph.arc_target(id));
                    match net.classify(exit) {
                        RotNode::In { cell, dir, .. } => (cell, dir),
                        _ => unreachable!("gadgets exit into a state layer"),
                    }
                }
                _ => unreachable!("states hand over to a wait, turn, or move arc"),
            };
            cell = next.0;
            facing = next.1;
            path.push(grid.cell_at(cell as usize));
            dirs.push(facing);
        }
        consume_occupancy(&net.graph, &mut budget, net.state_in(cell, facing, net.horizon));
        let to_collector = budget
            .step_from(&net.graph, net.state_out(cell, facing, net.horizon))
            .expect("agents finish on a draining state");
        let collector = net.graph.arc_target(to_collector);
        let drained = budget.step_to(&net.graph, collector, RotNet::SINK);
        debug_assert!(drained, "collectors forward every arrival to the sink");
        paths.push(path);
        facings.push(dirs);
    }
    (paths, facings)
}

fn consume_occupancy(graph: &FlowGraph, budget: &mut FlowUse, in_node: u32) {
    let id = budget
        .step_from(graph, in_node)
        .expect("occupied cells carry flow across their occupancy arc");
    debug_assert_eq!(id % 2, 0, "occupancy arcs are forward arcs");
}

/// Enter a gadget, cross its bottleneck, and return the exit node.
fn cross_gadget(graph: &FlowGraph, budget: &mut FlowUse, gadget_in: u32) -> u32 {
    let mid = budget
        .step_from(graph, gadget_in)
        .expect("gadget entries feed the bottleneck");
    let out = budget
        .step_from(graph, graph.arc_target(mid))
        .expect("gadget bottlenecks feed an exit");
    graph.arc_target(out)
}
