//! Dinic's algorithm: BFS level graphs and DFS blocking flow with the
//! current-arc optimization. On unit-capacity networks this runs in
//! O(E·sqrt(V)).

use std::collections::VecDeque;

use super::graph::FlowGraph;
use super::FlowSolver;

#[derive(Debug, Clone, Copy, Default)]
pub struct Dinic;

impl FlowSolver for Dinic {
    fn max_flow(&self, graph: &mut FlowGraph, source: u32, sink: u32) -> i64 {
        if source == sink {
            return 0;
        }
        let nodes = graph.node_count();
        let mut level = vec![-1i32; nodes];
        let mut cursor = vec![0usize; nodes];
        let mut total = 0i64;
        while build_levels(graph, source, sink, &mut level) {
            cursor.iter_mut().for_each(|c| *c = 0);
            loop {
                let pushed = augment(graph, source, sink, i64::MAX, &level, &mut cursor);
                if pushed == 0 {
                    break;
                }
                total += pushed;
            }
        }
        total
    }
}

/// BFS over residual arcs; returns whether the sink is still reachable.
fn build_levels(graph: &FlowGraph, source: u32, sink: u32, level: &mut [i32]) -> bool {
    level.iter_mut().for_each(|l| *l = -1);
    level[source as usize] = 0;
    let mut queue = VecDeque::from([source]);
    while let Some(node) = queue.pop_front() {
        for &id in &graph.adj[node as usize] {
            let to = graph.arcs[id as usize].to;
            if graph.arcs[id as usize].cap > 0 && level[to as usize] < 0 {
                level[to as usize] = level[node as usize] + 1;
                queue.push_back(to);
            }
        }
    }
    level[sink as usize] >= 0
}

/// Push one augmenting unit (or more) down the level graph.
fn augment(
    graph: &mut FlowGraph,
    node: u32,
    sink: u32,
    limit: i64,
    level: &[i32],
    cursor: &mut [usize],
) -> i64 {
    if node == sink {
        return limit;
    }
    while cursor[node as usize] < graph.adj[node as usize].len() {
        let id = graph.adj[node as usize][cursor[node as usize]];
        let to = graph.arcs[id as usize].to;
        let cap = graph.arcs[id as usize].cap;
        if cap > 0 && level[to as usize] == level[node as usize] + 1 {
            let pushed = augment(graph, to, sink, limit.min(cap), level, cursor);
            if pushed > 0 {
                graph.push(id, pushed);
                return pushed;
            }
        }
        cursor[node as usize] += 1;
    }
    0
}
