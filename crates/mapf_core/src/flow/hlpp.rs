//! Highest-label push-relabel with the gap heuristic and periodic global
//! relabeling, O(V²·sqrt(E)).
//!
//! The loop runs until no vertex other than the terminals holds excess, so
//! the finished arc flows decompose into source-to-sink paths and can be
//! traced directly; stopping at the preflow value would leave stranded
//! excess in the residual graph.

use std::collections::VecDeque;

use super::graph::FlowGraph;
use super::FlowSolver;

#[derive(Debug, Clone, Copy, Default)]
pub struct Hlpp;

struct State {
    height: Vec<usize>,
    excess: Vec<i64>,
    cursor: Vec<usize>,
    /// Active nodes by height; entries may be stale and are re-checked on pop.
    buckets: Vec<Vec<u32>>,
    /// Nodes per height, for the gap heuristic.
    count: Vec<usize>,
    highest: usize,
    relabels: usize,
}

impl FlowSolver for Hlpp {
    fn max_flow(&self, graph: &mut FlowGraph, source: u32, sink: u32) -> i64 {
        if source == sink {
            return 0;
        }
        let nodes = graph.node_count();
        let limit = 2 * nodes;
        let mut state = State {
            height: vec![0; nodes],
            excess: vec![0; nodes],
            cursor: vec![0; nodes],
            buckets: vec![Vec::new(); limit + 2],
            count: vec![0; limit + 2],
            highest: 0,
            relabels: 0,
        };

        global_relabel(graph, source, sink, &mut state);

        // Saturate every arc out of the source.
        let source_arcs: Vec<u32> = graph.adj[source as usize].clone();
        for id in source_arcs {
            let cap = graph.residual(id);
            if cap > 0 {
                let to = graph.arc_target(id);
                graph.push(id, cap);
                state.excess[source as usize] -= cap;
                state.excess[to as usize] += cap;
            }
        }
        for node in 0..nodes as u32 {
            if node != source && node != sink && state.excess[node as usize] > 0 {
                state.activate(node);
            }
        }

        loop {
            while state.highest > 0 && state.buckets[state.highest].is_empty() {
                state.highest -= 1;
            }
            let Some(node) = state.buckets[state.highest].pop() else {
                break;
            };
            // Stale entry: the node drained or was re-bucketed at another height.
            if state.excess[node as usize] == 0 || state.height[node as usize] != state.highest {
                continue;
            }
            discharge(graph, source, sink, node, limit, &mut state);
            if state.relabels >= nodes {
                state.relabels = 0;
                global_relabel(graph, source, sink, &mut state);
            }
        }

        state.excess[sink as usize]
    }
}

impl State {
    fn activate(&mut self, node: u32) {
        let h = self.height[node as usize];
        self.buckets[h].push(node);
        self.highest = self.highest.max(h);
    }
}

fn discharge(
    graph: &mut FlowGraph,
    source: u32,
    sink: u32,
    node: u32,
    limit: usize,
    state: &mut State,
) {
    let v = node as usize;
    while state.excess[v] > 0 {
        if state.cursor[v] == graph.adj[v].len() {
            relabel(graph, source, node, limit, state);
            continue;
        }
        let id = graph.adj[v][state.cursor[v]];
        let to = graph.arc_target(id) as usize;
        if graph.residual(id) > 0 && state.height[v] == state.height[to] + 1 {
            let amount = state.excess[v].min(graph.residual(id));
            graph.push(id, amount);
            state.excess[v] -= amount;
            let was_idle = state.excess[to] == 0;
            state.excess[to] += amount;
            if was_idle && to != source as usize && to != sink as usize {
                state.activate(to as u32);
            }
        } else {
            state.cursor[v] += 1;
        }
    }
}

fn relabel(graph: &FlowGraph, source: u32, node: u32, limit: usize, state: &mut State) {
    let v = node as usize;
    let nodes = graph.node_count();
    let mut lifted = usize::MAX;
    for &id in &graph.adj[v] {
        if graph.residual(id) > 0 {
            lifted = lifted.min(state.height[graph.arc_target(id) as usize] + 1);
        }
    }
    debug_assert!(lifted <= limit, "excess node must keep a residual arc");
    let old = state.height[v];
    state.count[old] -= 1;
    state.height[v] = lifted;
    state.count[lifted] += 1;
    state.cursor[v] = 0;
    state.relabels += 1;

    // Gap: a height below `nodes` just emptied, so everything stranded above
    // it can never reach the sink again and goes straight to the return band.
    if state.count[old] == 0 && old < nodes {
        for u in 0..nodes {
            if u == source as usize || u == v {
                continue;
            }
            let h = state.height[u];
            if h > old && h < nodes {
                state.count[h] -= 1;
                state.height[u] = nodes + 1;
                state.count[nodes + 1] += 1;
                state.cursor[u] = 0;
                if state.excess[u] > 0 {
                    state.activate(u as u32);
                }
            }
        }
    }
}

/// Exact heights: distance to the sink through residual arcs, or, for nodes
/// that can no longer reach it, `n` plus the distance to the source.
/// Rebuilds the buckets from scratch.
fn global_relabel(graph: &FlowGraph, source: u32, sink: u32, state: &mut State) {
    let nodes = graph.node_count();
    let unseen = 2 * nodes + 1;
    state.height.iter_mut().for_each(|h| *h = unseen);
    state.cursor.iter_mut().for_each(|c| *c = 0);

    let mut queue = VecDeque::new();
    state.height[sink as usize] = 0;
    queue.push_back(sink);
    state.height[source as usize] = nodes;
    while let Some(v) = queue.pop_front() {
        for &id in &graph.adj[v as usize] {
            let w = graph.arc_target(id) as usize;
            // The paired arc runs w -> v; w feeds v when it has residual.
            if state.height[w] == unseen && graph.residual(id ^ 1) > 0 {
                state.height[w] = state.height[v as usize] + 1;
                queue.push_back(w as u32);
            }
        }
    }
    queue.push_back(source);
    while let Some(v) = queue.pop_front() {
        for &id in &graph.adj[v as usize] {
            let w = graph.arc_target(id) as usize;
            if state.height[w] == unseen && graph.residual(id ^ 1) > 0 {
                state.height[w] = state.height[v as usize] + 1;
                queue.push_back(w as u32);
            }
        }
    }

    state.count.iter_mut().for_each(|c| *c = 0);
    for &h in &state.height {
        state.count[h.min(2 * nodes + 1)] += 1;
    }
    for bucket in &mut state.buckets {
        bucket.clear();
    }
    state.highest = 0;
    for node in 0..nodes as u32 {
        if node != source && node != sink && state.excess[node as usize] > 0 {
            state.activate(node);
        }
    }
}
