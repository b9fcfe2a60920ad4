//! Residual flow graph: paired forward/reverse arcs with integer capacity.

/// One directed arc. The reverse arc always sits at `id ^ 1`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Arc {
    pub to: u32,
    pub cap: i64,
}

/// Directed graph in residual form. Every [`add_arc`](FlowGraph::add_arc)
/// also inserts the zero-capacity reverse arc, so solvers can push and undo
/// flow by adjusting the pair.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    pub(crate) arcs: Vec<Arc>,
    pub(crate) adj: Vec<Vec<u32>>,
}

impl FlowGraph {
    pub fn with_nodes(nodes: usize) -> Self {
        Self {
            arcs: Vec::new(),
            adj: vec![Vec::new(); nodes],
        }
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Add a forward arc and its reverse; returns the forward arc id (always
    /// even).
    pub fn add_arc(&mut self, from: u32, to: u32, cap: i64) -> u32 {
        debug_assert!((from as usize) < self.adj.len() && (to as usize) < self.adj.len());
        let id = self.arcs.len() as u32;
        self.arcs.push(Arc { to, cap });
        self.arcs.push(Arc { to: from, cap: 0 });
        self.adj[from as usize].push(id);
        self.adj[to as usize].push(id + 1);
        id
    }

    pub fn arc_target(&self, id: u32) -> u32 {
        self.arcs[id as usize].to
    }

    /// Remaining capacity of an arc.
    pub fn residual(&self, id: u32) -> i64 {
        self.arcs[id as usize].cap
    }

    /// Net units pushed through a forward arc, read from its reverse.
    pub fn flow(&self, id: u32) -> i64 {
        self.arcs[(id ^ 1) as usize].cap
    }

    /// Move `amount` units along the arc (negative undoes).
    pub(crate) fn push(&mut self, id: u32, amount: i64) {
        self.arcs[id as usize].cap -= amount;
        self.arcs[(id ^ 1) as usize].cap += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arcs_come_in_pairs() {
        let mut graph = FlowGraph::with_nodes(2);
        let id = graph.add_arc(0, 1, 3);
        assert_eq!(id, 0);
        assert_eq!(graph.arc_target(id), 1);
        assert_eq!(graph.arc_target(id ^ 1), 0);
        assert_eq!(graph.residual(id), 3);
        assert_eq!(graph.flow(id), 0);

        graph.push(id, 2);
        assert_eq!(graph.residual(id), 1);
        assert_eq!(graph.flow(id), 2);
    }
}
