//! Unit-capacity max-flow engine with interchangeable algorithms.
//!
//! Networks are built as [`FlowGraph`]s with explicit reverse arcs; a
//! [`FlowSolver`] saturates them in place. Two implementations are provided
//! and selectable by name:
//!
//! - [`Dinic`]: repeated BFS level graphs with DFS blocking flow.
//! - [`Hlpp`]: highest-label push-relabel with gap and global-relabel
//!   heuristics.
//!
//! Any feasible max flow is acceptable; ties between equivalent routings are
//! unspecified.

pub mod graph;

mod dinic;
mod hlpp;

pub use dinic::Dinic;
pub use graph::FlowGraph;
pub use hlpp::Hlpp;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// A max-flow algorithm over a residual graph.
pub trait FlowSolver {
    /// Saturate the graph and return the total flow moved from `source` to
    /// `sink`.
    fn max_flow(&self, graph: &mut FlowGraph, source: u32, sink: u32) -> i64;
}

/// Named solver selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowMethod {
    #[default]
    Dinic,
    Hlpp,
}

impl FlowMethod {
    /// Parse a solver name, case-insensitively: `"dinic"` or `"hlpp"`.
    pub fn from_name(name: &str) -> Result<Self, PlanError> {
        match name.to_ascii_lowercase().as_str() {
            "dinic" => Ok(FlowMethod::Dinic),
            "hlpp" => Ok(FlowMethod::Hlpp),
            other => Err(PlanError::InvalidInput(format!(
                "unknown flow method \"{other}\" (expected \"dinic\" or \"hlpp\")"
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FlowMethod::Dinic => "dinic",
            FlowMethod::Hlpp => "hlpp",
        }
    }

    /// Run the selected algorithm to saturation.
    pub fn solve(self, graph: &mut FlowGraph, source: u32, sink: u32) -> i64 {
        match self {
            FlowMethod::Dinic => Dinic.max_flow(graph, source, sink),
            FlowMethod::Hlpp => Hlpp.max_flow(graph, source, sink),
        }
    }
}

impl std::str::FromStr for FlowMethod {
    type Err = PlanError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        FlowMethod::from_name(name)
    }
}
