//! # Multi-Agent Flow Planner Core
//!
//! Exact collision-free routing for fleets on 4-connected grids, built on
//! unit-capacity max flow over time-expanded networks.
//!
//! ## Overview
//!
//! This crate provides the planning engine, including:
//!
//! - **Grid & Reachability**: passable-cell geometry and multi-source BFS
//!   distance fields with memoization
//! - **Max-Flow Engine**: Dinic and highest-label push-relabel solvers over
//!   a shared residual graph
//! - **Time-Expanded Networks**: per-step cell layers whose unit capacities
//!   rule out vertex conflicts and edge swaps by construction
//! - **Plan Modes**: single-target with capacities and reservations,
//!   synchronized two-stage pickup-then-drop, and rotation-aware planning
//!   with quarter-turn costs
//!
//! ## Key Concepts
//!
//! - **Feasibility is a value**: a request that admits no plan returns
//!   `Infeasible`, never an error; errors are reserved for malformed input
//! - **Deterministic attribution**: flow units are traced back to agents in
//!   request order, so equal inputs yield equal paths
//! - **Per-solve state**: every call builds its own network; grids are
//!   immutable and freely shared across threads
//!
//! ## Example
//!
//! ```rust,no_run
//! use mapf_core::{plan_flow, Cell, FlowMethod, Grid, Reservations};
//!
//! let grid = Grid::from_rows(&[vec![0, 0, 0]]).unwrap();
//! let outcome = plan_flow(
//!     &grid,
//!     &[Cell::new(0, 0)],
//!     &[Cell::new(2, 0)],
//!     &[1],
//!     2,
//!     &Reservations::default(),
//!     FlowMethod::Dinic,
//! )
//! .unwrap();
//! assert!(outcome.is_feasible());
//! ```

pub mod error;
pub mod flow;
pub mod grid;
pub mod plan;
pub mod reachability;
pub mod reservations;

mod network;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use error::PlanError;
pub use flow::FlowMethod;
pub use grid::{Cell, Dir, Grid};
pub use plan::{plan_flow, plan_flow_rot, plan_flow_sync, PlanOutcome, RotPlanOutcome};
pub use reservations::Reservations;
