//! # Multi-Agent Flow Planner Search Drivers
//!
//! Minimum-makespan orchestration over the `mapf_core` flow planners.
//!
//! ## Overview
//!
//! This crate locates the smallest feasible horizons, including:
//!
//! - **Single-target search**: exponential probing plus binary refinement
//! - **Two-phase rounds**: loaded and empty agents planned in both orders,
//!   the first group's trajectories reserved against the second
//! - **Synchronized rounds**: joint minimum `(horizon, tau)` with
//!   reachability bounds that skip provably hopeless instances
//! - **Parallel probing**: rayon worker pools scan rendezvous candidates
//!   and candidate horizons in deterministic ascending batches
//! - **Diagnosis**: structured reports on why a round fails
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//!
//! use mapf_core::{Cell, Grid};
//! use mapf_search::{plan_round_sync, AgentState, CargoState, SearchParams};
//!
//! let grid = Grid::from_rows(&[vec![0, 0], vec![0, 0]]).unwrap();
//! let agents = vec![
//!     AgentState::new(1, Cell::new(0, 0), CargoState::Empty),
//!     AgentState::new(2, Cell::new(1, 0), CargoState::Empty),
//! ];
//! let pickups = vec![Cell::new(0, 1), Cell::new(1, 1)];
//! let drops = vec![Cell::new(0, 0), Cell::new(1, 0)];
//! let params = SearchParams::default().with_workers(4);
//!
//! let plan = plan_round_sync(&grid, &agents, &pickups, &drops, &HashMap::new(), &params)
//!     .unwrap()
//!     .expect("a feasible round");
//! assert_eq!((plan.horizon, plan.tau), (2, 1));
//! ```

pub mod agents;
pub mod explain;
pub mod params;
pub mod rounds;
pub mod search;
pub mod sync;

pub use agents::{AgentState, CargoState};
pub use explain::{explain_infeasible, Diagnosis};
pub use params::SearchParams;
pub use rounds::{plan_round, RoundOutcome, RoundPlan};
pub use search::{
    search_min_horizon, search_min_horizon_rot, MinHorizonPlan, MinHorizonRotPlan,
};
pub use sync::{plan_round_sync, search_min_horizon_sync, SyncPlan};
