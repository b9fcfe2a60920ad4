//! Structured diagnosis of rounds that fail to plan.
//!
//! The report is advisory: it re-solves relaxed sub-problems and reads the
//! reachability bounds, but never changes what the planners answer.

use std::collections::HashMap;

use serde::Serialize;

use mapf_core::error::PlanError;
use mapf_core::reachability::{
    cached_multi_source_bfs, kth_smallest_distance, max_distance_to, unreachable_cells,
};
use mapf_core::{plan_flow, Cell, FlowMethod, Grid, Reservations};

use crate::agents::AgentState;
use crate::params::SearchParams;
use crate::rounds::{plan_with_order, RoundOutcome};

/// Why a round cannot be planned at the probed horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    /// Outcome of the loaded-first ordered attempt.
    pub loaded_first: RoundOutcome,
    /// Outcome of the empty-first ordered attempt.
    pub empty_first: RoundOutcome,
    /// Whether the loaded group alone, with a free grid, can reach the drops.
    pub loaded_only: bool,
    /// Whether the empty group alone, with a free grid, can reach the pickups.
    pub empty_only: bool,
    /// Agent positions with no path to any pickup.
    pub unreachable_starts: Vec<Cell>,
    /// Pickups that can still reach some drop.
    pub reachable_pickups: usize,
    /// Slowest start-to-pickup distance, if every start can reach one.
    pub tau_min: Option<u32>,
    /// k-th smallest pickup-to-drop distance for k agents, if that many
    /// pickups can reach a drop.
    pub min_drop_needed: Option<u32>,
}

/// Diagnose a round at a fixed horizon.
pub fn explain_infeasible(
    grid: &Grid,
    agents: &[AgentState],
    pickups: &[Cell],
    drops: &[Cell],
    drop_caps: &HashMap<Cell, u32>,
    horizon: u32,
    method: FlowMethod,
) -> Result<Diagnosis, PlanError> {
    let loaded: Vec<AgentState> = agents.iter().copied().filter(AgentState::is_loaded).collect();
    let empty: Vec<AgentState> = agents
        .iter()
        .copied()
        .filter(|agent| !agent.is_loaded())
        .collect();
    let drop_cap_list: Vec<u32> = drops
        .iter()
        .map(|cell| drop_caps.get(cell).copied().unwrap_or(1))
        .collect();
    let pickup_caps = vec![1u32; pickups.len()];
    let free = Reservations::default();

    let loaded_only = if loaded.is_empty() {
        true
    } else {
        let starts: Vec<Cell> = loaded.iter().map(|agent| agent.pos).collect();
        plan_flow(grid, &starts, drops, &drop_cap_list, horizon, &free, method)?.is_feasible()
    };
    let empty_only = if empty.is_empty() {
        true
    } else {
        let starts: Vec<Cell> = empty.iter().map(|agent| agent.pos).collect();
        plan_flow(grid, &starts, pickups, &pickup_caps, horizon, &free, method)?.is_feasible()
    };

    let params = SearchParams::default()
        .with_horizon_cap(horizon)
        .with_method(method);
    let loaded_first = plan_with_order(
        grid, &loaded, &empty, pickups, drops, &drop_cap_list, horizon, true, &params,
    )?
    .outcome();
    let empty_first = plan_with_order(
        grid, &loaded, &empty, pickups, drops, &drop_cap_list, horizon, false, &params,
    )?
    .outcome();

    let starts: Vec<Cell> = agents.iter().map(|agent| agent.pos).collect();
    let to_pickups = cached_multi_source_bfs(grid, pickups);
    let to_drops = cached_multi_source_bfs(grid, drops);

    Ok(Diagnosis {
        loaded_first,
        empty_first,
        loaded_only,
        empty_only,
        unreachable_starts: unreachable_cells(grid, &to_pickups, &starts),
        reachable_pickups: pickups
            .iter()
            .filter(|&&cell| to_drops[grid.index(cell)] >= 0)
            .count(),
        tau_min: max_distance_to(grid, &to_pickups, &starts),
        min_drop_needed: kth_smallest_distance(grid, &to_drops, pickups, agents.len()),
    })
}
