//! Two-phase round planning for mixed fleets.
//!
//! Loaded agents head for drop cells, empty agents for pickup cells. One
//! cargo group is planned first with a free grid; its padded trajectories
//! become reservations for the other group. Both orderings are attempted,
//! loaded-first then empty-first, and either succeeding settles the round.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use mapf_core::error::PlanError;
use mapf_core::{plan_flow, Cell, Grid, Reservations};

use crate::agents::AgentState;
use crate::params::SearchParams;
use crate::search::{pad_path, search_min};

/// A planned round: every agent's padded path over `[0, horizon]`, keyed by
/// agent id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundPlan {
    pub horizon: u32,
    pub paths: BTreeMap<u32, Vec<Cell>>,
}

/// How one ordered planning attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundOutcome {
    Planned,
    LoadedStageInfeasible,
    EmptyStageInfeasible,
}

pub(crate) enum OrderAttempt {
    Planned(BTreeMap<u32, Vec<Cell>>),
    LoadedStage,
    EmptyStage,
}

impl OrderAttempt {
    pub(crate) fn outcome(&self) -> RoundOutcome {
        match self {
            OrderAttempt::Planned(_) => RoundOutcome::Planned,
            OrderAttempt::LoadedStage => RoundOutcome::LoadedStageInfeasible,
            OrderAttempt::EmptyStage => RoundOutcome::EmptyStageInfeasible,
        }
    }
}

/// Plan one round at the smallest feasible horizon within the cap.
///
/// Missing `drop_caps` entries default to one slot per drop.
pub fn plan_round(
    grid: &Grid,
    agents: &[AgentState],
    pickups: &[Cell],
    drops: &[Cell],
    drop_caps: &HashMap<Cell, u32>,
    params: &SearchParams,
) -> Result<Option<RoundPlan>, PlanError> {
    if agents.is_empty() {
        return Ok(Some(RoundPlan {
            horizon: 0,
            paths: BTreeMap::new(),
        }));
    }
    validate_agents(agents)?;

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

    let found = search_min(params.horizon_cap, 0, |t| {
        let first = plan_with_order(grid, &loaded, &empty, pickups, drops, &drop_cap_list, t, true, params)?;
        if let OrderAttempt::Planned(paths) = first {
            return Ok(Some(paths));
        }
        let second =
            plan_with_order(grid, &loaded, &empty, pickups, drops, &drop_cap_list, t, false, params)?;
        match second {
            OrderAttempt::Planned(paths) => Ok(Some(paths)),
            _ => Ok(None),
        }
    })?;
    Ok(found.map(|(horizon, paths)| RoundPlan { horizon, paths }))
}

/// One ordered attempt at a fixed horizon: plan the first group at its own
/// minimum horizon, reserve its padded trajectories, then plan the second
/// group around them.
#[allow(clippy::too_many_arguments)]
pub(crate) fn plan_with_order(
    grid: &Grid,
    loaded: &[AgentState],
    empty: &[AgentState],
    pickups: &[Cell],
    drops: &[Cell],
    drop_cap_list: &[u32],
    horizon: u32,
    loaded_first: bool,
    params: &SearchParams,
) -> Result<OrderAttempt, PlanError> {
    let pickup_caps = vec![1u32; pickups.len()];

    let (first_group, first_targets, first_caps): (&[AgentState], &[Cell], &[u32]) = if loaded_first
    {
        (loaded, drops, drop_cap_list)
    } else {
        (empty, pickups, &pickup_caps)
    };
    let (second_group, second_targets, second_caps): (&[AgentState], &[Cell], &[u32]) =
        if loaded_first {
            (empty, pickups, &pickup_caps)
        } else {
            (loaded, drops, drop_cap_list)
        };

    let free = Reservations::default();
    let Some(first_paths) =
        plan_group(grid, first_group, first_targets, first_caps, &free, horizon, params)?
    else {
        return Ok(if loaded_first {
            OrderAttempt::LoadedStage
        } else {
            OrderAttempt::EmptyStage
        });
    };

    let reservations = Reservations::from_paths(&first_paths);
    let Some(second_paths) = plan_group(
        grid,
        second_group,
        second_targets,
        second_caps,
        &reservations,
        horizon,
        params,
    )?
    else {
        return Ok(if loaded_first {
            OrderAttempt::EmptyStage
        } else {
            OrderAttempt::LoadedStage
        });
    };

    let mut paths = BTreeMap::new();
    for (agent, path) in first_group.iter().zip(first_paths) {
        paths.insert(agent.id, path);
    }
    for (agent, path) in second_group.iter().zip(second_paths) {
        paths.insert(agent.id, path);
    }
    Ok(OrderAttempt::Planned(paths))
}

/// Plan one cargo group at its own minimum horizon within the round, then
/// pad every path out to the round horizon.
fn plan_group(
    grid: &Grid,
    group: &[AgentState],
    targets: &[Cell],
    caps: &[u32],
    reservations: &Reservations,
    horizon: u32,
    params: &SearchParams,
) -> Result<Option<Vec<Vec<Cell>>>, PlanError> {
    if group.is_empty() {
        return Ok(Some(Vec::new()));
    }
    let starts: Vec<Cell> = group.iter().map(|agent| agent.pos).collect();
    let found = search_min(horizon, 0, |t| {
        Ok(plan_flow(grid, &starts, targets, caps, t, reservations, params.method)?.into_paths())
    })?;
    Ok(found.map(|(_, paths)| {
        paths
            .into_iter()
            .map(|path| pad_path(path, horizon))
            .collect()
    }))
}

pub(crate) fn validate_agents(agents: &[AgentState]) -> Result<(), PlanError> {
    let mut ids = HashSet::with_capacity(agents.len());
    let mut positions = HashSet::with_capacity(agents.len());
    for agent in agents {
        if !ids.insert(agent.id) {
            return Err(PlanError::InvalidInput(format!(
                "duplicate agent id {}",
                agent.id
            )));
        }
        if !positions.insert(agent.pos) {
            return Err(PlanError::InvalidInput(format!(
                "two agents occupy ({}, {})",
                agent.pos.x, agent.pos.y
            )));
        }
    }
    Ok(())
}
