//! Synchronized two-stage search: the smallest `(horizon, tau)` at which
//! every agent can stand on a pickup at `tau` and on a drop at the horizon.
//!
//! Reachability bounds shrink the window before any flow is built: the
//! slowest start-to-pickup distance floors `tau`, and the k-th smallest
//! pickup-to-drop distance floors the carry leg. The outer horizon search
//! is exponential-then-binary; the inner scan tries `tau` ascending and
//! keeps the first feasible value, so the reported pair is lexicographically
//! minimal regardless of worker count.

use std::collections::{BTreeMap, HashMap};

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;

use mapf_core::error::PlanError;
use mapf_core::reachability::{cached_multi_source_bfs, kth_smallest_distance, max_distance_to};
use mapf_core::{plan_flow_sync, Cell, Grid};

use crate::agents::AgentState;
use crate::params::SearchParams;
use crate::rounds::validate_agents;

/// A planned synchronized round, keyed by agent id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub horizon: u32,
    /// Step at which every agent stands on a pickup.
    pub tau: u32,
    pub paths: BTreeMap<u32, Vec<Cell>>,
}

/// Plan a synchronized round, requiring a drop cell per agent.
///
/// Missing `drop_caps` entries default to one slot per drop.
pub fn plan_round_sync(
    grid: &Grid,
    agents: &[AgentState],
    pickups: &[Cell],
    drops: &[Cell],
    drop_caps: &HashMap<Cell, u32>,
    params: &SearchParams,
) -> Result<Option<SyncPlan>, PlanError> {
    if drops.len() < agents.len() {
        return Err(PlanError::InvalidInput(format!(
            "synchronized rounds need one drop per agent (drops={}, agents={})",
            drops.len(),
            agents.len()
        )));
    }
    search_min_horizon_sync(grid, agents, pickups, drops, drop_caps, params)
}

/// Find the lexicographically smallest feasible `(horizon, tau)` within the
/// horizon cap, with its paths.
pub fn search_min_horizon_sync(
    grid: &Grid,
    agents: &[AgentState],
    pickups: &[Cell],
    drops: &[Cell],
    drop_caps: &HashMap<Cell, u32>,
    params: &SearchParams,
) -> Result<Option<SyncPlan>, PlanError> {
    if agents.is_empty() {
        return Ok(Some(SyncPlan {
            horizon: 0,
            tau: 0,
            paths: BTreeMap::new(),
        }));
    }
    validate_agents(agents)?;

    let starts: Vec<Cell> = agents.iter().map(|agent| agent.pos).collect();
    let drop_cap_list: Vec<u32> = drops
        .iter()
        .map(|cell| drop_caps.get(cell).copied().unwrap_or(1))
        .collect();

    // Bounds from the grid alone; provably hopeless instances end here.
    let to_pickups = cached_multi_source_bfs(grid, pickups);
    let Some(tau_floor) = max_distance_to(grid, &to_pickups, &starts) else {
        return Ok(None);
    };
    let to_drops = cached_multi_source_bfs(grid, drops);
    let Some(carry_floor) = kth_smallest_distance(grid, &to_drops, pickups, agents.len()) else {
        return Ok(None);
    };
    let lower = tau_floor.saturating_add(carry_floor);

    let instance = SyncInstance {
        grid,
        starts: &starts,
        pickups,
        drops,
        drop_cap_list: &drop_cap_list,
        tau_floor,
        carry_floor,
        params,
    };

    let found = if params.parallel() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.total_workers)
            .build()
            .expect("failed to create search worker pool");
        pool.install(|| search_outer(&instance, lower))?
    } else {
        search_outer(&instance, lower)?
    };

    Ok(found.map(|(horizon, tau, paths)| SyncPlan {
        horizon,
        tau,
        paths: agents
            .iter()
            .zip(paths)
            .map(|(agent, path)| (agent.id, path))
            .collect(),
    }))
}

struct SyncInstance<'a> {
    grid: &'a Grid,
    starts: &'a [Cell],
    pickups: &'a [Cell],
    drops: &'a [Cell],
    drop_cap_list: &'a [u32],
    tau_floor: u32,
    carry_floor: u32,
    params: &'a SearchParams,
}

type SyncHit = (u32, u32, Vec<Vec<Cell>>);

fn search_outer(instance: &SyncInstance<'_>, lower: u32) -> Result<Option<SyncHit>, PlanError> {
    let params = instance.params;
    let cap = params.horizon_cap;
    let serial_slots = params.tau_workers(1);
    if lower > cap {
        return Ok(None);
    }
    if let Some((tau, paths)) = probe_horizon(instance, lower, serial_slots)? {
        return Ok(Some((lower, tau, paths)));
    }
    if lower == cap {
        return Ok(None);
    }

    let mut low = lower + 1;
    let mut delta = 1u32;
    let mut best: SyncHit;
    loop {
        let high = lower.saturating_add(delta);
        if high >= cap {
            match probe_horizon(instance, cap, serial_slots)? {
                Some((tau, paths)) => {
                    best = (cap, tau, paths);
                    break;
                }
                None => return Ok(None),
            }
        }
        if let Some((tau, paths)) = probe_horizon(instance, high, serial_slots)? {
            best = (high, tau, paths);
            break;
        }
        low = high + 1;
        delta = delta.saturating_mul(2);
    }
    if params.horizon_workers > 1 && params.parallel() {
        // Refine by scanning the window in ascending batches of candidate
        // horizons; the first feasible one is the minimum.
        let candidates: Vec<u32> = (low..best.0).collect();
        for batch in candidates.chunks(params.horizon_workers) {
            let slots = params.tau_workers(batch.len());
            let outcomes: Vec<Option<(u32, Vec<Vec<Cell>>)>> = batch
                .par_iter()
                .map(|&t| probe_horizon(instance, t, slots))
                .collect::<Result<_, PlanError>>()?;
            if let Some((i, (tau, paths))) = outcomes
                .into_iter()
                .enumerate()
                .find_map(|(i, hit)| hit.map(|found| (i, found)))
            {
                best = (batch[i], tau, paths);
                break;
            }
        }
    } else {
        let mut high = best.0 - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            if let Some((tau, paths)) = probe_horizon(instance, mid, serial_slots)? {
                best = (mid, tau, paths);
                high = mid - 1;
            } else {
                low = mid + 1;
            }
        }
    }
    Ok(Some(best))
}

/// Scan `tau` ascending for one candidate horizon; the first feasible value
/// wins. With more than one slot, consecutive candidates are probed in
/// batches and the earliest hit of the batch is kept.
fn probe_horizon(
    instance: &SyncInstance<'_>,
    horizon: u32,
    slots: usize,
) -> Result<Option<(u32, Vec<Vec<Cell>>)>, PlanError> {
    let tau_low = instance.tau_floor;
    if horizon < instance.carry_floor || horizon - instance.carry_floor < tau_low {
        return Ok(None);
    }
    let tau_high = horizon - instance.carry_floor;

    let solve = |tau: u32| -> Result<Option<Vec<Vec<Cell>>>, PlanError> {
        Ok(plan_flow_sync(
            instance.grid,
            instance.starts,
            instance.pickups,
            instance.drops,
            instance.drop_cap_list,
            horizon,
            tau,
            instance.params.method,
        )?
        .into_paths())
    };

    if slots <= 1 {
        let bar = instance
            .params
            .show_progress
            .then(|| ProgressBar::new(u64::from(tau_high - tau_low) + 1));
        for tau in tau_low..=tau_high {
            let hit = solve(tau)?;
            if let Some(ref bar) = bar {
                bar.inc(1);
            }
            if let Some(paths) = hit {
                if let Some(ref bar) = bar {
                    bar.finish_and_clear();
                }
                return Ok(Some((tau, paths)));
            }
        }
        if let Some(ref bar) = bar {
            bar.finish_and_clear();
        }
        return Ok(None);
    }

    let candidates: Vec<u32> = (tau_low..=tau_high).collect();
    for batch in candidates.chunks(slots) {
        let outcomes: Vec<Option<Vec<Vec<Cell>>>> = batch
            .par_iter()
            .map(|&tau| solve(tau))
            .collect::<Result<_, PlanError>>()?;
        if let Some((i, paths)) = outcomes
            .into_iter()
            .enumerate()
            .find_map(|(i, hit)| hit.map(|paths| (i, paths)))
        {
            return Ok(Some((batch[i], paths)));
        }
    }
    Ok(None)
}
