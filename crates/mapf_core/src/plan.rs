//! Plan entry points: single-target, synchronized two-stage, and
//! rotation-aware planning over a fixed horizon.
//!
//! A request is validated up front and fails fast on malformed input; a
//! well-formed request that admits no collision-free routing reports
//! `Infeasible` in the outcome instead. Returned paths always have
//! `horizon + 1` entries per agent, starting at the agent's start cell.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::flow::FlowMethod;
use crate::grid::{Cell, Dir, Grid};
use crate::network::extract::{trace_cell_paths, trace_oriented_paths};
use crate::network::{rotation, single, sync};
use crate::reservations::Reservations;

/// Outcome of a fixed-horizon plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanOutcome {
    /// One path per agent, in request order.
    Feasible(Vec<Vec<Cell>>),
    Infeasible,
}

impl PlanOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, PlanOutcome::Feasible(_))
    }

    pub fn paths(&self) -> Option<&[Vec<Cell>]> {
        match self {
            PlanOutcome::Feasible(paths) => Some(paths),
            PlanOutcome::Infeasible => None,
        }
    }

    pub fn into_paths(self) -> Option<Vec<Vec<Cell>>> {
        match self {
            PlanOutcome::Feasible(paths) => Some(paths),
            PlanOutcome::Infeasible => None,
        }
    }
}

/// Outcome of a fixed-horizon rotation-aware plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotPlanOutcome {
    Feasible {
        paths: Vec<Vec<Cell>>,
        /// Facing per step, aligned with `paths`; waits keep the facing.
        facings: Vec<Vec<Dir>>,
    },
    Infeasible,
}

impl RotPlanOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, RotPlanOutcome::Feasible { .. })
    }

    pub fn into_parts(self) -> Option<(Vec<Vec<Cell>>, Vec<Vec<Dir>>)> {
        match self {
            RotPlanOutcome::Feasible { paths, facings } => Some((paths, facings)),
            RotPlanOutcome::Infeasible => None,
        }
    }
}

/// Route every agent from its start to some target cell by `horizon`,
/// collision-free, honoring per-target capacities and the given
/// reservations.
pub fn plan_flow(
    grid: &Grid,
    starts: &[Cell],
    targets: &[Cell],
    caps: &[u32],
    horizon: u32,
    reservations: &Reservations,
    method: FlowMethod,
) -> Result<PlanOutcome, PlanError> {
    validate_starts(grid, starts)?;
    validate_cells(grid, targets, "target")?;
    if caps.len() != targets.len() {
        return Err(PlanError::InvalidInput(format!(
            "{} capacities for {} targets",
            caps.len(),
            targets.len()
        )));
    }
    validate_reservations(starts, reservations)?;
    if starts.is_empty() {
        return Ok(PlanOutcome::Feasible(Vec::new()));
    }

    let mut net = single::build(grid, starts, targets, caps, horizon, reservations);
    let (source, sink) = (net.source(), net.sink());
    let flow = method.solve(&mut net.graph, source, sink);
    if flow == starts.len() as i64 {
        Ok(PlanOutcome::Feasible(trace_cell_paths(&net, grid, starts)))
    } else {
        Ok(PlanOutcome::Infeasible)
    }
}

/// Route every agent so it stands on a pickup cell exactly at `tau` and on
/// a drop cell exactly at `horizon`.
pub fn plan_flow_sync(
    grid: &Grid,
    starts: &[Cell],
    pickups: &[Cell],
    drops: &[Cell],
    drop_caps: &[u32],
    horizon: u32,
    tau: u32,
    method: FlowMethod,
) -> Result<PlanOutcome, PlanError> {
    validate_starts(grid, starts)?;
    validate_cells(grid, pickups, "pickup")?;
    validate_cells(grid, drops, "drop")?;
    if drop_caps.len() != drops.len() {
        return Err(PlanError::InvalidInput(format!(
            "{} capacities for {} drops",
            drop_caps.len(),
            drops.len()
        )));
    }
    if tau > horizon {
        return Err(PlanError::InvalidInput(format!(
            "rendezvous step {tau} exceeds horizon {horizon}"
        )));
    }
    if starts.is_empty() {
        return Ok(PlanOutcome::Feasible(Vec::new()));
    }

    let mut net = sync::build(grid, starts, pickups, drops, drop_caps, horizon, tau);
    let (source, sink) = (net.source(), net.sink());
    let flow = method.solve(&mut net.graph, source, sink);
    if flow == starts.len() as i64 {
        Ok(PlanOutcome::Feasible(trace_cell_paths(&net, grid, starts)))
    } else {
        Ok(PlanOutcome::Infeasible)
    }
}

/// [`plan_flow`] with orientation: agents carry a facing, move only along
/// it, and spend one step per quarter turn.
pub fn plan_flow_rot(
    grid: &Grid,
    starts: &[Cell],
    start_dirs: &[Dir],
    targets: &[Cell],
    caps: &[u32],
    horizon: u32,
    reservations: &Reservations,
    method: FlowMethod,
) -> Result<RotPlanOutcome, PlanError> {
    validate_starts(grid, starts)?;
    validate_cells(grid, targets, "target")?;
    if start_dirs.len() != starts.len() {
        return Err(PlanError::InvalidInput(format!(
            "{} facings for {} starts",
            start_dirs.len(),
            starts.len()
        )));
    }
    if caps.len() != targets.len() {
        return Err(PlanError::InvalidInput(format!(
            "{} capacities for {} targets",
            caps.len(),
            targets.len()
        )));
    }
    validate_reservations(starts, reservations)?;
    if starts.is_empty() {
        return Ok(RotPlanOutcome::Feasible {
            paths: Vec::new(),
            facings: Vec::new(),
        });
    }

    let mut net = rotation::build(grid, starts, start_dirs, targets, caps, horizon, reservations);
    let (source, sink) = (net.source(), net.sink());
    let flow = method.solve(&mut net.graph, source, sink);
    if flow == starts.len() as i64 {
        let (paths, facings) = trace_oriented_paths(&net, grid, starts, start_dirs);
        Ok(RotPlanOutcome::Feasible { paths, facings })
    } else {
        Ok(RotPlanOutcome::Infeasible)
    }
}

fn validate_cells(grid: &Grid, cells: &[Cell], what: &str) -> Result<(), PlanError> {
    for &cell in cells {
        if !grid.passable(cell) {
            return Err(PlanError::InvalidInput(format!(
                "{what} ({}, {}) is blocked or out of bounds",
                cell.x, cell.y
            )));
        }
    }
    Ok(())
}

fn validate_starts(grid: &Grid, starts: &[Cell]) -> Result<(), PlanError> {
    validate_cells(grid, starts, "start")?;
    let mut seen = HashSet::with_capacity(starts.len());
    for &start in starts {
        if !seen.insert(start) {
            return Err(PlanError::InvalidInput(format!(
                "two agents start on ({}, {})",
                start.x, start.y
            )));
        }
    }
    Ok(())
}

fn validate_reservations(starts: &[Cell], reservations: &Reservations) -> Result<(), PlanError> {
    for &start in starts {
        if reservations.vertex_reserved(start, 0) {
            return Err(PlanError::ReservationConflict(start));
        }
    }
    Ok(())
}
