//! Minimum-horizon search: exponential probing followed by binary
//! refinement.
//!
//! Feasibility is assumed monotone in the horizon, which holds whenever
//! every agent can reach some target and capacities suffice: extra steps
//! can always be spent waiting on the target.

use serde::Serialize;

use mapf_core::error::PlanError;
use mapf_core::reachability::shortest_time_with_rotation;
use mapf_core::{plan_flow, plan_flow_rot, Cell, Dir, Grid, Reservations};

use crate::params::SearchParams;

/// A minimum-horizon plan for a single-target request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinHorizonPlan {
    pub horizon: u32,
    /// One path of `horizon + 1` cells per agent, in request order.
    pub paths: Vec<Vec<Cell>>,
}

/// A minimum-horizon plan for a rotation-aware request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinHorizonRotPlan {
    pub horizon: u32,
    pub paths: Vec<Vec<Cell>>,
    pub facings: Vec<Vec<Dir>>,
}

/// Find the smallest `t` in `[lower, cap]` whose probe succeeds, assuming
/// the probe is monotone. Probes `lower` directly (it is a proven lower
/// bound), then doubles the offset until feasible or past the cap, then
/// bisects the remaining window.
pub(crate) fn search_min<P, F>(cap: u32, lower: u32, mut probe: F) -> Result<Option<(u32, P)>, PlanError>
where
    F: FnMut(u32) -> Result<Option<P>, PlanError>,
{
    if lower > cap {
        return Ok(None);
    }
    if let Some(found) = probe(lower)? {
        return Ok(Some((lower, found)));
    }
    if lower == cap {
        return Ok(None);
    }

    let mut low = lower + 1;
    let mut delta = 1u32;
    let mut best: Option<(u32, P)>;
    loop {
        let high = lower.saturating_add(delta);
        if high >= cap {
            match probe(cap)? {
                Some(found) => {
                    best = Some((cap, found));
                    break;
                }
                None => return Ok(None),
            }
        }
        if let Some(found) = probe(high)? {
            best = Some((high, found));
            break;
        }
        low = high + 1;
        delta = delta.saturating_mul(2);
    }

    let mut high = best.as_ref().map(|(t, _)| *t).expect("probe succeeded") - 1;
    while low <= high {
        let mid = low + (high - low) / 2;
        if let Some(found) = probe(mid)? {
            best = Some((mid, found));
            high = mid - 1;
        } else {
            low = mid + 1;
        }
    }
    Ok(best)
}

/// Minimum horizon for a single-target request, with its paths.
pub fn search_min_horizon(
    grid: &Grid,
    starts: &[Cell],
    targets: &[Cell],
    caps: &[u32],
    reservations: &Reservations,
    params: &SearchParams,
) -> Result<Option<MinHorizonPlan>, PlanError> {
    if starts.is_empty() {
        return Ok(Some(MinHorizonPlan {
            horizon: 0,
            paths: Vec::new(),
        }));
    }
    let found = search_min(params.horizon_cap, 0, |t| {
        Ok(plan_flow(grid, starts, targets, caps, t, reservations, params.method)?.into_paths())
    })?;
    Ok(found.map(|(horizon, paths)| MinHorizonPlan { horizon, paths }))
}

/// Minimum horizon for a rotation-aware request. The search starts at the
/// slowest agent's oriented shortest time, which prices quarter turns.
pub fn search_min_horizon_rot(
    grid: &Grid,
    starts: &[Cell],
    start_dirs: &[Dir],
    targets: &[Cell],
    caps: &[u32],
    reservations: &Reservations,
    params: &SearchParams,
) -> Result<Option<MinHorizonRotPlan>, PlanError> {
    if starts.is_empty() {
        return Ok(Some(MinHorizonRotPlan {
            horizon: 0,
            paths: Vec::new(),
            facings: Vec::new(),
        }));
    }
    let mut lower = 0u32;
    for (&start, &dir) in starts.iter().zip(start_dirs) {
        match shortest_time_with_rotation(grid, start, dir, targets) {
            Some(steps) => lower = lower.max(steps),
            None => return Ok(None),
        }
    }
    let found = search_min(params.horizon_cap, lower, |t| {
        Ok(
            plan_flow_rot(grid, starts, start_dirs, targets, caps, t, reservations, params.method)?
                .into_parts(),
        )
    })?;
    Ok(found.map(|(horizon, (paths, facings))| MinHorizonRotPlan {
        horizon,
        paths,
        facings,
    }))
}

/// Extend a path to `horizon + 1` entries by repeating its last cell.
pub(crate) fn pad_path(mut path: Vec<Cell>, horizon: u32) -> Vec<Cell> {
    if let Some(&last) = path.last() {
        while path.len() < horizon as usize + 1 {
            path.push(last);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Probe helper: feasible from `threshold` up, counting probes.
    fn counting_probe(threshold: u32, count: &mut u32) -> impl FnMut(u32) -> Result<Option<u32>, PlanError> + '_ {
        move |t| {
            *count += 1;
            Ok((t >= threshold).then_some(t))
        }
    }

    #[test]
    fn finds_the_threshold_exactly() {
        for threshold in 0..20 {
            let mut probes = 0;
            let found = search_min(64, 0, counting_probe(threshold, &mut probes)).expect("no errors");
            assert_eq!(found, Some((threshold, threshold)));
            assert!(probes <= 16, "threshold {threshold} took {probes} probes");
        }
    }

    #[test]
    fn respects_the_cap_and_the_lower_bound() {
        let mut probes = 0;
        let missed = search_min(10, 0, counting_probe(11, &mut probes)).expect("no errors");
        assert_eq!(missed, None);

        let mut probes = 0;
        let found = search_min(64, 5, counting_probe(3, &mut probes)).expect("no errors");
        assert_eq!(found, Some((5, 5)));
        assert_eq!(probes, 1, "a feasible lower bound needs one probe");

        let empty = search_min(3, 5, counting_probe(0, &mut probes)).expect("no errors");
        assert_eq!(empty, None);
    }

    #[test]
    fn pads_with_the_last_cell() {
        let path = vec![Cell::new(0, 0), Cell::new(1, 0)];
        let padded = pad_path(path, 3);
        assert_eq!(
            padded,
            vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(1, 0), Cell::new(1, 0)]
        );
        assert!(pad_path(Vec::new(), 3).is_empty());
    }
}
