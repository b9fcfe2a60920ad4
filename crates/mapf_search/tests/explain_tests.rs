//! Diagnosis reports for failing rounds.

use std::collections::HashMap;

use mapf_core::test_helpers::{cells, grid_from};
use mapf_core::{Cell, FlowMethod};
use mapf_search::{explain_infeasible, AgentState, CargoState, RoundOutcome};

#[test]
fn feasible_rounds_diagnose_clean() {
    let grid = grid_from(&["....", "....", "....", "...."]);
    let agents = vec![
        AgentState::new(1, Cell::new(0, 0), CargoState::Loaded),
        AgentState::new(2, Cell::new(0, 3), CargoState::Empty),
    ];
    let report = explain_infeasible(
        &grid,
        &agents,
        &cells(&[(3, 3)]),
        &cells(&[(3, 0)]),
        &HashMap::new(),
        8,
        FlowMethod::Dinic,
    )
    .expect("valid request");

    assert_eq!(report.loaded_first, RoundOutcome::Planned);
    assert_eq!(report.empty_first, RoundOutcome::Planned);
    assert!(report.loaded_only);
    assert!(report.empty_only);
    assert!(report.unreachable_starts.is_empty());
    assert_eq!(report.reachable_pickups, 1);
    assert_eq!(report.tau_min, Some(6));
    // Two agents share a single pickup, so no carry bound exists.
    assert_eq!(report.min_drop_needed, None);
}

#[test]
fn corridor_deadlock_blames_the_second_stage() {
    // Each group is fine alone; orderings fail because the corridor cannot
    // be shared.
    let grid = grid_from(&["...."]);
    let agents = vec![
        AgentState::new(1, Cell::new(1, 0), CargoState::Loaded),
        AgentState::new(2, Cell::new(2, 0), CargoState::Empty),
    ];
    let report = explain_infeasible(
        &grid,
        &agents,
        &cells(&[(0, 0)]),
        &cells(&[(3, 0)]),
        &HashMap::new(),
        6,
        FlowMethod::Dinic,
    )
    .expect("valid request");

    assert!(report.loaded_only);
    assert!(report.empty_only);
    assert_eq!(report.loaded_first, RoundOutcome::EmptyStageInfeasible);
    assert_eq!(report.empty_first, RoundOutcome::LoadedStageInfeasible);
    assert!(report.unreachable_starts.is_empty());
    // Two agents but a single pickup: no carry bound exists.
    assert_eq!(report.reachable_pickups, 1);
    assert_eq!(report.tau_min, Some(2));
    assert_eq!(report.min_drop_needed, None);
}

#[test]
fn cut_off_starts_are_listed() {
    let grid = grid_from(&[".#.", ".#."]);
    let agents = vec![
        AgentState::new(1, Cell::new(0, 0), CargoState::Empty),
        AgentState::new(2, Cell::new(2, 0), CargoState::Empty),
    ];
    let report = explain_infeasible(
        &grid,
        &agents,
        &cells(&[(0, 1)]),
        &cells(&[(0, 0)]),
        &HashMap::new(),
        4,
        FlowMethod::Dinic,
    )
    .expect("valid request");

    assert_eq!(report.unreachable_starts, vec![Cell::new(2, 0)]);
    assert_eq!(report.tau_min, None);
    assert!(!report.empty_only);
}
