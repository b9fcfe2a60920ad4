//! End-to-end coverage of rotation-aware planning.

use mapf_core::test_helpers::{assert_plan_valid, cells, grid_from};
use mapf_core::{plan_flow, plan_flow_rot, Cell, Dir, FlowMethod, Reservations};

#[test]
fn aligned_agent_needs_no_extra_steps() {
    let grid = grid_from(&["..."]);
    let oriented = plan_flow_rot(
        &grid,
        &cells(&[(0, 0)]),
        &[Dir::East],
        &cells(&[(2, 0)]),
        &[1],
        2,
        &Reservations::default(),
        FlowMethod::Dinic,
    )
    .expect("valid request");
    let plain = plan_flow(
        &grid,
        &cells(&[(0, 0)]),
        &cells(&[(2, 0)]),
        &[1],
        2,
        &Reservations::default(),
        FlowMethod::Dinic,
    )
    .expect("valid request");
    let (paths, facings) = oriented.into_parts().expect("feasible");
    let plain_paths = plain.into_paths().expect("feasible");
    assert_eq!(paths[0].len(), plain_paths[0].len());
    assert!(facings[0].iter().all(|&dir| dir == Dir::East));
}

#[test]
fn quarter_turn_costs_one_step() {
    let grid = grid_from(&["..."]);
    let starts = cells(&[(0, 0)]);
    let targets = cells(&[(2, 0)]);

    let rushed = plan_flow_rot(
        &grid,
        &starts,
        &[Dir::South],
        &targets,
        &[1],
        2,
        &Reservations::default(),
        FlowMethod::Dinic,
    )
    .expect("valid request");
    assert!(!rushed.is_feasible());

    let turned = plan_flow_rot(
        &grid,
        &starts,
        &[Dir::South],
        &targets,
        &[1],
        3,
        &Reservations::default(),
        FlowMethod::Dinic,
    )
    .expect("valid request");
    let (paths, facings) = turned.into_parts().expect("feasible");
    assert_eq!(paths[0].len(), 4);
    assert_eq!(facings[0].len(), 4);
    assert_eq!(*paths[0].last().unwrap(), Cell::new(2, 0));
}

#[test]
fn half_turn_costs_two_steps() {
    let grid = grid_from(&["..."]);
    let starts = cells(&[(0, 0)]);
    let targets = cells(&[(2, 0)]);

    for horizon in [2, 3] {
        let outcome = plan_flow_rot(
            &grid,
            &starts,
            &[Dir::West],
            &targets,
            &[1],
            horizon,
            &Reservations::default(),
            FlowMethod::Dinic,
        )
        .expect("valid request");
        assert!(!outcome.is_feasible(), "horizon {horizon}");
    }

    let outcome = plan_flow_rot(
        &grid,
        &starts,
        &[Dir::West],
        &targets,
        &[1],
        4,
        &Reservations::default(),
        FlowMethod::Dinic,
    )
    .expect("valid request");
    let (paths, _) = outcome.into_parts().expect("feasible");
    assert_eq!(paths[0].len(), 5);
    assert_eq!(*paths[0].last().unwrap(), Cell::new(2, 0));
}

#[test]
fn reserved_cell_blocks_every_facing() {
    let grid = grid_from(&["..."]);
    let mut reservations = Reservations::new();
    reservations.reserve_vertex(Cell::new(1, 0), 1);

    let tight = plan_flow_rot(
        &grid,
        &cells(&[(0, 0)]),
        &[Dir::East],
        &cells(&[(2, 0)]),
        &[1],
        2,
        &reservations,
        FlowMethod::Dinic,
    )
    .expect("valid request");
    assert!(!tight.is_feasible());

    let delayed = plan_flow_rot(
        &grid,
        &cells(&[(0, 0)]),
        &[Dir::East],
        &cells(&[(2, 0)]),
        &[1],
        4,
        &reservations,
        FlowMethod::Dinic,
    )
    .expect("valid request");
    assert!(delayed.is_feasible());
}

#[test]
fn waiting_preserves_the_facing() {
    let grid = grid_from(&["..."]);
    let mut reservations = Reservations::new();
    reservations.reserve_vertex(Cell::new(1, 0), 1);

    let outcome = plan_flow_rot(
        &grid,
        &cells(&[(0, 0)]),
        &[Dir::East],
        &cells(&[(2, 0)]),
        &[1],
        4,
        &reservations,
        FlowMethod::Dinic,
    )
    .expect("valid request");
    let (paths, facings) = outcome.into_parts().expect("feasible");
    for t in 0..paths[0].len() - 1 {
        if paths[0][t] == paths[0][t + 1] {
            assert_eq!(facings[0][t], facings[0][t + 1], "facing changed during a wait");
        }
    }
}

#[test]
fn facing_sequences_match_paths() {
    let grid = grid_from(&["..."]);
    let outcome = plan_flow_rot(
        &grid,
        &cells(&[(0, 0)]),
        &[Dir::East],
        &cells(&[(2, 0)]),
        &[1],
        2,
        &Reservations::default(),
        FlowMethod::Dinic,
    )
    .expect("valid request");
    let (paths, facings) = outcome.into_parts().expect("feasible");
    assert_eq!(paths.len(), facings.len());
    for (path, dirs) in paths.iter().zip(&facings) {
        assert_eq!(path.len(), dirs.len());
    }
}

#[test]
fn disjoint_corridors_stay_collision_free() {
    let grid = grid_from(&["...", "...", "..."]);
    let outcome = plan_flow_rot(
        &grid,
        &cells(&[(0, 0), (2, 2)]),
        &[Dir::East, Dir::West],
        &cells(&[(2, 0), (0, 2)]),
        &[1, 1],
        6,
        &Reservations::default(),
        FlowMethod::Dinic,
    )
    .expect("valid request");
    let (paths, _) = outcome.into_parts().expect("feasible");
    assert_eq!(paths.len(), 2);
    assert_plan_valid(&grid, &paths);
}

#[test]
fn no_agents_is_trivially_feasible() {
    let grid = grid_from(&["..."]);
    let outcome = plan_flow_rot(
        &grid,
        &[],
        &[],
        &cells(&[(2, 0)]),
        &[1],
        2,
        &Reservations::default(),
        FlowMethod::Dinic,
    )
    .expect("valid request");
    let (paths, facings) = outcome.into_parts().expect("feasible");
    assert!(paths.is_empty() && facings.is_empty());
}

#[test]
fn hlpp_solves_oriented_instances() {
    let grid = grid_from(&["..."]);
    let outcome = plan_flow_rot(
        &grid,
        &cells(&[(0, 0)]),
        &[Dir::East],
        &cells(&[(2, 0)]),
        &[1],
        2,
        &Reservations::default(),
        FlowMethod::Hlpp,
    )
    .expect("valid request");
    let (paths, _) = outcome.into_parts().expect("feasible");
    assert_eq!(*paths[0].last().unwrap(), Cell::new(2, 0));
}
