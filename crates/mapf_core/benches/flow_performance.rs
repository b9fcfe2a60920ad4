//! Performance benchmarks for mapf_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use mapf_core::{plan_flow, plan_flow_sync, Cell, FlowMethod, Grid, Reservations};

/// Open square grid with a sparse obstacle lattice.
fn lattice_grid(side: u32) -> Grid {
    let rows: Vec<Vec<u8>> = (0..side)
        .map(|y| {
            (0..side)
                .map(|x| u8::from(x % 4 == 2 && y % 4 == 2))
                .collect()
        })
        .collect();
    Grid::from_rows(&rows).expect("lattice grid")
}

/// Agents along the top edge, targets along the bottom edge.
fn crossing_fleet(side: u32, agents: u32) -> (Vec<Cell>, Vec<Cell>) {
    let starts = (0..agents).map(|i| Cell::new(i % side, 0)).collect();
    let targets = (0..agents)
        .map(|i| Cell::new(side - 1 - (i % side), side - 1))
        .collect();
    (starts, targets)
}

fn bench_fixed_horizon_plans(c: &mut Criterion) {
    let scenarios = [("small", 8u32, 4u32), ("medium", 12, 8), ("large", 16, 12)];

    let mut group = c.benchmark_group("fixed_horizon_plan");
    for (name, side, agents) in scenarios {
        let grid = lattice_grid(side);
        let (starts, targets) = crossing_fleet(side, agents);
        let caps = vec![1u32; targets.len()];
        let horizon = 2 * side;
        for method in [FlowMethod::Dinic, FlowMethod::Hlpp] {
            group.bench_with_input(
                BenchmarkId::new(method.name(), name),
                &method,
                |b, &method| {
                    b.iter(|| {
                        black_box(
                            plan_flow(
                                &grid,
                                &starts,
                                &targets,
                                &caps,
                                horizon,
                                &Reservations::default(),
                                method,
                            )
                            .expect("valid request"),
                        )
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_synchronized_plans(c: &mut Criterion) {
    let side = 10u32;
    let grid = lattice_grid(side);
    let starts: Vec<Cell> = (0..6).map(|i| Cell::new(i, 0)).collect();
    let pickups: Vec<Cell> = (0..6).map(|i| Cell::new(i, side - 1)).collect();
    let drops: Vec<Cell> = (0..6).map(|i| Cell::new(i, 0)).collect();
    let drop_caps = vec![1u32; drops.len()];
    let horizon = 2 * side;
    let tau = side;

    let mut group = c.benchmark_group("synchronized_plan");
    for method in [FlowMethod::Dinic, FlowMethod::Hlpp] {
        group.bench_with_input(
            BenchmarkId::from_parameter(method.name()),
            &method,
            |b, &method| {
                b.iter(|| {
                    black_box(
                        plan_flow_sync(
                            &grid, &starts, &pickups, &drops, &drop_caps, horizon, tau, method,
                        )
                        .expect("valid request"),
                    )
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_fixed_horizon_plans, bench_synchronized_plans);
criterion_main!(benches);
