//! Turn-resolution benchmarks for armada_core.
//!
//! Run with: `cargo bench -p armada_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use armada_core::prelude::*;

/// A mid-game board: two fleets of eight ships approaching each other.
fn fleet_state() -> (GameState, Vec<Order>) {
    let map = generate_map(MapConfig::default().with_seed(42));
    let mut state = GameState::new(map.grid, RulesConfig::default());
    let p1 = state.players.add_player("Anne", Controller::Ai, 1000);
    let p2 = state.players.add_player("Bart", Controller::Ai, 1000);

    let mut orders = Vec::new();
    let coords = state.grid.sorted_coords();
    let navigable: Vec<HexCoord> = coords
        .into_iter()
        .filter(|c| state.grid.is_navigable(*c))
        .collect();

    for i in 0..8 {
        let at = navigable[i * 3];
        let unit = state.units.create_unit(p1, at, &state.config);
        if let Some(next) = state.grid.navigable_neighbors(at).first().copied() {
            orders.push(Order::Move {
                unit,
                owner: p1,
                path: vec![at, next],
            });
        }
    }
    for i in 0..8 {
        let at = navigable[navigable.len() - 1 - i * 3];
        let unit = state.units.create_unit(p2, at, &state.config);
        if let Some(next) = state.grid.navigable_neighbors(at).first().copied() {
            orders.push(Order::Move {
                unit,
                owner: p2,
                path: vec![at, next],
            });
        }
    }
    (state, orders)
}

pub fn resolution_benchmark(c: &mut Criterion) {
    c.bench_function("resolve_turn_16_ships", |b| {
        b.iter(|| {
            let (mut state, orders) = fleet_state();
            let mut resolver = TurnResolver::new(7);
            black_box(resolver.resolve_turn(&mut state, &orders))
        })
    });

    c.bench_function("find_path_across_map", |b| {
        let map = generate_map(MapConfig::default().with_seed(42));
        let coords = map.grid.sorted_coords();
        let navigable: Vec<HexCoord> = coords
            .into_iter()
            .filter(|c| map.grid.is_navigable(*c))
            .collect();
        let start = navigable[0];
        let goal = navigable[navigable.len() - 1];
        b.iter(|| black_box(find_path(&map.grid, start, goal, 64)));
    });

    c.bench_function("state_hash_16_ships", |b| {
        let (state, _) = fleet_state();
        b.iter(|| black_box(state.state_hash()));
    });
}

criterion_group!(benches, resolution_benchmark);
criterion_main!(benches);
