// Benchmark for the A* search — the dominant per-tick cost once many
// workers recompute routes across a crowded floor.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use workfloor_sim::config::GridParams;
use workfloor_sim::grid::GridIndex;
use workfloor_sim::pathfinding::find_path;
use workfloor_sim::types::GridCell;

/// A 64x64 grid with a scattered deterministic pattern of blocked cells.
fn crowded_grid() -> GridIndex {
    let mut grid = GridIndex::new(&GridParams {
        cell_size: 32.0,
        min: GridCell::new(0, 0),
        max: GridCell::new(64, 64),
    });
    for y in 0..64 {
        for x in 0..64 {
            // Leave corridors every 5th row/column open.
            if (x * 7 + y * 13) % 11 == 0 && x % 5 != 0 && y % 5 != 0 {
                grid.add(GridCell::new(x, y));
            }
        }
    }
    // Keep the endpoints clear.
    grid.remove(GridCell::new(1, 1));
    grid.remove(GridCell::new(62, 62));
    grid
}

fn bench_find_path(c: &mut Criterion) {
    let grid = crowded_grid();
    let start = GridCell::new(1, 1);
    let target = GridCell::new(62, 62);
    assert!(find_path(start, target, &grid).is_some());

    c.bench_function("find_path_64x64_crowded", |b| {
        b.iter(|| find_path(black_box(start), black_box(target), &grid))
    });

    c.bench_function("find_path_64x64_unreachable", |b| {
        let mut walled = crowded_grid();
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx, dy) != (0, 0) {
                    walled.add(GridCell::new(62 + dx, 62 + dy));
                }
            }
        }
        b.iter(|| find_path(black_box(start), black_box(target), &walled))
    });
}

criterion_group!(benches, bench_find_path);
criterion_main!(benches);
