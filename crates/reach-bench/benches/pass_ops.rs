//! Criterion micro-benchmarks for the worker's diff pass.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use reach_bench::{prober_sets, reference_profile, stress_profile};
use reach_engine::{EngineConfig, ReachabilityEngine};

fn engine(config: EngineConfig) -> ReachabilityEngine<u32> {
    ReachabilityEngine::new(config, |_: &[reach_core::CellId]| {}).unwrap()
}

/// Benchmark: first pass applying 64 probers x 256 cells on 16K cells.
fn bench_initial_pass_64_probers(c: &mut Criterion) {
    let config = reference_profile();
    let cell_count = config.space.cell_count() as u32;
    let sets = prober_sets(cell_count, 64, 256, 7);

    c.bench_function("initial_pass_64x256", |b| {
        b.iter_batched(
            || {
                let e = engine(config.clone());
                for (p, set) in sets.iter().enumerate() {
                    e.allocate(p as u32).unwrap();
                    e.occupy(&(p as u32), set, true).unwrap();
                }
                e
            },
            |mut e| black_box(e.run_pass().unwrap()),
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: steady state where every prober shifts its set by a few cells.
fn bench_incremental_pass(c: &mut Criterion) {
    let config = reference_profile();
    let cell_count = config.space.cell_count() as u32;
    let a = prober_sets(cell_count, 64, 256, 7);
    let b_sets = prober_sets(cell_count, 64, 256, 8);
    let mut e = engine(config);
    for (p, set) in a.iter().enumerate() {
        e.allocate(p as u32).unwrap();
        e.occupy(&(p as u32), set, true).unwrap();
    }
    e.run_pass().unwrap();

    let mut flip = false;
    c.bench_function("incremental_pass_64x256", |bench| {
        bench.iter(|| {
            let sets = if flip { &a } else { &b_sets };
            flip = !flip;
            for (p, set) in sets.iter().enumerate() {
                e.occupy(&(p as u32), set, true).unwrap();
            }
            black_box(e.run_pass().unwrap());
            e.update();
        });
    });
}

/// Benchmark: an idle pass over 1024 registered probers.
fn bench_idle_pass_1024_probers(c: &mut Criterion) {
    let config = stress_profile();
    let cell_count = config.space.cell_count() as u32;
    let sets = prober_sets(cell_count, 1024, 32, 11);
    let mut e = engine(config);
    for (p, set) in sets.iter().enumerate() {
        e.allocate(p as u32).unwrap();
        e.occupy(&(p as u32), set, true).unwrap();
    }
    e.run_pass().unwrap();
    e.update();

    c.bench_function("idle_pass_1024", |b| {
        b.iter(|| black_box(e.run_pass().unwrap()));
    });
}

criterion_group!(
    benches,
    bench_initial_pass_64_probers,
    bench_incremental_pass,
    bench_idle_pass_1024_probers,
);
criterion_main!(benches);
