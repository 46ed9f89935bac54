//! Criterion benchmarks for the direct-method solve loop.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use minicell_bench::random_network;
use minicell_cme::NoopHook;
use minicell_core::ReactionId;
use minicell_test_utils::fixtures::decay_network;

fn bench_solve_random_network(c: &mut Criterion) {
    let mut group = c.benchmark_group("ssa_solve");
    for &(species, reactions) in &[(10usize, 20usize), (100, 300)] {
        group.bench_function(format!("random_{species}x{reactions}"), |b| {
            b.iter_batched(
                || random_network(17, species, reactions).unwrap(),
                |mut net| {
                    let report = net.solve(1.0, 0.5, &mut NoopHook).unwrap();
                    black_box(report.events);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_decay_to_exhaustion(c: &mut Criterion) {
    c.bench_function("ssa_decay_10k", |b| {
        b.iter_batched(
            || decay_network(3, 10_000, 1.0),
            |mut net| {
                let report = net.solve(f64::INFINITY, 10.0, &mut NoopHook).unwrap();
                black_box(report.events);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_fire(c: &mut Criterion) {
    let mut net = random_network(5, 100, 300).unwrap();
    net.refresh_propensities().unwrap();
    c.bench_function("ssa_fire_and_update", |b| {
        let mut i = 0u32;
        b.iter(|| {
            // Firing may hit a propensity guard once counts drain; the cost
            // of the dependency update is what is measured.
            let _ = net.fire(black_box(ReactionId(i % 300)));
            i = i.wrapping_add(1);
        });
    });
}

criterion_group!(
    benches,
    bench_solve_random_network,
    bench_decay_to_exhaustion,
    bench_fire
);
criterion_main!(benches);
