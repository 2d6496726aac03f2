//! Criterion benchmarks for whole-cluster steps.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tessel_bench::{reference_profile, stress_profile};
use tessel_engine::{LockstepCluster, NullSink, ThreadedCluster};

/// Benchmark: one lockstep step of the reference profile.
fn bench_lockstep_step_reference(c: &mut Criterion) {
    let config = reference_profile(42, u64::MAX);
    let mut cluster = LockstepCluster::new(&config).unwrap();

    c.bench_function("lockstep_step_reference", |b| {
        b.iter(|| {
            let metrics = cluster.step();
            black_box(&metrics);
        });
    });
}

/// Benchmark: one lockstep step of the stress profile.
fn bench_lockstep_step_stress(c: &mut Criterion) {
    let config = stress_profile(42, u64::MAX);
    let mut cluster = LockstepCluster::new(&config).unwrap();

    let mut group = c.benchmark_group("stress");
    group.sample_size(10);
    group.bench_function("lockstep_step_stress", |b| {
        b.iter(|| {
            let metrics = cluster.step();
            black_box(&metrics);
        });
    });
    group.finish();
}

/// Benchmark: a full 20-step threaded run of the reference profile,
/// including thread spawn and join.
fn bench_threaded_run_reference(c: &mut Criterion) {
    let config = reference_profile(42, 20);

    let mut group = c.benchmark_group("threaded");
    group.sample_size(10);
    group.bench_function("threaded_run_reference_20", |b| {
        b.iter(|| {
            let cluster = ThreadedCluster::new(&config).unwrap();
            let done = cluster.run(&mut NullSink).unwrap();
            black_box(done.report);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_lockstep_step_reference,
    bench_lockstep_step_stress,
    bench_threaded_run_reference
);
criterion_main!(benches);
