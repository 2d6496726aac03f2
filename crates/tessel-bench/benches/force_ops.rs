//! Criterion micro-benchmarks for the force and integration kernels.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tessel_bench::particle_cloud;
use tessel_core::IntegrationScheme;

/// Benchmark: all-pairs force accumulation over 1K particles.
fn bench_accumulate_force_1k(c: &mut Criterion) {
    let cloud = particle_cloud(1000, 100.0, 7);

    c.bench_function("accumulate_force_1k", |b| {
        b.iter(|| {
            let mut local = cloud.clone();
            for (i, p) in local.iter_mut().enumerate() {
                p.accumulate_force(&cloud, Some(i));
            }
            black_box(&local);
        });
    });
}

/// Benchmark: integrate 10K particles one step.
fn bench_integrate_10k(c: &mut Criterion) {
    let mut cloud = particle_cloud(10_000, 100.0, 11);
    for p in &mut cloud {
        p.fx = 0.5;
        p.fy = -0.25;
    }

    c.bench_function("integrate_10k", |b| {
        b.iter(|| {
            let mut local = cloud.clone();
            for p in &mut local {
                p.integrate(0.01, 100.0, IntegrationScheme::Kinematic);
            }
            black_box(&local);
        });
    });
}

criterion_group!(benches, bench_accumulate_force_1k, bench_integrate_10k);
criterion_main!(benches);
