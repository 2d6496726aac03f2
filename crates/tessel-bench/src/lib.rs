//! Benchmark profiles and utilities for the Tessel N-body simulation.
//!
//! Provides pre-built [`ClusterConfig`] profiles for benchmarking:
//!
//! - [`reference_profile`]: 16 partitions, 64 small particles and one large body each
//! - [`stress_profile`]: 64 partitions, 256 small particles each
//! - [`particle_cloud`]: deterministic free-standing particles for kernel benches

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessel_core::{IntegrationScheme, LargeParticleSpec, Particle};
use tessel_engine::{ClusterConfig, SimConfig};

/// Build a reference benchmark profile: 4x4 partitions of side 50.
///
/// Each partition holds 64 small particles and one large body at its centre.
pub fn reference_profile(seed: u64, time_slots: u64) -> ClusterConfig {
    ClusterConfig::new(
        SimConfig {
            time_slots,
            time_step: 0.01,
            horizon: 1,
            grid_size: 50,
            small_particle_count: 64,
            small_particle_mass: 0.1,
            small_particle_radius: 0.2,
            large_particles: vec![LargeParticleSpec {
                radius: 5.0,
                mass: 40.0,
                x: 25.0,
                y: 25.0,
            }],
            seed,
            integration: IntegrationScheme::Kinematic,
        },
        16,
    )
}

/// Build a stress benchmark profile: 8x8 partitions, 256 small particles each.
///
/// Horizon 2, so every partition exchanges with 24 neighbours.
pub fn stress_profile(seed: u64, time_slots: u64) -> ClusterConfig {
    ClusterConfig::new(
        SimConfig {
            time_slots,
            time_step: 0.01,
            horizon: 2,
            grid_size: 50,
            small_particle_count: 256,
            small_particle_mass: 0.1,
            small_particle_radius: 0.2,
            large_particles: Vec::new(),
            seed,
            integration: IntegrationScheme::Kinematic,
        },
        64,
    )
}

/// Generate `n` particles at rest, uniformly spread over a `side` x `side` square.
pub fn particle_cloud(n: usize, side: f64, seed: u64) -> Vec<Particle> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x = rng.random::<f64>() * side;
            let y = rng.random::<f64>() * side;
            Particle::at_rest(1.0, 0.2, x, y)
        })
        .collect()
}
