//! Configuration and partition fixtures.

use tessel_core::{IntegrationScheme, LargeParticleSpec, Particle, PartitionId};
use tessel_engine::{Partition, SimConfig};
use tessel_space::PartitionGrid;

/// A small, quiet configuration: light particles, short time step.
pub fn quiet_config(time_slots: u64) -> SimConfig {
    SimConfig {
        time_slots,
        time_step: 0.01,
        horizon: 1,
        grid_size: 20,
        small_particle_count: 8,
        small_particle_mass: 0.01,
        small_particle_radius: 0.2,
        large_particles: Vec::new(),
        seed: 0x7e55e1,
        integration: IntegrationScheme::Kinematic,
    }
}

/// A configuration with one heavy body per partition.
pub fn heavy_config(time_slots: u64) -> SimConfig {
    SimConfig {
        time_slots,
        time_step: 0.05,
        horizon: 1,
        grid_size: 30,
        small_particle_count: 12,
        small_particle_mass: 0.5,
        small_particle_radius: 0.3,
        large_particles: vec![LargeParticleSpec {
            radius: 4.0,
            mass: 25.0,
            x: 15.0,
            y: 15.0,
        }],
        seed: 2024,
        integration: IntegrationScheme::Kinematic,
    }
}

/// A configuration with no random particles, for hand-placed scenarios.
pub fn empty_config(time_slots: u64, grid_size: u32) -> SimConfig {
    SimConfig {
        time_slots,
        time_step: 0.1,
        horizon: 1,
        grid_size,
        small_particle_count: 0,
        small_particle_mass: 1.0,
        small_particle_radius: 0.1,
        large_particles: Vec::new(),
        seed: 0,
        integration: IntegrationScheme::Kinematic,
    }
}

/// A small particle at rest.
pub fn at_rest(mass: f64, x: f64, y: f64) -> Particle {
    Particle::at_rest(mass, 0.1, x, y)
}

/// A small particle moving with velocity `(vx, vy)`.
pub fn moving(mass: f64, x: f64, y: f64, vx: f64, vy: f64) -> Particle {
    Particle {
        vx,
        vy,
        ..at_rest(mass, x, y)
    }
}

/// Build every partition of a grid, placing each given particle in the
/// partition that owns its position.
pub fn partitions_with(
    config: &SimConfig,
    partition_count: u32,
    particles: &[Particle],
) -> (PartitionGrid, Vec<Partition>) {
    let grid = PartitionGrid::new(partition_count, config.cell_size()).expect("valid test grid");
    let partitions = grid
        .ids()
        .map(|id| {
            let mine: Vec<Particle> = particles
                .iter()
                .filter(|p| grid.owner_of(p.x, p.y) == id)
                .copied()
                .collect();
            Partition::with_particles(config, &grid, id, mine, Vec::new())
                .expect("valid test partition")
        })
        .collect();
    (grid, partitions)
}

/// Every owned particle lying outside its owner's box.
pub fn ownership_violations(partitions: &[Partition]) -> Vec<(PartitionId, Particle)> {
    partitions
        .iter()
        .flat_map(|p| {
            let bounds = p.bounds();
            p.small()
                .iter()
                .chain(p.large())
                .filter(move |q| !bounds.contains_particle(q))
                .map(move |q| (p.id(), *q))
        })
        .collect()
}
