//! Tessel: a toroidal N-body simulation decomposed over a square grid of
//! partitions.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Tessel sub-crates. For most users, adding `tessel` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tessel::prelude::*;
//!
//! let sim = SimConfig {
//!     time_slots: 5,
//!     time_step: 0.01,
//!     horizon: 1,
//!     grid_size: 20,
//!     small_particle_count: 10,
//!     small_particle_mass: 0.01,
//!     small_particle_radius: 0.1,
//!     large_particles: vec![LargeParticleSpec { radius: 3.0, mass: 10.0, x: 10.0, y: 10.0 }],
//!     seed: 42,
//!     integration: IntegrationScheme::Kinematic,
//! };
//!
//! // Four partitions in a 2x2 grid, all stepped on this thread.
//! let mut cluster = LockstepCluster::new(&ClusterConfig::new(sim, 4)).unwrap();
//! let report = cluster.run(&mut NullSink).unwrap();
//! assert_eq!(report.steps, 5);
//! assert_eq!(report.final_particles, cluster.total_particles());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessel-core` | IDs, bounding boxes, particles, particle arena |
//! | [`space`] | `tessel-space` | Partition grid and neighbour topology |
//! | [`halo`] | `tessel-halo` | Halo snapshots and their wire codec |
//! | [`engine`] | `tessel-engine` | Partitions, halo exchange, cluster runners |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`tessel-core`).
///
/// [`types::Particle`] carries the force law and integrator;
/// [`types::ParticleArena`] is a partition's particle storage.
pub use tessel_core as types;

/// Partition grid and neighbour topology (`tessel-space`).
///
/// [`space::PartitionGrid`] maps ids to boxes and points to owners;
/// [`space::neighbors`] computes the exchange set for one partition.
pub use tessel_space as space;

/// Halo snapshots and their binary codec (`tessel-halo`).
pub use tessel_halo as halo;

/// Partition step machine and cluster runners (`tessel-engine`).
///
/// [`engine::LockstepCluster`] steps every partition on one thread,
/// [`engine::ThreadedCluster`] runs one thread per partition.
pub use tessel_engine as engine;

/// Common imports for typical Tessel usage.
pub mod prelude {
    // Core types
    pub use tessel_core::{
        BoundingBox, IntegrationScheme, IterationId, LargeParticleSpec, Particle, PartitionId,
    };

    // Topology
    pub use tessel_space::{NeighborSet, PartitionGrid};

    // Halo
    pub use tessel_halo::HaloSnapshot;

    // Engine
    pub use tessel_engine::{
        ClusterConfig, ClusterError, ConfigError, FrameSink, FrameStage, LockstepCluster,
        NullSink, Partition, PartitionView, RunReport, SimConfig, StepMetrics, ThreadedCluster,
    };
}
