//! Core types for the Tessel partitioned N-body simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the value types every other Tessel crate shares: partition and
//! iteration identifiers, the [`Particle`] with its force law and
//! integrator, the half-open [`BoundingBox`] a partition owns, and the
//! [`ParticleArena`] partitions keep their particles in.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod bounds;
pub mod id;
pub mod particle;

pub use arena::{ParticleArena, SlotIndex};
pub use bounds::BoundingBox;
pub use id::{IterationId, PartitionId};
pub use particle::{
    wrap_coordinate, IntegrationScheme, LargeParticleSpec, Particle, FORCE_CONSTANT,
};
