//! The halo snapshot value.

use tessel_core::{IterationId, Particle, PartitionId};

/// An owned copy of one partition's particles at a step boundary.
///
/// `iteration` is the iteration that will consume the snapshot: the
/// state published at the end of step `k` is tagged `k + 1`, and the
/// state published before the first step is tagged `0`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HaloSnapshot {
    /// The partition that published the snapshot.
    pub origin: PartitionId,
    /// The iteration this snapshot is meant for.
    pub iteration: IterationId,
    /// Copies of the publisher's small particles.
    pub small: Vec<Particle>,
    /// Copies of the publisher's large particles.
    pub large: Vec<Particle>,
}

impl HaloSnapshot {
    /// Capture the given particle lists.
    pub fn capture(
        origin: PartitionId,
        iteration: IterationId,
        small: &[Particle],
        large: &[Particle],
    ) -> Self {
        Self {
            origin,
            iteration,
            small: small.to_vec(),
            large: large.to_vec(),
        }
    }

    /// Total number of particles carried.
    pub fn particle_count(&self) -> usize {
        self.small.len() + self.large.len()
    }

    /// Size of the snapshot once encoded.
    pub fn encoded_len(&self) -> usize {
        crate::HEADER_BYTES + self.particle_count() * crate::PARTICLE_RECORD_BYTES
    }

    /// Small then large particles.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.small.iter().chain(self.large.iter())
    }
}
