//! Partition-owned particle storage.
//!
//! [`ParticleArena`] is a contiguous `Vec<Particle>` addressed by
//! [`SlotIndex`]. Slots are stable between compactions: pushing never
//! moves existing particles, and [`ParticleArena::compact`] is the only
//! operation that renumbers them.

use crate::particle::Particle;

/// Index of a particle inside a [`ParticleArena`].
///
/// Valid until the next [`ParticleArena::compact`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(pub u32);

impl SlotIndex {
    /// The slot as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Contiguous storage for one class of particle owned by a partition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleArena {
    slots: Vec<Particle>,
}

impl ParticleArena {
    /// An empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of existing particles, in order.
    pub fn from_vec(slots: Vec<Particle>) -> Self {
        Self { slots }
    }

    /// Number of live particles.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the arena holds no particles.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append a particle and return its slot.
    pub fn push(&mut self, particle: Particle) -> SlotIndex {
        let slot = SlotIndex(self.slots.len() as u32);
        self.slots.push(particle);
        slot
    }

    /// The particle in `slot`, if any.
    pub fn get(&self, slot: SlotIndex) -> Option<&Particle> {
        self.slots.get(slot.index())
    }

    /// All particles in slot order.
    pub fn as_slice(&self) -> &[Particle] {
        &self.slots
    }

    /// Iterate particles in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.slots.iter()
    }

    /// Iterate particles in slot order, mutably.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.slots.iter_mut()
    }

    /// Drop every particle for which `keep` returns `false`.
    ///
    /// Survivors keep their relative order and are renumbered densely
    /// from slot 0. Returns the number of particles removed.
    pub fn compact<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Particle) -> bool,
    {
        let before = self.slots.len();
        self.slots.retain(|p| keep(p));
        before - self.slots.len()
    }

    /// Total mass of the particles held.
    pub fn total_mass(&self) -> f64 {
        self.slots.iter().map(|p| p.mass).sum()
    }
}
