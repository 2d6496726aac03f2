//! One partition of the domain and the step it runs.
//!
//! A [`Partition`] owns every particle whose centre lies in its
//! bounding box. Each step it:
//!
//! 1. receives halo snapshots from its neighbours (driven by
//!    [`crate::sync`], which calls [`Partition::receive_halo`]);
//! 2. admits halo particles that lie inside its box;
//! 3. recomputes forces against local particles plus every halo particle
//!    it did not just admit;
//! 4. integrates its particles, migrants included;
//! 5. publishes an encoded snapshot for the next exchange;
//! 6. evicts particles that left its box (skipped on the last step).
//!
//! Steps 2 through 6 run in [`Partition::advance`].

use std::time::Instant;

use indexmap::IndexSet;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;
use tessel_core::{
    BoundingBox, IntegrationScheme, IterationId, Particle, ParticleArena, PartitionId,
};
use tessel_halo::{encode_to_vec, HaloSnapshot};
use tessel_space::{NeighborSet, PartitionGrid};
use tracing::{debug, warn};

use crate::config::{ConfigError, SimConfig};
use crate::metrics::StepMetrics;
use crate::view::PartitionView;

/// Where a partition is in its step cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepPhase {
    /// Between steps.
    Idle,
    /// Exchanging halo snapshots.
    Syncing,
    /// Computing forces.
    ForceComputing,
    /// Integrating positions and velocities.
    Integrating,
    /// Admitting migrants or evicting emigrants.
    Migrating,
    /// Every configured step has run.
    Terminal,
}

/// A partition's particles, geometry, and step state.
#[derive(Debug)]
pub struct Partition {
    id: PartitionId,
    row: u32,
    col: u32,
    bounds: BoundingBox,
    domain_side: f64,
    neighbors: NeighborSet,
    small: ParticleArena,
    large: ParticleArena,
    /// Snapshots received for the current step only.
    halo: SmallVec<[HaloSnapshot; 8]>,
    /// Encoded snapshot sent during the next exchange.
    outgoing: Vec<u8>,
    iteration: IterationId,
    time_slots: u64,
    time_step: f64,
    scheme: IntegrationScheme,
    phase: StepPhase,
}

impl Partition {
    /// Create partition `id` with its configured initial particles.
    ///
    /// Small particles are drawn from a ChaCha8 stream seeded with
    /// `config.seed ^ id`, so every partition gets a distinct but
    /// reproducible layout. Every configured large particle is placed in
    /// every partition, offset into its cell.
    pub fn new(
        config: &SimConfig,
        grid: &PartitionGrid,
        id: PartitionId,
    ) -> Result<Self, ConfigError> {
        let (row, col) = grid.coord_of(id)?;
        let cell = grid.cell_size();

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed ^ u64::from(id.0));
        let small = (0..config.small_particle_count)
            .map(|_| {
                Particle::small(
                    config.small_particle_radius,
                    config.small_particle_mass,
                    cell,
                    row,
                    col,
                    &mut rng,
                )
            })
            .collect();
        let large = config
            .large_particles
            .iter()
            .map(|spec| Particle::large(spec, cell, row, col))
            .collect();

        Self::with_particles(config, grid, id, small, large)
    }

    /// Create partition `id` holding exactly the given particles.
    ///
    /// The caller is responsible for placing them inside the partition's box.
    pub fn with_particles(
        config: &SimConfig,
        grid: &PartitionGrid,
        id: PartitionId,
        small: Vec<Particle>,
        large: Vec<Particle>,
    ) -> Result<Self, ConfigError> {
        let (row, col) = grid.coord_of(id)?;
        let mut partition = Self {
            id,
            row,
            col,
            bounds: grid.bounds_of(id)?,
            domain_side: grid.domain_side(),
            neighbors: grid.neighbors(id, config.horizon)?,
            small: ParticleArena::from_vec(small),
            large: ParticleArena::from_vec(large),
            halo: SmallVec::new(),
            outgoing: Vec::new(),
            iteration: IterationId(0),
            time_slots: config.time_slots,
            time_step: config.time_step,
            scheme: config.integration,
            phase: if config.time_slots == 0 {
                StepPhase::Terminal
            } else {
                StepPhase::Idle
            },
        };
        partition.publish(IterationId(0));
        Ok(partition)
    }

    // ── Accessors ───────────────────────────────────────────────

    /// This partition's id.
    pub fn id(&self) -> PartitionId {
        self.id
    }

    /// Grid `(row, col)`.
    pub fn coord(&self) -> (u32, u32) {
        (self.row, self.col)
    }

    /// The half-open box this partition owns.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Partitions this one exchanges halos with.
    pub fn neighbors(&self) -> &NeighborSet {
        &self.neighbors
    }

    /// The next iteration to run (equal to `time_slots` once finished).
    pub fn iteration(&self) -> IterationId {
        self.iteration
    }

    /// Current phase.
    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Whether every configured step has run.
    pub fn is_finished(&self) -> bool {
        self.phase == StepPhase::Terminal
    }

    /// Owned small particles.
    pub fn small(&self) -> &[Particle] {
        self.small.as_slice()
    }

    /// Owned large particles.
    pub fn large(&self) -> &[Particle] {
        self.large.as_slice()
    }

    /// Number of owned particles.
    pub fn particle_count(&self) -> usize {
        self.small.len() + self.large.len()
    }

    /// Total mass of owned particles.
    pub fn total_mass(&self) -> f64 {
        self.small.total_mass() + self.large.total_mass()
    }

    /// The encoded snapshot this partition will send next.
    pub fn outgoing(&self) -> &[u8] {
        &self.outgoing
    }

    /// Snapshots received so far this step.
    pub fn halo(&self) -> &[HaloSnapshot] {
        &self.halo
    }

    /// Borrowed view for visualization.
    pub fn view(&self) -> PartitionView<'_> {
        PartitionView {
            id: self.id,
            row: self.row,
            col: self.col,
            bounds: self.bounds,
            iteration: self.iteration,
            small: self.small.as_slice(),
            large: self.large.as_slice(),
        }
    }

    // ── Step ────────────────────────────────────────────────────

    /// Enter the exchange phase of the next step.
    ///
    /// Returns `false` if there is no step left to run.
    pub fn begin_step(&mut self) -> bool {
        match self.phase {
            StepPhase::Idle => {
                self.phase = StepPhase::Syncing;
                true
            }
            StepPhase::Terminal => false,
            other => {
                warn!(partition = %self.id, phase = ?other, "begin_step called mid-step");
                false
            }
        }
    }

    /// Buffer a neighbour's snapshot for the current step.
    pub fn receive_halo(&mut self, snapshot: HaloSnapshot) {
        self.halo.push(snapshot);
    }

    /// Run everything after the exchange and move to the next iteration.
    ///
    /// The returned metrics carry the particle work of the step; the
    /// exchange driver fills in the traffic fields.
    pub fn advance(&mut self) -> StepMetrics {
        let mut m = StepMetrics {
            partition: self.id,
            iteration: self.iteration,
            ..StepMetrics::default()
        };
        if self.phase == StepPhase::Terminal {
            warn!(partition = %self.id, "advance called after the last step");
            return m;
        }

        // Arrival order depends on thread scheduling; origin order does not.
        self.halo.sort_by_key(|s| s.origin);

        self.phase = StepPhase::Migrating;
        let admitted = self.admit_migrants();
        m.admitted = admitted.len();

        self.phase = StepPhase::ForceComputing;
        let start = Instant::now();
        self.compute_forces(&admitted);
        m.force_us = start.elapsed().as_micros() as u64;

        self.phase = StepPhase::Integrating;
        let start = Instant::now();
        self.integrate();
        m.integrate_us = start.elapsed().as_micros() as u64;

        self.phase = StepPhase::Migrating;
        let next = self.iteration.next();
        self.publish(next);
        if next.0 < self.time_slots {
            m.evicted = self.evict();
        }

        self.halo.clear();
        self.iteration = next;
        self.phase = if next.0 >= self.time_slots {
            StepPhase::Terminal
        } else {
            StepPhase::Idle
        };

        m.small_count = self.small.len();
        m.large_count = self.large.len();
        debug!(
            partition = %self.id,
            iteration = %m.iteration,
            small = m.small_count,
            large = m.large_count,
            admitted = m.admitted,
            evicted = m.evicted,
            "step complete"
        );
        m
    }

    /// Append halo particles that lie inside this box.
    ///
    /// Returns the bit patterns of the admitted particles; a particle seen
    /// in more than one snapshot is admitted once.
    fn admit_migrants(&mut self) -> IndexSet<[u64; 8]> {
        let bounds = self.bounds;
        let mut admitted: IndexSet<[u64; 8]> = IndexSet::new();
        for snap in &self.halo {
            for (list, arena) in [
                (&snap.small, &mut self.small),
                (&snap.large, &mut self.large),
            ] {
                for p in list {
                    if bounds.contains_particle(p) && admitted.insert(p.bit_pattern()) {
                        arena.push(*p);
                    }
                }
            }
        }
        admitted
    }

    fn compute_forces(&mut self, admitted: &IndexSet<[u64; 8]>) {
        let bounds = self.bounds;
        let halo_len: usize = self.halo.iter().map(HaloSnapshot::particle_count).sum();
        let mut candidates = Vec::with_capacity(self.particle_count() + halo_len);
        candidates.extend_from_slice(self.small.as_slice());
        candidates.extend_from_slice(self.large.as_slice());
        // Admitted migrants are already local; their halo copies would pull twice.
        for snap in &self.halo {
            candidates.extend(
                snap.particles()
                    .filter(|p| admitted.is_empty() || !admitted.contains(&p.bit_pattern()))
                    .copied(),
            );
        }

        let small_len = self.small.len();
        for (i, p) in self.small.iter_mut().enumerate() {
            if bounds.contains_particle(p) {
                p.accumulate_force(&candidates, Some(i));
            }
        }
        for (i, p) in self.large.iter_mut().enumerate() {
            if bounds.contains_particle(p) {
                p.accumulate_force(&candidates, Some(small_len + i));
            }
        }
    }

    fn integrate(&mut self) {
        let bounds = self.bounds;
        for p in self.small.iter_mut().chain(self.large.iter_mut()) {
            if bounds.contains_particle(p) {
                p.integrate(self.time_step, self.domain_side, self.scheme);
            }
        }
    }

    fn publish(&mut self, tag: IterationId) {
        let snap = HaloSnapshot::capture(self.id, tag, self.small.as_slice(), self.large.as_slice());
        match encode_to_vec(&snap) {
            Ok(bytes) => self.outgoing = bytes,
            Err(e) => {
                warn!(partition = %self.id, error = %e, "failed to encode halo snapshot");
                self.outgoing.clear();
            }
        }
    }

    fn evict(&mut self) -> usize {
        let bounds = self.bounds;
        self.small.compact(|p| bounds.contains_particle(p))
            + self.large.compact(|p| bounds.contains_particle(p))
    }
}
