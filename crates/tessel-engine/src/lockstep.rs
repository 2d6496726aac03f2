//! Lockstep (single-threaded) cluster.
//!
//! [`LockstepCluster`] runs every partition on the calling thread. It
//! performs the same round-robin exchange as the threaded cluster, with
//! an in-memory [`Mailbox`] in place of rendezvous channels: on turn
//! `j` every other partition sends first, then partition `j` drains its
//! queue. The particle state it produces is bit-identical to
//! [`ThreadedCluster`](crate::threaded::ThreadedCluster) for the same
//! configuration.
//!
//! # Example
//!
//! ```ignore
//! let mut cluster = LockstepCluster::new(&ClusterConfig::new(sim, 4))?;
//! while !cluster.is_finished() {
//!     let metrics = cluster.step();
//! }
//! ```

use tessel_core::{IterationId, PartitionId};
use tessel_space::PartitionGrid;
use tracing::info;

use crate::config::{ClusterConfig, ConfigError};
use crate::error::ClusterError;
use crate::metrics::{RunReport, StepMetrics};
use crate::partition::Partition;
use crate::sync::{exchange_turn, SyncStats};
use crate::transport::Mailbox;
use crate::view::{emit_frames, FrameSink, FrameStage};

/// Every partition of a run, stepped together on one thread.
pub struct LockstepCluster {
    grid: PartitionGrid,
    partitions: Vec<Partition>,
    mailbox: Mailbox,
    time_slots: u64,
}

impl LockstepCluster {
    /// Validate the configuration and create every partition.
    pub fn new(config: &ClusterConfig) -> Result<Self, ConfigError> {
        let grid = config.validate()?;
        let partitions = grid
            .ids()
            .map(|id| Partition::new(&config.sim, &grid, id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_partitions(grid, partitions, config.sim.time_slots))
    }

    /// Assemble a cluster from prebuilt partitions, one per grid cell in id order.
    pub fn from_partitions(grid: PartitionGrid, partitions: Vec<Partition>, time_slots: u64) -> Self {
        Self {
            mailbox: Mailbox::new(grid.partition_count()),
            grid,
            partitions,
            time_slots,
        }
    }

    /// The partition grid.
    pub fn grid(&self) -> &PartitionGrid {
        &self.grid
    }

    /// All partitions in id order.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// One partition.
    pub fn partition(&self, id: PartitionId) -> Option<&Partition> {
        self.partitions.get(id.index())
    }

    /// The next iteration to run.
    pub fn iteration(&self) -> IterationId {
        self.partitions
            .first()
            .map_or(IterationId(0), Partition::iteration)
    }

    /// Whether every partition has run its last step.
    pub fn is_finished(&self) -> bool {
        self.partitions.iter().all(Partition::is_finished)
    }

    /// Particles owned across all partitions.
    pub fn total_particles(&self) -> usize {
        self.partitions.iter().map(Partition::particle_count).sum()
    }

    /// Run one step on every partition. Returns nothing once finished.
    pub fn step(&mut self) -> Vec<StepMetrics> {
        let mut active = false;
        for p in &mut self.partitions {
            active |= p.begin_step();
        }
        if !active {
            return Vec::new();
        }

        let mut stats = vec![SyncStats::default(); self.partitions.len()];
        for turn in self.grid.ids() {
            for (k, p) in self.partitions.iter_mut().enumerate() {
                if p.id() != turn {
                    let id = p.id();
                    exchange_turn(p, turn, &mut self.mailbox.endpoint(id), &mut stats[k]);
                }
            }
            if let Some(receiver) = self.partitions.get_mut(turn.index()) {
                let stats = &mut stats[turn.index()];
                exchange_turn(receiver, turn, &mut self.mailbox.endpoint(turn), stats);
            }
        }

        self.partitions
            .iter_mut()
            .zip(&stats)
            .map(|(p, s)| {
                let mut m = p.advance();
                s.apply_to(&mut m);
                m
            })
            .collect()
    }

    /// Run every remaining step, handing frames to `sink`.
    pub fn run(&mut self, sink: &mut dyn FrameSink) -> Result<RunReport, ClusterError> {
        info!(
            partitions = self.partitions.len(),
            steps = self.time_slots,
            particles = self.total_particles(),
            "lockstep run starting"
        );
        emit_frames(&self.partitions, FrameStage::Initial, sink)?;

        let mut report = RunReport {
            partitions: self.grid.partition_count(),
            ..RunReport::default()
        };
        while !self.is_finished() {
            let metrics = self.step();
            let Some(first) = metrics.first() else {
                break;
            };
            let finished = first.iteration;
            for m in &metrics {
                report.record(m);
            }
            report.steps += 1;
            if sink.wants_steps() {
                emit_frames(&self.partitions, FrameStage::Step(finished), sink)?;
            }
        }

        emit_frames(&self.partitions, FrameStage::Final, sink)?;
        report.final_particles = self.total_particles();
        info!(
            steps = report.steps,
            particles = report.final_particles,
            admitted = report.admitted,
            evicted = report.evicted,
            bytes = report.bytes_exchanged,
            failures = report.failures,
            "lockstep run finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::view::NullSink;
    use tessel_core::{IntegrationScheme, LargeParticleSpec};

    fn sim(time_slots: u64) -> SimConfig {
        SimConfig {
            time_slots,
            time_step: 0.05,
            horizon: 1,
            grid_size: 20,
            small_particle_count: 6,
            small_particle_mass: 1.0,
            small_particle_radius: 0.2,
            large_particles: vec![LargeParticleSpec {
                radius: 3.0,
                mass: 20.0,
                x: 10.0,
                y: 10.0,
            }],
            seed: 42,
            integration: IntegrationScheme::Kinematic,
        }
    }

    #[test]
    fn new_rejects_non_square_count() {
        assert!(matches!(
            LockstepCluster::new(&ClusterConfig::new(sim(2), 3)),
            Err(ConfigError::Topology(_))
        ));
    }

    #[test]
    fn steps_advance_every_partition() {
        let mut c = LockstepCluster::new(&ClusterConfig::new(sim(3), 4)).unwrap();
        assert_eq!(c.total_particles(), 4 * 7);
        let m = c.step();
        assert_eq!(m.len(), 4);
        assert!(m.iter().all(|s| s.halos_received == 3 && s.failed_receives == 0));
        assert_eq!(c.iteration(), IterationId(1));
        c.step();
        c.step();
        assert!(c.is_finished());
        assert!(c.step().is_empty());
    }

    #[test]
    fn run_reports_totals() {
        let mut c = LockstepCluster::new(&ClusterConfig::new(sim(5), 9)).unwrap();
        let report = c.run(&mut NullSink).unwrap();
        assert_eq!(report.partitions, 9);
        assert_eq!(report.steps, 5);
        assert_eq!(report.failures, 0);
        assert_eq!(report.final_particles, c.total_particles());
        assert!(report.bytes_exchanged > 0);
    }

    #[test]
    fn single_partition_has_no_traffic() {
        let mut c = LockstepCluster::new(&ClusterConfig::new(sim(4), 1)).unwrap();
        let report = c.run(&mut NullSink).unwrap();
        assert_eq!(report.bytes_exchanged, 0);
        assert_eq!(report.final_particles, 7);
    }
}
