//! Threaded cluster: one OS thread per partition.
//!
//! Each [`PartitionWorker`] owns its partition exclusively (moved in via
//! `thread::Builder::spawn`) and talks to the others only through its
//! [`ChannelTransport`]. No locks, no shared particle storage: halo
//! snapshots cross threads as encoded byte buffers over zero-capacity
//! crossbeam channels, so every exchange is a rendezvous.
//!
//! There are no timeouts. A worker that dies mid-run leaves its peers
//! blocked in the exchange.

use std::thread;

use tessel_space::PartitionGrid;
use tracing::{debug, info};

use crate::config::{ClusterConfig, ConfigError};
use crate::error::ClusterError;
use crate::metrics::RunReport;
use crate::partition::Partition;
use crate::sync::exchange_all;
use crate::transport::ChannelTransport;
use crate::view::{emit_frames, FrameSink, FrameStage};

// Compile-time assertion: partitions and their transports can move to
// worker threads.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Partition>();
        assert_send::<ChannelTransport>();
    }
};

/// State owned by one worker thread.
pub(crate) struct PartitionWorker {
    partition: Partition,
    transport: ChannelTransport,
    partition_count: u32,
}

impl PartitionWorker {
    /// Step until the partition finishes, then hand it back.
    pub fn run(mut self) -> (Partition, RunReport) {
        let mut report = RunReport {
            partitions: 1,
            ..RunReport::default()
        };
        while self.partition.begin_step() {
            let stats = exchange_all(&mut self.partition, self.partition_count, &mut self.transport);
            let mut m = self.partition.advance();
            stats.apply_to(&mut m);
            report.record(&m);
            report.steps += 1;
        }
        report.final_particles = self.partition.particle_count();
        debug!(
            partition = %self.partition.id(),
            particles = report.final_particles,
            failures = report.failures,
            "worker finished"
        );
        (self.partition, report)
    }
}

/// The partitions of a finished threaded run.
#[derive(Debug)]
pub struct FinishedRun {
    /// Final partitions, in id order.
    pub partitions: Vec<Partition>,
    /// Totals over every worker.
    pub report: RunReport,
}

impl FinishedRun {
    /// Particles owned across all partitions.
    pub fn total_particles(&self) -> usize {
        self.partitions.iter().map(Partition::particle_count).sum()
    }
}

/// Every partition of a run, ready to be handed to worker threads.
pub struct ThreadedCluster {
    grid: PartitionGrid,
    partitions: Vec<Partition>,
    time_slots: u64,
}

impl ThreadedCluster {
    /// Validate the configuration and create every partition.
    pub fn new(config: &ClusterConfig) -> Result<Self, ConfigError> {
        let grid = config.validate()?;
        let partitions = grid
            .ids()
            .map(|id| Partition::new(&config.sim, &grid, id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            grid,
            partitions,
            time_slots: config.sim.time_slots,
        })
    }

    /// Assemble a cluster from prebuilt partitions, one per grid cell in id order.
    pub fn from_partitions(grid: PartitionGrid, partitions: Vec<Partition>, time_slots: u64) -> Self {
        Self {
            grid,
            partitions,
            time_slots,
        }
    }

    /// The partition grid.
    pub fn grid(&self) -> &PartitionGrid {
        &self.grid
    }

    /// All partitions in id order, before the run.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Spawn one worker per partition and wait for all of them.
    ///
    /// `sink` receives the initial and final frames on the calling
    /// thread. Per-step frames are not delivered.
    pub fn run(self, sink: &mut dyn FrameSink) -> Result<FinishedRun, ClusterError> {
        let partition_count = self.grid.partition_count();
        let particles: usize = self.partitions.iter().map(Partition::particle_count).sum();
        info!(
            partitions = partition_count,
            steps = self.time_slots,
            particles,
            "threaded run starting"
        );
        emit_frames(&self.partitions, FrameStage::Initial, sink)?;

        let transports = ChannelTransport::mesh(partition_count);
        let mut handles = Vec::with_capacity(self.partitions.len());
        for (partition, transport) in self.partitions.into_iter().zip(transports) {
            let id = partition.id();
            let worker = PartitionWorker {
                partition,
                transport,
                partition_count,
            };
            // Workers already started are detached if a later spawn fails.
            let handle = thread::Builder::new()
                .name(format!("tessel-partition-{id}"))
                .spawn(move || worker.run())
                .map_err(|e| ClusterError::ThreadSpawnFailed {
                    reason: format!("partition {id}: {e}"),
                })?;
            handles.push((id, handle));
        }

        let mut partitions = Vec::with_capacity(handles.len());
        let mut report = RunReport::default();
        for (id, handle) in handles {
            let (partition, worker_report) = handle
                .join()
                .map_err(|_| ClusterError::WorkerPanicked { partition: id })?;
            report.merge(&worker_report);
            partitions.push(partition);
        }

        emit_frames(&partitions, FrameStage::Final, sink)?;
        info!(
            steps = report.steps,
            particles = report.final_particles,
            admitted = report.admitted,
            evicted = report.evicted,
            bytes = report.bytes_exchanged,
            failures = report.failures,
            "threaded run finished"
        );
        Ok(FinishedRun { partitions, report })
    }
}
