//! Per-step metrics for a partition and the aggregate report of a run.
//!
//! [`StepMetrics`] captures timing and traffic for a single step of a
//! single partition. [`RunReport`] folds the steps of every partition
//! into one summary for logging.

use tessel_core::{IterationId, PartitionId};

/// Timing and traffic metrics collected during one partition step.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// The partition that ran the step.
    pub partition: PartitionId,
    /// The step index.
    pub iteration: IterationId,
    /// Time spent in the halo exchange, in microseconds.
    pub sync_us: u64,
    /// Time spent computing forces, in microseconds.
    pub force_us: u64,
    /// Time spent integrating, in microseconds.
    pub integrate_us: u64,
    /// Small particles owned after the step.
    pub small_count: usize,
    /// Large particles owned after the step.
    pub large_count: usize,
    /// Particles admitted from neighbours' halos.
    pub admitted: usize,
    /// Particles evicted for leaving the partition's box.
    pub evicted: usize,
    /// Halo snapshots received and decoded.
    pub halos_received: usize,
    /// Encoded bytes received.
    pub bytes_in: usize,
    /// Encoded bytes sent.
    pub bytes_out: usize,
    /// Receives that failed or carried undecodable data.
    pub failed_receives: usize,
    /// Sends that failed.
    pub failed_sends: usize,
}

impl StepMetrics {
    /// Total wall-clock time of the step, in microseconds.
    pub fn total_us(&self) -> u64 {
        self.sync_us + self.force_us + self.integrate_us
    }
}

/// Totals over every step of every partition in a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunReport {
    /// Number of partitions.
    pub partitions: u32,
    /// Number of steps each partition ran.
    pub steps: u64,
    /// Particles owned across all partitions at the end of the run.
    pub final_particles: usize,
    /// Total admissions.
    pub admitted: usize,
    /// Total evictions.
    pub evicted: usize,
    /// Total encoded bytes moved between partitions.
    pub bytes_exchanged: usize,
    /// Total failed sends and receives.
    pub failures: usize,
    /// Summed sync time, in microseconds.
    pub sync_us: u64,
    /// Summed force time, in microseconds.
    pub force_us: u64,
    /// Summed integration time, in microseconds.
    pub integrate_us: u64,
    /// Longest single partition step, in microseconds.
    pub slowest_step_us: u64,
}

impl RunReport {
    /// Fold one step's metrics into the report.
    pub fn record(&mut self, m: &StepMetrics) {
        self.admitted += m.admitted;
        self.evicted += m.evicted;
        self.bytes_exchanged += m.bytes_out;
        self.failures += m.failed_receives + m.failed_sends;
        self.sync_us += m.sync_us;
        self.force_us += m.force_us;
        self.integrate_us += m.integrate_us;
        self.slowest_step_us = self.slowest_step_us.max(m.total_us());
    }

    /// Merge another report (for example, one partition's) into this one.
    pub fn merge(&mut self, other: &RunReport) {
        self.partitions += other.partitions;
        self.steps = self.steps.max(other.steps);
        self.final_particles += other.final_particles;
        self.admitted += other.admitted;
        self.evicted += other.evicted;
        self.bytes_exchanged += other.bytes_exchanged;
        self.failures += other.failures;
        self.sync_us += other.sync_us;
        self.force_us += other.force_us;
        self.integrate_us += other.integrate_us;
        self.slowest_step_us = self.slowest_step_us.max(other.slowest_step_us);
    }
}
