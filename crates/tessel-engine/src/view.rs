//! Read-only views of partition state for visualization.
//!
//! The engine never writes files. Anything that wants to look at the
//! particles (image writers, test probes) implements [`FrameSink`] and
//! is handed a [`PartitionView`] at the points named by [`FrameStage`].

use std::io;

use tessel_core::{BoundingBox, IterationId, Particle, PartitionId};

use crate::error::ClusterError;
use crate::partition::Partition;

/// When a frame was captured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStage {
    /// Before the first step.
    Initial,
    /// After the given step completed.
    Step(IterationId),
    /// After the last step.
    Final,
}

/// Borrowed snapshot of one partition's particles and geometry.
#[derive(Clone, Copy, Debug)]
pub struct PartitionView<'a> {
    /// The partition.
    pub id: PartitionId,
    /// Grid row.
    pub row: u32,
    /// Grid column.
    pub col: u32,
    /// The box the partition owns.
    pub bounds: BoundingBox,
    /// The next iteration the partition will run.
    pub iteration: IterationId,
    /// Owned small particles.
    pub small: &'a [Particle],
    /// Owned large particles.
    pub large: &'a [Particle],
}

impl PartitionView<'_> {
    /// Number of particles owned.
    pub fn particle_count(&self) -> usize {
        self.small.len() + self.large.len()
    }
}

/// Receives partition views during a run.
pub trait FrameSink {
    /// Whether [`FrameStage::Step`] frames should be delivered.
    fn wants_steps(&self) -> bool {
        false
    }

    /// Consume one partition's view.
    fn frame(&mut self, stage: FrameStage, view: &PartitionView<'_>) -> io::Result<()>;
}

/// A sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn frame(&mut self, _stage: FrameStage, _view: &PartitionView<'_>) -> io::Result<()> {
        Ok(())
    }
}

/// Hand every partition's view to `sink`.
pub(crate) fn emit_frames(
    partitions: &[Partition],
    stage: FrameStage,
    sink: &mut dyn FrameSink,
) -> Result<(), ClusterError> {
    for p in partitions {
        sink.frame(stage, &p.view())
            .map_err(|source| ClusterError::Sink {
                partition: p.id(),
                source,
            })?;
    }
    Ok(())
}
