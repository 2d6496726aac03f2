//! Test fixtures and probe sinks for Tessel development.
//!
//! Provides ready-made [`SimConfig`] values, helpers for building
//! partitions with hand-placed particles, and a [`CollectingSink`] that
//! records every frame it is handed.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::*;

use std::collections::BTreeMap;
use std::io;

use tessel_core::{Particle, PartitionId};
use tessel_engine::{FrameSink, FrameStage, PartitionView};

/// An owned copy of one [`PartitionView`].
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedFrame {
    pub stage: FrameStage,
    pub partition: PartitionId,
    pub row: u32,
    pub col: u32,
    pub small: Vec<Particle>,
    pub large: Vec<Particle>,
}

/// Records every frame, in delivery order.
#[derive(Default)]
pub struct CollectingSink {
    pub frames: Vec<CapturedFrame>,
    pub want_steps: bool,
    /// Fail the n-th delivery (0-based) with an I/O error.
    pub fail_at: Option<usize>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that also asks for per-step frames.
    pub fn with_steps() -> Self {
        Self {
            want_steps: true,
            ..Self::default()
        }
    }

    /// Frames captured at `stage`, keyed by partition.
    pub fn at(&self, stage: FrameStage) -> BTreeMap<PartitionId, &CapturedFrame> {
        self.frames
            .iter()
            .filter(|f| f.stage == stage)
            .map(|f| (f.partition, f))
            .collect()
    }

    /// Total particles across the frames captured at `stage`.
    pub fn particles_at(&self, stage: FrameStage) -> usize {
        self.at(stage)
            .values()
            .map(|f| f.small.len() + f.large.len())
            .sum()
    }
}

impl FrameSink for CollectingSink {
    fn wants_steps(&self) -> bool {
        self.want_steps
    }

    fn frame(&mut self, stage: FrameStage, view: &PartitionView<'_>) -> io::Result<()> {
        if self.fail_at == Some(self.frames.len()) {
            return Err(io::Error::other("injected sink failure"));
        }
        self.frames.push(CapturedFrame {
            stage,
            partition: view.id,
            row: view.row,
            col: view.col,
            small: view.small.to_vec(),
            large: view.large.to_vec(),
        });
        Ok(())
    }
}
