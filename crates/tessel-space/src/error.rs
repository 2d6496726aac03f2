//! Error types for grid construction and topology queries.

use std::fmt;

use tessel_core::PartitionId;

/// Errors arising from partition grid construction or topology queries.
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// The partition count is zero.
    EmptyGrid,
    /// The partition count cannot be laid out as a square grid.
    NotPerfectSquare {
        /// The rejected partition count.
        partition_count: u32,
    },
    /// A partition id does not exist in the grid.
    PartitionOutOfRange {
        /// The offending id.
        id: PartitionId,
        /// Number of partitions in the grid.
        partition_count: u32,
    },
    /// The cell side length is not a positive finite number.
    InvalidCellSize {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "partition grid must have at least one partition"),
            Self::NotPerfectSquare { partition_count } => {
                write!(f, "partition count {partition_count} is not a perfect square")
            }
            Self::PartitionOutOfRange {
                id,
                partition_count,
            } => write!(
                f,
                "partition {id} out of range for a grid of {partition_count} partitions"
            ),
            Self::InvalidCellSize { value } => {
                write!(f, "cell size must be positive and finite, got {value}")
            }
        }
    }
}

impl std::error::Error for TopologyError {}
