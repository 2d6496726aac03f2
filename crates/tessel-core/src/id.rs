//! Strongly-typed identifiers for partitions and simulation iterations.

use std::fmt;

/// Identifies a partition by its linear index in the partition grid.
///
/// Partitions are laid out row-major on a `side × side` grid, so
/// `PartitionId(n)` sits at row `n / side`, column `n % side`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(pub u32);

impl PartitionId {
    /// The id as a `usize`, for indexing per-partition vectors.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PartitionId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Zero-based index of a simulation step.
///
/// A partition at `IterationId(k)` is about to run (or is running) its
/// `k`-th step. Halo snapshots are tagged with the iteration that will
/// consume them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IterationId(pub u64);

impl IterationId {
    /// The iteration that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for IterationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for IterationId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_id_index_and_display() {
        let id = PartitionId(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "7");
        assert_eq!(PartitionId::from(7u32), id);
    }

    #[test]
    fn iteration_next_is_monotonic() {
        let it = IterationId::default();
        assert_eq!(it, IterationId(0));
        assert_eq!(it.next(), IterationId(1));
        assert!(it.next() > it);
    }
}
