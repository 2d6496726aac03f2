//! Horizon neighbourhoods on the toroidal partition grid.

use indexmap::IndexSet;
use tessel_core::PartitionId;

use crate::error::TopologyError;
use crate::grid::{grid_side, wrap_axis};

/// The distinct partitions a partition exchanges halo data with.
///
/// Never contains the owning partition. Iteration order is the
/// row-major scan order of the offsets that produced it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeighborSet(IndexSet<PartitionId>);

impl NeighborSet {
    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of neighbours.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no neighbours.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `id` is a neighbour.
    pub fn contains(&self, id: PartitionId) -> bool {
        self.0.contains(&id)
    }

    /// Iterate neighbours in scan order.
    pub fn iter(&self) -> impl Iterator<Item = PartitionId> + '_ {
        self.0.iter().copied()
    }

    /// Neighbours in ascending id order.
    pub fn to_sorted_vec(&self) -> Vec<PartitionId> {
        let mut v: Vec<PartitionId> = self.0.iter().copied().collect();
        v.sort_unstable();
        v
    }
}

impl FromIterator<PartitionId> for NeighborSet {
    fn from_iter<T: IntoIterator<Item = PartitionId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Every partition whose row and column are each within `horizon` of
/// `id`'s on the toroidal grid, excluding `id` itself.
///
/// `horizon < 1` yields the empty set. Rows and columns wrap
/// independently, so a horizon larger than the grid simply covers the
/// whole grid once.
pub fn neighbors(
    id: PartitionId,
    horizon: i32,
    partition_count: u32,
) -> Result<NeighborSet, TopologyError> {
    let side = grid_side(partition_count)?;
    if id.0 >= partition_count {
        return Err(TopologyError::PartitionOutOfRange {
            id,
            partition_count,
        });
    }
    if horizon < 1 {
        return Ok(NeighborSet::empty());
    }

    let row = i64::from(id.0 / side);
    let col = i64::from(id.0 % side);
    let reach = i64::from(horizon).min(i64::from(side));

    let mut set = IndexSet::new();
    for dr in -reach..=reach {
        let r = wrap_axis(row + dr, side);
        for dc in -reach..=reach {
            let c = wrap_axis(col + dc, side);
            let n = PartitionId(r * side + c);
            if n != id {
                set.insert(n);
            }
        }
    }
    Ok(NeighborSet(set))
}
