//! The square partition grid laid over the toroidal domain.

use tessel_core::{wrap_coordinate, BoundingBox, PartitionId};

use crate::error::TopologyError;
use crate::topology::{self, NeighborSet};

/// Side length of the square grid holding `partition_count` partitions.
///
/// Returns `Err` if the count is zero or not a perfect square.
pub fn grid_side(partition_count: u32) -> Result<u32, TopologyError> {
    if partition_count == 0 {
        return Err(TopologyError::EmptyGrid);
    }
    let side = partition_count.isqrt();
    if side * side != partition_count {
        return Err(TopologyError::NotPerfectSquare { partition_count });
    }
    Ok(side)
}

/// Wrap a signed index onto `[0, len)`.
pub(crate) fn wrap_axis(val: i64, len: u32) -> u32 {
    let n = i64::from(len);
    (((val % n) + n) % n) as u32
}

/// Distance between two indices on a ring of `len` positions.
pub(crate) fn axis_distance(a: u32, b: u32, len: u32) -> u32 {
    let diff = a.abs_diff(b);
    diff.min(len - diff)
}

/// A `side × side` grid of square cells of side `cell_size`.
///
/// Partition `n` sits at row `n / side`, column `n % side`, and owns the
/// half-open box `[col·g, (col+1)·g) × [row·g, (row+1)·g)` where `g` is
/// the cell size. The whole domain is a torus of side `side · g`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartitionGrid {
    side: u32,
    cell_size: f64,
}

impl PartitionGrid {
    /// Build the grid for `partition_count` partitions of side `cell_size`.
    pub fn new(partition_count: u32, cell_size: f64) -> Result<Self, TopologyError> {
        let side = grid_side(partition_count)?;
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(TopologyError::InvalidCellSize { value: cell_size });
        }
        Ok(Self { side, cell_size })
    }

    /// Number of partitions along each axis.
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Total number of partitions.
    pub fn partition_count(&self) -> u32 {
        self.side * self.side
    }

    /// Side length of one partition's cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Side length of the whole toroidal domain.
    pub fn domain_side(&self) -> f64 {
        self.cell_size * f64::from(self.side)
    }

    /// Iterate every partition id in row-major order.
    pub fn ids(&self) -> impl Iterator<Item = PartitionId> {
        (0..self.partition_count()).map(PartitionId)
    }

    fn check(&self, id: PartitionId) -> Result<(), TopologyError> {
        if id.0 >= self.partition_count() {
            return Err(TopologyError::PartitionOutOfRange {
                id,
                partition_count: self.partition_count(),
            });
        }
        Ok(())
    }

    /// `(row, col)` of a partition.
    pub fn coord_of(&self, id: PartitionId) -> Result<(u32, u32), TopologyError> {
        self.check(id)?;
        Ok((id.0 / self.side, id.0 % self.side))
    }

    /// The partition at `(row, col)`, wrapping both axes onto the torus.
    pub fn id_of(&self, row: i64, col: i64) -> PartitionId {
        let r = wrap_axis(row, self.side);
        let c = wrap_axis(col, self.side);
        PartitionId(r * self.side + c)
    }

    /// The half-open box a partition owns.
    pub fn bounds_of(&self, id: PartitionId) -> Result<BoundingBox, TopologyError> {
        let (row, col) = self.coord_of(id)?;
        Ok(BoundingBox::cell(row, col, self.cell_size))
    }

    /// The partition whose box contains `(x, y)` after wrapping onto the torus.
    ///
    /// Agrees with [`BoundingBox::contains`] on cell edges.
    pub fn owner_of(&self, x: f64, y: f64) -> PartitionId {
        let domain = self.domain_side();
        let col = self.cell_index(wrap_coordinate(x, domain));
        let row = self.cell_index(wrap_coordinate(y, domain));
        PartitionId(row * self.side + col)
    }

    fn cell_index(&self, v: f64) -> u32 {
        let mut idx = ((v / self.cell_size).floor().max(0.0) as u32).min(self.side - 1);
        if idx > 0 && v < f64::from(idx) * self.cell_size {
            idx -= 1;
        } else if idx + 1 < self.side && v >= f64::from(idx + 1) * self.cell_size {
            idx += 1;
        }
        idx
    }

    /// Toroidal Chebyshev distance between two partitions, in cells.
    pub fn distance(&self, a: PartitionId, b: PartitionId) -> Result<u32, TopologyError> {
        let (ar, ac) = self.coord_of(a)?;
        let (br, bc) = self.coord_of(b)?;
        Ok(axis_distance(ar, br, self.side).max(axis_distance(ac, bc, self.side)))
    }

    /// The halo neighbours of `id` within `horizon` cells.
    pub fn neighbors(&self, id: PartitionId, horizon: i32) -> Result<NeighborSet, TopologyError> {
        topology::neighbors(id, horizon, self.partition_count())
    }
}
