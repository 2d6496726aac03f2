//! Half-open axis-aligned boxes owned by partitions.

use crate::particle::Particle;

/// The square region of the domain a partition owns.
///
/// Bounds are half-open: `[min_x, max_x) × [min_y, max_y)`. Adjacent
/// partitions share an edge value, and the half-open rule assigns a point
/// on that edge to exactly one of them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Inclusive lower x bound.
    pub min_x: f64,
    /// Inclusive lower y bound.
    pub min_y: f64,
    /// Exclusive upper x bound.
    pub max_x: f64,
    /// Exclusive upper y bound.
    pub max_y: f64,
}

impl BoundingBox {
    /// The box of the grid cell at `(row, col)` for cells of side `cell_size`.
    pub fn cell(row: u32, col: u32, cell_size: f64) -> Self {
        let min_x = f64::from(col) * cell_size;
        let min_y = f64::from(row) * cell_size;
        Self {
            min_x,
            min_y,
            max_x: f64::from(col + 1) * cell_size,
            max_y: f64::from(row + 1) * cell_size,
        }
    }

    /// Whether `(x, y)` lies inside the box. NaN coordinates are never inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Whether the particle's centre lies inside the box.
    pub fn contains_particle(&self, p: &Particle) -> bool {
        self.contains(p.x, p.y)
    }

    /// Width of the box along x.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_box_is_offset_by_row_and_col() {
        let b = BoundingBox::cell(1, 2, 10.0);
        assert_eq!(b.min_x, 20.0);
        assert_eq!(b.max_x, 30.0);
        assert_eq!(b.min_y, 10.0);
        assert_eq!(b.max_y, 20.0);
        assert_eq!(b.width(), 10.0);
    }

    #[test]
    fn contains_is_half_open() {
        let b = BoundingBox::cell(0, 0, 10.0);
        assert!(b.contains(0.0, 0.0));
        assert!(b.contains(9.999, 9.999));
        assert!(!b.contains(10.0, 5.0));
        assert!(!b.contains(5.0, 10.0));
        assert!(!b.contains(-0.001, 5.0));
        assert!(!b.contains(f64::NAN, 5.0));
    }

    #[test]
    fn shared_edge_belongs_to_one_cell() {
        let left = BoundingBox::cell(0, 0, 4.0);
        let right = BoundingBox::cell(0, 1, 4.0);
        assert!(!left.contains(4.0, 1.0));
        assert!(right.contains(4.0, 1.0));
    }
}
