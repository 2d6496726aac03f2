//! Plain-text (P3) PPM rendering of one partition.
//!
//! One pixel per unit of space, in partition-local coordinates. Large
//! particles paint their disk blue; each small particle adds one to the
//! red channel of the pixel it sits in, unless that pixel is already
//! covered by a large particle.

use std::fmt;
use std::ops::Range;

use tessel_core::Particle;
use tessel_engine::PartitionView;

const FULL: u8 = 255;

/// An RGB raster of one partition's particles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    side: usize,
    pixels: Vec<[u8; 3]>,
}

impl Raster {
    /// Rasterize a partition view onto a `cell_size` × `cell_size` grid.
    pub fn from_view(view: &PartitionView<'_>, cell_size: f64) -> Self {
        let side = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size.ceil() as usize
        } else {
            0
        };
        let mut raster = Self {
            side,
            pixels: vec![[0; 3]; side * side],
        };
        let (ox, oy) = (view.bounds.min_x, view.bounds.min_y);
        for p in view.large {
            raster.paint_disk(p.x - ox, p.y - oy, p.radius);
        }
        for p in view.small {
            raster.bump(p, ox, oy);
        }
        raster
    }

    /// Width and height in pixels.
    pub fn side(&self) -> usize {
        self.side
    }

    /// The `[r, g, b]` value at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x < self.side && y < self.side {
            self.pixels.get(y * self.side + x).copied()
        } else {
            None
        }
    }

    fn index(&self, x: f64, y: f64) -> Option<usize> {
        let side = self.side as f64;
        if x >= 0.0 && y >= 0.0 && x < side && y < side {
            Some(y as usize * self.side + x as usize)
        } else {
            None
        }
    }

    // Samples at unit steps from the disk's top-left corner, so a disk
    // whose centre is off the pixel grid still lands on whole pixels.
    // Only samples that fall on the raster are visited.
    fn paint_disk(&mut self, cx: f64, cy: f64, radius: f64) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let steps = (2.0 * radius).ceil();
        let side = self.side as f64;
        let (x0, y0) = (cx - radius, cy - radius);
        for i in visible_steps(x0, steps, side) {
            let x = x0 + i as f64;
            for j in visible_steps(y0, steps, side) {
                let y = y0 + j as f64;
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy >= r2 {
                    continue;
                }
                if let Some(k) = self.index(x, y) {
                    self.pixels[k][2] = FULL;
                }
            }
        }
    }

    fn bump(&mut self, p: &Particle, ox: f64, oy: f64) {
        let x = (p.x - ox).trunc();
        let y = (p.y - oy).trunc();
        if let Some(k) = self.index(x, y) {
            let px = &mut self.pixels[k];
            if px[2] != FULL {
                px[0] = px[0].saturating_add(1);
            }
        }
    }
}

/// Sample indices `i < steps` for which `start + i` lies in `[0, side)`.
fn visible_steps(start: f64, steps: f64, side: f64) -> Range<usize> {
    let lo = (-start).ceil().clamp(0.0, steps);
    let hi = (side - start).ceil().clamp(0.0, steps);
    lo as usize..hi as usize
}

impl fmt::Display for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "P3")?;
        writeln!(f, "{} {}", self.side, self.side)?;
        writeln!(f, "{FULL}")?;
        if self.side == 0 {
            return Ok(());
        }
        for row in self.pixels.chunks(self.side) {
            for [r, g, b] in row {
                write!(f, "{r} {g} {b} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Render one partition as the text of a P3 PPM file.
pub fn render(view: &PartitionView<'_>, cell_size: f64) -> String {
    Raster::from_view(view, cell_size).to_string()
}
