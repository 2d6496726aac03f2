//! Particles, the pairwise force law, and the position integrator.
//!
//! Particles are plain values: they have no identity beyond their fields
//! and are copied freely between partitions inside halo snapshots. There
//! is one force law, the inverse-square attraction `F = 3·m1·m2 / d²`,
//! and one explicit integrator on a torus.

use rand::Rng;

/// Coupling constant of the force law `F = FORCE_CONSTANT · m1 · m2 / d²`.
pub const FORCE_CONSTANT: f64 = 3.0;

/// How [`Particle::integrate`] advances position from velocity and force.
///
/// Velocity is always updated as `v + a·t`. The schemes differ only in
/// the quadratic displacement term.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IntegrationScheme {
    /// `x + v·t + ½·a·t²` (constant-acceleration kinematics).
    #[default]
    Kinematic,
    /// `x + v·t`; acceleration reaches position only through the next
    /// step's velocity. Reproduces runs that dropped the half-step term.
    VelocityOnly,
}

impl IntegrationScheme {
    /// Coefficient applied to `a·t²` in the position update.
    pub fn displacement_coefficient(self) -> f64 {
        match self {
            Self::Kinematic => 0.5,
            Self::VelocityOnly => 0.0,
        }
    }
}

/// A configured large particle, positioned relative to its partition's cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LargeParticleSpec {
    /// Radius.
    pub radius: f64,
    /// Mass.
    pub mass: f64,
    /// X offset inside the owning cell.
    pub x: f64,
    /// Y offset inside the owning cell.
    pub y: f64,
}

/// A point mass with a radius, moving on the toroidal domain.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    /// Mass.
    pub mass: f64,
    /// Radius. Only used for rendering; the force law treats particles as points.
    pub radius: f64,
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Velocity x.
    pub vx: f64,
    /// Velocity y.
    pub vy: f64,
    /// Force x from the most recent force pass.
    pub fx: f64,
    /// Force y from the most recent force pass.
    pub fy: f64,
}

impl Particle {
    /// A particle at rest at `(x, y)` with no force acting on it.
    pub fn at_rest(mass: f64, radius: f64, x: f64, y: f64) -> Self {
        Self {
            mass,
            radius,
            x,
            y,
            ..Self::default()
        }
    }

    /// A small particle placed uniformly at random inside the cell at `(row, col)`.
    pub fn small<R: Rng + ?Sized>(
        radius: f64,
        mass: f64,
        cell_size: f64,
        row: u32,
        col: u32,
        rng: &mut R,
    ) -> Self {
        let x = (rng.random::<f64>() + f64::from(col)) * cell_size;
        let y = (rng.random::<f64>() + f64::from(row)) * cell_size;
        Self::at_rest(mass, radius, x, y)
    }

    /// A large particle at its configured offset inside the cell at `(row, col)`.
    pub fn large(spec: &LargeParticleSpec, cell_size: f64, row: u32, col: u32) -> Self {
        let x = spec.x + cell_size * f64::from(col);
        let y = spec.y + cell_size * f64::from(row);
        Self::at_rest(spec.mass, spec.radius, x, y)
    }

    /// Force exerted on `self` by `other`, or `None` when the centres coincide.
    ///
    /// Coincident pairs have no defined direction, so they contribute
    /// nothing. This also covers the halo copy of a particle the caller
    /// already holds locally.
    pub fn force_from(&self, other: &Particle) -> Option<(f64, f64)> {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let d2 = dx * dx + dy * dy;
        if d2 == 0.0 {
            return None;
        }
        let d = d2.sqrt();
        let magnitude = FORCE_CONSTANT * self.mass * other.mass / d2;
        Some((dx / d * magnitude, dy / d * magnitude))
    }

    /// Recompute `(fx, fy)` as the sum of forces from `candidates`.
    ///
    /// `own_slot` is the index of this particle inside `candidates`, if it
    /// is there; that entry is skipped. The previous force is replaced,
    /// not added to.
    pub fn accumulate_force(&mut self, candidates: &[Particle], own_slot: Option<usize>) {
        let mut fx = 0.0;
        let mut fy = 0.0;
        for (idx, other) in candidates.iter().enumerate() {
            if Some(idx) == own_slot {
                continue;
            }
            if let Some((dfx, dfy)) = self.force_from(other) {
                fx += dfx;
                fy += dfy;
            }
        }
        self.fx = fx;
        self.fy = fy;
    }

    /// Advance position and velocity by `time_step` under the current force.
    ///
    /// Position wraps into `[0, domain_side)` on both axes.
    pub fn integrate(&mut self, time_step: f64, domain_side: f64, scheme: IntegrationScheme) {
        let ax = self.fx / self.mass;
        let ay = self.fy / self.mass;
        let k = scheme.displacement_coefficient();
        let t2 = time_step * time_step;
        self.x = wrap_coordinate(k * ax * t2 + self.vx * time_step + self.x, domain_side);
        self.y = wrap_coordinate(k * ay * t2 + self.vy * time_step + self.y, domain_side);
        self.vx += ax * time_step;
        self.vy += ay * time_step;
    }

    /// Raw bits of every field, in wire order.
    ///
    /// Two particles are the same value exactly when their bit patterns
    /// match; unlike `==` this treats `-0.0` and `0.0` as distinct and
    /// NaN as equal to itself.
    pub fn bit_pattern(&self) -> [u64; 8] {
        [
            self.mass, self.radius, self.x, self.y, self.vx, self.vy, self.fx, self.fy,
        ]
        .map(f64::to_bits)
    }
}

/// Reduce `value` into `[0, side)`.
///
/// A tiny negative remainder can round to exactly `side` after the
/// correction; that case maps to `0.0` so the half-open invariant holds.
pub fn wrap_coordinate(value: f64, side: f64) -> f64 {
    let mut r = value % side;
    if r < 0.0 {
        r += side;
    }
    if r >= side {
        r = 0.0;
    }
    r
}
