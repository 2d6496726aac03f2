//! Simulation configuration, validation, the text config format, and error types.
//!
//! [`SimConfig`] holds every physical parameter of a run. [`ClusterConfig`]
//! adds the partition count and resolves the [`PartitionGrid`] once,
//! before any partition starts.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use tessel_core::{IntegrationScheme, LargeParticleSpec};
use tessel_space::{PartitionGrid, TopologyError};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while parsing or validating a configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `time_slots` is zero.
    ZeroTimeSlots,
    /// `time_step` is NaN, infinite, zero, or negative.
    InvalidTimeStep {
        /// The invalid value.
        value: f64,
    },
    /// `grid_size` is zero.
    ZeroGridSize,
    /// A mass is NaN, infinite, zero, or negative.
    InvalidMass {
        /// Which particle the mass belongs to.
        what: String,
        /// The invalid value.
        value: f64,
    },
    /// A radius is NaN, infinite, or negative.
    InvalidRadius {
        /// Which particle the radius belongs to.
        what: String,
        /// The invalid value.
        value: f64,
    },
    /// A large particle's offset lies outside `[0, grid_size)`.
    LargeParticleOutOfCell {
        /// Index of the particle in `large_particles`.
        index: usize,
        /// Configured x offset.
        x: f64,
        /// Configured y offset.
        y: f64,
    },
    /// The partition layout is invalid.
    Topology(TopologyError),
    /// The text configuration could not be parsed.
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTimeSlots => write!(f, "time_slots must be at least 1"),
            Self::InvalidTimeStep { value } => {
                write!(f, "time_step must be finite and positive, got {value}")
            }
            Self::ZeroGridSize => write!(f, "grid_size must be at least 1"),
            Self::InvalidMass { what, value } => {
                write!(f, "{what} mass must be finite and positive, got {value}")
            }
            Self::InvalidRadius { what, value } => {
                write!(f, "{what} radius must be finite and non-negative, got {value}")
            }
            Self::LargeParticleOutOfCell { index, x, y } => write!(
                f,
                "large particle {index} at ({x}, {y}) lies outside its partition cell"
            ),
            Self::Topology(e) => write!(f, "topology: {e}"),
            Self::Parse { line, reason } => write!(f, "line {line}: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Topology(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TopologyError> for ConfigError {
    fn from(e: TopologyError) -> Self {
        Self::Topology(e)
    }
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Physical parameters of a run, shared by every partition.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Number of steps to simulate.
    pub time_slots: u64,
    /// Integration time step.
    pub time_step: f64,
    /// Halo horizon in partition cells. Values below 1 disable halo exchange.
    pub horizon: i32,
    /// Side length of each partition's square cell.
    pub grid_size: u32,
    /// Small particles created per partition.
    pub small_particle_count: u32,
    /// Mass of every small particle.
    pub small_particle_mass: f64,
    /// Radius of every small particle.
    pub small_particle_radius: f64,
    /// Large particles created in every partition, offset into its cell.
    pub large_particles: Vec<LargeParticleSpec>,
    /// Base seed for small particle placement.
    pub seed: u64,
    /// Position update rule.
    pub integration: IntegrationScheme,
}

fn check_mass(what: impl Into<String>, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidMass {
            what: what.into(),
            value,
        });
    }
    Ok(())
}

fn check_radius(what: impl Into<String>, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidRadius {
            what: what.into(),
            value,
        });
    }
    Ok(())
}

impl SimConfig {
    /// Cell side length as a float.
    pub fn cell_size(&self) -> f64 {
        f64::from(self.grid_size)
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_slots == 0 {
            return Err(ConfigError::ZeroTimeSlots);
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ConfigError::InvalidTimeStep {
                value: self.time_step,
            });
        }
        if self.grid_size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }
        check_mass("small particle", self.small_particle_mass)?;
        check_radius("small particle", self.small_particle_radius)?;

        let cell = self.cell_size();
        for (index, spec) in self.large_particles.iter().enumerate() {
            check_mass(format!("large particle {index}"), spec.mass)?;
            check_radius(format!("large particle {index}"), spec.radius)?;
            let inside = |v: f64| (0.0..cell).contains(&v);
            if !inside(spec.x) || !inside(spec.y) {
                return Err(ConfigError::LargeParticleOutOfCell {
                    index,
                    x: spec.x,
                    y: spec.y,
                });
            }
        }
        Ok(())
    }

    /// Parse the line-oriented text format.
    ///
    /// Eight `key value` header lines come first, in this order: time
    /// slots, time step, horizon, grid size, small particle count, small
    /// particle mass, small particle radius, large particle count. Keys
    /// are not checked. Then one `radius mass x y` line per large
    /// particle. Blank lines and lines starting with `#` are ignored.
    ///
    /// The result is not validated; `seed` is `0` and `integration` is
    /// the default scheme.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let eof_line = text.lines().count() + 1;
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

        let mut header = |name: &str| -> Result<(usize, String), ConfigError> {
            let (line, text) = lines.next().ok_or_else(|| ConfigError::Parse {
                line: eof_line,
                reason: format!("missing `{name}` line"),
            })?;
            let mut tokens = text.split_whitespace();
            let _key = tokens.next();
            let value = tokens.next().ok_or_else(|| ConfigError::Parse {
                line,
                reason: format!("expected `key value` for {name}"),
            })?;
            Ok((line, value.to_string()))
        };

        let time_slots = parse_value(header("time slots")?, "time slots")?;
        let time_step = parse_value(header("time step")?, "time step")?;
        let horizon = parse_value(header("horizon")?, "horizon")?;
        let grid_size = parse_value(header("grid size")?, "grid size")?;
        let small_particle_count = parse_value(header("small particle count")?, "small particle count")?;
        let small_particle_mass = parse_value(header("small particle mass")?, "small particle mass")?;
        let small_particle_radius =
            parse_value(header("small particle radius")?, "small particle radius")?;
        let large_count: usize = parse_value(header("large particle count")?, "large particle count")?;

        let mut large_particles = Vec::with_capacity(large_count.min(1024));
        for index in 0..large_count {
            let (line, text) = lines.next().ok_or_else(|| ConfigError::Parse {
                line: eof_line,
                reason: format!("expected {large_count} large particles, found {index}"),
            })?;
            let fields: Vec<&str> = text.split_whitespace().collect();
            if fields.len() != 4 {
                return Err(ConfigError::Parse {
                    line,
                    reason: format!("expected `radius mass x y`, found {} fields", fields.len()),
                });
            }
            let num = |i: usize, name: &str| parse_value((line, fields[i].to_string()), name);
            large_particles.push(LargeParticleSpec {
                radius: num(0, "radius")?,
                mass: num(1, "mass")?,
                x: num(2, "x")?,
                y: num(3, "y")?,
            });
        }

        if let Some((line, _)) = lines.next() {
            return Err(ConfigError::Parse {
                line,
                reason: "unexpected line after the last large particle".to_string(),
            });
        }

        Ok(Self {
            time_slots,
            time_step,
            horizon,
            grid_size,
            small_particle_count,
            small_particle_mass,
            small_particle_radius,
            large_particles,
            seed: 0,
            integration: IntegrationScheme::default(),
        })
    }
}

fn parse_value<T>((line, raw): (usize, String), name: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e| ConfigError::Parse {
        line,
        reason: format!("invalid {name} `{raw}`: {e}"),
    })
}

impl FromStr for SimConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ── ClusterConfig ──────────────────────────────────────────────────

/// A [`SimConfig`] together with the number of partitions to run it on.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterConfig {
    /// Physical parameters.
    pub sim: SimConfig,
    /// Number of partitions. Must be a perfect square.
    pub partition_count: u32,
}

impl ClusterConfig {
    /// Pair a configuration with a partition count.
    pub fn new(sim: SimConfig, partition_count: u32) -> Self {
        Self {
            sim,
            partition_count,
        }
    }

    /// Validate everything and resolve the partition grid.
    pub fn validate(&self) -> Result<PartitionGrid, ConfigError> {
        self.sim.validate()?;
        Ok(PartitionGrid::new(
            self.partition_count,
            self.sim.cell_size(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
timeSlots 100
timeStep 0.01
horizon 1
gridSize 50
numberOfSmallParticles 20
smallParticleMass 1
smallParticleRadius 0.5
numberOfLargeParticles 2
5 40 10 10
3 20.5 25 30
";

    fn valid_config() -> SimConfig {
        SimConfig {
            time_slots: 10,
            time_step: 0.1,
            horizon: 1,
            grid_size: 20,
            small_particle_count: 5,
            small_particle_mass: 1.0,
            small_particle_radius: 0.5,
            large_particles: vec![LargeParticleSpec {
                radius: 2.0,
                mass: 10.0,
                x: 5.0,
                y: 5.0,
            }],
            seed: 1,
            integration: IntegrationScheme::Kinematic,
        }
    }

    // ── Validation ──────────────────────────────────────────────

    #[test]
    fn validate_valid_config_succeeds() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_zero_time_slots_fails() {
        let mut cfg = valid_config();
        cfg.time_slots = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeSlots));
    }

    #[test]
    fn validate_bad_time_step_fails() {
        for bad in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let mut cfg = valid_config();
            cfg.time_step = bad;
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidTimeStep { .. })
            ));
        }
    }

    #[test]
    fn validate_zero_grid_size_fails() {
        let mut cfg = valid_config();
        cfg.grid_size = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroGridSize));
    }

    #[test]
    fn validate_bad_masses_fail() {
        let mut cfg = valid_config();
        cfg.small_particle_mass = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidMass { .. })));

        let mut cfg = valid_config();
        cfg.large_particles[0].mass = f64::NAN;
        match cfg.validate() {
            Err(ConfigError::InvalidMass { what, .. }) => assert_eq!(what, "large particle 0"),
            other => panic!("expected InvalidMass, got {other:?}"),
        }
    }

    #[test]
    fn validate_negative_radius_fails() {
        let mut cfg = valid_config();
        cfg.small_particle_radius = -1.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn validate_large_particle_outside_cell_fails() {
        let mut cfg = valid_config();
        cfg.large_particles[0].x = 20.0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::LargeParticleOutOfCell {
                index: 0,
                x: 20.0,
                y: 5.0
            })
        );
    }

    #[test]
    fn negative_horizon_is_valid() {
        let mut cfg = valid_config();
        cfg.horizon = -4;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn cluster_rejects_non_square_partition_count() {
        let cluster = ClusterConfig::new(valid_config(), 6);
        match cluster.validate() {
            Err(ConfigError::Topology(TopologyError::NotPerfectSquare { partition_count: 6 })) => {}
            other => panic!("expected Topology(NotPerfectSquare), got {other:?}"),
        }
    }

    #[test]
    fn cluster_resolves_grid() {
        let grid = ClusterConfig::new(valid_config(), 9).validate().unwrap();
        assert_eq!(grid.side(), 3);
        assert_eq!(grid.domain_side(), 60.0);
    }

    // ── Parsing ─────────────────────────────────────────────────

    #[test]
    fn parse_sample_file() {
        let cfg = SimConfig::parse(SAMPLE).unwrap();
        assert_eq!(cfg.time_slots, 100);
        assert_eq!(cfg.time_step, 0.01);
        assert_eq!(cfg.horizon, 1);
        assert_eq!(cfg.grid_size, 50);
        assert_eq!(cfg.small_particle_count, 20);
        assert_eq!(cfg.small_particle_mass, 1.0);
        assert_eq!(cfg.small_particle_radius, 0.5);
        assert_eq!(cfg.large_particles.len(), 2);
        assert_eq!(
            cfg.large_particles[1],
            LargeParticleSpec {
                radius: 3.0,
                mass: 20.5,
                x: 25.0,
                y: 30.0
            }
        );
        assert_eq!(cfg.seed, 0);
        assert_eq!(cfg.integration, IntegrationScheme::Kinematic);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_via_from_str() {
        let cfg: SimConfig = SAMPLE.parse().unwrap();
        assert_eq!(cfg.grid_size, 50);
    }

    #[test]
    fn parse_reports_bad_number_with_line() {
        let text = SAMPLE.replace("horizon 1", "horizon one");
        match SimConfig::parse(&text) {
            Err(ConfigError::Parse { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("horizon"), "{reason}");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn parse_reports_missing_value() {
        let text = SAMPLE.replace("gridSize 50", "gridSize");
        assert!(matches!(
            SimConfig::parse(&text),
            Err(ConfigError::Parse { line: 4, .. })
        ));
    }

    #[test]
    fn parse_reports_missing_large_particle() {
        let text = SAMPLE.replace("numberOfLargeParticles 2", "numberOfLargeParticles 3");
        let err = SimConfig::parse(&text).unwrap_err();
        assert!(err.to_string().contains("expected 3 large particles, found 2"));
    }

    #[test]
    fn parse_rejects_short_large_line() {
        let text = SAMPLE.replace("5 40 10 10", "5 40 10");
        assert!(matches!(
            SimConfig::parse(&text),
            Err(ConfigError::Parse { line: 9, .. })
        ));
    }

    #[test]
    fn parse_rejects_trailing_lines() {
        let text = format!("{SAMPLE}1 1 1 1\n");
        assert!(matches!(
            SimConfig::parse(&text),
            Err(ConfigError::Parse { line: 11, .. })
        ));
    }

    #[test]
    fn parse_skips_blank_and_comment_lines() {
        let text = format!("# initial spec\n\n{SAMPLE}\n");
        assert!(SimConfig::parse(&text).is_ok());
    }

    #[test]
    fn parse_truncated_header() {
        let err = SimConfig::parse("timeSlots 3\ntimeStep 1\n").unwrap_err();
        assert!(err.to_string().contains("horizon"));
    }
}
