//! Tessel command-line runner.
//!
//! Reads a simulation config file, runs it across a square grid of
//! partitions, and writes PPM previews of every partition before the
//! first step and after the last.
//!
//! # Example
//!
//! ```bash
//! # Nine partitions, one thread each
//! tessel initialspec.txt --partitions 9
//!
//! # Reproducible layout, previews under ./frames
//! RUST_LOG=tessel_engine=debug tessel initialspec.txt -p 4 --seed 7 --out frames
//! ```

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tessel_cli::PpmSink;
use tessel_core::IntegrationScheme;
use tessel_engine::{ClusterConfig, LockstepCluster, RunReport, SimConfig, ThreadedCluster};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tessel N-body runner
///
/// Runs a toroidal N-body simulation decomposed over a square grid of
/// partitions that exchange halo snapshots every step.
#[derive(Parser, Debug)]
#[command(name = "tessel")]
#[command(version, about, long_about = None)]
struct Args {
    /// Simulation config file
    config: PathBuf,

    /// Number of partitions (must be a perfect square)
    #[arg(short = 'p', long, default_value = "4")]
    partitions: u32,

    /// File name suffix of the initial previews
    #[arg(long, default_value = "initial.ppm")]
    initial: String,

    /// File name suffix of the final previews
    #[arg(long = "final", default_value = "final.ppm")]
    final_name: String,

    /// Seed for small-particle placement (overrides the default of 0)
    #[arg(long)]
    seed: Option<u64>,

    /// Directory the previews are written to
    #[arg(short = 'o', long, default_value = ".")]
    out: PathBuf,

    /// Advance positions by velocity only, without the half-step force term
    #[arg(long)]
    velocity_only: bool,

    /// Run every partition on the calling thread instead of one thread each
    #[arg(long)]
    lockstep: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tessel=info,tessel_engine=info")),
        )
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.config)
        .map_err(|e| format!("cannot read {}: {e}", args.config.display()))?;
    let mut sim = SimConfig::parse(&text)?;
    if let Some(seed) = args.seed {
        sim.seed = seed;
    }
    if args.velocity_only {
        sim.integration = IntegrationScheme::VelocityOnly;
    }
    let config = ClusterConfig::new(sim, args.partitions);
    config.validate()?;

    fs::create_dir_all(&args.out)?;
    let mut sink = PpmSink::new(&args.out, args.initial.as_str(), args.final_name.as_str());

    info!(
        config = %args.config.display(),
        partitions = args.partitions,
        steps = config.sim.time_slots,
        seed = config.sim.seed,
        lockstep = args.lockstep,
        "Starting simulation"
    );

    let report = if args.lockstep {
        LockstepCluster::new(&config)?.run(&mut sink)?
    } else {
        ThreadedCluster::new(&config)?.run(&mut sink)?.report
    };

    summarize(&report, sink.written());
    Ok(())
}

fn summarize(report: &RunReport, previews: usize) {
    info!(
        steps = report.steps,
        particles = report.final_particles,
        admitted = report.admitted,
        evicted = report.evicted,
        bytes = report.bytes_exchanged,
        failures = report.failures,
        sync_us = report.sync_us,
        force_us = report.force_us,
        integrate_us = report.integrate_us,
        slowest_step_us = report.slowest_step_us,
        previews,
        "Simulation finished"
    );
}
