//! Robot Mission Simulation
//!
//! Runs a configured mission until every waste is disposed of or the step
//! limit is reached, then writes the recorded run and prints a summary.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mission_core::config::{default_config_toml, PolicyKind, SimulationConfig, DEFAULT_CONFIG_PATH};
use mission_core::events::EventLogger;
use mission_core::output::{write_export, RunSummary, EXPORT_PATH};
use mission_core::setup::world_from_config;
use mission_core::SimResult;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "robot_mission")]
#[command(about = "Tiered robots collecting, merging and disposing of waste")]
struct Args {
    /// TOML configuration file; defaults are used if it cannot be read
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of steps
    #[arg(long)]
    steps: Option<u64>,

    /// Where to write the run export
    #[arg(long, default_value = EXPORT_PATH)]
    export: PathBuf,

    /// Append turn events to this JSONL file
    #[arg(long)]
    events: Option<PathBuf>,

    /// Use this policy for every tier
    #[arg(long)]
    policy: Option<PolicyKind>,

    /// Write the default configuration to --config and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("robot_mission=info,mission_core=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        tracing::error!(error = %e, "simulation failed");
        std::process::exit(1);
    }
}

fn run(args: Args) -> SimResult<()> {
    if args.write_default_config {
        fs::write(&args.config, default_config_toml()?)?;
        tracing::info!(path = %args.config.display(), "wrote default configuration");
        return Ok(());
    }

    let mut config = SimulationConfig::load_or_default(&args.config);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(policy) = args.policy {
        config = config.with_policy(policy);
    }
    if let Some(steps) = args.steps {
        config.world.max_steps = steps;
    }
    tracing::info!(
        seed = config.world.seed,
        width = config.world.width,
        height = config.world.height,
        max_steps = config.world.max_steps,
        "starting mission"
    );

    let mut world = world_from_config(&config)?;
    let mut logger = match &args.events {
        Some(path) => EventLogger::new(path)?,
        None => EventLogger::null(),
    };
    let mut summary = RunSummary::default();

    while world.step_count() < config.world.max_steps && !world.is_done() {
        let report = world.step()?;
        logger.log_batch(&report.events)?;
        summary.record_events(&report.events);
    }
    logger.flush()?;
    summary.finish(&world);

    write_export(&world.export()?, &args.export)?;
    tracing::info!(
        steps = summary.steps,
        done = summary.done,
        events = summary.total_events,
        remaining_mass = summary.census.live_mass(),
        "mission finished"
    );
    println!("{}", summary.to_json()?);
    Ok(())
}
