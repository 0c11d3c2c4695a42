//! Headless driver: runs the ecosystem for a fixed number of ticks and
//! prints the final world totals as JSON.

use clap::Parser;
use log::{error, info};
use nodus::simulation::ecosystem::Ecosystem;
use nodus::simulation::error::SimulationError;
use nodus::simulation::params::Params;
use std::path::PathBuf;
use std::process::ExitCode;

/// Nodus - evolving neural nodes
#[derive(Parser, Debug)]
#[command(name = "nodus")]
#[command(about = "Run the node ecosystem headless and report population totals")]
struct Args {
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 2400)]
    ticks: u64,

    /// JSON parameter file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log a summary line every N ticks (0 disables)
    #[arg(long, default_value_t = 100)]
    report_every: u64,
}

fn run(args: &Args) -> Result<(), SimulationError> {
    let params = match &args.config {
        Some(path) => Params::from_json_file(path)?,
        None => Params::default(),
    };
    let dt = params.tick_interval;
    let mut ecosystem = Ecosystem::new(params)?;

    for tick in 1..=args.ticks {
        ecosystem.detect_contacts();
        ecosystem.tick(dt);
        ecosystem.drain_events();

        if args.report_every > 0 && tick % args.report_every == 0 {
            let totals = ecosystem.totals();
            info!(
                "tick {}: t={:.1}s nodes={} species={} founded={} resources={}",
                tick,
                totals.time,
                totals.node_count,
                totals.active_species,
                totals.species_founded,
                totals.resource_count
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&ecosystem.totals())?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
