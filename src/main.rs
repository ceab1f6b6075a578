//! CLI entry point: load a clinic configuration, run one day, print the summary.

use std::path::PathBuf;

use clap::Parser;
use clinic_sim::config::{self, Config};
use clinic_sim::report::{self, RunSummary};
use clinic_sim::simulator::Simulator;
use clinic_sim::trace::{EventLog, LogSink, TraceSink};

/// Urgent-care clinic simulator
#[derive(Parser, Debug)]
#[command(name = "clinic-sim", about = "Simulate patient flow through an urgent-care clinic.")]
pub struct Cli {
    /// Path to a TOML config file (overrides defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of exam rooms (overrides config)
    #[arg(long)]
    exam_rooms: Option<usize>,

    /// Number of mental-health consult rooms (overrides config)
    #[arg(long)]
    consult_rooms: Option<usize>,

    /// Closing time in hours (overrides config)
    #[arg(long)]
    close_time: Option<f64>,

    /// Stop the event loop at this time instead of draining the calendar
    #[arg(long)]
    horizon: Option<f64>,

    /// Output directory for CSV/JSON results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the event trace after the run
    #[arg(long)]
    trace: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    // 1. Load config (default or from file)
    let mut config = match cli.config {
        Some(ref path) => {
            let path = path.to_string_lossy();
            tracing::info!("Loading configuration from: {}", path);
            config::load_config(&path).map_err(|e| {
                tracing::error!("Failed to load config from '{}': {}", path, e);
                e
            })?
        }
        None => Config::default(),
    };

    // 2. Apply command-line overrides
    if let Some(seed) = cli.seed {
        config.run.seed = seed;
    }
    if let Some(rooms) = cli.exam_rooms {
        config.clinic.exam_rooms = rooms;
    }
    if let Some(rooms) = cli.consult_rooms {
        config.clinic.consult_rooms = rooms;
    }
    if let Some(close_time) = cli.close_time {
        config.clinic.close_time = close_time;
    }
    if cli.horizon.is_some() {
        config.clinic.horizon = cli.horizon;
    }
    config.validate().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;

    // 3. Run
    let trace: Box<dyn TraceSink> = if cli.trace {
        Box::new(EventLog::new())
    } else {
        Box::new(LogSink)
    };
    let mut sim = Simulator::seeded(&config, trace)?;
    if let Err(e) = sim.run() {
        tracing::error!("Simulation aborted at t={}: {}", sim.now(), e);
        return Err(e.into());
    }

    // 4. Report
    let summary = RunSummary::from_simulator(&sim);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary);
    }
    if cli.trace {
        println!();
        for entry in sim.clinic().trace().entries() {
            println!("{}", entry);
        }
    }
    if let Some(ref dir) = cli.output {
        report::write_outputs(dir, &sim)?;
    }
    Ok(())
}
