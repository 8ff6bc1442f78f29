use anyhow::{Context, Result};
use clap::Parser;
use flocksim_core::{init_logging, AppConfig};
use flocksim_lib::app::App;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Stop after this many ticks (overrides `max_ticks`)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Remove a quarter of the living prey every N ticks
    #[arg(long)]
    kill_every: Option<u64>,

    /// Maximum turn per tick, in degrees
    #[arg(long)]
    max_turn_degrees: Option<f64>,
}

fn load_config(path: &str) -> Result<AppConfig> {
    if !Path::new(path).exists() {
        tracing::warn!(path, "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    AppConfig::from_toml(&content).with_context(|| format!("failed to parse {path}"))
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(degrees) = args.max_turn_degrees {
        config.simulation = config.simulation.with_turning_angle_degrees(degrees);
    }
    if let Some(ticks) = args.ticks {
        config.max_ticks = ticks;
    }

    let max_ticks = config.max_ticks;
    let mut app = App::new(config)?.with_kill_every(args.kill_every);
    let summary = app.run(max_ticks);

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
