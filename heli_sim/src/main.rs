// heli_sim/src/main.rs

use anyhow::Context;
use clap::Parser;
use heli_sim::cli::Cli;
use heli_sim::prelude::NoInput;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // RUST_LOG wins over this default.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,heli_sim=debug,heli_core=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    info!("Starting Heli simulation with {:?}", cli.config);

    let results = heli_sim::run_batch(
        &cli.config,
        &cli.output,
        |config| {
            if let Some(seed) = cli.seed {
                config.seed = seed;
            }
            if let Some(dir) = &cli.scenario_dir {
                config.scenario_dir = dir.clone();
            }
            if !cli.scenarios.is_empty() {
                config.scenarios = cli.scenarios.clone();
            }
        },
        &mut NoInput,
    )
    .with_context(|| format!("batch run with configuration {:?} failed", cli.config))?;

    for result in results.iter() {
        info!(
            "{} at {} m/s: {} after {:.1} s",
            result.scenario, result.autopilot.max_h_velocity, result.end_trigger, result.duration
        );
    }
    info!("Results written to {:?}", cli.output);
    Ok(())
}
