// heli_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Heli: a headless helicopter flight simulator and autopilot test bench.
///
/// Flies the configured scenarios at each max horizontal velocity and writes a
/// report with flight logs to the output directory.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the test configuration TOML file.
    #[arg(short, long, default_value = "assets/test_configuration.toml")]
    pub config: PathBuf,

    /// Directory the results are written to.
    #[arg(short, long, default_value = "Test Results")]
    pub output: PathBuf,

    /// Overrides the random seed of the configuration.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overrides the directory scenarios are loaded from.
    #[arg(long)]
    pub scenario_dir: Option<PathBuf>,

    /// Only fly these scenarios, in this order.
    #[arg(short, long = "scenario")]
    pub scenarios: Vec<String>,
}
