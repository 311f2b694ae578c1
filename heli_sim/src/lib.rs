// heli_sim/src/lib.rs

use std::path::Path;

use tracing::info;

use crate::simulation::config::{load_test_configuration, ScenarioCatalog, TestConfiguration};
use crate::simulation::error::SimError;
use crate::simulation::input::InputSource;
use crate::simulation::testing::{ScenarioRunner, TestResults};

// This prelude is for convenience for other files WITHIN the heli_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;

/// Selects the configured scenarios from the catalog and sets up a runner for
/// them. Without an input device, an empty selection leaves out player-controlled
/// scenarios.
pub fn build_runner(
    config: TestConfiguration,
    input: &dyn InputSource,
) -> Result<ScenarioRunner, SimError> {
    let catalog = ScenarioCatalog::load_from_dir(&config.scenario_dir);
    let scenarios = catalog.resolve(&config.scenarios, input.is_attached())?;
    info!(
        "Selected scenarios: {:?}",
        scenarios.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
    );
    ScenarioRunner::new(config, scenarios, input)
}

/// Loads the configuration at `config_path`, lets `customize` override it, then
/// flies every selected scenario and writes the results into `output_dir`.
pub fn run_batch(
    config_path: &Path,
    output_dir: &Path,
    customize: impl FnOnce(&mut TestConfiguration),
    input: &mut dyn InputSource,
) -> Result<TestResults, SimError> {
    let mut config = load_test_configuration(config_path)?;
    customize(&mut config);

    let mut runner = build_runner(config, &*input)?.with_output_dir(output_dir);
    Ok(runner.run(input).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::input::NoInput;

    #[test]
    fn bundled_configuration_runs_headless() {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        let mut config = load_test_configuration(&assets.join("test_configuration.toml")).unwrap();
        config.scenario_dir = assets.join("scenarios");

        let runner = build_runner(config, &NoInput).unwrap();
        assert!(runner.is_test_mode());
        let names: Vec<_> = runner.scenarios().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Hill climb", "Square with hover", "Straight line"]);
    }
}
