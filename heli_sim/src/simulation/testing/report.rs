// heli_sim/src/simulation/testing/report.rs

//! Writes the outcome of a batch run to disk: a plain text summary, one flight
//! log per result, the last flight and the configuration that produced them.

use std::fs;
use std::path::Path;

use tracing::{error, info};

use super::results::{ScenarioTestResult, TestResults};
use crate::simulation::config::{write_test_configuration, TestConfiguration};
use crate::simulation::logging::FlightLog;

pub const REPORT_FILE_NAME: &str = "test_results.txt";
pub const LAST_FLIGHT_FILE_NAME: &str = "flightpath.json";
pub const CONFIGURATION_FILE_NAME: &str = "test_configuration.toml";

/// The text block for one result.
pub fn format_result(r: &ScenarioTestResult) -> String {
    r.to_string()
}

pub fn format_report(results: &TestResults) -> String {
    results.iter().map(format_result).collect()
}

/// Writes everything into `dir`, creating it if needed. Existing files are
/// overwritten but never deleted. Failures are logged and the remaining files
/// are still written.
pub fn write_results(
    dir: &Path,
    results: &TestResults,
    last_flight: &FlightLog,
    config: &TestConfiguration,
) {
    if let Err(e) = fs::create_dir_all(dir) {
        error!("Failed to create results directory {:?}: {}", dir, e);
        return;
    }

    let report_path = dir.join(REPORT_FILE_NAME);
    match fs::write(&report_path, format_report(results)) {
        Ok(()) => info!("Wrote test results to {:?}", report_path),
        Err(e) => error!("Failed to write test results to {:?}: {}", report_path, e),
    }

    for result in results.iter() {
        let path = dir.join(result.flight_log_file_name());
        if let Err(e) = result.flight_log.to_json(&path) {
            error!("Failed to write flight log {:?}: {}", path, e);
        }
    }

    let path = dir.join(LAST_FLIGHT_FILE_NAME);
    if let Err(e) = last_flight.to_json(&path) {
        error!("Failed to write flight log {:?}: {}", path, e);
    }

    let path = dir.join(CONFIGURATION_FILE_NAME);
    if let Err(e) = write_test_configuration(config, &path) {
        error!("Failed to write configuration: {}", e);
    }
}
