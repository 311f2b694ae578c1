// heli_sim/src/simulation/config/mod.rs

//! This module handles loading the test configuration and the scenario catalog
//! from disk, and writing the resolved configuration back out.

mod catalog;

pub mod structs;

use std::fs;
use std::path::Path;

use figment::{
    providers::{Format, Toml},
    Figment,
};
use tracing::{info, warn};

use crate::simulation::error::SimError;
pub use catalog::ScenarioCatalog;
pub use structs::{
    EstimatorKind, PidSetupConfig, ScenarioConfig, TaskConfig, TerrainConfig, TestConfiguration,
    WaypointConfig,
};

/// Loads a test configuration. A missing file yields the defaults.
pub fn load_test_configuration(path: &Path) -> Result<TestConfiguration, SimError> {
    if !path.exists() {
        warn!(
            "Test configuration not found at {:?}, using defaults.",
            path
        );
    } else {
        info!("Loading test configuration from: {:?}", path);
    }

    Figment::new()
        .merge(Toml::file(path))
        .extract()
        .map_err(|e| SimError::Config {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
}

/// Writes `config` as TOML to `path`, next to the results it produced.
pub fn write_test_configuration(config: &TestConfiguration, path: &Path) -> Result<(), SimError> {
    let text = toml::to_string_pretty(config).map_err(|e| SimError::Serialization {
        what: "test configuration",
        reason: e.to_string(),
    })?;
    fs::write(path, text).map_err(|e| SimError::io(path, e))
}
