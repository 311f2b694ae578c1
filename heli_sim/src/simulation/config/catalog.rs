// heli_sim/src/simulation/config/catalog.rs

//! The scenario catalog: every `.toml` file below the scenario directory
//! describes one scenario.

use std::collections::HashMap;
use std::path::Path;

use figment::{
    providers::{Format, Toml},
    Figment,
};
use tracing::{error, info, warn};
use walkdir::WalkDir;

use super::structs::ScenarioConfig;
use crate::simulation::error::SimError;

/// All scenarios found on disk, keyed by their `name`.
#[derive(Default, Debug, Clone)]
pub struct ScenarioCatalog(pub HashMap<String, ScenarioConfig>);

impl ScenarioCatalog {
    /// Walks `dir` and parses every `.toml` file into a scenario. Files that fail
    /// to parse are logged and skipped.
    pub fn load_from_dir(dir: &Path) -> Self {
        let mut catalog = Self::default();
        if !dir.exists() {
            warn!(
                "Scenario directory not found at {:?}, no scenarios will be loaded.",
                dir
            );
            return catalog;
        }

        info!("Loading scenario catalog from: {:?}", dir);

        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                !e.file_type().is_dir() && e.path().extension().is_some_and(|ext| ext == "toml")
            })
        {
            let path = entry.path();
            match Figment::new().merge(Toml::file(path)).extract::<ScenarioConfig>() {
                Ok(scenario) => {
                    info!("Loaded scenario: '{}'", scenario.name);
                    if let Some(previous) = catalog.insert(scenario) {
                        warn!(
                            "Scenario '{}' from {:?} replaces an earlier definition.",
                            previous.name, path
                        );
                    }
                }
                Err(e) => {
                    error!("Failed to load scenario from {:?}: {}", path, e);
                }
            }
        }
        catalog
    }

    /// Adds a scenario, returning any previous scenario with the same name.
    pub fn insert(&mut self, scenario: ScenarioConfig) -> Option<ScenarioConfig> {
        self.0.insert(scenario.name.clone(), scenario)
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioConfig> {
        self.0.get(name)
    }

    /// Looks up `names` in order. An empty list selects every scenario, sorted
    /// by name, leaving out player-controlled ones unless
    /// `include_player_controlled` is set.
    pub fn resolve(
        &self,
        names: &[String],
        include_player_controlled: bool,
    ) -> Result<Vec<ScenarioConfig>, SimError> {
        let scenarios = if names.is_empty() {
            let mut all: Vec<_> = self
                .0
                .values()
                .filter(|s| {
                    let keep = include_player_controlled || !s.player_controlled;
                    if !keep {
                        info!("Skipping player-controlled scenario '{}'.", s.name);
                    }
                    keep
                })
                .cloned()
                .collect();
            all.sort_by(|a, b| a.name.cmp(&b.name));
            all
        } else {
            names
                .iter()
                .map(|name| {
                    self.get(name)
                        .cloned()
                        .ok_or_else(|| SimError::UnknownScenario(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        if scenarios.is_empty() {
            return Err(SimError::NoScenarios);
        }
        Ok(scenarios)
    }
}
