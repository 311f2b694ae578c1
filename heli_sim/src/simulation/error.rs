// heli_sim/src/simulation/error.rs

use std::path::PathBuf;

use heli_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Failed to load configuration from {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("Unsupported sensor configuration: {0}")]
    UnsupportedSensors(&'static str),

    #[error("Invalid noise for {sensor}: standard deviation {std_dev}")]
    InvalidNoise { sensor: &'static str, std_dev: f64 },

    #[error("Scenario '{0}' was not found in the scenario catalog")]
    UnknownScenario(String),

    #[error("At least one max horizontal velocity must be configured")]
    EmptyVelocitySweep,

    #[error("No scenarios to run")]
    NoScenarios,

    #[error("Scenario '{0}' is player controlled but no input device is attached")]
    NoInputDevice(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {what}: {reason}")]
    Serialization { what: &'static str, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SimError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimError::Io {
            path: path.into(),
            source,
        }
    }
}
