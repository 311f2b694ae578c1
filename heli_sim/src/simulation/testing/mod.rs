// heli_sim/src/simulation/testing/mod.rs

pub mod report;
pub mod results;
pub mod runner;

pub use report::{format_report, write_results};
pub use results::{
    AutopilotConfiguration, IntermediaryTestResult, ScenarioRun, ScenarioTestResult, TestResults,
};
pub use runner::ScenarioRunner;
