// heli_sim/src/simulation/testing/results.rs

use std::fmt;

use heli_core::control::PidSetup;

use crate::simulation::core::app_state::EndTrigger;
use crate::simulation::logging::{FlightLog, HelicopterLogSnapshot};
use crate::simulation::sensors::SensorSpecifications;

/// Running statistics of the scenario currently being flown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntermediaryTestResult {
    pub update_count: u64,
    pub acc_estimated_position_error: f64,
    pub max_estimated_position_error: f64,
    pub min_estimated_position_error: f64,
    pub acc_height_above_ground: f64,
    pub max_height_above_ground: f64,
    pub min_height_above_ground: f64,
    pub acc_velocity: f64,
    pub max_velocity: f64,
}

impl Default for IntermediaryTestResult {
    fn default() -> Self {
        Self {
            update_count: 0,
            acc_estimated_position_error: 0.0,
            max_estimated_position_error: 0.0,
            min_estimated_position_error: f64::MAX,
            acc_height_above_ground: 0.0,
            max_height_above_ground: 0.0,
            min_height_above_ground: f64::MAX,
            acc_velocity: 0.0,
            max_velocity: 0.0,
        }
    }
}

impl IntermediaryTestResult {
    /// Accumulates one logged tick.
    pub fn add(&mut self, snapshot: &HelicopterLogSnapshot) {
        let truth = &snapshot.true_state;
        let error = (snapshot.estimated_state.position - truth.position).norm();
        let height_above_ground = truth.position.y - snapshot.ground_altitude;
        let velocity = truth.velocity.norm();

        self.acc_estimated_position_error += error;
        self.max_estimated_position_error = self.max_estimated_position_error.max(error);
        self.min_estimated_position_error = self.min_estimated_position_error.min(error);
        self.acc_height_above_ground += height_above_ground;
        self.max_height_above_ground = self.max_height_above_ground.max(height_above_ground);
        self.min_height_above_ground = self.min_height_above_ground.min(height_above_ground);
        self.acc_velocity += velocity;
        self.max_velocity = self.max_velocity.max(velocity);
        self.update_count += 1;
    }

    fn average(&self, sum: f64) -> f64 {
        if self.update_count == 0 {
            0.0
        } else {
            sum / self.update_count as f64
        }
    }

    fn min_or_zero(&self, min: f64) -> f64 {
        if self.update_count == 0 {
            0.0
        } else {
            min
        }
    }

    pub fn finish(&self, run: ScenarioRun) -> ScenarioTestResult {
        ScenarioTestResult {
            scenario: run.scenario,
            end_trigger: run.end_trigger,
            duration: run.duration,
            sensors: run.sensors,
            autopilot: run.autopilot,
            flight_log: run.flight_log,
            max_estimated_position_error: self.max_estimated_position_error,
            avg_estimated_position_error: self.average(self.acc_estimated_position_error),
            min_estimated_position_error: self.min_or_zero(self.min_estimated_position_error),
            max_height_above_ground: self.max_height_above_ground,
            avg_height_above_ground: self.average(self.acc_height_above_ground),
            min_height_above_ground: self.min_or_zero(self.min_height_above_ground),
            max_velocity: self.max_velocity,
            avg_velocity: self.average(self.acc_velocity),
        }
    }
}

/// How a finished scenario was flown.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub scenario: String,
    pub end_trigger: EndTrigger,
    /// Seconds.
    pub duration: f64,
    pub sensors: SensorSpecifications,
    pub autopilot: AutopilotConfiguration,
    pub flight_log: FlightLog,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutopilotConfiguration {
    pub max_h_velocity: f64,
    pub pid_setup: PidSetup,
}

impl fmt::Display for AutopilotConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Max horizontal velocity: {} m/s", self.max_h_velocity)?;
        write!(f, "PID setup '{}': {}", self.pid_setup.name, self.pid_setup)
    }
}

/// Final statistics of one scenario at one velocity setting.
#[derive(Debug, Clone)]
pub struct ScenarioTestResult {
    pub scenario: String,
    pub end_trigger: EndTrigger,
    pub duration: f64,
    pub sensors: SensorSpecifications,
    pub autopilot: AutopilotConfiguration,
    pub flight_log: FlightLog,
    pub max_estimated_position_error: f64,
    pub avg_estimated_position_error: f64,
    pub min_estimated_position_error: f64,
    pub max_height_above_ground: f64,
    pub avg_height_above_ground: f64,
    pub min_height_above_ground: f64,
    /// m/s
    pub max_velocity: f64,
    pub avg_velocity: f64,
}

/// The report block: what was flown, then the statistics, then three blank lines.
impl fmt::Display for ScenarioTestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario: {}", self.scenario)?;
        writeln!(f, "Scenario ended by: {}", self.end_trigger)?;
        writeln!(f, "Duration: {:.1} s", self.duration)?;
        writeln!(f, "Sensors:\n{}", self.sensors)?;
        writeln!(f, "{}", self.autopilot)?;
        writeln!(f)?;
        writeln!(f, "MaxEstimatedPositionError: {:.2} m", self.max_estimated_position_error)?;
        writeln!(f, "AvgEstimatedPositionError: {:.2} m", self.avg_estimated_position_error)?;
        writeln!(f, "MinEstimatedPositionError: {:.2} m", self.min_estimated_position_error)?;
        writeln!(f)?;
        writeln!(f, "MaxHeightAboveGround: {:.2} m", self.max_height_above_ground)?;
        writeln!(f, "AvgHeightAboveGround: {:.2} m", self.avg_height_above_ground)?;
        writeln!(f, "MinHeightAboveGround: {:.2} m", self.min_height_above_ground)?;
        writeln!(f)?;
        writeln!(f, "MaxVelocity: {:.1} km/h", self.max_velocity * 3.6)?;
        writeln!(f, "AvgVelocity: {:.1} km/h", self.avg_velocity * 3.6)?;
        write!(f, "\n\n\n")
    }
}

impl ScenarioTestResult {
    pub fn flight_log_file_name(&self) -> String {
        format!(
            "flightlog_{}_{}mps.json",
            self.scenario, self.autopilot.max_h_velocity
        )
    }
}

/// Every result of a batch run, grouped by scenario name in the order the
/// scenarios were first flown.
#[derive(Debug, Clone, Default)]
pub struct TestResults {
    entries: Vec<(String, Vec<ScenarioTestResult>)>,
}

impl TestResults {
    pub fn record(&mut self, result: ScenarioTestResult) {
        match self.entries.iter_mut().find(|(name, _)| *name == result.scenario) {
            Some((_, results)) => results.push(result),
            None => self.entries.push((result.scenario.clone(), vec![result])),
        }
    }

    pub fn get(&self, scenario: &str) -> Option<&[ScenarioTestResult]> {
        self.entries
            .iter()
            .find(|(name, _)| name == scenario)
            .map(|(_, results)| results.as_slice())
    }

    pub fn scenario_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// All results, grouped by scenario.
    pub fn iter(&self) -> impl Iterator<Item = &ScenarioTestResult> {
        self.entries.iter().flat_map(|(_, results)| results.iter())
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, results)| results.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
