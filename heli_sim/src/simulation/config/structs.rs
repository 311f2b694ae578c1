// heli_sim/src/simulation/config/structs.rs

use std::path::PathBuf;

use heli_core::control::{Pid, PidGains, PidSetup};
use heli_core::error::CoreError;
use heli_core::navigation::{NavigationMap, Task, Waypoint, WaypointKind};
use heli_core::physics::HeliParameters;
use heli_core::utils::serde_helpers::vec3_array;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::simulation::sensors::specs::SensorSpecifications;

// =========================================================================
// == Test Configuration ==
// =========================================================================

fn default_true() -> bool {
    true
}

fn default_max_h_velocities() -> Vec<f64> {
    vec![10.0]
}

fn default_scenario_dir() -> PathBuf {
    "assets/scenarios".into()
}

fn default_tick_seconds() -> f64 {
    1.0 / 60.0
}

fn default_fallback_timeout_seconds() -> f64 {
    120.0
}

/// # TestConfiguration
/// The root of a test configuration TOML file: which sensors are trusted, how the
/// autopilot is tuned and which scenarios are flown at which speeds.
///
/// Scalar fields come before nested tables so the struct writes back as valid TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfiguration {
    /// The autopilot flies on the estimated state instead of the true state.
    #[serde(default = "default_true")]
    pub fly_by_sensors: bool,
    /// Disables every noise source.
    #[serde(default)]
    pub use_perfect_sensors: bool,
    #[serde(default = "default_true")]
    pub use_gps: bool,
    #[serde(default = "default_true")]
    pub use_ins: bool,
    /// Replace the estimated height above ground with the range finder reading
    /// whenever it has one.
    #[serde(default = "default_true")]
    pub use_range_finder: bool,
    #[serde(default)]
    pub estimator: EstimatorKind,
    /// Look up the estimated ground altitude below the estimated position instead
    /// of below the true position.
    #[serde(default)]
    pub estimated_ground_from_estimate: bool,
    /// Let the physics engine report terrain collisions.
    #[serde(default)]
    pub terrain_collision: bool,
    /// Optional seed for the pseudo-random number generator.
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,
    /// Used for scenarios without a timeout of their own. Zero disables it.
    #[serde(default = "default_fallback_timeout_seconds")]
    pub fallback_timeout_seconds: f64,
    #[serde(default = "default_scenario_dir")]
    pub scenario_dir: PathBuf,
    /// Flown in order. A crash retries the scenario at the next, slower velocity.
    #[serde(default = "default_max_h_velocities")]
    pub max_h_velocities: Vec<f64>,
    /// Scenario names to fly, in order. Empty means every scenario in the catalog.
    #[serde(default)]
    pub scenarios: Vec<String>,
    #[serde(default)]
    pub sensors: SensorSpecifications,
    #[serde(default)]
    pub autopilot: PidSetupConfig,
    #[serde(default)]
    pub physics: HeliParameters,
}

impl Default for TestConfiguration {
    fn default() -> Self {
        Self {
            fly_by_sensors: true,
            use_perfect_sensors: false,
            use_gps: true,
            use_ins: true,
            use_range_finder: true,
            estimator: EstimatorKind::default(),
            estimated_ground_from_estimate: false,
            terrain_collision: false,
            seed: 0,
            tick_seconds: default_tick_seconds(),
            fallback_timeout_seconds: default_fallback_timeout_seconds(),
            scenario_dir: default_scenario_dir(),
            max_h_velocities: default_max_h_velocities(),
            scenarios: Vec::new(),
            sensors: SensorSpecifications::default(),
            autopilot: PidSetupConfig::default(),
            physics: HeliParameters::default(),
        }
    }
}

/// Which state estimator feeds the autopilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EstimatorKind {
    /// GPS/INS Kalman filter over the simulated sensors.
    #[default]
    Kalman,
    /// Ground truth, no sensors involved.
    Perfect,
}

/// Controller gains of the autopilot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PidSetupConfig {
    pub name: String,
    pub pitch_angle: PidGains,
    pub roll_angle: PidGains,
    pub yaw_angle: PidGains,
    pub throttle: PidGains,
    pub forwards_accel: PidGains,
    pub rightwards_accel: PidGains,
}

impl Default for PidSetupConfig {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            // No derivative on attitude: at the rotation rate limit it flips the
            // output between the extremes every tick.
            pitch_angle: PidGains::new(10.0, 0.0, 0.0),
            roll_angle: PidGains::new(10.0, 0.0, 0.0),
            yaw_angle: PidGains::new(30.0, 0.0, 0.0),
            throttle: PidGains::new(-10.0, -20.0, -5.0),
            forwards_accel: PidGains::new(0.0, 0.0, -10.0),
            rightwards_accel: PidGains::new(0.0, 0.0, -10.0),
        }
    }
}

impl PidSetupConfig {
    pub fn build(&self) -> PidSetup {
        PidSetup {
            name: self.name.clone(),
            pitch_angle: Pid::new("Pitch", self.pitch_angle),
            roll_angle: Pid::new("Roll", self.roll_angle),
            yaw_angle: Pid::new("Yaw", self.yaw_angle),
            throttle: Pid::new("Throttle", self.throttle),
            forwards_accel: Pid::new("ForwardsAccel", self.forwards_accel),
            rightwards_accel: Pid::new("RightwardsAccel", self.rightwards_accel),
        }
    }
}

// =========================================================================
// == Scenarios ==
// =========================================================================

fn default_hold_height_above_ground() -> f64 {
    -1.0
}

fn default_waypoint_radius() -> f64 {
    5.0
}

/// One flight to test, loaded from its own TOML file in the scenario directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(with = "vec3_array")]
    pub start_position: Vector3<f64>,
    /// Zero means no timeout of its own.
    #[serde(default)]
    pub timeout_seconds: f64,
    #[serde(default)]
    pub assisted_autopilot: bool,
    #[serde(default)]
    pub player_controlled: bool,
    #[serde(default)]
    pub terrain: TerrainConfig,
    pub task: TaskConfig,
}

impl ScenarioConfig {
    pub fn build_task(&self) -> Result<Task, CoreError> {
        self.task.build()
    }

    pub fn build_map(&self) -> Result<NavigationMap, CoreError> {
        self.terrain.build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Metres above ground to hold. Non-positive follows the waypoint altitudes.
    #[serde(default = "default_hold_height_above_ground")]
    pub hold_height_above_ground: f64,
    #[serde(default)]
    pub looping: bool,
    #[serde(default = "default_waypoint_radius")]
    pub default_waypoint_radius: f64,
    pub waypoints: Vec<WaypointConfig>,
}

impl TaskConfig {
    pub fn build(&self) -> Result<Task, CoreError> {
        let waypoints = self
            .waypoints
            .iter()
            .map(|w| w.build(self.default_waypoint_radius))
            .collect();
        Task::new(waypoints, self.hold_height_above_ground, self.looping)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaypointConfig {
    #[serde(with = "vec3_array")]
    pub position: Vector3<f64>,
    #[serde(default)]
    pub heading_degrees: f64,
    #[serde(default)]
    pub kind: WaypointKind,
    pub radius: Option<f64>,
    pub seconds_to_wait: Option<f64>,
}

impl WaypointConfig {
    fn build(&self, default_radius: f64) -> Waypoint {
        let mut waypoint = Waypoint::new(
            self.position,
            self.heading_degrees.to_radians(),
            self.kind,
            self.radius.unwrap_or(default_radius),
        );
        if let Some(seconds) = self.seconds_to_wait {
            waypoint.seconds_to_wait = seconds;
        }
        waypoint
    }
}

/// The ground below the scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "PascalCase")]
pub enum TerrainConfig {
    Flat { altitude: f64 },
    /// Rows run along -Z, columns along +X, one metre apart.
    Heightmap { heights: Vec<Vec<f64>> },
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig::Flat { altitude: 0.0 }
    }
}

impl TerrainConfig {
    pub fn build(&self) -> Result<NavigationMap, CoreError> {
        match self {
            TerrainConfig::Flat { altitude } => Ok(NavigationMap::flat(*altitude)),
            TerrainConfig::Heightmap { heights } => NavigationMap::new(heights),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use heli_core::navigation::TerrainMap;
    use nalgebra::Vector2;

    const SCENARIO: &str = r#"
        name = "Hover test"
        start_position = [0.0, 5.0, 0.0]
        timeout_seconds = 30.0

        [terrain]
        kind = "Heightmap"
        heights = [[0.0, 2.0], [0.0, 2.0]]

        [task]
        default_waypoint_radius = 3.0

        [[task.waypoints]]
        position = [0.0, 5.0, -20.0]
        heading_degrees = 90.0
        kind = "Hover"

        [[task.waypoints]]
        position = [10.0, 5.0, -20.0]
        kind = "TestDestination"
        radius = 1.0
    "#;

    #[test]
    fn scenario_builds_task_and_map() {
        let scenario: ScenarioConfig = toml::from_str(SCENARIO).unwrap();
        assert_eq!(scenario.name, "Hover test");
        assert!(!scenario.player_controlled);

        let task = scenario.build_task().unwrap();
        let first = task.current().unwrap();
        assert_eq!(first.kind, WaypointKind::Hover);
        assert_eq!(first.radius, 3.0);
        assert_eq!(first.seconds_to_wait, 2.0);
        assert_abs_diff_eq!(first.heading_angle, std::f64::consts::FRAC_PI_2);
        assert_eq!(task.all_waypoints()[1].radius, 1.0);
        assert!(!task.holds_height_above_ground());

        let map = scenario.build_map().unwrap();
        assert_abs_diff_eq!(map.altitude(&Vector2::new(0.5, 0.0)), 1.0);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<TestConfiguration, _> = toml::from_str("use_gsp = false");
        assert!(result.is_err());
    }

    #[test]
    fn configuration_survives_toml_round_trip() {
        let mut config = TestConfiguration::default();
        config.max_h_velocities = vec![10.0, 7.0, 5.0];
        config.scenarios = vec!["A".to_string()];
        let text = toml::to_string(&config).unwrap();
        let back: TestConfiguration = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn pid_setup_displays_configured_gains() {
        let setup = PidSetupConfig::default().build();
        assert_eq!(
            setup.to_string(),
            "Pitch(10, 0, 0) Roll(10, 0, 0) Yaw(30, 0, 0) Throttle(-10, -20, -5)"
        );
    }
}
