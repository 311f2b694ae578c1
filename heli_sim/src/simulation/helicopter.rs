// heli_sim/src/simulation/helicopter.rs

//! One simulated helicopter: physics, sensors, state estimation and autopilot
//! advanced together one tick at a time.

use std::sync::Arc;

use heli_core::control::{Autopilot, HeliState};
use heli_core::estimation::{
    EstimatedStates, EstimatorInput, PerfectState, SensorEstimatedState, StateEstimator,
};
use heli_core::messages::SensorReadings;
use heli_core::navigation::{TerrainMap, Waypoint, WaypointKind};
use heli_core::physics::{HeliPhysics, PhysicsEngine};
use heli_core::types::{ControlGoal, JoystickOutput, PhysicalState};
use tracing::{debug, info, warn};

use crate::simulation::config::{EstimatorKind, ScenarioConfig, TestConfiguration};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::debugging::StateError;
use crate::simulation::error::SimError;
use crate::simulation::input::{shape_manual_input, RawSticks};
use crate::simulation::logging::{FlightLog, HelicopterLogSnapshot};
use crate::simulation::sensors::SensorModel;

/// Below this height above ground the helicopter counts as crashed.
pub const CRASH_HEIGHT_ABOVE_GROUND: f64 = 0.1;

const START_WAYPOINT_RADIUS: f64 = 5.0;

/// Crash detection for when the physics engine does not report collisions.
pub fn is_collided_with_terrain(height_above_ground: f64) -> bool {
    height_above_ground < CRASH_HEIGHT_ABOVE_GROUND
}

/// What the user asks for this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlRequest {
    /// Shaped stick input, if a device is attached.
    pub manual: Option<JoystickOutput>,
    /// The hover override key is held.
    pub hover: bool,
}

/// The outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// The output fed to physics, yaw already inverted.
    pub output: JoystickOutput,
    pub goal: ControlGoal,
    pub true_height_above_ground: f64,
    pub estimated_height_above_ground: f64,
    pub estimation_error: StateError,
    pub crashed: bool,
}

/// Rejects sensor combinations the estimation pipeline cannot fly with.
pub fn validate_sensor_configuration(config: &TestConfiguration) -> Result<(), SimError> {
    if !config.use_gps {
        return Err(SimError::UnsupportedSensors("flying without GPS is not implemented"));
    }
    if !config.use_ins {
        return Err(SimError::UnsupportedSensors("flying without INS is not implemented"));
    }
    Ok(())
}

pub struct HelicopterSim {
    config: TestConfiguration,
    scenario: ScenarioConfig,
    is_test_mode: bool,
    max_h_velocity: f64,
    map: Arc<dyn TerrainMap>,
    physics: HeliPhysics,
    sensors: SensorModel,
    estimator: Box<dyn StateEstimator>,
    autopilot: Autopilot,
    rng: SimulationRng,
    physical_state: PhysicalState,
    estimated: EstimatedStates,
    true_state: HeliState,
    estimated_state: HeliState,
    last_waypoint: Waypoint,
    control_goal: ControlGoal,
    log: FlightLog,
}

impl HelicopterSim {
    pub fn new(
        config: &TestConfiguration,
        scenario: &ScenarioConfig,
        max_h_velocity: f64,
        is_test_mode: bool,
    ) -> Result<Self, SimError> {
        validate_sensor_configuration(config)?;
        info!(
            "Sensors: GPS {}, INS {}, range finder {}, perfect {}, estimator {:?}",
            config.use_gps,
            config.use_ins,
            config.use_range_finder,
            config.use_perfect_sensors,
            config.estimator
        );
        Self::assemble(config.clone(), scenario.clone(), max_h_velocity, is_test_mode, 0.0)
    }

    /// Starts `scenario` over from its start position with fresh physics, sensors,
    /// estimator and autopilot, and the random generator re-seeded.
    pub fn reset(&mut self, scenario: &ScenarioConfig, start_time: f64) -> Result<(), SimError> {
        info!(
            "Resetting helicopter for scenario '{}' at {:.1} m/s.",
            scenario.name, self.max_h_velocity
        );
        *self = Self::assemble(
            self.config.clone(),
            scenario.clone(),
            self.max_h_velocity,
            self.is_test_mode,
            start_time,
        )?;
        Ok(())
    }

    fn assemble(
        config: TestConfiguration,
        scenario: ScenarioConfig,
        max_h_velocity: f64,
        is_test_mode: bool,
        start_time: f64,
    ) -> Result<Self, SimError> {
        let map: Arc<dyn TerrainMap> = Arc::new(scenario.build_map()?);
        let task = scenario.build_task()?;

        let mut start_position = scenario.start_position;
        if task.holds_height_above_ground() {
            start_position.y = map.ground_altitude(&start_position) + task.hold_height_above_ground;
        }
        let start = PhysicalState::at_rest(start_position);

        let mut physics = HeliPhysics::new(config.physics.clone())?;
        if config.terrain_collision {
            physics = physics.with_terrain(map.clone());
        }
        let sensors = SensorModel::new(
            &config.sensors,
            config.use_perfect_sensors,
            &config.physics,
            map.clone(),
            &start,
        )?;
        let estimator: Box<dyn StateEstimator> = match config.estimator {
            EstimatorKind::Kalman => {
                Box::new(SensorEstimatedState::new(start, config.sensors.filter_noise()))
            }
            EstimatorKind::Perfect => Box::new(PerfectState::new()),
        };

        let mut autopilot = Autopilot::new(task, config.autopilot.build(), map.clone());
        autopilot.is_test_mode = is_test_mode;
        autopilot.max_h_velocity = max_h_velocity;

        let start_waypoint = Waypoint::new(
            start_position,
            0.0,
            WaypointKind::Intermediate,
            START_WAYPOINT_RADIUS,
        );
        let true_state = HeliState::from_physical(
            &start,
            map.height_above_ground(&start_position),
            &start_waypoint,
            JoystickOutput::default(),
        );
        let log = FlightLog::new(autopilot.task().all_waypoints().to_vec());

        debug!(start_time, "helicopter placed at {:?}", start_position);

        Ok(Self {
            rng: SimulationRng::from_seed(config.seed),
            config,
            scenario,
            is_test_mode,
            max_h_velocity,
            map,
            physics,
            sensors,
            estimator,
            autopilot,
            physical_state: start,
            estimated: EstimatedStates {
                estimated: start,
                ..Default::default()
            },
            estimated_state: true_state.clone(),
            true_state,
            last_waypoint: start_waypoint,
            control_goal: ControlGoal::default(),
            log,
        })
    }

    /// Advances the simulation by `dt` seconds, ending at `total_time`.
    pub fn step(&mut self, request: &ControlRequest, dt: f64, total_time: f64) -> TickReport {
        let (mut output, goal) = self.resolve_control(request, dt, total_time);
        self.control_goal = goal;

        // Positive yaw turns clockwise seen from above.
        output.yaw = -output.yaw;

        let step = self
            .physics
            .perform_timestep(&self.physical_state, &output, dt, total_time);
        let readings = *self.sensors.update(&step, &output, &mut self.rng);
        self.estimator.process(&EstimatorInput {
            step: &step,
            readings: &readings,
            output: &output,
            dt,
            total_time,
        });

        // The acceleration held during the step, not the one after it.
        let mut true_physical = step.result;
        true_physical.acceleration = step.start.acceleration;

        let mut estimated = self.estimator.get_state().unwrap_or(EstimatedStates {
            estimated: true_physical,
            observed: true_physical,
            blind: true_physical,
        });

        let true_ground = self.map.ground_altitude(&true_physical.position);
        let estimated_ground = if self.config.estimated_ground_from_estimate {
            self.map.ground_altitude(&estimated.estimated.position)
        } else {
            true_ground
        };
        let true_height_above_ground = true_physical.position.y - true_ground;
        // The range finder replaces the fused altitude. Without a reading the
        // fused altitude stands as is.
        let estimated_height_above_ground = match readings.range_finder() {
            Some(height) if self.config.use_range_finder => {
                estimated.estimated.position.y = height + estimated_ground;
                height
            }
            _ => self.map.height_above_ground(&estimated.estimated.position),
        };

        if let Some(waypoint) = self.autopilot.current_waypoint() {
            self.last_waypoint = waypoint.clone();
        }
        self.physical_state = true_physical;
        self.estimated = estimated;
        self.true_state = HeliState::from_physical(
            &true_physical,
            true_height_above_ground,
            &self.last_waypoint,
            output,
        );
        self.estimated_state = HeliState::from_physical(
            &estimated.estimated,
            estimated_height_above_ground,
            &self.last_waypoint,
            output,
        );

        let estimation_error = StateError::between(&true_physical, &estimated.estimated);
        estimation_error.log(total_time);

        self.log.push(HelicopterLogSnapshot {
            true_state: true_physical,
            observed_state: estimated.observed,
            estimated_state: estimated.estimated,
            blind_estimated_state: estimated.blind,
            accelerometer: readings.imu.acceleration_local,
            ground_altitude: true_ground,
            time: total_time,
        });

        let crashed = step.collided
            || is_collided_with_terrain(true_height_above_ground)
            || !output.is_finite();
        if crashed {
            warn!(
                "Helicopter crashed at {:.2}s: height above ground {:.3} m, collided {}, output {:?}",
                total_time, true_height_above_ground, step.collided, output
            );
        }

        TickReport {
            output,
            goal,
            true_height_above_ground,
            estimated_height_above_ground,
            estimation_error,
            crashed,
        }
    }

    /// User stick, hover override, assisted autopilot or full autopilot, in that
    /// order of precedence.
    fn resolve_control(
        &mut self,
        request: &ControlRequest,
        dt: f64,
        total_time: f64,
    ) -> (JoystickOutput, ControlGoal) {
        let manual = request
            .manual
            .unwrap_or_else(|| shape_manual_input(&RawSticks::default()));
        if self.scenario.player_controlled {
            return (manual, ControlGoal::default());
        }

        if self.is_test_mode {
            let position = self.physical_state.position;
            self.autopilot.is_true_position_within_radius = self
                .autopilot
                .current_waypoint()
                .is_some_and(|waypoint| waypoint.is_within_radius(&position));
        }

        let state = if self.config.fly_by_sensors {
            &self.estimated_state
        } else {
            &self.true_state
        };

        if request.hover {
            self.autopilot.get_hover_output(state, total_time)
        } else if self.scenario.assisted_autopilot {
            self.autopilot.get_assisted_output(&manual, state, dt, total_time)
        } else {
            self.autopilot.get_output(state, dt, total_time)
        }
    }

    pub fn set_max_h_velocity(&mut self, max_h_velocity: f64) {
        self.max_h_velocity = max_h_velocity;
        self.autopilot.max_h_velocity = max_h_velocity;
    }

    pub fn max_h_velocity(&self) -> f64 {
        self.max_h_velocity
    }

    pub fn scenario(&self) -> &ScenarioConfig {
        &self.scenario
    }

    pub fn config(&self) -> &TestConfiguration {
        &self.config
    }

    /// Ground truth as the renderer would draw it.
    pub fn physical_state(&self) -> &PhysicalState {
        &self.physical_state
    }

    pub fn true_state(&self) -> &HeliState {
        &self.true_state
    }

    pub fn estimated_state(&self) -> &HeliState {
        &self.estimated_state
    }

    pub fn estimated_states(&self) -> &EstimatedStates {
        &self.estimated
    }

    /// The estimator's own output, before the range finder override. `None`
    /// until the estimator is ready.
    pub fn fused_states(&self) -> Option<EstimatedStates> {
        self.estimator.get_state()
    }

    pub fn sensor_readings(&self) -> &SensorReadings {
        self.sensors.readings()
    }

    pub fn control_goal(&self) -> &ControlGoal {
        &self.control_goal
    }

    pub fn autopilot(&self) -> &Autopilot {
        &self.autopilot
    }

    pub fn is_at_destination(&self) -> bool {
        self.autopilot.is_at_destination
    }

    pub fn log(&self) -> &FlightLog {
        &self.log
    }

    pub fn terrain(&self) -> &Arc<dyn TerrainMap> {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::{TaskConfig, TerrainConfig, WaypointConfig};
    use heli_core::navigation::TerrainMap;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    const DT: f64 = 1.0 / 60.0;

    fn scenario(start_y: f64, waypoint: Vector3<f64>, kind: WaypointKind) -> ScenarioConfig {
        ScenarioConfig {
            name: "Test".to_string(),
            start_position: Vector3::new(0.0, start_y, 0.0),
            timeout_seconds: 0.0,
            assisted_autopilot: false,
            player_controlled: false,
            terrain: TerrainConfig::Flat { altitude: 0.0 },
            task: TaskConfig {
                hold_height_above_ground: -1.0,
                looping: false,
                default_waypoint_radius: 5.0,
                waypoints: vec![WaypointConfig {
                    position: waypoint,
                    heading_degrees: 0.0,
                    kind,
                    radius: None,
                    seconds_to_wait: None,
                }],
            },
        }
    }

    fn run(sim: &mut HelicopterSim, ticks: usize, request: ControlRequest) -> Vec<TickReport> {
        (1..=ticks)
            .map(|i| sim.step(&request, DT, i as f64 * DT))
            .collect()
    }

    #[test]
    fn missing_gps_or_ins_fails_fast() {
        let s = scenario(10.0, Vector3::new(0.0, 10.0, -50.0), WaypointKind::TestDestination);
        let mut config = TestConfiguration {
            use_gps: false,
            ..Default::default()
        };
        assert!(matches!(
            HelicopterSim::new(&config, &s, 10.0, true),
            Err(SimError::UnsupportedSensors(_))
        ));
        config.use_gps = true;
        config.use_ins = false;
        assert!(matches!(
            HelicopterSim::new(&config, &s, 10.0, true),
            Err(SimError::UnsupportedSensors(_))
        ));
    }

    #[test]
    fn crash_threshold_is_exclusive() {
        assert!(!is_collided_with_terrain(0.1));
        assert!(is_collided_with_terrain(0.099));
        assert!(is_collided_with_terrain(-1.0));
    }

    #[test]
    fn range_finder_replaces_estimated_altitude() {
        let s = scenario(5.0, Vector3::new(0.0, 5.0, -50.0), WaypointKind::TestDestination);
        let config = TestConfiguration::default();
        let mut sim = HelicopterSim::new(&config, &s, 10.0, true).unwrap();

        for report in run(&mut sim, 30, ControlRequest::default()) {
            assert!(!report.crashed);
            let height = sim.sensor_readings().range_finder().unwrap();
            assert_eq!(report.estimated_height_above_ground, height);
        }
        let height = sim.sensor_readings().range_finder().unwrap();
        assert_eq!(sim.estimated_states().estimated.position.y, height + 0.0);
        assert_eq!(sim.log().last().unwrap().estimated_state.position.y, height);
    }

    #[test]
    fn out_of_range_finder_falls_back_to_fused_altitude() {
        let s = scenario(50.0, Vector3::new(0.0, 50.0, -50.0), WaypointKind::TestDestination);
        let config = TestConfiguration {
            estimator: EstimatorKind::Perfect,
            ..Default::default()
        };
        let mut sim = HelicopterSim::new(&config, &s, 10.0, true).unwrap();
        let report = sim.step(&ControlRequest::default(), DT, DT);

        assert!(sim.sensor_readings().range_finder_height.is_nan());
        assert!(report.estimated_height_above_ground.is_finite());
        assert_eq!(
            sim.estimated_states().estimated.position.y,
            sim.physical_state().position.y
        );
    }

    #[test]
    fn range_finder_can_be_disabled() {
        let s = scenario(5.0, Vector3::new(0.0, 5.0, -50.0), WaypointKind::TestDestination);
        let config = TestConfiguration {
            estimator: EstimatorKind::Perfect,
            use_range_finder: false,
            ..Default::default()
        };
        let mut sim = HelicopterSim::new(&config, &s, 10.0, true).unwrap();
        let report = sim.step(&ControlRequest::default(), DT, DT);
        assert_eq!(report.estimated_height_above_ground, report.true_height_above_ground);
    }

    #[test]
    fn reset_replays_the_same_flight() {
        let s = scenario(10.0, Vector3::new(20.0, 12.0, -40.0), WaypointKind::TestDestination);
        let config = TestConfiguration {
            seed: 1234,
            ..Default::default()
        };
        let mut sim = HelicopterSim::new(&config, &s, 10.0, true).unwrap();
        run(&mut sim, 90, ControlRequest::default());
        let first = sim.log().clone();

        sim.reset(&s, 0.0).unwrap();
        assert!(sim.log().is_empty());
        run(&mut sim, 90, ControlRequest::default());

        assert_eq!(sim.log().samples[0].true_state, first.samples[0].true_state);
        assert_eq!(sim.log(), &first);
    }

    #[test]
    fn hold_height_lifts_the_start_position() {
        let mut s = scenario(0.0, Vector3::new(0.0, 0.0, -50.0), WaypointKind::TestDestination);
        s.terrain = TerrainConfig::Flat { altitude: 3.0 };
        s.task.hold_height_above_ground = 4.0;
        let sim = HelicopterSim::new(&TestConfiguration::default(), &s, 10.0, true).unwrap();
        assert_abs_diff_eq!(sim.physical_state().position.y, 7.0);
        assert_abs_diff_eq!(sim.true_state().height_above_ground, 4.0);
    }

    #[test]
    fn falling_without_throttle_crashes() {
        let mut s = scenario(0.5, Vector3::new(0.0, 0.5, -50.0), WaypointKind::TestDestination);
        s.player_controlled = true;
        let mut sim = HelicopterSim::new(&TestConfiguration::default(), &s, 10.0, false).unwrap();
        let request = ControlRequest {
            manual: Some(JoystickOutput::default()),
            hover: false,
        };
        let reports = run(&mut sim, 60, request);
        assert!(!reports[0].crashed);
        assert!(reports.iter().any(|r| r.crashed));
    }

    #[test]
    fn non_finite_output_is_a_crash() {
        let mut s = scenario(20.0, Vector3::new(0.0, 20.0, -50.0), WaypointKind::TestDestination);
        s.player_controlled = true;
        let mut sim = HelicopterSim::new(&TestConfiguration::default(), &s, 10.0, false).unwrap();
        let request = ControlRequest {
            manual: Some(JoystickOutput {
                pitch: f64::NAN,
                throttle: 0.6,
                ..Default::default()
            }),
            hover: false,
        };
        assert!(sim.step(&request, DT, DT).crashed);
    }

    #[test]
    fn manual_yaw_is_inverted_before_physics() {
        let mut s = scenario(20.0, Vector3::new(0.0, 20.0, -50.0), WaypointKind::TestDestination);
        s.player_controlled = true;
        let mut sim = HelicopterSim::new(&TestConfiguration::default(), &s, 10.0, false).unwrap();
        let request = ControlRequest {
            manual: Some(JoystickOutput {
                yaw: 0.5,
                throttle: 0.6,
                ..Default::default()
            }),
            hover: false,
        };
        let report = sim.step(&request, DT, DT);
        assert_eq!(report.output.yaw, -0.5);
    }

    #[test]
    fn nearby_destination_is_reached_on_the_first_tick() {
        let s = scenario(10.0, Vector3::new(0.0, 10.0, -3.0), WaypointKind::TestDestination);
        let mut sim = HelicopterSim::new(&TestConfiguration::default(), &s, 10.0, true).unwrap();
        assert!(!sim.is_at_destination());
        sim.step(&ControlRequest::default(), DT, DT);
        assert!(sim.is_at_destination());
    }

    #[test]
    fn hovers_in_place_when_asked() {
        let s = scenario(10.0, Vector3::new(0.0, 10.0, -200.0), WaypointKind::TestDestination);
        let config = TestConfiguration {
            estimator: EstimatorKind::Perfect,
            ..Default::default()
        };
        let mut sim = HelicopterSim::new(&config, &s, 10.0, true).unwrap();
        let request = ControlRequest {
            manual: None,
            hover: true,
        };
        let reports = run(&mut sim, 120, request);
        assert!(reports.iter().all(|r| !r.crashed && r.output.yaw == 0.0));
        assert!(sim.physical_state().position.xz().norm() < 0.5);
    }

    /// A ramp rising 1 m per metre along -Z.
    fn sloped(mut s: ScenarioConfig) -> ScenarioConfig {
        s.terrain = TerrainConfig::Heightmap {
            heights: (0..6).map(|r| vec![r as f64; 6]).collect(),
        };
        s
    }

    #[test]
    fn missing_range_finder_keeps_fused_altitude_on_slopes() {
        // 30 m up is beyond the range finder, so every tick falls back.
        let mut s = sloped(scenario(30.0, Vector3::new(2.0, 30.0, -200.0), WaypointKind::TestDestination));
        s.start_position = Vector3::new(2.0, 30.0, -2.5);
        let mut sim = HelicopterSim::new(&TestConfiguration::default(), &s, 10.0, true).unwrap();

        let mut checked = 0;
        for i in 1..=120 {
            sim.step(&ControlRequest::default(), DT, i as f64 * DT);
            assert!(sim.sensor_readings().range_finder().is_none());
            if let Some(fused) = sim.fused_states() {
                assert_eq!(
                    sim.estimated_states().estimated.position.y,
                    fused.estimated.position.y
                );
                checked += 1;
            }
        }
        assert!(checked > 100);
    }

    #[test]
    fn range_finder_altitude_uses_ground_below_true_position_on_slopes() {
        let mut s = sloped(scenario(6.0, Vector3::new(2.0, 6.0, -200.0), WaypointKind::TestDestination));
        s.start_position = Vector3::new(2.0, 6.0, -2.5);
        let mut sim = HelicopterSim::new(&TestConfiguration::default(), &s, 10.0, true).unwrap();

        for i in 1..=30 {
            sim.step(&ControlRequest::default(), DT, i as f64 * DT);
            let height = sim.sensor_readings().range_finder().unwrap();
            let ground = sim.terrain().ground_altitude(&sim.physical_state().position);
            assert_abs_diff_eq!(
                sim.estimated_states().estimated.position.y,
                height + ground,
                epsilon = 1e-9
            );
        }
    }

    /// Flies the default configuration until the destination is reached.
    fn seconds_to_reach(target: Vector3<f64>, limit: f64) -> Option<f64> {
        let s = scenario(10.0, target, WaypointKind::TestDestination);
        let mut sim = HelicopterSim::new(&TestConfiguration::default(), &s, 10.0, true).unwrap();
        let ticks = (limit / DT) as usize;
        for i in 1..=ticks {
            let t = i as f64 * DT;
            let report = sim.step(&ControlRequest::default(), DT, t);
            assert!(!report.crashed, "crashed at {t:.2}s");
            if sim.is_at_destination() {
                return Some(t);
            }
        }
        None
    }

    #[test]
    fn default_configuration_reaches_forward_waypoint() {
        let seconds = seconds_to_reach(Vector3::new(0.0, 10.0, -100.0), 40.0);
        assert!(seconds.is_some_and(|s| s > 5.0), "arrived after {seconds:?}");
    }

    #[test]
    fn default_configuration_reaches_lateral_waypoint() {
        let seconds = seconds_to_reach(Vector3::new(40.0, 10.0, 0.0), 25.0);
        assert!(seconds.is_some(), "never arrived");
    }
}
