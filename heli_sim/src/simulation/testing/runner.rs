// heli_sim/src/simulation/testing/runner.rs

//! Flies a list of scenarios one after another, sweeping the max horizontal
//! velocity when a scenario crashes, and collects the results.

use std::path::PathBuf;

use tracing::{error, info};

use super::report::write_results;
use super::results::{AutopilotConfiguration, IntermediaryTestResult, ScenarioRun, TestResults};
use crate::simulation::config::{ScenarioConfig, TestConfiguration};
use crate::simulation::core::app_state::{EndTrigger, RunnerState};
use crate::simulation::error::SimError;
use crate::simulation::helicopter::{ControlRequest, HelicopterSim};
use crate::simulation::input::{shape_manual_input, InputSource};

pub struct ScenarioRunner {
    config: TestConfiguration,
    scenarios: Vec<ScenarioConfig>,
    scenario_index: usize,
    velocity_index: usize,
    /// Test mode ends scenarios and records results. Interactive mode restarts
    /// the scenario on a crash or skip instead.
    is_test_mode: bool,
    sim: HelicopterSim,
    state: RunnerState,
    time: f64,
    intermediary: IntermediaryTestResult,
    results: TestResults,
    output_dir: Option<PathBuf>,
}

impl ScenarioRunner {
    pub fn new(
        config: TestConfiguration,
        scenarios: Vec<ScenarioConfig>,
        input: &dyn InputSource,
    ) -> Result<Self, SimError> {
        let first_velocity = *config
            .max_h_velocities
            .first()
            .ok_or(SimError::EmptyVelocitySweep)?;
        let first = scenarios.first().ok_or(SimError::NoScenarios)?;

        for scenario in &scenarios {
            scenario.build_map()?;
            scenario.build_task()?;
            if scenario.player_controlled && !input.is_attached() {
                return Err(SimError::NoInputDevice(scenario.name.clone()));
            }
        }

        let is_test_mode = !first.player_controlled;
        let sim = HelicopterSim::new(&config, first, first_velocity, is_test_mode)?;
        info!(
            "Running {} scenario(s) at max horizontal velocities {:?} m/s, test mode {}",
            scenarios.len(),
            config.max_h_velocities,
            is_test_mode
        );

        Ok(Self {
            config,
            scenarios,
            scenario_index: 0,
            velocity_index: 0,
            is_test_mode,
            sim,
            state: RunnerState::default(),
            time: 0.0,
            intermediary: IntermediaryTestResult::default(),
            results: TestResults::default(),
            output_dir: None,
        })
    }

    /// Results are written here once every scenario has ended.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Advances the current scenario by one tick.
    pub fn tick(&mut self, input: &mut dyn InputSource) -> RunnerState {
        if self.state.is_complete() {
            return self.state;
        }
        self.state = RunnerState::RunningScenario;

        if input.skip_pressed() {
            self.scenario_interrupted(EndTrigger::UserSkipped);
            return self.state;
        }

        let dt = self.config.tick_seconds;
        self.time += dt;
        let request = ControlRequest {
            manual: input.sticks().map(|sticks| shape_manual_input(&sticks)),
            hover: input.hover_held(),
        };
        let report = self.sim.step(&request, dt, self.time);

        if report.crashed {
            self.scenario_interrupted(EndTrigger::Crashed);
            return self.state;
        }

        if self.is_test_mode {
            if let Some(snapshot) = self.sim.log().last() {
                self.intermediary.add(snapshot);
            }

            let timeout = self.timeout();
            if self.sim.is_at_destination() {
                self.end_scenario(EndTrigger::ReachedDestination);
            } else if timeout > 0.0 && self.time >= timeout {
                self.end_scenario(EndTrigger::TimedOut);
            }
        }
        self.state
    }

    /// Ticks until every scenario has ended. An interactive session only ends
    /// through [`ScenarioRunner::tick`] driven by the caller, so this is meant for
    /// test mode.
    pub fn run(&mut self, input: &mut dyn InputSource) -> &TestResults {
        while !self.state.is_complete() {
            self.tick(input);
        }
        &self.results
    }

    fn timeout(&self) -> f64 {
        let scenario = self.current_scenario();
        if scenario.timeout_seconds > 0.0 {
            scenario.timeout_seconds
        } else {
            self.config.fallback_timeout_seconds
        }
    }

    fn scenario_interrupted(&mut self, trigger: EndTrigger) {
        if self.is_test_mode {
            self.end_scenario(trigger);
        } else {
            info!("Scenario '{}' {}, restarting.", self.current_scenario().name, trigger);
            self.restart();
        }
    }

    /// Records the result, then retries a crashed scenario at the next velocity or
    /// moves on to the next scenario at the first velocity.
    fn end_scenario(&mut self, trigger: EndTrigger) {
        let run = ScenarioRun {
            scenario: self.current_scenario().name.clone(),
            end_trigger: trigger,
            duration: self.time,
            sensors: self.config.sensors.clone(),
            autopilot: AutopilotConfiguration {
                max_h_velocity: self.sim.max_h_velocity(),
                pid_setup: self.sim.autopilot().pid_setup().clone(),
            },
            flight_log: self.sim.log().clone(),
        };
        info!(
            "Scenario '{}' at {} m/s ended by {} after {:.1} s",
            run.scenario, run.autopilot.max_h_velocity, trigger, run.duration
        );
        self.results.record(self.intermediary.finish(run));
        self.state = RunnerState::ScenarioEnded(trigger);

        if trigger == EndTrigger::Crashed
            && self.velocity_index + 1 < self.config.max_h_velocities.len()
        {
            self.velocity_index += 1;
        } else {
            self.scenario_index += 1;
            self.velocity_index = 0;
        }

        if self.scenario_index >= self.scenarios.len() {
            self.finish();
        } else {
            self.restart();
        }
    }

    fn restart(&mut self) {
        self.time = 0.0;
        self.intermediary = IntermediaryTestResult::default();
        self.sim.set_max_h_velocity(self.current_velocity());
        let scenario = self.scenarios[self.scenario_index].clone();
        if let Err(e) = self.sim.reset(&scenario, 0.0) {
            error!("Failed to reset scenario '{}': {}", scenario.name, e);
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.state = RunnerState::AllScenariosComplete;
        info!("All scenarios complete, {} result(s).", self.results.len());
        if let Some(dir) = &self.output_dir {
            write_results(dir, &self.results, self.sim.log(), &self.config);
        }
    }

    pub fn results(&self) -> &TestResults {
        &self.results
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn is_test_mode(&self) -> bool {
        self.is_test_mode
    }

    /// Seconds since the current scenario started.
    pub fn elapsed(&self) -> f64 {
        self.time
    }

    pub fn scenarios(&self) -> &[ScenarioConfig] {
        &self.scenarios
    }

    pub fn current_scenario(&self) -> &ScenarioConfig {
        let last = self.scenarios.len() - 1;
        &self.scenarios[self.scenario_index.min(last)]
    }

    pub fn current_velocity(&self) -> f64 {
        self.config.max_h_velocities[self.velocity_index]
    }

    pub fn helicopter(&self) -> &HelicopterSim {
        &self.sim
    }
}
