// heli_core/src/control/autopilot.rs

use std::sync::Arc;

use tracing::{debug, trace};

use crate::control::{HeliState, OutputController, PidSetup};
use crate::navigation::{Task, TerrainMap, Waypoint, WaypointKind};
use crate::types::{ControlGoal, JoystickOutput};
use crate::utils::angles::{lerp_range, to_horizontal};

/// Default cruise speed in m/s.
pub const DEFAULT_MAX_H_VELOCITY: f64 = 10.0;

/// What the autopilot is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationState {
    /// Flying towards the current waypoint.
    #[default]
    EnRoute,
    /// Holding position; the task is complete.
    AtDestination,
    /// Translating user stick input into velocity and height commands.
    AssistedAutopilot,
}

/// Flies a [`Task`] waypoint by waypoint.
pub struct Autopilot {
    /// Waypoint capture uses `is_true_position_within_radius` instead of the
    /// position of the state handed to the autopilot.
    pub is_test_mode: bool,
    /// Set by the simulator each tick in test mode.
    pub is_true_position_within_radius: bool,
    pub max_h_velocity: f64,
    pub is_at_destination: bool,
    navigation: NavigationState,
    map: Arc<dyn TerrainMap>,
    task: Task,
    output: OutputController,
}

impl Autopilot {
    pub fn new(task: Task, pid_setup: PidSetup, map: Arc<dyn TerrainMap>) -> Self {
        Self {
            is_test_mode: false,
            is_true_position_within_radius: false,
            max_h_velocity: DEFAULT_MAX_H_VELOCITY,
            is_at_destination: false,
            navigation: NavigationState::default(),
            map,
            task,
            output: OutputController::new(pid_setup),
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn current_waypoint(&self) -> Option<&Waypoint> {
        self.task.current()
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigation
    }

    pub fn pid_setup(&self) -> &PidSetup {
        &self.output.pid_setup
    }

    /// Flies towards the current waypoint, or hovers once the task is done.
    /// Advances the task afterwards when the waypoint has been reached.
    pub fn get_output(
        &mut self,
        s: &HeliState,
        dt: f64,
        total_time: f64,
    ) -> (JoystickOutput, ControlGoal) {
        let result = if self.is_at_destination || self.task.is_empty() {
            self.navigation = NavigationState::AtDestination;
            self.get_hover_output(s, total_time)
        } else {
            self.navigation = NavigationState::EnRoute;
            self.output.move_towards_goal(
                self.max_h_velocity,
                s,
                total_time,
                self.task.hold_height_above_ground,
            )
        };

        trace!(
            "autopilot PRYT {:.2},{:.2},{:.2},{:.2}",
            result.0.pitch,
            result.0.roll,
            result.0.yaw,
            result.0.throttle
        );

        self.process_navigation(s, dt);
        result
    }

    /// Lets the user command velocities and height above ground with the stick:
    /// throttle sets 1..10 m above ground, pitch and roll set -10..10 m/s forwards
    /// and rightwards, yaw turns the heading.
    pub fn get_assisted_output(
        &mut self,
        user_input: &JoystickOutput,
        s: &HeliState,
        dt: f64,
        total_time: f64,
    ) -> (JoystickOutput, ControlGoal) {
        self.navigation = NavigationState::AssistedAutopilot;

        let height_above_ground = lerp_range(user_input.throttle, 0.0, 1.0, 1.0, 10.0);
        let forwards_velocity = lerp_range(-user_input.pitch, -1.0, 1.0, -10.0, 10.0);
        let rightwards_velocity = lerp_range(user_input.roll, -1.0, 1.0, -10.0, 10.0);
        let heading_deg = s.degrees.heading_angle - 15.0 * user_input.yaw;

        let result = self.output.move_relatively(
            s,
            forwards_velocity,
            rightwards_velocity,
            heading_deg,
            height_above_ground,
            total_time,
        );
        self.process_navigation(s, dt);
        result
    }

    /// Levels out and holds the current altitude without turning.
    pub fn get_hover_output(&mut self, s: &HeliState, total_time: f64) -> (JoystickOutput, ControlGoal) {
        let goal = ControlGoal::default();
        let output = JoystickOutput {
            throttle: self.output.throttle(s.position.y, s.position.y, total_time),
            roll: self.output.roll(s.degrees.roll_angle, goal.roll_angle, total_time),
            pitch: self.output.pitch(s.degrees.pitch_angle, goal.pitch_angle, total_time),
            yaw: 0.0,
        };
        (output, goal)
    }

    /// Waypoint bookkeeping after an output has been computed for this tick.
    fn process_navigation(&mut self, s: &HeliState, dt: f64) {
        let hold = self.task.hold_height_above_ground;
        let holds_height = self.task.holds_height_above_ground();
        let looping = self.task.looping;

        let Some(waypoint) = self.task.current_mut() else {
            return;
        };

        // Waypoints are passed in map coordinates when holding height above ground.
        if holds_height {
            waypoint.position.y = self.map.altitude(&to_horizontal(&waypoint.position)) + hold;
        }

        let is_within_radius = if self.is_test_mode {
            self.is_true_position_within_radius
        } else {
            waypoint.is_within_radius(&s.position)
        };

        // Waiting only counts while continuously inside the radius.
        if is_within_radius {
            waypoint.seconds_waited += dt;
        } else {
            waypoint.seconds_waited = 0.0;
        }

        let advance = match waypoint.kind {
            WaypointKind::Hover => waypoint.done_waiting(),
            WaypointKind::Intermediate => is_within_radius,
            WaypointKind::TestDestination if is_within_radius => {
                if !looping {
                    debug!("reached test destination");
                    self.is_at_destination = true;
                }
                looping
            }
            WaypointKind::TestDestination | WaypointKind::Land => false,
        };

        if advance {
            self.task.next();
            if let Some(next) = self.task.current() {
                debug!(
                    "next waypoint {:?} at ({:.1}, {:.1}, {:.1})",
                    next.kind, next.position.x, next.position.y, next.position.z
                );
            }
        }
    }
}
