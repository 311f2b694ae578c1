// heli_core/src/control/output_controller.rs

use crate::control::{HeliState, PidSetup};
use crate::navigation::WaypointKind;
use crate::types::{ControlGoal, JoystickOutput};
use crate::utils::angles::{self, to_horizontal};

/// Distance (in seconds at max velocity) over which the wanted speed ramps down.
const SECONDS_TO_STOP: f64 = 1.0;
/// Largest cyclic tilt commanded to accelerate or decelerate, in degrees.
const MAX_CYCLIC_ANGLE_DEG: f64 = 10.0;
/// Below this horizontal speed a hover waypoint turns to its own heading.
const HOVER_YAW_SPEED: f64 = 1.0;

/// Turns wanted motion into stick outputs through the PID setup. All errors are
/// `current - wanted`.
#[derive(Debug, Clone)]
pub struct OutputController {
    pub pid_setup: PidSetup,
}

impl OutputController {
    pub fn new(pid_setup: PidSetup) -> Self {
        Self { pid_setup }
    }

    /// Flies towards the waypoint in `s`, slowing down linearly within
    /// `SECONDS_TO_STOP * max_h_velocity` metres of it.
    pub fn move_towards_goal(
        &mut self,
        max_h_velocity: f64,
        s: &HeliState,
        total_time: f64,
        hold_height_above_ground: f64,
    ) -> (JoystickOutput, ControlGoal) {
        let h_goal_distance = s.h_position_to_goal.norm();
        let meters_to_stop = SECONDS_TO_STOP * max_h_velocity;
        let ramp = if meters_to_stop > 0.0 {
            (h_goal_distance / meters_to_stop).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let wanted_h_velocity = max_h_velocity * ramp;

        let (wanted_forward, wanted_right) = match s.h_position_to_goal.try_normalize(1e-12) {
            Some(dir) if wanted_h_velocity != 0.0 => {
                let wanted = dir * wanted_h_velocity;
                (
                    angles::project(&wanted, &to_horizontal(&s.axes.forward)),
                    angles::project(&wanted, &to_horizontal(&s.axes.right)),
                )
            }
            _ => (0.0, 0.0),
        };

        // Near a hover waypoint, turn to its heading. Otherwise face the goal.
        let h_velocity = to_horizontal(&s.velocity).norm();
        let wanted_yaw_deg = if s.waypoint.kind == WaypointKind::Hover && h_velocity < HOVER_YAW_SPEED
        {
            s.waypoint.heading_angle.to_degrees()
        } else {
            s.degrees.goal_angle
        };

        self.move_relatively(
            s,
            wanted_forward,
            wanted_right,
            wanted_yaw_deg,
            hold_height_above_ground,
            total_time,
        )
    }

    /// Tracks wanted horizontal velocities along the body's forward and right axes,
    /// a heading, and either a height above ground (when positive) or the
    /// waypoint altitude.
    pub fn move_relatively(
        &mut self,
        s: &HeliState,
        wanted_h_velocity_forward: f64,
        wanted_h_velocity_right: f64,
        wanted_yaw_angle_deg: f64,
        wanted_height_above_ground: f64,
        total_time: f64,
    ) -> (JoystickOutput, ControlGoal) {
        let h_velocity = to_horizontal(&s.velocity);
        let h_velocity_forward = angles::project(&h_velocity, &to_horizontal(&s.axes.forward));
        let h_velocity_right = angles::project(&h_velocity, &to_horizontal(&s.axes.right));

        let forward_error = h_velocity_forward - wanted_h_velocity_forward;
        let right_error = h_velocity_right - wanted_h_velocity_right;

        // -1 is full deceleration, +1 full acceleration.
        let wanted_forwards_accel = self
            .pid_setup
            .forwards_accel
            .compute_explicit(0.0, 0.0, forward_error);
        let wanted_rightwards_accel = self
            .pid_setup
            .rightwards_accel
            .compute_explicit(0.0, 0.0, right_error);

        // Nose down accelerates forwards, right side down accelerates rightwards.
        let wanted_pitch_deg = -wanted_forwards_accel * MAX_CYCLIC_ANGLE_DEG;
        let wanted_roll_deg = wanted_rightwards_accel * MAX_CYCLIC_ANGLE_DEG;

        let throttle = if wanted_height_above_ground > 0.0 {
            self.throttle(s.height_above_ground, wanted_height_above_ground, total_time)
        } else {
            self.throttle(s.position.y, s.waypoint.position.y, total_time)
        };

        let output = JoystickOutput {
            pitch: self.pitch(s.degrees.pitch_angle, wanted_pitch_deg, total_time),
            roll: self.roll(s.degrees.roll_angle, wanted_roll_deg, total_time),
            yaw: self.yaw(s.degrees.heading_angle, wanted_yaw_angle_deg, total_time),
            throttle,
        };
        let goal = ControlGoal {
            h_velocity: 0.0,
            pitch_angle: wanted_pitch_deg.to_radians(),
            roll_angle: wanted_roll_deg.to_radians(),
            heading_angle: 0.0,
        };
        (output, goal)
    }

    pub fn pitch(&mut self, pitch_angle_deg: f64, wanted_pitch_angle_deg: f64, total_time: f64) -> f64 {
        let error = pitch_angle_deg - wanted_pitch_angle_deg;
        -self.pid_setup.pitch_angle.compute(error, total_time)
    }

    pub fn roll(&mut self, roll_angle_deg: f64, wanted_roll_angle_deg: f64, total_time: f64) -> f64 {
        let error = roll_angle_deg - wanted_roll_angle_deg;
        -self.pid_setup.roll_angle.compute(error, total_time)
    }

    pub fn yaw(&mut self, heading_angle_deg: f64, wanted_yaw_angle_deg: f64, total_time: f64) -> f64 {
        let error = angles::diff_angle(
            heading_angle_deg.to_radians(),
            wanted_yaw_angle_deg.to_radians(),
        )
        .to_degrees();
        self.pid_setup.yaw_angle.compute(error, total_time)
    }

    /// Throttle in `[0, 1]` from an altitude (or height above ground) error.
    pub fn throttle(&mut self, altitude: f64, wanted_altitude: f64, total_time: f64) -> f64 {
        self.pid_setup
            .throttle
            .compute_positive(altitude - wanted_altitude, total_time)
    }
}
