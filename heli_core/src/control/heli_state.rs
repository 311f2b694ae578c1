// heli_core/src/control/heli_state.rs

use std::fmt;

use nalgebra::{UnitQuaternion, Vector2, Vector3};

use crate::navigation::Waypoint;
use crate::types::{Axes, JoystickOutput, PhysicalState};
use crate::utils::angles::{self, to_horizontal};

/// Below this speed (m/s) the bearing is undefined and the heading is used instead.
const MIN_BEARING_SPEED: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Angles {
    pub pitch_angle: f64,
    pub roll_angle: f64,
    pub heading_angle: f64,
    /// Direction of horizontal travel.
    pub bearing_angle: f64,
    /// Direction towards the current waypoint.
    pub goal_angle: f64,
    pub bearing_error_angle: f64,
}

impl Angles {
    pub fn to_degrees(self) -> Self {
        Self {
            pitch_angle: self.pitch_angle.to_degrees(),
            roll_angle: self.roll_angle.to_degrees(),
            heading_angle: self.heading_angle.to_degrees(),
            bearing_angle: self.bearing_angle.to_degrees(),
            goal_angle: self.goal_angle.to_degrees(),
            bearing_error_angle: self.bearing_error_angle.to_degrees(),
        }
    }
}

/// A physical state enriched with what the autopilot needs to steer: body axes,
/// angles and the relation to the current waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct HeliState {
    pub height_above_ground: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub acceleration: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub axes: Axes,
    /// Horizontal vector from the helicopter to the waypoint.
    pub h_position_to_goal: Vector2<f64>,
    pub radians: Angles,
    pub degrees: Angles,
    pub waypoint: Waypoint,
    pub output: JoystickOutput,
}

impl HeliState {
    pub fn from_physical(
        s: &PhysicalState,
        height_above_ground: f64,
        waypoint: &Waypoint,
        output: JoystickOutput,
    ) -> Self {
        let h_position_to_goal = to_horizontal(&(waypoint.position - s.position));

        let heading_angle = angles::heading_angle(&s.orientation);
        let bearing_angle = if s.velocity.norm() < MIN_BEARING_SPEED {
            heading_angle
        } else {
            angles::heading_of(&to_horizontal(&s.velocity))
        };
        let goal_angle = angles::heading_of(&h_position_to_goal);

        let radians = Angles {
            pitch_angle: angles::pitch_angle(&s.orientation),
            roll_angle: angles::roll_angle(&s.orientation),
            heading_angle,
            bearing_angle,
            goal_angle,
            bearing_error_angle: angles::diff_angle(bearing_angle, goal_angle),
        };

        Self {
            height_above_ground,
            position: s.position,
            velocity: s.velocity,
            acceleration: s.acceleration,
            orientation: s.orientation,
            axes: s.axes(),
            h_position_to_goal,
            radians,
            degrees: radians.to_degrees(),
            waypoint: waypoint.clone(),
            output,
        }
    }

    pub fn to_physical(&self) -> PhysicalState {
        PhysicalState::new(self.orientation, self.position, self.velocity, self.acceleration)
    }
}

impl fmt::Display for HeliState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Position {:.1},{:.1},{:.1} - Velocity {:.1}km/h - Heading {:.0}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.norm() * 3.6,
            self.degrees.heading_angle
        )
    }
}
