// heli_core/src/types.rs

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::utils::angles;
use crate::utils::serde_helpers::{quat_xyzw_array, vec3_array};

// --- Rigid-body snapshot ---

/// Ground-truth (or estimated) rigid-body state at one instant, all in world frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalState {
    #[serde(with = "quat_xyzw_array")]
    pub orientation: UnitQuaternion<f64>,
    #[serde(with = "vec3_array")]
    pub position: Vector3<f64>,
    #[serde(with = "vec3_array")]
    pub velocity: Vector3<f64>,
    #[serde(with = "vec3_array")]
    pub acceleration: Vector3<f64>,
}

impl Default for PhysicalState {
    fn default() -> Self {
        Self {
            orientation: UnitQuaternion::identity(),
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
        }
    }
}

impl PhysicalState {
    pub fn new(
        orientation: UnitQuaternion<f64>,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        acceleration: Vector3<f64>,
    ) -> Self {
        Self {
            orientation,
            position,
            velocity,
            acceleration,
        }
    }

    /// A motionless state at `position` with identity orientation.
    pub fn at_rest(position: Vector3<f64>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn axes(&self) -> Axes {
        angles::axes_of(&self.orientation)
    }
}

/// Body axes in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    pub forward: Vector3<f64>,
    pub right: Vector3<f64>,
    pub up: Vector3<f64>,
}

/// A quantity decomposed along the body's forward, right and up axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForwardRightUp {
    pub forward: f64,
    pub right: f64,
    pub up: f64,
}

impl ForwardRightUp {
    pub fn new(forward: f64, right: f64, up: f64) -> Self {
        Self { forward, right, up }
    }
}

// --- Control ---

/// Normalized stick positions. Pitch, roll and yaw in `[-1, 1]`, throttle in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JoystickOutput {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
    pub throttle: f64,
}

impl JoystickOutput {
    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite()
            && self.roll.is_finite()
            && self.yaw.is_finite()
            && self.throttle.is_finite()
    }
}

/// What the autopilot is currently aiming for. Angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlGoal {
    pub h_velocity: f64,
    pub pitch_angle: f64,
    pub roll_angle: f64,
    pub heading_angle: f64,
}
