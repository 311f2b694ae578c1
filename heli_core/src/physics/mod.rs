// heli_core/src/physics/mod.rs

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::error::CoreError;
use crate::types::{JoystickOutput, PhysicalState};
use crate::utils::integrators::{ForwardEuler, Heun, Integrator, RungeKutta4};
use crate::utils::serde_helpers::vec3_array;

pub mod heli;
pub mod step;

pub use heli::HeliPhysics;
pub use step::SimulationStepResult;

/// The contract for anything that can advance the true rigid-body state by one tick.
///
/// `perform_timestep` must be a pure function of its arguments. A terrain collision
/// is reported through [`SimulationStepResult::collided`], never as an error.
pub trait PhysicsEngine: Send + Sync {
    /// Advances `state` by `dt` seconds under `output`, ending at `total_time`.
    fn perform_timestep(
        &self,
        state: &PhysicalState,
        output: &JoystickOutput,
        dt: f64,
        total_time: f64,
    ) -> SimulationStepResult;
}

/// Which Runge-Kutta scheme integrates position and velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum IntegratorKind {
    Euler,
    Heun,
    #[default]
    RungeKutta4,
}

impl IntegratorKind {
    pub fn build(self) -> Box<dyn Integrator<f64>> {
        match self {
            IntegratorKind::Euler => Box::new(ForwardEuler),
            IntegratorKind::Heun => Box::new(Heun),
            IntegratorKind::RungeKutta4 => Box::new(RungeKutta4),
        }
    }
}

/// Airframe constants of the simulated model helicopter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HeliParameters {
    /// kg
    pub mass: f64,
    #[serde(with = "vec3_array")]
    pub gravity: Vector3<f64>,
    /// Thrust at full throttle as a multiple of the weight.
    pub max_thrust_to_weight: f64,
    /// kg/m^3
    pub air_density: f64,
    pub drag_coefficient: f64,
    /// m^2
    pub cross_section_area: f64,
    /// rad/s at full stick deflection.
    pub max_pitch_rate: f64,
    pub max_roll_rate: f64,
    pub max_yaw_rate: f64,
    /// Extra sub-steps per timestep. Zero integrates the whole step at once.
    pub substeps: u32,
    pub integrator: IntegratorKind,
}

impl Default for HeliParameters {
    fn default() -> Self {
        Self {
            mass: 0.7,
            gravity: Vector3::new(0.0, -9.81, 0.0),
            max_thrust_to_weight: 1.7,
            air_density: 1.204,
            drag_coefficient: 1.0,
            cross_section_area: 0.1 * 0.2,
            max_pitch_rate: FRAC_PI_2,
            max_roll_rate: FRAC_PI_2,
            max_yaw_rate: FRAC_PI_2,
            substeps: 0,
            integrator: IntegratorKind::default(),
        }
    }
}

impl HeliParameters {
    pub fn max_thrust(&self) -> f64 {
        self.max_thrust_to_weight * self.mass * self.gravity.norm()
    }

    /// Stick deflection to angular rate, per axis (pitch, roll, yaw).
    pub fn angular_rates(&self, output: &JoystickOutput) -> Vector3<f64> {
        Vector3::new(
            output.pitch * self.max_pitch_rate,
            output.roll * self.max_roll_rate,
            output.yaw * self.max_yaw_rate,
        )
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.mass.is_nan() || self.mass <= 0.0 {
            return Err(CoreError::InvalidPhysics {
                name: "mass",
                reason: format!("must be positive, got {}", self.mass),
            });
        }
        if self.max_thrust_to_weight < 0.0 {
            return Err(CoreError::InvalidPhysics {
                name: "max_thrust_to_weight",
                reason: format!("must not be negative, got {}", self.max_thrust_to_weight),
            });
        }
        Ok(())
    }
}
