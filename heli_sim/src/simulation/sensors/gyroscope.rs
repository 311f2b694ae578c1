// heli_sim/src/simulation/sensors/gyroscope.rs

use heli_core::physics::HeliParameters;
use heli_core::types::JoystickOutput;
use nalgebra::Vector3;

/// Angular rate sensor. The airframe turns at exactly the commanded rate, so the
/// gyro reads the stick deflection scaled by the maximum rates.
#[derive(Debug, Clone)]
pub struct Gyroscope {
    params: HeliParameters,
}

/// Pitch, roll and yaw components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroSample {
    /// rad/s
    pub rate: Vector3<f64>,
    /// rad over the step.
    pub delta: Vector3<f64>,
}

impl Gyroscope {
    pub fn new(params: &HeliParameters) -> Self {
        Self {
            params: params.clone(),
        }
    }

    pub fn update(&self, output: &JoystickOutput, dt: f64) -> GyroSample {
        let rate = self.params.angular_rates(output);
        GyroSample {
            rate,
            delta: rate * dt,
        }
    }
}
