// heli_sim/src/simulation/sensors/imu.rs

use heli_core::messages::ImuReading;
use heli_core::physics::{HeliParameters, SimulationStepResult};
use heli_core::types::JoystickOutput;
use heli_core::utils::angles;
use nalgebra::UnitQuaternion;
use tracing::trace;

use super::accelerometer::Accelerometer;
use super::gyroscope::Gyroscope;
use super::{Noise, SensorSpecifications};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::error::SimError;

/// Seconds between new orientation noise draws.
const ORIENTATION_NOISE_PERIOD: f64 = 0.5;
const TIME_TOLERANCE: f64 = 1e-9;

/// Inertial measurement unit: accelerometer plus gyroscope, with the orientation
/// dead-reckoned from the gyro.
#[derive(Debug, Clone)]
pub struct Imu {
    accelerometer: Accelerometer,
    gyroscope: Gyroscope,
    orientation: UnitQuaternion<f64>,
    orientation_noise: Noise,
    noise_rotation: UnitQuaternion<f64>,
    last_noise_time: Option<f64>,
}

impl Imu {
    pub fn new(
        specs: &SensorSpecifications,
        use_perfect_sensors: bool,
        params: &HeliParameters,
        start_orientation: UnitQuaternion<f64>,
    ) -> Result<Self, SimError> {
        Ok(Self {
            accelerometer: Accelerometer::new(specs, use_perfect_sensors)?,
            gyroscope: Gyroscope::new(params),
            orientation: start_orientation,
            orientation_noise: Noise::new(
                "orientation",
                specs.orientation_angle_noise_std_dev.to_radians(),
                use_perfect_sensors,
            )?,
            noise_rotation: UnitQuaternion::identity(),
            last_noise_time: None,
        })
    }

    pub fn update(
        &mut self,
        step: &SimulationStepResult,
        output: &JoystickOutput,
        rng: &mut SimulationRng,
    ) -> ImuReading {
        let acceleration = self.accelerometer.update(step, rng);
        let gyro = self.gyroscope.update(output, step.duration());
        self.orientation =
            angles::add_pitch_roll_yaw(&self.orientation, gyro.delta.x, gyro.delta.y, gyro.delta.z);

        if self.orientation_noise.is_enabled() {
            let now = step.end_time;
            let due = self
                .last_noise_time
                .map_or(true, |last| now - last + TIME_TOLERANCE >= ORIENTATION_NOISE_PERIOD);
            if due {
                let yaw = self.orientation_noise.sample(rng);
                let pitch = self.orientation_noise.sample(rng);
                let roll = self.orientation_noise.sample(rng);
                self.noise_rotation = angles::from_yaw_pitch_roll(yaw, pitch, roll);
                self.last_noise_time = Some(now);
                trace!(yaw, pitch, roll, "new IMU orientation noise");
            }
        }

        ImuReading {
            acceleration_world: acceleration.world,
            acceleration_local: acceleration.local,
            orientation: self.orientation * self.noise_rotation,
            angular_rate: gyro.rate,
            angular_delta: gyro.delta,
        }
    }
}
