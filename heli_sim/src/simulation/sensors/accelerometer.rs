// heli_sim/src/simulation/sensors/accelerometer.rs

use heli_core::physics::SimulationStepResult;
use heli_core::types::ForwardRightUp;
use nalgebra::Vector3;

use super::{Noise, SensorSpecifications};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::error::SimError;

const TIME_TOLERANCE: f64 = 1e-9;

/// One accelerometer sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccelerometerSample {
    pub world: Vector3<f64>,
    pub local: ForwardRightUp,
}

/// Three-axis accelerometer strapped to the body, sampling at a fixed rate.
#[derive(Debug, Clone)]
pub struct Accelerometer {
    period: f64,
    forward_noise: Noise,
    right_noise: Noise,
    up_noise: Noise,
    last_sample_time: Option<f64>,
    sample: AccelerometerSample,
}

impl Accelerometer {
    pub fn new(specs: &SensorSpecifications, use_perfect_sensors: bool) -> Result<Self, SimError> {
        let std_dev = &specs.accelerometer_std_dev;
        Ok(Self {
            period: 1.0 / specs.accelerometer_frequency,
            forward_noise: Noise::new("accelerometer forward", std_dev.forward, use_perfect_sensors)?,
            right_noise: Noise::new("accelerometer right", std_dev.right, use_perfect_sensors)?,
            up_noise: Noise::new("accelerometer up", std_dev.up, use_perfect_sensors)?,
            last_sample_time: None,
            sample: AccelerometerSample::default(),
        })
    }

    /// Samples the acceleration held at the start of the step once a sample
    /// period has passed. Between samples the previous sample is repeated.
    pub fn update(&mut self, step: &SimulationStepResult, rng: &mut SimulationRng) -> AccelerometerSample {
        let now = step.end_time;
        let Some(last) = self.last_sample_time else {
            self.last_sample_time = Some(now);
            return self.sample;
        };
        if now - last + TIME_TOLERANCE < self.period {
            return self.sample;
        }
        self.last_sample_time = Some(now);

        let state = &step.start;
        let world = state.acceleration;
        // Body frame: right = x, up = y, forward = -z.
        let body = state.orientation.inverse_transform_vector(&world);
        let noise = Vector3::new(
            self.right_noise.sample(rng),
            self.up_noise.sample(rng),
            -self.forward_noise.sample(rng),
        );
        let measured = body + noise;

        self.sample = AccelerometerSample {
            world: world + state.orientation.transform_vector(&noise),
            local: ForwardRightUp::new(-measured.z, measured.x, measured.y),
        };
        self.sample
    }
}
