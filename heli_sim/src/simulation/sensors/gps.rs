// heli_sim/src/simulation/sensors/gps.rs

use heli_core::messages::GpsFix;
use heli_core::physics::SimulationStepResult;
use tracing::trace;

use super::{Noise, SensorSpecifications};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::error::SimError;

/// Seconds between fixes.
const UPDATE_PERIOD: f64 = 1.0;
const TIME_TOLERANCE: f64 = 1e-9;

/// A GPS receiver producing one noisy position and velocity fix per second.
#[derive(Debug, Clone)]
pub struct Gps {
    position_noise: Noise,
    velocity_noise: Noise,
    last_fix_time: Option<f64>,
}

impl Gps {
    pub fn new(specs: &SensorSpecifications, use_perfect_sensors: bool) -> Result<Self, SimError> {
        Ok(Self {
            position_noise: Noise::new("GPS position", specs.gps_position_std_dev, use_perfect_sensors)?,
            velocity_noise: Noise::new("GPS velocity", specs.gps_velocity_std_dev, use_perfect_sensors)?,
            last_fix_time: None,
        })
    }

    /// Ready once the first fix has been produced.
    pub fn is_ready(&self) -> bool {
        self.last_fix_time.is_some()
    }

    /// Returns a fix of the end-of-step state when one is due.
    pub fn update(&mut self, step: &SimulationStepResult, rng: &mut SimulationRng) -> Option<GpsFix> {
        let now = step.end_time;
        let due = self
            .last_fix_time
            .map_or(true, |last| now - last + TIME_TOLERANCE >= UPDATE_PERIOD);
        if !due {
            return None;
        }
        self.last_fix_time = Some(now);

        let fix = GpsFix {
            position: step.result.position + self.position_noise.sample_vector(rng),
            velocity: step.result.velocity + self.velocity_noise.sample_vector(rng),
        };
        trace!(time = now, "GPS fix at {:?}", fix.position);
        Some(fix)
    }
}
