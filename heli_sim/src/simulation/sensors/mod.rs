// heli_sim/src/simulation/sensors/mod.rs

//! Simulated sensors. Each one turns the true state of a physics step into a
//! noisy measurement, drawing noise from the simulation RNG.

pub mod accelerometer;
pub mod gps;
pub mod gyroscope;
pub mod imu;
pub mod range_finder;
pub mod specs;

use std::sync::Arc;

use heli_core::messages::SensorReadings;
use heli_core::navigation::TerrainMap;
use heli_core::physics::{HeliParameters, SimulationStepResult};
use heli_core::types::{JoystickOutput, PhysicalState};
use nalgebra::Vector3;
use rand_distr::{Distribution, Normal};

use crate::simulation::core::prng::SimulationRng;
use crate::simulation::error::SimError;
use gps::Gps;
use imu::Imu;
use range_finder::RangeFinder;
pub use specs::SensorSpecifications;

/// A zero-mean Gaussian, or nothing when the sensor is perfect.
#[derive(Debug, Clone, Copy)]
pub struct Noise(Option<Normal<f64>>);

impl Noise {
    pub const NONE: Noise = Noise(None);

    pub fn new(sensor: &'static str, std_dev: f64, perfect: bool) -> Result<Self, SimError> {
        if perfect || std_dev == 0.0 {
            return Ok(Self::NONE);
        }
        Normal::new(0.0, std_dev)
            .map(|n| Noise(Some(n)))
            .map_err(|_| SimError::InvalidNoise { sensor, std_dev })
    }

    pub fn sample(&self, rng: &mut SimulationRng) -> f64 {
        self.0.map_or(0.0, |n| n.sample(&mut rng.0))
    }

    /// Independent samples per component.
    pub fn sample_vector(&self, rng: &mut SimulationRng) -> Vector3<f64> {
        let x = self.sample(rng);
        let y = self.sample(rng);
        let z = self.sample(rng);
        Vector3::new(x, y, z)
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }
}

/// The sensor suite of one helicopter: GPS, IMU and a downwards range finder.
pub struct SensorModel {
    gps: Gps,
    imu: Imu,
    range_finder: RangeFinder,
    readings: SensorReadings,
}

impl SensorModel {
    pub fn new(
        specs: &SensorSpecifications,
        use_perfect_sensors: bool,
        params: &HeliParameters,
        map: Arc<dyn TerrainMap>,
        start: &PhysicalState,
    ) -> Result<Self, SimError> {
        Ok(Self {
            gps: Gps::new(specs, use_perfect_sensors)?,
            imu: Imu::new(specs, use_perfect_sensors, params, start.orientation)?,
            range_finder: RangeFinder::new(map),
            readings: SensorReadings::default(),
        })
    }

    /// Measures the step just taken. Must run before the estimator sees this tick.
    pub fn update(
        &mut self,
        step: &SimulationStepResult,
        output: &JoystickOutput,
        rng: &mut SimulationRng,
    ) -> &SensorReadings {
        let gps = self.gps.update(step, rng);
        let imu = self.imu.update(step, output, rng);
        let range_finder_height = self.range_finder.measure(&step.result);

        self.readings = SensorReadings {
            gps,
            gps_ready: self.gps.is_ready(),
            imu,
            range_finder_height,
        };
        &self.readings
    }

    pub fn ready(&self) -> bool {
        self.gps.is_ready()
    }

    pub fn readings(&self) -> &SensorReadings {
        &self.readings
    }
}
