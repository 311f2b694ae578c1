// heli_core/src/estimation/mod.rs

use crate::messages::SensorReadings;
use crate::physics::SimulationStepResult;
use crate::types::{JoystickOutput, PhysicalState};

pub mod filters;
pub mod perfect;
pub mod sensor_estimated;

pub use perfect::PerfectState;
pub use sensor_estimated::SensorEstimatedState;

/// Everything an estimator may consume on one tick. The readings must come from
/// the sensor update of this same tick.
#[derive(Debug, Clone, Copy)]
pub struct EstimatorInput<'a> {
    pub step: &'a SimulationStepResult,
    pub readings: &'a SensorReadings,
    pub output: &'a JoystickOutput,
    /// Seconds since the previous tick.
    pub dt: f64,
    /// Seconds since the scenario started.
    pub total_time: f64,
}

/// The three views of the vehicle an estimator publishes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EstimatedStates {
    /// Sensor-fused belief.
    pub estimated: PhysicalState,
    /// The GPS fix of this tick. Only the position is meaningful; it is zero on
    /// ticks without a fix.
    pub observed: PhysicalState,
    /// Dead reckoning without corrections.
    pub blind: PhysicalState,
}

/// The contract for any algorithm that turns sensor readings into a state estimate.
pub trait StateEstimator: Send + Sync {
    /// False until enough sensor data has arrived to produce an estimate.
    fn is_ready(&self) -> bool;

    /// Consumes exactly one tick of input. Must be called once per tick, after the
    /// sensor model has been updated.
    fn process(&mut self, input: &EstimatorInput);

    /// The latest estimate, `None` while not ready.
    fn get_state(&self) -> Option<EstimatedStates>;
}
