// heli_core/src/physics/step.rs

use crate::types::PhysicalState;

/// Output of one physics timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationStepResult {
    /// State at the start of the step. Its acceleration is the one held during the
    /// first sub-step, which is what accelerometers should sample.
    pub start: PhysicalState,
    /// State at the end of the step.
    pub result: PhysicalState,
    pub start_time: f64,
    pub end_time: f64,
    /// Set when the engine detected a terrain collision during this step.
    pub collided: bool,
}

impl SimulationStepResult {
    /// A zero-duration step that leaves `state` untouched.
    pub fn initial(state: PhysicalState, time: f64) -> Self {
        Self {
            start: state,
            result: state,
            start_time: time,
            end_time: time,
            collided: false,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}
