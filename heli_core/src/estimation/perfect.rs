// heli_core/src/estimation/perfect.rs

use crate::estimation::{EstimatedStates, EstimatorInput, StateEstimator};

/// Echoes the true state with zero latency. Used when flying by perfect information.
#[derive(Debug, Clone, Default)]
pub struct PerfectState {
    current: Option<EstimatedStates>,
}

impl PerfectState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateEstimator for PerfectState {
    fn is_ready(&self) -> bool {
        true
    }

    fn process(&mut self, input: &EstimatorInput) {
        let mut estimated = input.step.result;
        // The end-of-step acceleration is only known on the next step.
        estimated.acceleration = input.step.start.acceleration;
        self.current = Some(EstimatedStates {
            estimated,
            ..Default::default()
        });
    }

    fn get_state(&self) -> Option<EstimatedStates> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::SensorReadings;
    use crate::physics::SimulationStepResult;
    use crate::types::{JoystickOutput, PhysicalState};
    use nalgebra::Vector3;

    #[test]
    fn echoes_true_state_with_starting_acceleration() {
        let mut start = PhysicalState::at_rest(Vector3::new(0.0, 10.0, 0.0));
        start.acceleration = Vector3::new(0.0, -9.81, 0.0);
        let mut end = PhysicalState::at_rest(Vector3::new(0.0, 9.9, 0.0));
        end.acceleration = Vector3::new(0.0, -9.0, 0.0);
        let step = SimulationStepResult {
            start,
            result: end,
            start_time: 0.0,
            end_time: 0.1,
            collided: false,
        };

        let mut perfect = PerfectState::new();
        assert!(perfect.get_state().is_none());
        perfect.process(&EstimatorInput {
            step: &step,
            readings: &SensorReadings::default(),
            output: &JoystickOutput::default(),
            dt: 0.1,
            total_time: 0.1,
        });

        let states = perfect.get_state().unwrap();
        assert_eq!(states.estimated.position, end.position);
        assert_eq!(states.estimated.acceleration, start.acceleration);
        assert_eq!(states.observed, PhysicalState::default());
    }
}
