// heli_sim/src/simulation/debugging/state_error.rs

use heli_core::types::PhysicalState;
use tracing::debug;

/// How far an estimate is from the truth.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateError {
    /// Euclidean distance between the positions, metres.
    pub position: f64,
    /// Magnitude of the velocity difference, m/s.
    pub velocity: f64,
    /// Angle of the rotation taking the estimate to the truth, degrees.
    pub attitude_degrees: f64,
}

impl StateError {
    pub fn between(truth: &PhysicalState, estimate: &PhysicalState) -> Self {
        // The error rotation that transforms the estimate to the truth.
        let error_rotation = truth.orientation * estimate.orientation.inverse();
        Self {
            position: (truth.position - estimate.position).norm(),
            velocity: (truth.velocity - estimate.velocity).norm(),
            attitude_degrees: error_rotation.angle().to_degrees(),
        }
    }

    pub fn log(&self, time: f64) {
        debug!(
            "State error at {:.2}s | Pos Err: {:.3}m | Vel Err: {:.3}m/s | Att Err: {:.3}°",
            time, self.position, self.velocity, self.attitude_degrees
        );
    }
}
