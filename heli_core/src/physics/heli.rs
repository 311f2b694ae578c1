// heli_core/src/physics/heli.rs

use std::sync::Arc;

use nalgebra::{DVector, Vector3};

use crate::error::CoreError;
use crate::navigation::TerrainMap;
use crate::physics::{HeliParameters, PhysicsEngine, SimulationStepResult};
use crate::types::{JoystickOutput, PhysicalState};
use crate::utils::angles;
use crate::utils::integrators::Integrator;

/// Point-mass helicopter: main rotor thrust along the body up axis, quadratic drag
/// and gravity. Attitude follows the stick as a pure rate command.
pub struct HeliPhysics {
    params: HeliParameters,
    integrator: Box<dyn Integrator<f64>>,
    terrain: Option<Arc<dyn TerrainMap>>,
}

impl HeliPhysics {
    pub fn new(params: HeliParameters) -> Result<Self, CoreError> {
        params.validate()?;
        let integrator = params.integrator.build();
        Ok(Self {
            params,
            integrator,
            terrain: None,
        })
    }

    /// Enables terrain collision detection against `terrain`.
    pub fn with_terrain(mut self, terrain: Arc<dyn TerrainMap>) -> Self {
        self.terrain = Some(terrain);
        self
    }

    pub fn parameters(&self) -> &HeliParameters {
        &self.params
    }

    /// World acceleration for the given attitude, velocity and throttle.
    pub fn acceleration(&self, state: &PhysicalState, throttle: f64) -> Vector3<f64> {
        let p = &self.params;
        let up = state.axes().up;
        let thrust = up * (throttle.clamp(0.0, 1.0) * p.max_thrust());

        let speed = state.velocity.norm();
        let drag = if speed > 0.0 {
            let magnitude =
                0.5 * p.air_density * speed * speed * p.cross_section_area * p.drag_coefficient;
            -state.velocity / speed * magnitude
        } else {
            Vector3::zeros()
        };

        p.gravity + (thrust + drag) / p.mass
    }

    fn integrate_substep(&self, state: &mut PhysicalState, output: &JoystickOutput, t0: f64, h: f64) {
        let accel = self.acceleration(state, output.throttle);

        // x = [p; v], x' = [v; a] with the acceleration held over the sub-step
        let x0 = DVector::from_column_slice(&[
            state.position.x,
            state.position.y,
            state.position.z,
            state.velocity.x,
            state.velocity.y,
            state.velocity.z,
        ]);
        let dynamics = move |x: &DVector<f64>, _t: f64| {
            DVector::from_column_slice(&[x[3], x[4], x[5], accel.x, accel.y, accel.z])
        };
        let x1 = self.integrator.step(&dynamics, &x0, t0, t0 + h);

        let rates = self.params.angular_rates(output) * h;
        state.orientation = angles::add_pitch_roll_yaw(&state.orientation, rates.x, rates.y, rates.z);
        state.position = Vector3::new(x1[0], x1[1], x1[2]);
        state.velocity = Vector3::new(x1[3], x1[4], x1[5]);
        state.acceleration = accel;
    }
}

impl PhysicsEngine for HeliPhysics {
    fn perform_timestep(
        &self,
        state: &PhysicalState,
        output: &JoystickOutput,
        dt: f64,
        total_time: f64,
    ) -> SimulationStepResult {
        let start_time = total_time - dt;
        let steps = 1 + self.params.substeps;
        let h = dt / f64::from(steps);

        let mut start = *state;
        start.acceleration = self.acceleration(state, output.throttle);

        let mut current = *state;
        for i in 0..steps {
            self.integrate_substep(&mut current, output, start_time + f64::from(i) * h, h);
        }

        let collided = self
            .terrain
            .as_ref()
            .is_some_and(|terrain| terrain.height_above_ground(&current.position) <= 0.0);

        SimulationStepResult {
            start,
            result: current,
            start_time,
            end_time: total_time,
            collided,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationMap;
    use approx::assert_abs_diff_eq;

    const F64_EPSILON: f64 = 1e-9;

    fn engine() -> HeliPhysics {
        HeliPhysics::new(HeliParameters::default()).unwrap()
    }

    /// Throttle that exactly cancels gravity.
    fn hover_throttle(params: &HeliParameters) -> f64 {
        1.0 / params.max_thrust_to_weight
    }

    #[test]
    fn free_fall_matches_closed_form() {
        let physics = engine();
        let state = PhysicalState::at_rest(Vector3::new(0.0, 100.0, 0.0));
        let step = physics.perform_timestep(&state, &JoystickOutput::default(), 0.5, 0.5);

        // No drag at the start since the velocity is zero, and the whole step
        // integrates with the starting acceleration.
        assert_abs_diff_eq!(step.result.velocity.y, -9.81 * 0.5, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(
            step.result.position.y,
            100.0 - 0.5 * 9.81 * 0.25,
            epsilon = F64_EPSILON
        );
        assert_abs_diff_eq!(step.start.acceleration.y, -9.81, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(step.start_time, 0.0);
        assert_abs_diff_eq!(step.duration(), 0.5);
    }

    #[test]
    fn hover_throttle_holds_altitude() {
        let physics = engine();
        let output = JoystickOutput {
            throttle: hover_throttle(physics.parameters()),
            ..Default::default()
        };
        let mut state = PhysicalState::at_rest(Vector3::new(3.0, 10.0, -4.0));
        for i in 1..=60 {
            state = physics
                .perform_timestep(&state, &output, 1.0 / 60.0, i as f64 / 60.0)
                .result;
        }
        assert_abs_diff_eq!(state.position, Vector3::new(3.0, 10.0, -4.0), epsilon = 1e-9);
    }

    #[test]
    fn drag_opposes_motion() {
        let physics = engine();
        let mut state = PhysicalState::at_rest(Vector3::zeros());
        state.velocity = Vector3::new(10.0, 0.0, 0.0);
        let output = JoystickOutput {
            throttle: hover_throttle(physics.parameters()),
            ..Default::default()
        };
        let accel = physics.acceleration(&state, output.throttle);
        let expected = 0.5 * 1.204 * 100.0 * 0.02 * 1.0 / 0.7;
        assert_abs_diff_eq!(accel.x, -expected, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(accel.y, 0.0, epsilon = F64_EPSILON);
    }

    #[test]
    fn substeps_expose_first_substep_acceleration() {
        let params = HeliParameters {
            substeps: 4,
            ..Default::default()
        };
        let physics = HeliPhysics::new(params).unwrap();
        let state = PhysicalState::at_rest(Vector3::new(0.0, 50.0, 0.0));
        let step = physics.perform_timestep(&state, &JoystickOutput::default(), 1.0, 1.0);

        // Drag builds up over the sub-steps, but the start acceleration is pure gravity.
        assert_abs_diff_eq!(step.start.acceleration.y, -9.81, epsilon = F64_EPSILON);
        assert!(step.result.acceleration.y > -9.81);
        assert!(step.result.velocity.y > -9.81);
    }

    #[test]
    fn full_pitch_stick_rotates_at_max_rate() {
        let physics = engine();
        let output = JoystickOutput {
            pitch: 1.0,
            ..Default::default()
        };
        let state = PhysicalState::at_rest(Vector3::new(0.0, 50.0, 0.0));
        let step = physics.perform_timestep(&state, &output, 0.1, 0.1);
        assert_abs_diff_eq!(
            angles::pitch_angle(&step.result.orientation),
            std::f64::consts::FRAC_PI_2 * 0.1,
            epsilon = F64_EPSILON
        );
    }

    #[test]
    fn collision_is_signalled_when_terrain_is_attached() {
        let terrain: Arc<dyn TerrainMap> = Arc::new(NavigationMap::flat(0.0));
        let physics = engine().with_terrain(terrain);
        let state = PhysicalState::at_rest(Vector3::new(0.0, 0.01, 0.0));
        let step = physics.perform_timestep(&state, &JoystickOutput::default(), 0.1, 0.1);
        assert!(step.collided);

        let high = PhysicalState::at_rest(Vector3::new(0.0, 10.0, 0.0));
        let step = physics.perform_timestep(&high, &JoystickOutput::default(), 0.1, 0.1);
        assert!(!step.collided);
    }

    #[test]
    fn non_positive_mass_is_rejected() {
        let params = HeliParameters {
            mass: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            HeliPhysics::new(params),
            Err(CoreError::InvalidPhysics { name: "mass", .. })
        ));
    }
}
