// heli_core/src/estimation/filters/gps_ins.rs

use nalgebra::{DMatrix, DVector, UnitQuaternion, Vector3};
use tracing::trace;

use crate::frames::layout::{gps_ins_state_layout, GPS_INS_STATE_DIM};
use crate::frames::FrameAwareState;
use crate::messages::GpsFix;
use crate::types::PhysicalState;

/// Dimension of the input vector: world acceleration (3) and orientation (4).
const INPUT_DIM: usize = 7;
/// Dimension of the observation vector: GPS position (3) and velocity (3).
const OBSERVATION_DIM: usize = 6;
/// Initial error covariance. Small, so the filter starts out trusting its model.
const INITIAL_COVARIANCE: f64 = 0.001;

/// Noise figures the filter is tuned with (standard deviations).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsInsNoise {
    /// Used for all three axes of the process noise.
    pub accelerometer_std_dev: f64,
    pub gps_position_std_dev: Vector3<f64>,
    pub gps_velocity_std_dev: Vector3<f64>,
}

/// The model input `u` for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsInsInput {
    pub acceleration_world: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

/// The observation `z` for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsInsObservation {
    /// Seconds of simulation time.
    pub time: f64,
    /// Present only on ticks where the GPS produced a new fix.
    pub gps: Option<GpsFix>,
}

/// Kinematic part of a filter state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsInsState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl GpsInsState {
    pub fn to_physical(&self, acceleration: Vector3<f64>) -> PhysicalState {
        PhysicalState::new(self.orientation, self.position, self.velocity, acceleration)
    }
}

/// Result of one filter step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsInsEstimate {
    /// Posterior (corrected) estimate.
    pub posterior: GpsInsState,
    /// Model-only propagation that never sees an observation.
    pub blind: GpsInsState,
    /// The observed GPS position, zero when there was no fix this tick.
    pub observed_position: Vector3<f64>,
    pub time: f64,
}

/// Linear Kalman filter fusing GPS fixes with world-frame accelerations from the
/// IMU. The orientation is not filtered, it is copied from the input each step.
#[derive(Debug, Clone)]
pub struct GpsInsFilter {
    posterior: FrameAwareState,
    blind: DVector<f64>,
    noise: GpsInsNoise,
}

impl GpsInsFilter {
    /// Starts the filter at `initial` at `start_time`, with the blind and posterior
    /// estimates both equal to the initial state.
    pub fn new(initial: &PhysicalState, start_time: f64, noise: GpsInsNoise) -> Self {
        let mut posterior =
            FrameAwareState::new(gps_ins_state_layout(), INITIAL_COVARIANCE, start_time);
        posterior.set_kinematics(&initial.position, &initial.velocity, &initial.orientation);
        let blind = posterior.vector.clone();

        Self {
            posterior,
            blind,
            noise,
        }
    }

    pub fn state(&self) -> &FrameAwareState {
        &self.posterior
    }

    /// State transition `A`: position integrates velocity, quaternion rows are zero
    /// since the orientation enters through `B`.
    fn transition(dt: f64) -> DMatrix<f64> {
        let mut a = DMatrix::zeros(GPS_INS_STATE_DIM, GPS_INS_STATE_DIM);
        for i in 0..6 {
            a[(i, i)] = 1.0;
        }
        for i in 0..3 {
            a[(i, i + 3)] = dt;
        }
        a
    }

    /// Input gain `B`: acceleration into position and velocity, orientation copied.
    fn input_gain(dt: f64) -> DMatrix<f64> {
        let mut b = DMatrix::zeros(GPS_INS_STATE_DIM, INPUT_DIM);
        for i in 0..3 {
            b[(i, i)] = 0.5 * dt * dt;
            b[(i + 3, i)] = dt;
        }
        for i in 0..4 {
            b[(i + 6, i + 3)] = 1.0;
        }
        b
    }

    /// Process noise `Q` from the accelerometer standard deviation.
    fn process_noise(&self, dt: f64) -> DMatrix<f64> {
        let sigma_a = self.noise.accelerometer_std_dev;
        let pos = 0.5 * dt * dt * sigma_a;
        let vel = dt * sigma_a;
        let std_devs = DVector::from_column_slice(&[
            pos, pos, pos, vel, vel, vel, 0.0, 0.0, 0.0, 0.0,
        ]);
        DMatrix::from_diagonal(&std_devs.component_mul(&std_devs))
    }

    /// Observation noise `R` from the GPS standard deviations.
    fn observation_noise(&self) -> DMatrix<f64> {
        let p = self.noise.gps_position_std_dev;
        let v = self.noise.gps_velocity_std_dev;
        let std_devs = DVector::from_column_slice(&[p.x, p.y, p.z, v.x, v.y, v.z]);
        DMatrix::from_diagonal(&std_devs.component_mul(&std_devs))
    }

    /// Runs one predict/correct cycle and returns the new estimates.
    pub fn filter(&mut self, observation: &GpsInsObservation, input: &GpsInsInput) -> GpsInsEstimate {
        let dt = observation.time - self.posterior.last_update_timestamp;

        let a = Self::transition(dt);
        let b = Self::input_gain(dt);
        let q = self.process_noise(dt);
        let r = self.observation_noise();

        let acc = input.acceleration_world;
        let quat = input.orientation.as_ref();
        let u = DVector::from_column_slice(&[acc.x, acc.y, acc.z, quat.i, quat.j, quat.k, quat.w]);

        // Without a fix the observation matrix is zero, which turns the Kalman
        // gain to zero and leaves the prediction untouched.
        let (h, z) = match &observation.gps {
            Some(fix) => (
                DMatrix::identity(OBSERVATION_DIM, GPS_INS_STATE_DIM),
                DVector::from_column_slice(&[
                    fix.position.x,
                    fix.position.y,
                    fix.position.z,
                    fix.velocity.x,
                    fix.velocity.y,
                    fix.velocity.z,
                ]),
            ),
            None => (
                DMatrix::zeros(OBSERVATION_DIM, GPS_INS_STATE_DIM),
                DVector::zeros(OBSERVATION_DIM),
            ),
        };

        // Dead reckoning
        self.blind = &a * &self.blind + &b * &u;

        // Predict
        let x_prior = &a * &self.posterior.vector + &b * &u;
        let p_prior = &a * &self.posterior.covariance * a.transpose() + q;

        // Correct
        let residual = &z - &h * &x_prior;
        let s = &h * &p_prior * h.transpose() + r;
        // An all-zero S means perfect, noiseless sensors and no fix. Trust the model.
        let s_inv = if s.iter().all(|v| v.abs() < 1e-12) {
            DMatrix::zeros(OBSERVATION_DIM, OBSERVATION_DIM)
        } else {
            s.try_inverse().unwrap_or_else(|| {
                trace!("GPS/INS innovation covariance is singular, skipping correction");
                DMatrix::zeros(OBSERVATION_DIM, OBSERVATION_DIM)
            })
        };
        let k_gain = &p_prior * h.transpose() * s_inv;

        let identity = DMatrix::<f64>::identity(GPS_INS_STATE_DIM, GPS_INS_STATE_DIM);
        self.posterior.vector = x_prior + &k_gain * residual;
        self.posterior.covariance = (identity - &k_gain * &h) * p_prior;
        self.posterior.last_update_timestamp = observation.time;

        let observed_position = observation.gps.map_or_else(Vector3::zeros, |fix| fix.position);

        GpsInsEstimate {
            posterior: self.read(&self.posterior.vector),
            blind: self.read(&self.blind),
            observed_position,
            time: observation.time,
        }
    }

    fn read(&self, vector: &DVector<f64>) -> GpsInsState {
        GpsInsState {
            position: self.posterior.position_of(vector),
            velocity: self.posterior.velocity_of(vector),
            orientation: self.posterior.orientation_of(vector),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const F64_EPSILON: f64 = 1e-9;

    fn noise(gps_std: f64) -> GpsInsNoise {
        GpsInsNoise {
            accelerometer_std_dev: 0.7,
            gps_position_std_dev: Vector3::repeat(gps_std),
            gps_velocity_std_dev: Vector3::repeat(gps_std),
        }
    }

    fn level_input(acceleration_world: Vector3<f64>) -> GpsInsInput {
        GpsInsInput {
            acceleration_world,
            orientation: UnitQuaternion::identity(),
        }
    }

    #[test]
    fn without_fixes_posterior_follows_dead_reckoning() {
        let initial = PhysicalState::at_rest(Vector3::new(0.0, 10.0, 0.0));
        let mut filter = GpsInsFilter::new(&initial, 0.0, noise(2.0));
        let accel = Vector3::new(1.0, 0.0, -2.0);

        let mut last = None;
        for i in 1..=10 {
            let obs = GpsInsObservation {
                time: i as f64 * 0.1,
                gps: None,
            };
            last = Some(filter.filter(&obs, &level_input(accel)));
        }
        let est = last.unwrap();

        // p = p0 + 0.5 a t^2 at t = 1 s
        assert_abs_diff_eq!(est.posterior.position.x, 0.5, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(est.posterior.position.y, 10.0, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(est.posterior.position.z, -1.0, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(est.posterior.velocity.z, -2.0, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(est.blind.position, est.posterior.position, epsilon = F64_EPSILON);
        assert_eq!(est.observed_position, Vector3::zeros());
    }

    #[test]
    fn accurate_fix_pulls_posterior_towards_gps() {
        let initial = PhysicalState::at_rest(Vector3::zeros());
        let mut filter = GpsInsFilter::new(&initial, 0.0, noise(1e-4));
        let fix = GpsFix {
            position: Vector3::new(3.0, 4.0, 5.0),
            velocity: Vector3::zeros(),
        };
        let est = filter.filter(
            &GpsInsObservation {
                time: 0.1,
                gps: Some(fix),
            },
            &level_input(Vector3::zeros()),
        );

        assert_abs_diff_eq!(est.posterior.position, fix.position, epsilon = 1e-3);
        assert_eq!(est.observed_position, fix.position);
        // The blind estimate never sees the fix.
        assert_abs_diff_eq!(est.blind.position, Vector3::zeros(), epsilon = F64_EPSILON);
    }

    #[test]
    fn noisy_fix_only_nudges_the_estimate() {
        let initial = PhysicalState::at_rest(Vector3::zeros());
        let mut filter = GpsInsFilter::new(&initial, 0.0, noise(3.0));
        let fix = GpsFix {
            position: Vector3::new(10.0, 0.0, 0.0),
            velocity: Vector3::zeros(),
        };
        let est = filter.filter(
            &GpsInsObservation {
                time: 1.0 / 60.0,
                gps: Some(fix),
            },
            &level_input(Vector3::zeros()),
        );

        assert!(est.posterior.position.x > 0.0);
        assert!(est.posterior.position.x < 0.1);
    }

    #[test]
    fn noiseless_sensors_without_fix_stay_finite() {
        let initial = PhysicalState::at_rest(Vector3::new(1.0, 2.0, 3.0));
        let mut filter = GpsInsFilter::new(&initial, 0.0, noise(0.0));
        let est = filter.filter(
            &GpsInsObservation { time: 0.5, gps: None },
            &level_input(Vector3::zeros()),
        );
        assert!(est.posterior.position.iter().all(|v| v.is_finite()));
        assert!(filter.state().covariance.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn orientation_is_taken_from_the_input() {
        let initial = PhysicalState::at_rest(Vector3::zeros());
        let mut filter = GpsInsFilter::new(&initial, 0.0, noise(2.0));
        let q = UnitQuaternion::from_euler_angles(0.0, 0.4, 0.0);
        let est = filter.filter(
            &GpsInsObservation { time: 0.1, gps: None },
            &GpsInsInput {
                acceleration_world: Vector3::zeros(),
                orientation: q,
            },
        );
        assert_abs_diff_eq!(est.posterior.orientation.angle_to(&q), 0.0, epsilon = 1e-9);
    }
}
