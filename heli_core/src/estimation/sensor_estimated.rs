// heli_core/src/estimation/sensor_estimated.rs

use nalgebra::UnitQuaternion;
use tracing::debug;

use crate::estimation::filters::{GpsInsFilter, GpsInsInput, GpsInsNoise, GpsInsObservation};
use crate::estimation::{EstimatedStates, EstimatorInput, StateEstimator};
use crate::types::PhysicalState;

/// Estimates the state from GPS and IMU readings through a [`GpsInsFilter`].
///
/// The filter is only created once the sensors report ready, starting from the
/// state the helicopter was placed in.
#[derive(Debug, Clone)]
pub struct SensorEstimatedState {
    initial_state: PhysicalState,
    noise: GpsInsNoise,
    filter: Option<GpsInsFilter>,
    current: Option<EstimatedStates>,
}

impl SensorEstimatedState {
    pub fn new(initial_state: PhysicalState, noise: GpsInsNoise) -> Self {
        Self {
            initial_state,
            noise,
            filter: None,
            current: None,
        }
    }
}

impl StateEstimator for SensorEstimatedState {
    fn is_ready(&self) -> bool {
        self.filter.is_some()
    }

    fn process(&mut self, input: &EstimatorInput) {
        let readings = input.readings;

        if self.filter.is_none() && readings.gps_ready {
            let start_time = input.total_time - input.dt;
            debug!(start_time, "sensors ready, starting GPS/INS filter");
            self.filter = Some(GpsInsFilter::new(&self.initial_state, start_time, self.noise));
        }
        let Some(filter) = self.filter.as_mut() else {
            return;
        };

        let observation = GpsInsObservation {
            time: input.total_time,
            gps: readings.gps,
        };
        let model_input = GpsInsInput {
            acceleration_world: readings.imu.acceleration_world,
            orientation: readings.imu.orientation,
        };
        let estimate = filter.filter(&observation, &model_input);

        let accel = readings.imu.acceleration_world;
        self.current = Some(EstimatedStates {
            estimated: estimate.posterior.to_physical(accel),
            blind: estimate.blind.to_physical(accel),
            observed: PhysicalState::new(
                UnitQuaternion::identity(),
                estimate.observed_position,
                Default::default(),
                Default::default(),
            ),
        });
    }

    fn get_state(&self) -> Option<EstimatedStates> {
        self.current
    }
}
