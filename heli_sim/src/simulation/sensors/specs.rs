// heli_sim/src/simulation/sensors/specs.rs

use std::fmt;

use heli_core::estimation::filters::GpsInsNoise;
use heli_core::types::ForwardRightUp;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Knots to metres per second.
const KNOT: f64 = 0.0514444444 * 10.0;

fn default_accelerometer_std_dev() -> ForwardRightUp {
    ForwardRightUp::new(0.708, 0.708, 0.885)
}

fn default_accelerometer_frequency() -> f64 {
    60.0
}

fn default_gps_position_std_dev() -> f64 {
    2.824743927
}

fn default_gps_velocity_std_dev() -> f64 {
    KNOT * KNOT / 3.0
}

/// Noise characteristics of the simulated sensor suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorSpecifications {
    /// m/s^2 per body axis.
    #[serde(default = "default_accelerometer_std_dev")]
    pub accelerometer_std_dev: ForwardRightUp,
    /// Hz
    #[serde(default = "default_accelerometer_frequency")]
    pub accelerometer_frequency: f64,
    /// Metres, per world axis.
    #[serde(default = "default_gps_position_std_dev")]
    pub gps_position_std_dev: f64,
    /// m/s, per world axis.
    #[serde(default = "default_gps_velocity_std_dev")]
    pub gps_velocity_std_dev: f64,
    /// Degrees. Zero disables orientation noise.
    #[serde(default)]
    pub orientation_angle_noise_std_dev: f64,
}

impl Default for SensorSpecifications {
    fn default() -> Self {
        Self {
            accelerometer_std_dev: default_accelerometer_std_dev(),
            accelerometer_frequency: default_accelerometer_frequency(),
            gps_position_std_dev: default_gps_position_std_dev(),
            gps_velocity_std_dev: default_gps_velocity_std_dev(),
            orientation_angle_noise_std_dev: 0.0,
        }
    }
}

impl SensorSpecifications {
    /// Noise the GPS/INS filter is tuned with.
    pub fn filter_noise(&self) -> GpsInsNoise {
        GpsInsNoise {
            accelerometer_std_dev: self.accelerometer_std_dev.forward,
            gps_position_std_dev: Vector3::repeat(self.gps_position_std_dev),
            gps_velocity_std_dev: Vector3::repeat(self.gps_velocity_std_dev),
        }
    }
}

impl fmt::Display for SensorSpecifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.accelerometer_std_dev;
        writeln!(
            f,
            "Accelerometer: {} Hz, std dev F/R/U {}/{}/{} m/s^2",
            self.accelerometer_frequency, a.forward, a.right, a.up
        )?;
        writeln!(
            f,
            "GPS: std dev position {} m, velocity {} m/s",
            self.gps_position_std_dev, self.gps_velocity_std_dev
        )?;
        writeln!(
            f,
            "Orientation noise: std dev {} deg",
            self.orientation_angle_noise_std_dev
        )
    }
}
