// heli_core/src/messages.rs

use nalgebra::{UnitQuaternion, Vector3};

use crate::types::ForwardRightUp;

/// One GPS position/velocity fix in world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

/// Inertial measurements for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuReading {
    /// Measured acceleration rotated into world frame.
    pub acceleration_world: Vector3<f64>,
    /// Measured acceleration along the body axes.
    pub acceleration_local: ForwardRightUp,
    /// Orientation integrated from gyro deltas (plus orientation noise).
    pub orientation: UnitQuaternion<f64>,
    /// Pitch, roll and yaw rates in rad/s.
    pub angular_rate: Vector3<f64>,
    /// Pitch, roll and yaw change over the tick in rad.
    pub angular_delta: Vector3<f64>,
}

impl Default for ImuReading {
    fn default() -> Self {
        Self {
            acceleration_world: Vector3::zeros(),
            acceleration_local: ForwardRightUp::default(),
            orientation: UnitQuaternion::identity(),
            angular_rate: Vector3::zeros(),
            angular_delta: Vector3::zeros(),
        }
    }
}

/// Everything the sensor model observed this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReadings {
    /// A fix produced on this tick, `None` between GPS updates.
    pub gps: Option<GpsFix>,
    /// True once the GPS has produced its first fix.
    pub gps_ready: bool,
    pub imu: ImuReading,
    /// Height above ground along the body down axis. NaN when nothing is in range.
    pub range_finder_height: f64,
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self {
            gps: None,
            gps_ready: false,
            imu: ImuReading::default(),
            range_finder_height: f64::NAN,
        }
    }
}

impl SensorReadings {
    /// The range finder height, or `None` when out of range.
    pub fn range_finder(&self) -> Option<f64> {
        Some(self.range_finder_height).filter(|h| !h.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_range_reads_as_missing() {
        let mut readings = SensorReadings::default();
        assert_eq!(readings.range_finder(), None);
        readings.range_finder_height = 3.2;
        assert_eq!(readings.range_finder(), Some(3.2));
    }
}
