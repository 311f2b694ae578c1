// heli_sim/src/simulation/sensors/range_finder.rs

use std::sync::Arc;

use heli_core::navigation::TerrainMap;
use heli_core::types::PhysicalState;
use nalgebra::Vector3;

/// Metres.
const MAX_RANGE: f64 = 10.0;
const RESOLUTION: f64 = 0.001;

/// Laser range finder pointing along the body down axis, reporting the vertical
/// height above the ground it hits.
pub struct RangeFinder {
    map: Arc<dyn TerrainMap>,
}

impl RangeFinder {
    pub fn new(map: Arc<dyn TerrainMap>) -> Self {
        Self { map }
    }

    /// Height above ground, `NaN` when the ground is out of range. At or below
    /// the ground the (non-positive) height above ground is returned directly.
    pub fn measure(&self, state: &PhysicalState) -> f64 {
        let origin = state.position;
        let height = self.map.height_above_ground(&origin);
        if height <= 0.0 {
            return height;
        }

        let direction = -state.axes().up;
        let above_ground = |distance: f64| {
            self.map.height_above_ground(&(origin + direction * distance)) > 0.0
        };
        if above_ground(MAX_RANGE) {
            return f64::NAN;
        }

        // Invariant: above ground at `near`, at or below ground at `far`.
        let (mut near, mut far) = (0.0, MAX_RANGE);
        while far - near > RESOLUTION {
            let mid = 0.5 * (near + far);
            if above_ground(mid) {
                near = mid;
            } else {
                far = mid;
            }
        }

        let hit: Vector3<f64> = direction * far;
        -hit.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use heli_core::navigation::NavigationMap;
    use heli_core::utils::angles;
    use nalgebra::UnitQuaternion;

    fn finder(altitude: f64) -> RangeFinder {
        RangeFinder::new(Arc::new(NavigationMap::flat(altitude)))
    }

    #[test]
    fn measures_height_when_level() {
        let state = PhysicalState::at_rest(Vector3::new(3.0, 7.5, -2.0));
        assert_abs_diff_eq!(finder(2.0).measure(&state), 5.5, epsilon = RESOLUTION);
    }

    #[test]
    fn tilted_ray_still_reports_vertical_height() {
        let orientation = angles::add_pitch_roll_yaw(&UnitQuaternion::identity(), 0.0, 0.5, 0.0);
        let state = PhysicalState::new(
            orientation,
            Vector3::new(0.0, 4.0, 0.0),
            Vector3::zeros(),
            Vector3::zeros(),
        );
        assert_abs_diff_eq!(finder(0.0).measure(&state), 4.0, epsilon = 2.0 * RESOLUTION);
    }

    #[test]
    fn out_of_range_is_nan() {
        let state = PhysicalState::at_rest(Vector3::new(0.0, 30.0, 0.0));
        assert!(finder(0.0).measure(&state).is_nan());

        // Upside down, the ray points at the sky.
        let flipped = PhysicalState::new(
            angles::add_pitch_roll_yaw(&UnitQuaternion::identity(), std::f64::consts::PI, 0.0, 0.0),
            Vector3::new(0.0, 2.0, 0.0),
            Vector3::zeros(),
            Vector3::zeros(),
        );
        assert!(finder(0.0).measure(&flipped).is_nan());
    }

    #[test]
    fn below_ground_reports_negative_height() {
        let state = PhysicalState::at_rest(Vector3::new(0.0, 0.5, 0.0));
        assert_abs_diff_eq!(finder(1.0).measure(&state), -0.5);
    }
}
