// heli_core/src/utils/angles.rs

//! Orientation helpers for the simulator's world frame.
//!
//! World axes: +Y up, +X right, -Z forward. Horizontal (map) coordinates are the
//! `(x, z)` pair of a world vector.

use nalgebra::{UnitQuaternion, Vector2, Vector3};
use num_traits::{Float, FloatConst};

use crate::types::Axes;

/// Body forward/right/up expressed in world coordinates.
pub fn axes_of(orientation: &UnitQuaternion<f64>) -> Axes {
    Axes {
        forward: orientation * Vector3::new(0.0, 0.0, -1.0),
        right: orientation * Vector3::new(1.0, 0.0, 0.0),
        up: orientation * Vector3::new(0.0, 1.0, 0.0),
    }
}

/// Drops the vertical component: `(x, y, z) -> (x, z)`.
pub fn to_horizontal(v: &Vector3<f64>) -> Vector2<f64> {
    Vector2::new(v.x, v.z)
}

/// Heading angle of a horizontal vector in radians. Zero points along -Z and the
/// angle grows counter-clockwise seen from above. A zero vector has heading 0.
pub fn heading_of(h: &Vector2<f64>) -> f64 {
    if h.norm_squared() < 1e-12 {
        return 0.0;
    }
    (-h.x).atan2(-h.y)
}

/// Heading of the horizontal projection of the body forward axis.
pub fn heading_angle(orientation: &UnitQuaternion<f64>) -> f64 {
    let forward = orientation * Vector3::new(0.0, 0.0, -1.0);
    heading_of(&to_horizontal(&forward))
}

/// Nose up is positive.
pub fn pitch_angle(orientation: &UnitQuaternion<f64>) -> f64 {
    let forward = orientation * Vector3::new(0.0, 0.0, -1.0);
    forward.y.clamp(-1.0, 1.0).asin()
}

/// Right side down is positive.
pub fn roll_angle(orientation: &UnitQuaternion<f64>) -> f64 {
    let right = orientation * Vector3::new(1.0, 0.0, 0.0);
    (-right.y).clamp(-1.0, 1.0).asin()
}

/// Wraps an angle into `(-pi, pi]`.
pub fn wrap_angle<T: Float + FloatConst>(angle: T) -> T {
    let two_pi = T::PI() + T::PI();
    let mut wrapped = angle % two_pi;
    if wrapped <= -T::PI() {
        wrapped = wrapped + two_pi;
    } else if wrapped > T::PI() {
        wrapped = wrapped - two_pi;
    }
    wrapped
}

/// Shortest signed rotation from `b` to `a`, i.e. `a - b` wrapped to `(-pi, pi]`.
pub fn diff_angle<T: Float + FloatConst>(a: T, b: T) -> T {
    wrap_angle(a - b)
}

/// Rotates `orientation` about its own axes. Positive pitch raises the nose,
/// positive roll lowers the right side, positive yaw increases the heading.
pub fn add_pitch_roll_yaw(
    orientation: &UnitQuaternion<f64>,
    pitch: f64,
    roll: f64,
    yaw: f64,
) -> UnitQuaternion<f64> {
    orientation * UnitQuaternion::from_scaled_axis(Vector3::new(pitch, yaw, -roll))
}

/// Rotation built yaw first (about Y), then pitch (about X), then roll (about Z).
pub fn from_yaw_pitch_roll(yaw: f64, pitch: f64, roll: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw)
        * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), pitch)
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), roll)
}

/// Scalar projection of `v` onto the direction of `onto`. Zero when `onto` is zero.
pub fn project(v: &Vector2<f64>, onto: &Vector2<f64>) -> f64 {
    match onto.try_normalize(1e-12) {
        Some(dir) => v.dot(&dir),
        None => 0.0,
    }
}

/// Maps `value` linearly from `[from_min, from_max]` to `[to_min, to_max]`.
pub fn lerp_range(value: f64, from_min: f64, from_max: f64, to_min: f64, to_max: f64) -> f64 {
    let t = (value - from_min) / (from_max - from_min);
    to_min + t * (to_max - to_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    const F64_EPSILON: f64 = 1e-9;

    #[test]
    fn identity_has_zero_angles() {
        let q = UnitQuaternion::identity();
        assert_abs_diff_eq!(pitch_angle(&q), 0.0, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(roll_angle(&q), 0.0, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(heading_angle(&q), 0.0, epsilon = F64_EPSILON);
    }

    #[test]
    fn pitch_roll_yaw_are_recovered_individually() {
        let q = UnitQuaternion::identity();
        assert_abs_diff_eq!(
            pitch_angle(&add_pitch_roll_yaw(&q, 0.3, 0.0, 0.0)),
            0.3,
            epsilon = F64_EPSILON
        );
        assert_abs_diff_eq!(
            roll_angle(&add_pitch_roll_yaw(&q, 0.0, 0.2, 0.0)),
            0.2,
            epsilon = F64_EPSILON
        );
        assert_abs_diff_eq!(
            heading_angle(&add_pitch_roll_yaw(&q, 0.0, 0.0, 0.7)),
            0.7,
            epsilon = F64_EPSILON
        );
    }

    #[test]
    fn positive_roll_tilts_up_axis_to_the_right() {
        let q = add_pitch_roll_yaw(&UnitQuaternion::identity(), 0.0, 0.1, 0.0);
        assert!(axes_of(&q).up.x > 0.0);
    }

    #[test]
    fn nose_down_tilts_up_axis_forward() {
        let q = add_pitch_roll_yaw(&UnitQuaternion::identity(), -0.1, 0.0, 0.0);
        assert!(axes_of(&q).up.z < 0.0);
    }

    #[test]
    fn heading_of_cardinal_directions() {
        assert_abs_diff_eq!(heading_of(&Vector2::new(0.0, -1.0)), 0.0, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(heading_of(&Vector2::new(-1.0, 0.0)), FRAC_PI_2, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(heading_of(&Vector2::new(1.0, 0.0)), -FRAC_PI_2, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(heading_of(&Vector2::zeros()), 0.0, epsilon = F64_EPSILON);
    }

    #[test]
    fn diff_angle_takes_the_short_way_round() {
        assert_abs_diff_eq!(diff_angle(0.1, -0.1), 0.2, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(diff_angle(PI - 0.1, -PI + 0.1), -0.2, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(diff_angle(-PI + 0.1, PI - 0.1), 0.2, epsilon = F64_EPSILON);
        assert_abs_diff_eq!(wrap_angle(2.5 * PI), FRAC_PI_2, epsilon = F64_EPSILON);
    }

    #[test]
    fn projection_onto_zero_vector_is_zero() {
        let v = Vector2::new(1.0, 1.0);
        assert_abs_diff_eq!(project(&v, &Vector2::zeros()), 0.0);
        assert_abs_diff_eq!(
            project(&v, &Vector2::new(2.0, 0.0)),
            1.0,
            epsilon = F64_EPSILON
        );
    }

    #[test]
    fn lerp_range_maps_endpoints() {
        assert_abs_diff_eq!(lerp_range(0.0, 0.0, 1.0, 1.0, 10.0), 1.0);
        assert_abs_diff_eq!(lerp_range(1.0, 0.0, 1.0, 1.0, 10.0), 10.0);
        assert_abs_diff_eq!(lerp_range(0.0, -1.0, 1.0, -10.0, 10.0), 0.0);
    }

    #[test]
    fn yaw_pitch_roll_with_only_yaw_matches_heading() {
        let q = from_yaw_pitch_roll(FRAC_PI_4, 0.0, 0.0);
        assert_abs_diff_eq!(heading_angle(&q), FRAC_PI_4, epsilon = F64_EPSILON);
    }
}
