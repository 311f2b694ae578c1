// heli_core/src/navigation/waypoint.rs

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::utils::angles::to_horizontal;
use crate::utils::serde_helpers::vec3_array;

/// What the autopilot does on reaching a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum WaypointKind {
    /// Fly through without stopping.
    #[default]
    Intermediate,
    /// Hold position for a while, facing the waypoint heading.
    Hover,
    /// End of a test flight.
    TestDestination,
    /// Hold position indefinitely.
    Land,
}

impl WaypointKind {
    /// Default waiting time in seconds.
    pub fn default_seconds_to_wait(self) -> f64 {
        match self {
            WaypointKind::Hover => 2.0,
            WaypointKind::Land => f64::MAX,
            WaypointKind::Intermediate | WaypointKind::TestDestination => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(with = "vec3_array")]
    pub position: Vector3<f64>,
    /// Radians.
    pub heading_angle: f64,
    pub kind: WaypointKind,
    pub radius: f64,
    pub seconds_to_wait: f64,
    pub seconds_waited: f64,
}

impl Waypoint {
    pub fn new(position: Vector3<f64>, heading_angle: f64, kind: WaypointKind, radius: f64) -> Self {
        Self {
            position,
            heading_angle,
            kind,
            radius,
            seconds_to_wait: kind.default_seconds_to_wait(),
            seconds_waited: 0.0,
        }
    }

    pub fn done_waiting(&self) -> bool {
        self.seconds_waited >= self.seconds_to_wait
    }

    /// Strictly inside the capture sphere.
    pub fn is_within_radius(&self, position: &Vector3<f64>) -> bool {
        (self.position - position).norm() < self.radius
    }

    /// Strictly inside the capture circle, ignoring altitude.
    pub fn is_within_horizontal_radius(&self, map_position: &Vector2<f64>) -> bool {
        (to_horizontal(&self.position) - map_position).norm() < self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_check_is_strict() {
        let wp = Waypoint::new(Vector3::zeros(), 0.0, WaypointKind::Intermediate, 5.0);
        assert!(wp.is_within_radius(&Vector3::new(4.999, 0.0, 0.0)));
        assert!(!wp.is_within_radius(&Vector3::new(5.0, 0.0, 0.0)));
        assert!(wp.is_within_horizontal_radius(&Vector2::new(0.0, -4.0)));
    }

    #[test]
    fn waiting_defaults_follow_kind() {
        let hover = Waypoint::new(Vector3::zeros(), 0.0, WaypointKind::Hover, 5.0);
        assert_eq!(hover.seconds_to_wait, 2.0);
        assert!(!hover.done_waiting());

        let pass = Waypoint::new(Vector3::zeros(), 0.0, WaypointKind::Intermediate, 5.0);
        assert!(pass.done_waiting());

        let land = Waypoint::new(Vector3::zeros(), 0.0, WaypointKind::Land, 5.0);
        assert!(!land.done_waiting());
    }
}
