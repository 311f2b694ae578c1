// heli_core/src/navigation/mod.rs

use nalgebra::{Vector2, Vector3};

use crate::utils::angles::to_horizontal;

pub mod map;
pub mod task;
pub mod waypoint;

pub use map::NavigationMap;
pub use task::Task;
pub use waypoint::{Waypoint, WaypointKind};

/// The ground-altitude query surface. Implementations must be cheap, the step loop
/// calls them several times per tick.
pub trait TerrainMap: Send + Sync {
    /// Ground altitude below a horizontal `(x, z)` map position.
    fn altitude(&self, map_position: &Vector2<f64>) -> f64;

    /// Ground altitude directly below a world position.
    fn ground_altitude(&self, position: &Vector3<f64>) -> f64 {
        self.altitude(&to_horizontal(position))
    }

    fn height_above_ground(&self, position: &Vector3<f64>) -> f64 {
        position.y - self.ground_altitude(position)
    }
}
