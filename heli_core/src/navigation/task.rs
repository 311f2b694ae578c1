// heli_core/src/navigation/task.rs

use crate::error::CoreError;
use crate::navigation::Waypoint;

/// An ordered flight plan.
///
/// A non-looping task consumes its head waypoint on every [`Task::next`]; a looping
/// task cycles through its waypoints forever.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    waypoints: Vec<Waypoint>,
    all_waypoints: Vec<Waypoint>,
    current: usize,
    /// Metres above ground to hold while flying, or non-positive to follow the
    /// waypoint altitudes.
    pub hold_height_above_ground: f64,
    pub looping: bool,
}

impl Task {
    pub fn new(
        waypoints: Vec<Waypoint>,
        hold_height_above_ground: f64,
        looping: bool,
    ) -> Result<Self, CoreError> {
        if waypoints.is_empty() {
            return Err(CoreError::EmptyTask);
        }
        Ok(Self {
            all_waypoints: waypoints.clone(),
            waypoints,
            current: 0,
            hold_height_above_ground,
            looping,
        })
    }

    pub fn holds_height_above_ground(&self) -> bool {
        self.hold_height_above_ground > 0.0
    }

    pub fn current(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.current)
    }

    pub fn current_mut(&mut self) -> Option<&mut Waypoint> {
        self.waypoints.get_mut(self.current)
    }

    /// Waypoints not yet consumed, starting with the current one for non-looping tasks.
    pub fn remaining(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// The full plan as it was created.
    pub fn all_waypoints(&self) -> &[Waypoint] {
        &self.all_waypoints
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn next(&mut self) {
        if self.waypoints.is_empty() {
            return;
        }
        if self.looping {
            self.current = (self.current + 1) % self.waypoints.len();
        } else {
            self.waypoints.remove(0);
        }
    }
}
