// heli_sim/src/simulation/logging/flight_log.rs

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use heli_core::navigation::Waypoint;
use heli_core::types::{ForwardRightUp, PhysicalState};
use serde::{Deserialize, Serialize};

/// Everything worth plotting about one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HelicopterLogSnapshot {
    pub true_state: PhysicalState,
    pub observed_state: PhysicalState,
    pub estimated_state: PhysicalState,
    pub blind_estimated_state: PhysicalState,
    /// Body-frame accelerometer reading.
    pub accelerometer: ForwardRightUp,
    /// Ground altitude below the true position.
    pub ground_altitude: f64,
    /// Seconds since the simulation started.
    pub time: f64,
}

/// A recorded flight: the planned waypoints and one snapshot per tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightLog {
    pub waypoints: Vec<Waypoint>,
    pub samples: Vec<HelicopterLogSnapshot>,
}

impl FlightLog {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self {
            waypoints,
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, snapshot: HelicopterLogSnapshot) {
        self.samples.push(snapshot);
    }

    pub fn last(&self) -> Option<&HelicopterLogSnapshot> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Write the log to a JSON file (pretty-printed)
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, self).map_err(io::Error::other)
    }

    /// Read a log written by [`FlightLog::to_json`]
    pub fn from_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = BufReader::new(File::open(path)?);
        serde_json::from_reader(file).map_err(io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use heli_core::navigation::WaypointKind;
    use heli_core::utils::angles;
    use nalgebra::Vector3;

    fn snapshot(i: usize) -> HelicopterLogSnapshot {
        let t = i as f64 / 60.0;
        let true_state = PhysicalState::new(
            angles::from_yaw_pitch_roll(0.1 * t, 0.02, -0.03),
            Vector3::new(t, 10.0 + t.sin(), -3.0 * t),
            Vector3::new(1.0, t.cos(), -3.0),
            Vector3::new(0.0, -0.1, 0.2),
        );
        let mut estimated_state = true_state;
        estimated_state.position += Vector3::new(0.3, -0.1, 0.7);
        HelicopterLogSnapshot {
            true_state,
            observed_state: PhysicalState::at_rest(true_state.position),
            estimated_state,
            blind_estimated_state: PhysicalState::default(),
            accelerometer: ForwardRightUp::new(0.1, -0.2, 9.7),
            ground_altitude: 1.25,
            time: t,
        }
    }

    #[test]
    fn written_log_reads_back_in_order() {
        let mut log = FlightLog::new(vec![
            Waypoint::new(Vector3::new(0.0, 10.0, -40.0), 0.5, WaypointKind::Hover, 5.0),
            Waypoint::new(Vector3::new(20.0, 10.0, -40.0), 0.0, WaypointKind::Land, 2.0),
        ]);
        for i in 0..120 {
            log.push(snapshot(i));
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flightlog.json");
        log.to_json(&path).unwrap();
        let back = FlightLog::from_json(&path).unwrap();

        assert_eq!(back.waypoints, log.waypoints);
        assert_eq!(back.len(), log.len());
        for (a, b) in back.samples.iter().zip(&log.samples) {
            assert_abs_diff_eq!(a.time, b.time, epsilon = 1e-12);
            assert_abs_diff_eq!(a.true_state.position, b.true_state.position, epsilon = 1e-12);
            assert_abs_diff_eq!(a.estimated_state.position, b.estimated_state.position, epsilon = 1e-12);
            assert_abs_diff_eq!(a.true_state.orientation, b.true_state.orientation, epsilon = 1e-12);
            assert_eq!(a.accelerometer, b.accelerometer);
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FlightLog::from_json(dir.path().join("nope.json")).is_err());
    }
}
