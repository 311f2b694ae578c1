// heli_sim/src/prelude.rs

// Re-export the heli_core prelude so pure types like `PhysicalState`,
// `Waypoint` or `PidSetup` are one import away.
pub use heli_core::prelude::*;

// Common simulation-specific types.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::core::app_state::{EndTrigger, RunnerState};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::error::SimError;
pub use crate::simulation::helicopter::{ControlRequest, HelicopterSim, TickReport};
pub use crate::simulation::input::{InputSource, NoInput, RawSticks};
pub use crate::simulation::logging::{FlightLog, HelicopterLogSnapshot};
pub use crate::simulation::sensors::SensorSpecifications;
pub use crate::simulation::testing::{ScenarioRunner, ScenarioTestResult, TestResults};
