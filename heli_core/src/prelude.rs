// heli_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::estimation::StateEstimator;
pub use crate::navigation::TerrainMap;
pub use crate::physics::PhysicsEngine;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::error::CoreError;
pub use crate::estimation::{EstimatedStates, EstimatorInput};
pub use crate::frames::{FrameAwareState, FrameId, StateVariable};
pub use crate::messages::{GpsFix, ImuReading, SensorReadings};
pub use crate::navigation::{NavigationMap, Task, Waypoint, WaypointKind};
pub use crate::physics::{HeliParameters, IntegratorKind, SimulationStepResult};
pub use crate::types::{Axes, ControlGoal, ForwardRightUp, JoystickOutput, PhysicalState};

// --- Estimation Algorithms ---
pub use crate::estimation::filters::{GpsInsFilter, GpsInsNoise};
pub use crate::estimation::{PerfectState, SensorEstimatedState};

// --- Control ---
pub use crate::control::{Autopilot, HeliState, NavigationState, Pid, PidGains, PidSetup};
pub use crate::physics::HeliPhysics;
