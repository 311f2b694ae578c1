// heli_core/src/control/mod.rs

pub mod autopilot;
pub mod heli_state;
pub mod output_controller;
pub mod pid;

pub use autopilot::{Autopilot, NavigationState};
pub use heli_state::{Angles, HeliState};
pub use output_controller::OutputController;
pub use pid::{Pid, PidGains, PidSetup};
