// heli_core/src/lib.rs

// Framework-free flight algorithms: physics, estimation and control.
pub mod control;
pub mod error;
pub mod estimation;
pub mod frames;
pub mod messages;
pub mod navigation;
pub mod physics;
pub mod prelude;
pub mod types;
pub mod utils;
