// heli_sim/src/simulation/mod.rs

pub mod config;
pub mod core;
pub mod debugging;
pub mod error;
pub mod helicopter;
pub mod input;
pub mod logging;
pub mod sensors;
pub mod testing;
