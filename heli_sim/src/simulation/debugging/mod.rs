// heli_sim/src/simulation/debugging/mod.rs

pub mod state_error;

pub use state_error::StateError;
