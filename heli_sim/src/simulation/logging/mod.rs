// heli_sim/src/simulation/logging/mod.rs

pub mod flight_log;

pub use flight_log::{FlightLog, HelicopterLogSnapshot};
