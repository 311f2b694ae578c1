// heli_core/src/estimation/filters/mod.rs

pub mod gps_ins;

pub use gps_ins::{GpsInsFilter, GpsInsInput, GpsInsNoise, GpsInsObservation};
