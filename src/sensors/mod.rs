//! Sensor-side signal conditioning.

pub mod smoothing;
