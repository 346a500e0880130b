//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the vent controller:
//! smoothing, rule evaluation, duty cycling and debounced actuation.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod engine;
pub mod events;
pub mod ports;
