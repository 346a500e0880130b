//! Unified error types for the vent controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! polling loop's error handling uniform.  All variants are `Copy` so they
//! can be carried inside events and cycle reports without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// An actuator line could not be driven or queried.
    Actuator(ActuatorError),
    /// A GPIO line or sensor device could not be opened.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The HTTP request to the outdoor station failed or timed out.
    RequestFailed,
    /// The station answered but the payload could not be decoded.
    MalformedPayload,
    /// Value parsed but lies outside what the sensor can report.
    OutOfRange,
    /// The probe could not be read after every retry.
    ReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed => write!(f, "request failed"),
            Self::MalformedPayload => write!(f, "malformed payload"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::ReadFailed => write!(f, "read failed"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Driving the output line failed.
    GpioWriteFailed,
    /// Reading back the output line state failed.
    GpioReadFailed,
    /// The line was never exported or has disappeared.
    LineUnavailable,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::LineUnavailable => write!(f, "GPIO line unavailable"),
        }
    }
}

impl std::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}
