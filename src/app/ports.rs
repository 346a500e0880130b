//! Port traits separating the decision engine from sensors, relays and storage.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DecisionEngine (domain)
//! ```
//!
//! Driven adapters (air station, indoor probe, relay lines, clock, event
//! sinks, config storage) implement these traits.  The
//! [`DecisionEngine`](super::engine::DecisionEngine) consumes them via
//! generics and never reaches a GPIO line or socket itself.

use core::fmt;

use crate::config::SystemConfig;
use crate::error::{ActuatorError, SensorError};

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapters: hardware / network → domain)
// ───────────────────────────────────────────────────────────────

/// One successful outdoor station sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutdoorReading {
    /// PM2.5 air quality index.
    pub pm25_aqi: i32,
    /// Relative humidity (%).
    pub humidity: f32,
    /// Temperature (°F).
    pub temperature_f: f32,
}

/// One successful indoor probe sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndoorReading {
    /// Temperature (°F).
    pub temperature_f: f32,
    /// Relative humidity (%).
    pub humidity: f32,
}

/// Outdoor air station.  Called every cycle; failures are returned, never panic.
pub trait OutdoorSource {
    fn refresh(&mut self) -> Result<OutdoorReading, SensorError>;
}

/// Indoor temperature/humidity probe.
///
/// Implementations may retry internally and enforce their own minimum
/// spacing between physical reads.  Implausible values are reported as
/// errors, never as readings.
pub trait IndoorSource {
    fn read(&mut self) -> Result<IndoorReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Relay lines
// ───────────────────────────────────────────────────────────────

/// The two output lines the controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    Vent,
    Dehumidifier,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vent => write!(f, "vent"),
            Self::Dehumidifier => write!(f, "dehumidifier"),
        }
    }
}

/// What an activate/deactivate call did to the physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The line changed state.
    Switched,
    /// The line was already in the requested state; nothing was written.
    Unchanged,
}

/// Write-side port: binary on/off control with state query.
///
/// `activate`/`deactivate` are idempotent.  An `Err` leaves the line state
/// indeterminate; callers must re-query rather than assume.
pub trait ActuatorPort {
    fn activate(&mut self, line: Line) -> Result<Transition, ActuatorError>;

    fn deactivate(&mut self, line: Line) -> Result<Transition, ActuatorError>;

    /// Last commanded / observed state of `line`.
    fn query(&mut self, line: Line) -> Result<bool, ActuatorError>;

    /// Drive every line off — safe shutdown.
    fn all_off(&mut self);

    /// Convenience wrapper choosing activate or deactivate.
    fn set(&mut self, line: Line, on: bool) -> Result<Transition, ActuatorError> {
        if on {
            self.activate(line)
        } else {
            self.deactivate(line)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source for phase and debounce calculations.
pub trait TimePort {
    /// Milliseconds since an arbitrary fixed origin (monotonic).
    fn uptime_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Events
// ───────────────────────────────────────────────────────────────

/// Receives every [`AppEvent`](super::events::AppEvent) the engine raises.
/// Implementations decide where they go (log lines, test recorders).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration storage
// ───────────────────────────────────────────────────────────────

/// Reads and writes the [`SystemConfig`] document.
///
/// Implementations MUST validate before persisting.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`SystemConfig::default()`] if none is stored.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Rejects invalid values before anything is written.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations and config validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config could not be deserialized.
    Corrupted,
    /// A field is out of its allowed range; the message names the field.
    ValidationFailed(&'static str),
    /// Reading or writing the backing file failed.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
