//! Outbound application events.
//!
//! The [`DecisionEngine`](super::engine::DecisionEngine) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to stdout, append to a file, etc.

use crate::control::cycling::CyclingMode;
use crate::control::rules::{DehumRule, VentRule};
use crate::error::{ActuatorError, SensorError};

use super::ports::Line;

/// Where the indoor values used this cycle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndoorSourceKind {
    /// A fresh probe reading.
    Live,
    /// Probe failed; the last smoothed averages were reused.
    History,
    /// Probe failed with no history; the caller's hint or the configured
    /// fallbacks were used.
    Fallback,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic telemetry snapshot, one per completed cycle.
    Telemetry(TelemetryData),

    /// Outdoor data unavailable; no decisions were made.
    CycleAborted { reason: SensorError },

    /// Indoor probe failed; the cycle continued on substitute values.
    IndoorDegraded {
        error: SensorError,
        source: IndoorSourceKind,
    },

    /// Both desired states with the rules that produced them.
    Decision {
        vent_on: bool,
        vent_rule: VentRule,
        dehumidifier_on: bool,
        dehumidifier_rule: DehumRule,
    },

    /// The cycling mode changed (entered, switched or cleared).
    CyclingModeChanged { from: CyclingMode, to: CyclingMode },

    /// A line was switched.  `immediate` marks the AQI emergency close.
    Actuated { line: Line, on: bool, immediate: bool },

    /// A desired change was held back by the per-line rate limit.
    ActuationSuppressed {
        line: Line,
        desired: bool,
        remaining_ms: u64,
    },

    /// A query or switch on `line` failed.
    ActuatorFault { line: Line, error: ActuatorError },

    /// The engine has been constructed and is ready to run cycles.
    Started { vent_on: bool, dehumidifier_on: bool },
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub cycle: u64,
    pub avg_aqi: f32,
    pub avg_outdoor_humidity: f32,
    pub avg_outdoor_temp_f: f32,
    pub avg_indoor_humidity: f32,
    pub avg_indoor_temp_f: f32,
    pub vent_on: bool,
    pub dehumidifier_on: bool,
    pub mode: CyclingMode,
}
