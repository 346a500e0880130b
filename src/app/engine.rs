//! Decision engine — the hexagonal core.
//!
//! [`DecisionEngine`] owns the smoothing windows, the cycling policy and
//! both debounce gates.  All I/O flows through port traits handed over at
//! construction, so the whole engine runs on the host against mocks.
//!
//! ```text
//!  OutdoorSource ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!  IndoorSource  ──▶ │        DecisionEngine        │
//!  TimePort      ──▶ │ smoothing · rules · cycling  │
//!  ActuatorPort  ◀── │          · debounce          │
//!                    └─────────────────────────────┘
//! ```
//!
//! One call to [`update`](DecisionEngine::update) is one control cycle.
//! The hosting loop decides the period.

use log::{debug, error, info, warn};

use crate::config::SystemConfig;
use crate::control::cycling::{CyclingMode, CyclingPolicy, PhaseState};
use crate::control::debounce::{DebounceGate, GateVerdict};
use crate::control::rules::{Conditions, DehumRule, VentDecision, VentRule, decide_dehumidifier};
use crate::error::{ActuatorError, SensorError};
use crate::sensors::smoothing::RollingAverage;

use super::events::{AppEvent, IndoorSourceKind, TelemetryData};
use super::ports::{
    ActuatorPort, ConfigError, EventSink, IndoorSource, Line, OutdoorSource, TimePort,
};

// ───────────────────────────────────────────────────────────────
// Cycle inputs and results
// ───────────────────────────────────────────────────────────────

/// Caller-supplied indoor values, used only when the probe fails and no
/// indoor history exists yet.  Missing fields fall back to the config.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndoorHint {
    pub humidity: Option<f32>,
    pub temperature_f: Option<f32>,
}

/// What happened on one line during the actuation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuation {
    /// Desired state already held.
    Unchanged,
    /// Line switched through the debounce gate.
    Applied { on: bool },
    /// Vent closed immediately by the AQI override.
    Immediate,
    /// Change held back by the debounce gate.
    Suppressed { remaining_ms: u64 },
    /// Query or switch failed; line state is indeterminate until re-queried.
    Failed(ActuatorError),
}

/// Full account of one completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub now_ms: u64,
    pub avg_aqi: f32,
    pub avg_outdoor_humidity: f32,
    pub avg_outdoor_temp_f: f32,
    pub indoor_humidity: f32,
    pub indoor_temp_f: f32,
    pub indoor_source: IndoorSourceKind,
    pub conditions: Conditions,
    pub vent: VentDecision,
    pub dehumidifier: DehumRule,
    pub mode: CyclingMode,
    pub vent_actuation: Actuation,
    pub dehumidifier_actuation: Actuation,
}

// ───────────────────────────────────────────────────────────────
// DecisionEngine
// ───────────────────────────────────────────────────────────────

pub struct DecisionEngine<O, I, A, C> {
    config: SystemConfig,
    outdoor: O,
    indoor: I,
    actuators: A,
    clock: C,

    aqi: RollingAverage,
    outdoor_humidity: RollingAverage,
    outdoor_temp_f: RollingAverage,
    indoor_humidity: RollingAverage,
    indoor_temp_f: RollingAverage,

    cycling: CyclingPolicy,
    vent_gate: DebounceGate,
    dehum_gate: DebounceGate,

    /// Last state observed by query or confirmed by a successful switch.
    vent_on: bool,
    dehumidifier_on: bool,
    cycle_count: u64,
}

impl<O, I, A, C> DecisionEngine<O, I, A, C>
where
    O: OutdoorSource,
    I: IndoorSource,
    A: ActuatorPort,
    C: TimePort,
{
    /// Build an engine.  The configuration is validated here; an invalid
    /// config never reaches [`update`](Self::update).
    pub fn new(
        config: SystemConfig,
        outdoor: O,
        indoor: I,
        actuators: A,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let window = config.smoothing_samples;
        let min_interval_ms = config.min_change_interval_ms();
        Ok(Self {
            cycling: CyclingPolicy::new(&config),
            vent_gate: DebounceGate::new(Line::Vent, min_interval_ms),
            dehum_gate: DebounceGate::new(Line::Dehumidifier, min_interval_ms),
            aqi: RollingAverage::new(window),
            outdoor_humidity: RollingAverage::new(window),
            outdoor_temp_f: RollingAverage::new(window),
            indoor_humidity: RollingAverage::new(window),
            indoor_temp_f: RollingAverage::new(window),
            config,
            outdoor,
            indoor,
            actuators,
            clock,
            vent_on: false,
            dehumidifier_on: false,
            cycle_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Read back both lines and announce readiness.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        for line in [Line::Vent, Line::Dehumidifier] {
            match self.actuators.query(line) {
                Ok(on) => self.set_known_state(line, on),
                Err(e) => {
                    error!("ENGINE: {} state query failed at start: {}", line, e);
                    sink.emit(&AppEvent::ActuatorFault { line, error: e });
                }
            }
        }
        info!(
            "ENGINE: started (vent={}, dehumidifier={})",
            on_off(self.vent_on),
            on_off(self.dehumidifier_on)
        );
        sink.emit(&AppEvent::Started {
            vent_on: self.vent_on,
            dehumidifier_on: self.dehumidifier_on,
        });
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one control cycle with no indoor hint.
    pub fn update(&mut self, sink: &mut impl EventSink) -> Result<CycleReport, SensorError> {
        self.update_with_hint(IndoorHint::default(), sink)
    }

    /// Run one control cycle: outdoor → indoor → rules → actuators.
    ///
    /// Returns `Err` only when the outdoor refresh fails, in which case
    /// nothing was pushed and no line was touched.  Every other failure
    /// degrades inside the cycle and is reported in the [`CycleReport`].
    pub fn update_with_hint(
        &mut self,
        hint: IndoorHint,
        sink: &mut impl EventSink,
    ) -> Result<CycleReport, SensorError> {
        self.cycle_count += 1;
        let now_ms = self.clock.uptime_ms();

        // 1–2. Outdoor refresh and smoothing
        let outdoor = match self.outdoor.refresh() {
            Ok(reading) => reading,
            Err(e) => {
                error!("ENGINE: outdoor refresh failed ({}), cycle aborted", e);
                sink.emit(&AppEvent::CycleAborted { reason: e });
                return Err(e);
            }
        };
        self.aqi.push(outdoor.pm25_aqi as f32);
        self.outdoor_humidity.push(outdoor.humidity);
        self.outdoor_temp_f.push(outdoor.temperature_f);

        let avg_aqi = self.aqi.average();
        let avg_outdoor_humidity = self.outdoor_humidity.average();
        let avg_outdoor_temp_f = self.outdoor_temp_f.average();

        // 3–4. Indoor read with degradation
        let (indoor_temp_f, indoor_humidity, indoor_source) = self.indoor_values(hint, sink);

        info!(
            "ENGINE: avg AQI={:.1}, out hum={:.1}%, out temp={:.1}\u{00b0}F | \
             indoor hum={:.1}%, indoor temp={:.1}\u{00b0}F",
            avg_aqi, avg_outdoor_humidity, avg_outdoor_temp_f, indoor_humidity, indoor_temp_f
        );

        // 5–7. Rules
        let conditions = Conditions::evaluate(avg_outdoor_temp_f, indoor_temp_f, &self.config);
        let mode_before = self.cycling.mode();
        let vent = self.decide_vent(avg_aqi, avg_outdoor_humidity, &conditions, now_ms);
        let mode = self.cycling.mode();
        if mode != mode_before {
            sink.emit(&AppEvent::CyclingModeChanged {
                from: mode_before,
                to: mode,
            });
        }

        let dehumidifier = decide_dehumidifier(indoor_humidity, vent.on, &conditions, &self.config);
        info!(
            "ENGINE: vent {} ({}), dehumidifier {} ({})",
            on_off(vent.on),
            vent.rule,
            on_off(dehumidifier.wants_on()),
            dehumidifier
        );
        sink.emit(&AppEvent::Decision {
            vent_on: vent.on,
            vent_rule: vent.rule,
            dehumidifier_on: dehumidifier.wants_on(),
            dehumidifier_rule: dehumidifier,
        });

        // 8. Actuation
        let emergency_close = vent.rule == VentRule::AqiUnsafe;
        let vent_actuation = self.actuate(Line::Vent, vent.on, emergency_close, now_ms, sink);
        let dehumidifier_actuation = self.actuate(
            Line::Dehumidifier,
            dehumidifier.wants_on(),
            false,
            now_ms,
            sink,
        );

        sink.emit(&AppEvent::Telemetry(self.telemetry()));

        Ok(CycleReport {
            now_ms,
            avg_aqi,
            avg_outdoor_humidity,
            avg_outdoor_temp_f,
            indoor_humidity,
            indoor_temp_f,
            indoor_source,
            conditions,
            vent,
            dehumidifier,
            mode,
            vent_actuation,
            dehumidifier_actuation,
        })
    }

    fn indoor_values(
        &mut self,
        hint: IndoorHint,
        sink: &mut impl EventSink,
    ) -> (f32, f32, IndoorSourceKind) {
        let error = match self.indoor.read() {
            Ok(reading) => {
                self.indoor_temp_f.push(reading.temperature_f);
                self.indoor_humidity.push(reading.humidity);
                info!(
                    "ENGINE: indoor probe temp={:.1}\u{00b0}F, humidity={:.1}%",
                    reading.temperature_f, reading.humidity
                );
                return (
                    self.indoor_temp_f.average(),
                    self.indoor_humidity.average(),
                    IndoorSourceKind::Live,
                );
            }
            Err(e) => e,
        };

        if !self.indoor_temp_f.is_empty() && !self.indoor_humidity.is_empty() {
            let (temp_f, humidity) = (self.indoor_temp_f.average(), self.indoor_humidity.average());
            info!(
                "ENGINE: indoor probe failed ({}), using last known temp={:.1}\u{00b0}F, humidity={:.1}%",
                error, temp_f, humidity
            );
            sink.emit(&AppEvent::IndoorDegraded {
                error,
                source: IndoorSourceKind::History,
            });
            return (temp_f, humidity, IndoorSourceKind::History);
        }

        let humidity = hint.humidity.unwrap_or(self.config.fallback_indoor_humidity);
        let temp_f = hint
            .temperature_f
            .unwrap_or(self.config.fallback_indoor_temp_f);
        warn!(
            "ENGINE: indoor probe failed ({}) with no history, using fallback temp={:.1}\u{00b0}F, humidity={:.1}%",
            error, temp_f, humidity
        );
        sink.emit(&AppEvent::IndoorDegraded {
            error,
            source: IndoorSourceKind::Fallback,
        });
        (temp_f, humidity, IndoorSourceKind::Fallback)
    }

    fn decide_vent(
        &mut self,
        avg_aqi: f32,
        avg_outdoor_humidity: f32,
        conditions: &Conditions,
        now_ms: u64,
    ) -> VentDecision {
        let rule = VentRule::classify(avg_aqi, avg_outdoor_humidity, conditions, &self.config);
        let (on, phase): (bool, Option<PhaseState>) = match rule {
            // Guards hold the vent closed but leave any cycling mode latched.
            VentRule::AqiUnsafe | VentRule::OutdoorTempOutOfRange | VentRule::RainGuard => {
                (false, None)
            }
            VentRule::BringsCloser => {
                self.cycling.clear();
                (true, None)
            }
            VentRule::QuickVent => {
                let step = self.cycling.quick_vent(now_ms);
                (step.phase.on, Some(step.phase))
            }
            VentRule::LimitedVent => {
                let step = self.cycling.limited_vent(now_ms);
                (step.phase.on, Some(step.phase))
            }
        };
        VentDecision { on, rule, phase }
    }

    fn actuate(
        &mut self,
        line: Line,
        desired: bool,
        emergency_close: bool,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Actuation {
        let current = match self.actuators.query(line) {
            Ok(on) => on,
            Err(e) => return self.fault(line, e, sink),
        };
        self.set_known_state(line, current);

        if emergency_close && current {
            return match self.actuators.deactivate(line) {
                Ok(_) => {
                    self.gate_mut(line).record(now_ms);
                    self.set_known_state(line, false);
                    warn!("ENGINE: AQI above threshold, {} closed immediately", line);
                    sink.emit(&AppEvent::Actuated {
                        line,
                        on: false,
                        immediate: true,
                    });
                    Actuation::Immediate
                }
                Err(e) => self.fault(line, e, sink),
            };
        }

        match self.gate_mut(line).check(desired, current, now_ms) {
            GateVerdict::Unchanged => Actuation::Unchanged,
            GateVerdict::Suppress { remaining_ms } => {
                sink.emit(&AppEvent::ActuationSuppressed {
                    line,
                    desired,
                    remaining_ms,
                });
                Actuation::Suppressed { remaining_ms }
            }
            GateVerdict::Allow => match self.actuators.set(line, desired) {
                Ok(transition) => {
                    self.gate_mut(line).record(now_ms);
                    self.set_known_state(line, desired);
                    info!("ENGINE: {} turned {}", line, on_off(desired));
                    debug!("ENGINE: {} transition {:?}", line, transition);
                    sink.emit(&AppEvent::Actuated {
                        line,
                        on: desired,
                        immediate: false,
                    });
                    Actuation::Applied { on: desired }
                }
                Err(e) => self.fault(line, e, sink),
            },
        }
    }

    fn fault(&mut self, line: Line, error: ActuatorError, sink: &mut impl EventSink) -> Actuation {
        error!(
            "ENGINE: {} actuator fault: {}; state will be re-queried next cycle",
            line, error
        );
        sink.emit(&AppEvent::ActuatorFault { line, error });
        Actuation::Failed(error)
    }

    fn gate_mut(&mut self, line: Line) -> &mut DebounceGate {
        match line {
            Line::Vent => &mut self.vent_gate,
            Line::Dehumidifier => &mut self.dehum_gate,
        }
    }

    fn set_known_state(&mut self, line: Line, on: bool) {
        match line {
            Line::Vent => self.vent_on = on,
            Line::Dehumidifier => self.dehumidifier_on = on,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn telemetry(&self) -> TelemetryData {
        TelemetryData {
            cycle: self.cycle_count,
            avg_aqi: self.aqi.average(),
            avg_outdoor_humidity: self.outdoor_humidity.average(),
            avg_outdoor_temp_f: self.outdoor_temp_f.average(),
            avg_indoor_humidity: self.indoor_humidity.average(),
            avg_indoor_temp_f: self.indoor_temp_f.average(),
            vent_on: self.vent_on,
            dehumidifier_on: self.dehumidifier_on,
            mode: self.cycling.mode(),
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn mode(&self) -> CyclingMode {
        self.cycling.mode()
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Last debounce timestamp recorded for `line`.
    pub fn last_change_ms(&self, line: Line) -> Option<u64> {
        match line {
            Line::Vent => self.vent_gate.last_change_ms(),
            Line::Dehumidifier => self.dehum_gate.last_change_ms(),
        }
    }

    pub fn outdoor_mut(&mut self) -> &mut O {
        &mut self.outdoor
    }

    pub fn indoor_mut(&mut self) -> &mut I {
        &mut self.indoor
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    pub fn actuators_mut(&mut self) -> &mut A {
        &mut self.actuators
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}
