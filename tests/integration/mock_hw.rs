//! Mock collaborators for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO lines, and scripts sensor results
//! cycle by cycle.

use ventctl::adapters::time::ManualClock;
use ventctl::app::engine::DecisionEngine;
use ventctl::app::events::AppEvent;
use ventctl::app::ports::{
    ActuatorPort, EventSink, IndoorReading, IndoorSource, Line, OutdoorReading, OutdoorSource,
    Transition,
};
use ventctl::config::SystemConfig;
use ventctl::error::{ActuatorError, SensorError};

// ── Sensors ───────────────────────────────────────────────────

/// Returns `next` on every refresh until changed.
pub struct MockOutdoor {
    pub next: Result<OutdoorReading, SensorError>,
    pub refreshes: u32,
}

#[allow(dead_code)]
impl MockOutdoor {
    pub fn new(pm25_aqi: i32, humidity: f32, temperature_f: f32) -> Self {
        Self {
            next: Ok(OutdoorReading {
                pm25_aqi,
                humidity,
                temperature_f,
            }),
            refreshes: 0,
        }
    }

    pub fn set(&mut self, pm25_aqi: i32, humidity: f32, temperature_f: f32) {
        self.next = Ok(OutdoorReading {
            pm25_aqi,
            humidity,
            temperature_f,
        });
    }

    pub fn fail(&mut self, error: SensorError) {
        self.next = Err(error);
    }
}

impl OutdoorSource for MockOutdoor {
    fn refresh(&mut self) -> Result<OutdoorReading, SensorError> {
        self.refreshes += 1;
        self.next
    }
}

pub struct MockIndoor {
    pub next: Result<IndoorReading, SensorError>,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockIndoor {
    pub fn new(temperature_f: f32, humidity: f32) -> Self {
        Self {
            next: Ok(IndoorReading {
                temperature_f,
                humidity,
            }),
            reads: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            next: Err(SensorError::ReadFailed),
            reads: 0,
        }
    }

    pub fn set(&mut self, temperature_f: f32, humidity: f32) {
        self.next = Ok(IndoorReading {
            temperature_f,
            humidity,
        });
    }

    pub fn fail(&mut self) {
        self.next = Err(SensorError::ReadFailed);
    }
}

impl IndoorSource for MockIndoor {
    fn read(&mut self) -> Result<IndoorReading, SensorError> {
        self.reads += 1;
        self.next
    }
}

// ── Actuators ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Activate(Line),
    Deactivate(Line),
    AllOff,
}

pub struct MockActuators {
    pub vent: bool,
    pub dehumidifier: bool,
    pub calls: Vec<ActuatorCall>,
    /// Physical line changes (idempotent calls are not counted).
    pub transitions: Vec<(Line, bool)>,
    pub fail_query: Option<Line>,
    pub fail_write: Option<Line>,
}

#[allow(dead_code)]
impl MockActuators {
    pub fn new() -> Self {
        Self {
            vent: false,
            dehumidifier: false,
            calls: Vec::new(),
            transitions: Vec::new(),
            fail_query: None,
            fail_write: None,
        }
    }

    pub fn with_state(vent: bool, dehumidifier: bool) -> Self {
        Self {
            vent,
            dehumidifier,
            ..Self::new()
        }
    }

    pub fn transitions_on(&self, line: Line) -> usize {
        self.transitions.iter().filter(|(l, _)| *l == line).count()
    }

    fn state_mut(&mut self, line: Line) -> &mut bool {
        match line {
            Line::Vent => &mut self.vent,
            Line::Dehumidifier => &mut self.dehumidifier,
        }
    }

    fn drive(&mut self, line: Line, on: bool) -> Result<Transition, ActuatorError> {
        if self.fail_write == Some(line) {
            return Err(ActuatorError::GpioWriteFailed);
        }
        let state = self.state_mut(line);
        if *state == on {
            return Ok(Transition::Unchanged);
        }
        *state = on;
        self.transitions.push((line, on));
        Ok(Transition::Switched)
    }
}

impl Default for MockActuators {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockActuators {
    fn activate(&mut self, line: Line) -> Result<Transition, ActuatorError> {
        self.calls.push(ActuatorCall::Activate(line));
        self.drive(line, true)
    }

    fn deactivate(&mut self, line: Line) -> Result<Transition, ActuatorError> {
        self.calls.push(ActuatorCall::Deactivate(line));
        self.drive(line, false)
    }

    fn query(&mut self, line: Line) -> Result<bool, ActuatorError> {
        if self.fail_query == Some(line) {
            return Err(ActuatorError::GpioReadFailed);
        }
        Ok(*self.state_mut(line))
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
        self.vent = false;
        self.dehumidifier = false;
    }
}

// ── Event sink ────────────────────────────────────────────────

/// Keeps every emitted event for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|&e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Harness ───────────────────────────────────────────────────

pub type TestEngine = DecisionEngine<MockOutdoor, MockIndoor, MockActuators, ManualClock>;

/// Engine plus a shared handle on its clock.
pub struct Rig {
    pub engine: TestEngine,
    pub clock: ManualClock,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: SystemConfig, outdoor: MockOutdoor, indoor: MockIndoor) -> Self {
        Self::with_actuators(config, outdoor, indoor, MockActuators::new())
    }

    pub fn with_actuators(
        config: SystemConfig,
        outdoor: MockOutdoor,
        indoor: MockIndoor,
        actuators: MockActuators,
    ) -> Self {
        let clock = ManualClock::new(1_000_000);
        let engine = DecisionEngine::new(config, outdoor, indoor, actuators, clock.clone())
            .expect("test config must validate");
        Self {
            engine,
            clock,
            sink: RecordingSink::new(),
        }
    }

    pub fn vent(&self) -> bool {
        self.engine.actuators().vent
    }

    pub fn dehumidifier(&self) -> bool {
        self.engine.actuators().dehumidifier
    }

    pub fn advance_secs(&self, secs: u64) {
        self.clock.advance_secs(secs);
    }
}
