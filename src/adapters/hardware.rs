//! Hardware adapter — bridges the relay lines to the actuator port.
//!
//! Owns the vent and dehumidifier [`Relay`]s and exposes them through
//! [`ActuatorPort`].  Both lines are driven off when the bank is dropped,
//! so every exit path of the polling loop (return, `?`, panic unwind)
//! leaves the hardware in its safe state.

use embedded_hal::digital::StatefulOutputPin;
use log::{info, warn};

use crate::app::ports::{ActuatorPort, Line, Transition};
use crate::drivers::relay::Relay;
use crate::error::ActuatorError;

/// Concrete adapter combining both relay lines behind [`ActuatorPort`].
pub struct RelayBank<V: StatefulOutputPin, D: StatefulOutputPin> {
    vent: Relay<V>,
    dehumidifier: Relay<D>,
}

impl<V: StatefulOutputPin, D: StatefulOutputPin> RelayBank<V, D> {
    pub fn new(vent_pin: V, dehumidifier_pin: D) -> Self {
        Self {
            vent: Relay::new(Line::Vent, vent_pin),
            dehumidifier: Relay::new(Line::Dehumidifier, dehumidifier_pin),
        }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<V: StatefulOutputPin, D: StatefulOutputPin> ActuatorPort for RelayBank<V, D> {
    fn activate(&mut self, line: Line) -> Result<Transition, ActuatorError> {
        match line {
            Line::Vent => self.vent.set(true),
            Line::Dehumidifier => self.dehumidifier.set(true),
        }
    }

    fn deactivate(&mut self, line: Line) -> Result<Transition, ActuatorError> {
        match line {
            Line::Vent => self.vent.set(false),
            Line::Dehumidifier => self.dehumidifier.set(false),
        }
    }

    fn query(&mut self, line: Line) -> Result<bool, ActuatorError> {
        match line {
            Line::Vent => self.vent.is_on(),
            Line::Dehumidifier => self.dehumidifier.is_on(),
        }
    }

    fn all_off(&mut self) {
        if let Err(e) = self.vent.set(false) {
            warn!("RelayBank: vent shutdown failed: {}", e);
        }
        if let Err(e) = self.dehumidifier.set(false) {
            warn!("RelayBank: dehumidifier shutdown failed: {}", e);
        }
    }
}

impl<V: StatefulOutputPin, D: StatefulOutputPin> Drop for RelayBank<V, D> {
    fn drop(&mut self) {
        self.all_off();
        info!("RelayBank: all lines off");
    }
}
