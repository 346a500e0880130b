//! Relay driver for one binary output line (vent damper or dehumidifier).
//!
//! Drives any `embedded_hal::digital::StatefulOutputPin`: high = ON.
//! `set` reads back the pin latch first and only writes on a real change,
//! so repeated commands produce no extra hardware transitions.
//!
//! This driver is a dumb actuator.  Which state the line should be in,
//! and how often it may change, is decided by the engine.

use embedded_hal::digital::StatefulOutputPin;
use log::info;

use crate::app::ports::{Line, Transition};
use crate::error::ActuatorError;

pub struct Relay<P> {
    line: Line,
    pin: P,
}

impl<P: StatefulOutputPin> Relay<P> {
    pub fn new(line: Line, pin: P) -> Self {
        Self { line, pin }
    }

    pub fn set(&mut self, on: bool) -> Result<Transition, ActuatorError> {
        if self.is_on()? == on {
            return Ok(Transition::Unchanged);
        }
        let written = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        written.map_err(|_| ActuatorError::GpioWriteFailed)?;
        info!("RELAY: {} turned {}", self.line, if on { "ON" } else { "OFF" });
        Ok(Transition::Switched)
    }

    pub fn is_on(&mut self) -> Result<bool, ActuatorError> {
        self.pin
            .is_set_high()
            .map_err(|_| ActuatorError::GpioReadFailed)
    }

    #[cfg(test)]
    fn pin(&self) -> &P {
        &self.pin
    }
}
