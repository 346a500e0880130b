//! Time adapters implementing [`TimePort`].
//!
//! - [`MonotonicClock`] — wraps `std::time::Instant`; used by the daemon.
//! - [`ManualClock`] — test/simulation clock advanced by hand.  Clones
//!   share one counter, so a test can keep a handle while the engine owns
//!   the other.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::app::ports::TimePort;

/// Monotonic milliseconds since construction.
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl TimePort for MonotonicClock {
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(delta_ms));
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs.saturating_mul(1000));
    }
}

impl TimePort for ManualClock {
    fn uptime_ms(&self) -> u64 {
        self.now_ms.get()
    }
}
