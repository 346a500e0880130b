//! Per-line rate limiting of actuator state changes.
//!
//! A change is allowed only when the desired state differs from the current
//! one and at least `min_interval_ms` has passed since the last change on
//! the same line.  The AQI emergency vent closure never goes through here.

use log::debug;

use crate::app::ports::Line;

/// Pure gate predicate.
///
/// True only if `desired != current` and either no change has been
/// recorded yet or `now_ms - last_change_ms >= min_interval_ms`.
pub fn should_apply(
    desired: bool,
    current: bool,
    last_change_ms: Option<u64>,
    now_ms: u64,
    min_interval_ms: u64,
) -> bool {
    if desired == current {
        return false;
    }
    match last_change_ms {
        None => true,
        Some(last) => now_ms.saturating_sub(last) >= min_interval_ms,
    }
}

/// Outcome of checking a desired state against the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// Desired state already holds; nothing to do.
    Unchanged,
    /// Change may be applied now.
    Allow,
    /// Change is held back for another `remaining_ms`.
    Suppress { remaining_ms: u64 },
}

/// Debounce state for one actuator line.
#[derive(Debug, Clone)]
pub struct DebounceGate {
    line: Line,
    min_interval_ms: u64,
    last_change_ms: Option<u64>,
}

impl DebounceGate {
    pub fn new(line: Line, min_interval_ms: u64) -> Self {
        Self {
            line,
            min_interval_ms,
            last_change_ms: None,
        }
    }

    pub fn check(&self, desired: bool, current: bool, now_ms: u64) -> GateVerdict {
        if desired == current {
            return GateVerdict::Unchanged;
        }
        if should_apply(
            desired,
            current,
            self.last_change_ms,
            now_ms,
            self.min_interval_ms,
        ) {
            return GateVerdict::Allow;
        }

        let elapsed = self
            .last_change_ms
            .map_or(0, |last| now_ms.saturating_sub(last));
        let remaining_ms = self.min_interval_ms.saturating_sub(elapsed);
        debug!(
            "DEBOUNCE: {} change suppressed, {:.0}s remaining",
            self.line,
            remaining_ms as f32 / 1000.0
        );
        GateVerdict::Suppress { remaining_ms }
    }

    /// Record a successful transition at `now_ms`.
    pub fn record(&mut self, now_ms: u64) {
        self.last_change_ms = Some(now_ms);
    }

    pub fn last_change_ms(&self) -> Option<u64> {
        self.last_change_ms
    }
}
