//! Timed duty cycles for partial venting.
//!
//! Two modes share one evaluator:
//!
//! ```text
//!  quick-vent    |■■■■■□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□|  60 min
//!                 ON (quick_vent_secs)            OFF (rest of the hour)
//!
//!  limited-vent  |■■■■■■■■■■□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□□|  on + off
//!                 ON (limited_on_secs)            OFF (limited_off_secs)
//! ```
//!
//! The phase is `(now - start) mod period`.  `start` is latched when a mode
//! is entered and held while the mode stays active, so the phase runs
//! continuously across engine cycles.  Switching modes or clearing the
//! mode drops the start time; the next entry begins at phase zero.

use log::{debug, info};

use crate::config::SystemConfig;

/// Fixed total length of one quick-vent cycle.
pub const QUICK_VENT_PERIOD_SECS: u32 = 60 * 60;

// ---------------------------------------------------------------------------
// Duty cycle
// ---------------------------------------------------------------------------

/// A periodic ON/OFF pattern: ON for the first `on_ms` of every `period_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycle {
    on_ms: u64,
    period_ms: u64,
}

/// Where a duty cycle currently sits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseState {
    /// True during the ON part of the cycle.
    pub on: bool,
    /// Milliseconds since the start of the current period.
    pub phase_ms: u64,
    /// Fraction (0.0–1.0) of the current ON or OFF part already elapsed.
    pub progress: f32,
}

impl DutyCycle {
    pub fn new(on_secs: u32, off_secs: u32) -> Self {
        let on_ms = u64::from(on_secs) * 1000;
        let period_ms = on_ms + u64::from(off_secs) * 1000;
        Self {
            on_ms,
            // Config validation guarantees a non-empty period; never divide by zero.
            period_ms: period_ms.max(1),
        }
    }

    /// Quick-vent cycle: `on_secs` ON inside the fixed 60 minute period.
    pub fn quick_vent(on_secs: u32) -> Self {
        Self::new(on_secs, QUICK_VENT_PERIOD_SECS.saturating_sub(on_secs))
    }

    /// Position inside the current period for a cycle started at `start_ms`.
    pub fn phase_ms(&self, start_ms: u64, now_ms: u64) -> u64 {
        now_ms.saturating_sub(start_ms) % self.period_ms
    }

    pub fn evaluate(&self, start_ms: u64, now_ms: u64) -> PhaseState {
        let phase_ms = self.phase_ms(start_ms, now_ms);
        let on = phase_ms < self.on_ms;
        let progress = if on {
            phase_ms as f32 / self.on_ms as f32
        } else {
            let off_ms = self.period_ms - self.on_ms;
            if off_ms == 0 {
                1.0
            } else {
                (phase_ms - self.on_ms) as f32 / off_ms as f32
            }
        };
        PhaseState {
            on,
            phase_ms,
            progress,
        }
    }
}

// ---------------------------------------------------------------------------
// Mode state
// ---------------------------------------------------------------------------

/// Which cycling mode is active.  At most one, by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclingMode {
    #[default]
    Inactive,
    QuickVent { start_ms: u64 },
    LimitedVent { start_ms: u64 },
}

impl CyclingMode {
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Inactive)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::QuickVent { .. } => "quick-vent",
            Self::LimitedVent { .. } => "limited-vent",
        }
    }
}

/// Result of one enter-or-continue evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleStep {
    pub phase: PhaseState,
    /// True when this call entered the mode (phase restarted at zero).
    pub entered: bool,
    /// Mode in force before this call.
    pub previous: CyclingMode,
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Owns the cycling mode and both duty-cycle definitions.
#[derive(Debug, Clone)]
pub struct CyclingPolicy {
    quick: DutyCycle,
    limited: DutyCycle,
    mode: CyclingMode,
}

impl CyclingPolicy {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            quick: DutyCycle::quick_vent(config.quick_vent_secs),
            limited: DutyCycle::new(config.limited_on_secs, config.limited_off_secs),
            mode: CyclingMode::Inactive,
        }
    }

    pub fn mode(&self) -> CyclingMode {
        self.mode
    }

    /// Enter quick-vent (if not already in it) and report the current phase.
    pub fn quick_vent(&mut self, now_ms: u64) -> CycleStep {
        let previous = self.mode;
        let (start_ms, entered) = match previous {
            CyclingMode::QuickVent { start_ms } => (start_ms, false),
            _ => {
                self.mode = CyclingMode::QuickVent { start_ms: now_ms };
                info!("CYCLING: entering quick-vent mode for hot/cold outdoor air");
                (now_ms, true)
            }
        };

        let phase = self.quick.evaluate(start_ms, now_ms);
        debug!(
            "CYCLING: quick-vent {} phase progress {:.1}%",
            if phase.on { "ON" } else { "OFF" },
            phase.progress * 100.0
        );
        CycleStep {
            phase,
            entered,
            previous,
        }
    }

    /// Enter limited-vent (if not already in it) and report the current phase.
    pub fn limited_vent(&mut self, now_ms: u64) -> CycleStep {
        let previous = self.mode;
        let (start_ms, entered) = match previous {
            CyclingMode::LimitedVent { start_ms } => (start_ms, false),
            _ => {
                self.mode = CyclingMode::LimitedVent { start_ms: now_ms };
                info!("CYCLING: entering limited-vent mode; starting cycle");
                (now_ms, true)
            }
        };

        let phase = self.limited.evaluate(start_ms, now_ms);
        debug!(
            "CYCLING: limited-vent phase time {:.1}s, {} progress {:.1}%",
            phase.phase_ms as f32 / 1000.0,
            if phase.on { "ON" } else { "OFF" },
            phase.progress * 100.0
        );
        CycleStep {
            phase,
            entered,
            previous,
        }
    }

    /// Leave any active mode.  Returns the mode that was cleared, if any.
    pub fn clear(&mut self) -> Option<CyclingMode> {
        if !self.mode.is_active() {
            return None;
        }
        let previous = self.mode;
        self.mode = CyclingMode::Inactive;
        info!("CYCLING: leaving {} mode", previous.name());
        Some(previous)
    }
}
