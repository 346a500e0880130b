//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade.  The binary routes those records to stdout;
//! any other sink (file, MQTT) would implement the same trait.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | cycle={} | AQI={:.1} | out={:.1}\u{00b0}F/{:.1}% | \
                     in={:.1}\u{00b0}F/{:.1}% | vent={} dehum={} | mode={}",
                    t.cycle,
                    t.avg_aqi,
                    t.avg_outdoor_temp_f,
                    t.avg_outdoor_humidity,
                    t.avg_indoor_temp_f,
                    t.avg_indoor_humidity,
                    if t.vent_on { "ON" } else { "OFF" },
                    if t.dehumidifier_on { "ON" } else { "OFF" },
                    t.mode.name(),
                );
            }
            AppEvent::CycleAborted { reason } => {
                error!("CYCLE | aborted, outdoor data unavailable: {}", reason);
            }
            AppEvent::IndoorDegraded { error, source } => {
                warn!("INDOOR | probe failed ({}), using {:?} values", error, source);
            }
            AppEvent::Decision {
                vent_on,
                vent_rule,
                dehumidifier_on,
                dehumidifier_rule,
            } => {
                info!(
                    "DECIDE | vent={} ({}) | dehum={} ({})",
                    if *vent_on { "ON" } else { "OFF" },
                    vent_rule,
                    if *dehumidifier_on { "ON" } else { "OFF" },
                    dehumidifier_rule,
                );
            }
            AppEvent::CyclingModeChanged { from, to } => {
                info!("MODE | {} -> {}", from.name(), to.name());
            }
            AppEvent::Actuated {
                line,
                on,
                immediate,
            } => {
                info!(
                    "ACTUATE | {} -> {}{}",
                    line,
                    if *on { "ON" } else { "OFF" },
                    if *immediate { " (immediate)" } else { "" },
                );
            }
            AppEvent::ActuationSuppressed {
                line,
                desired,
                remaining_ms,
            } => {
                info!(
                    "DEBOUNCE | {} -> {} held for {}s",
                    line,
                    if *desired { "ON" } else { "OFF" },
                    remaining_ms.div_ceil(1000),
                );
            }
            AppEvent::ActuatorFault { line, error } => {
                error!("FAULT | {}: {}", line, error);
            }
            AppEvent::Started {
                vent_on,
                dehumidifier_on,
            } => {
                info!(
                    "START | vent={} dehum={}",
                    if *vent_on { "ON" } else { "OFF" },
                    if *dehumidifier_on { "ON" } else { "OFF" },
                );
            }
        }
    }
}
