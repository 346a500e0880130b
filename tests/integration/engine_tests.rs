//! DecisionEngine scenarios against mock sensors and relays.

use crate::mock_hw::{ActuatorCall, MockActuators, MockIndoor, MockOutdoor, Rig};

use ventctl::app::engine::{Actuation, DecisionEngine, IndoorHint};
use ventctl::app::events::{AppEvent, IndoorSourceKind};
use ventctl::app::ports::{ConfigError, Line};
use ventctl::adapters::time::ManualClock;
use ventctl::config::SystemConfig;
use ventctl::control::cycling::CyclingMode;
use ventctl::control::rules::{DehumRule, VentRule};
use ventctl::error::{ActuatorError, SensorError};

fn config() -> SystemConfig {
    SystemConfig {
        max_outdoor_temp_f: 100.0,
        ..SystemConfig::default()
    }
}

/// Single-sample smoothing so each cycle sees exactly the scripted values.
fn unsmoothed() -> SystemConfig {
    SystemConfig {
        smoothing_samples: 1,
        ..config()
    }
}

// ── Construction ──────────────────────────────────────────────

#[test]
fn invalid_config_is_rejected_at_construction() {
    let bad = SystemConfig {
        smoothing_samples: 0,
        ..SystemConfig::default()
    };
    let result = DecisionEngine::new(
        bad,
        MockOutdoor::new(10, 40.0, 70.0),
        MockIndoor::new(72.0, 40.0),
        MockActuators::new(),
        ManualClock::new(0),
    );
    assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));

    let bad = SystemConfig {
        limited_on_secs: 0,
        limited_off_secs: 0,
        ..SystemConfig::default()
    };
    let result = DecisionEngine::new(
        bad,
        MockOutdoor::new(10, 40.0, 70.0),
        MockIndoor::new(72.0, 40.0),
        MockActuators::new(),
        ManualClock::new(0),
    );
    assert!(result.is_err());
}

#[test]
fn start_reports_current_line_states() {
    let mut rig = Rig::with_actuators(
        config(),
        MockOutdoor::new(10, 40.0, 70.0),
        MockIndoor::new(72.0, 40.0),
        MockActuators::with_state(true, false),
    );
    rig.engine.start(&mut rig.sink);
    assert!(matches!(
        rig.sink.events.last(),
        Some(AppEvent::Started {
            vent_on: true,
            dehumidifier_on: false
        })
    ));
    assert!(rig.engine.telemetry().vent_on);
}

// ── AQI safety ────────────────────────────────────────────────

#[test]
fn high_aqi_forces_vent_closed_even_when_comfortable() {
    let mut rig = Rig::with_actuators(
        config(),
        MockOutdoor::new(80, 40.0, 72.0),
        MockIndoor::new(72.0, 70.0),
        MockActuators::with_state(true, false),
    );
    let report = rig.engine.update(&mut rig.sink).unwrap();

    assert_eq!(report.vent.rule, VentRule::AqiUnsafe);
    assert!(!report.vent.on);
    assert_eq!(report.vent_actuation, Actuation::Immediate);
    assert!(!rig.vent());
}

#[test]
fn aqi_closure_bypasses_debounce() {
    let mut rig = Rig::new(config(), MockOutdoor::new(10, 40.0, 50.0), MockIndoor::new(95.0, 40.0));

    let first = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(first.vent.rule, VentRule::BringsCloser);
    assert_eq!(first.vent_actuation, Actuation::Applied { on: true });

    // Ten seconds later the air turns bad: average (10 + 400) / 2 = 205.
    rig.advance_secs(10);
    rig.engine.outdoor_mut().set(400, 40.0, 50.0);
    let second = rig.engine.update(&mut rig.sink).unwrap();

    assert_eq!(second.vent.rule, VentRule::AqiUnsafe);
    assert_eq!(second.vent_actuation, Actuation::Immediate);
    assert!(!rig.vent());
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::Actuated {
                line: Line::Vent,
                on: false,
                immediate: true
            }
        )),
        1
    );
}

#[test]
fn aqi_closure_is_a_no_op_when_vent_already_closed() {
    let mut rig = Rig::new(config(), MockOutdoor::new(150, 40.0, 72.0), MockIndoor::new(80.0, 40.0));
    let report = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(report.vent_actuation, Actuation::Unchanged);
    assert!(rig.engine.actuators().calls.is_empty());
}

// ── Guards ────────────────────────────────────────────────────

#[test]
fn rain_guard_closes_vent() {
    let mut rig = Rig::with_actuators(
        config(),
        MockOutdoor::new(10, 90.0, 65.0),
        MockIndoor::new(80.0, 40.0),
        MockActuators::with_state(true, false),
    );
    let report = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(report.vent.rule, VentRule::RainGuard);
    assert_eq!(report.vent_actuation, Actuation::Applied { on: false });
    assert!(!rig.vent());
}

#[test]
fn outdoor_temperature_out_of_range_closes_vent() {
    let mut rig = Rig::with_actuators(
        SystemConfig::default(),
        MockOutdoor::new(10, 40.0, 95.0),
        MockIndoor::new(72.0, 40.0),
        MockActuators::with_state(true, false),
    );
    let report = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(report.vent.rule, VentRule::OutdoorTempOutOfRange);
    assert!(!rig.vent());
}

#[test]
fn guards_keep_cycling_mode_latched() {
    let mut rig = Rig::new(unsmoothed(), MockOutdoor::new(10, 40.0, 65.0), MockIndoor::new(72.0, 40.0));
    rig.engine.update(&mut rig.sink).unwrap();
    let CyclingMode::LimitedVent { start_ms } = rig.engine.mode() else {
        panic!("expected limited-vent, got {:?}", rig.engine.mode());
    };

    rig.advance_secs(30);
    rig.engine.outdoor_mut().set(10, 95.0, 65.0);
    let report = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(report.vent.rule, VentRule::RainGuard);
    assert_eq!(rig.engine.mode(), CyclingMode::LimitedVent { start_ms });
}

// ── Debounce ──────────────────────────────────────────────────

#[test]
fn flips_within_interval_produce_one_transition() {
    let mut rig = Rig::new(unsmoothed(), MockOutdoor::new(10, 40.0, 50.0), MockIndoor::new(95.0, 40.0));

    // ON (first change is always allowed)
    rig.engine.update(&mut rig.sink).unwrap();
    assert!(rig.vent());

    // 20 s later: rain, desired OFF, held back
    rig.advance_secs(20);
    rig.engine.outdoor_mut().set(10, 95.0, 50.0);
    let held = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(
        held.vent_actuation,
        Actuation::Suppressed {
            remaining_ms: 40_000
        }
    );
    assert!(rig.vent());

    // 40 s after the first change: desired ON again, nothing to do
    rig.advance_secs(20);
    rig.engine.outdoor_mut().set(10, 40.0, 50.0);
    let back = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(back.vent_actuation, Actuation::Unchanged);

    assert_eq!(rig.engine.actuators().transitions_on(Line::Vent), 1);

    // Past the interval a real change goes through.
    rig.advance_secs(60);
    rig.engine.outdoor_mut().set(10, 95.0, 50.0);
    let closed = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(closed.vent_actuation, Actuation::Applied { on: false });
    assert_eq!(rig.engine.actuators().transitions_on(Line::Vent), 2);
}

#[test]
fn lines_are_debounced_independently() {
    // Vent and dehumidifier both switch on in the same cycle.
    let mut rig = Rig::new(unsmoothed(), MockOutdoor::new(10, 40.0, 65.0), MockIndoor::new(70.0, 65.0));
    let report = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(report.vent_actuation, Actuation::Applied { on: true });
    assert_eq!(report.dehumidifier_actuation, Actuation::Applied { on: true });
    assert!(rig.engine.last_change_ms(Line::Vent).is_some());
    assert!(rig.engine.last_change_ms(Line::Dehumidifier).is_some());
}

// ── Cycling ───────────────────────────────────────────────────

#[test]
fn quick_vent_on_at_two_minutes_off_at_ten() {
    let mut rig = Rig::new(config(), MockOutdoor::new(10, 40.0, 95.0), MockIndoor::new(72.0, 40.0));
    let entry = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(entry.vent.rule, VentRule::QuickVent);
    assert!(entry.vent.on);
    let start_ms = 1_000_000;
    assert_eq!(rig.engine.mode(), CyclingMode::QuickVent { start_ms });

    rig.advance_secs(2 * 60);
    let on = rig.engine.update(&mut rig.sink).unwrap();
    assert!(on.vent.on);
    assert!(rig.vent());

    rig.advance_secs(8 * 60);
    let off = rig.engine.update(&mut rig.sink).unwrap();
    assert!(!off.vent.on);
    assert_eq!(off.vent_actuation, Actuation::Applied { on: false });
    assert!(!rig.vent());

    // Phase kept running from the original entry.
    assert_eq!(rig.engine.mode(), CyclingMode::QuickVent { start_ms });
}

#[test]
fn limited_vent_cycles_through_on_and_off() {
    let mut rig = Rig::new(config(), MockOutdoor::new(10, 40.0, 65.0), MockIndoor::new(72.0, 40.0));

    let entry = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(entry.vent.rule, VentRule::LimitedVent);
    assert!(rig.vent());

    rig.advance_secs(11 * 60);
    rig.engine.update(&mut rig.sink).unwrap();
    assert!(!rig.vent());

    rig.advance_secs(50 * 60);
    rig.engine.update(&mut rig.sink).unwrap();
    assert!(rig.vent());
}

#[test]
fn brings_closer_opens_vent_and_clears_mode() {
    let mut rig = Rig::new(unsmoothed(), MockOutdoor::new(10, 40.0, 65.0), MockIndoor::new(72.0, 40.0));
    rig.engine.update(&mut rig.sink).unwrap();
    assert!(matches!(rig.engine.mode(), CyclingMode::LimitedVent { .. }));

    rig.advance_secs(30);
    rig.engine.outdoor_mut().set(10, 40.0, 50.0);
    rig.engine.indoor_mut().set(95.0, 40.0);
    let report = rig.engine.update(&mut rig.sink).unwrap();

    assert!(report.conditions.temp_would_bring_closer);
    assert_eq!(report.vent.rule, VentRule::BringsCloser);
    assert!(report.vent.on);
    assert!(rig.vent());
    assert_eq!(rig.engine.mode(), CyclingMode::Inactive);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::CyclingModeChanged {
                to: CyclingMode::Inactive,
                ..
            }
        )),
        1
    );
}

#[test]
fn switching_modes_restarts_phase() {
    let mut rig = Rig::new(unsmoothed(), MockOutdoor::new(10, 40.0, 65.0), MockIndoor::new(72.0, 40.0));
    rig.engine.update(&mut rig.sink).unwrap();

    rig.advance_secs(20 * 60);
    rig.engine.outdoor_mut().set(10, 40.0, 95.0);
    let report = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(report.vent.rule, VentRule::QuickVent);
    assert_eq!(report.vent.phase.map(|p| p.phase_ms), Some(0));
    assert_eq!(
        rig.engine.mode(),
        CyclingMode::QuickVent {
            start_ms: 1_000_000 + 20 * 60 * 1000
        }
    );
}

// ── Dehumidifier ──────────────────────────────────────────────

#[test]
fn dehumidifier_stays_off_while_venting_suffices() {
    let mut rig = Rig::new(config(), MockOutdoor::new(10, 40.0, 68.0), MockIndoor::new(78.0, 65.0));
    let report = rig.engine.update(&mut rig.sink).unwrap();

    assert_eq!(report.vent.rule, VentRule::BringsCloser);
    assert!(rig.vent());
    assert_eq!(report.dehumidifier, DehumRule::CoolOutdoorVentingSuffices);
    assert!(!rig.dehumidifier());
    assert_eq!(rig.engine.actuators().transitions_on(Line::Dehumidifier), 0);
}

#[test]
fn dehumidifier_runs_when_venting_cool_humid_air() {
    let mut rig = Rig::new(config(), MockOutdoor::new(10, 40.0, 65.0), MockIndoor::new(70.0, 65.0));
    let report = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(report.dehumidifier, DehumRule::CoolOutdoorWhileVenting);
    assert!(rig.dehumidifier());
}

#[test]
fn warm_humid_room_with_vent_closed_is_dehumidified() {
    // Bad air keeps the vent shut; room warm and very humid.
    let mut rig = Rig::new(config(), MockOutdoor::new(120, 40.0, 80.0), MockIndoor::new(76.0, 70.0));
    let report = rig.engine.update(&mut rig.sink).unwrap();
    assert!(!report.vent.on);
    assert_eq!(report.dehumidifier, DehumRule::WarmIndoorVeryHumid);
    assert!(rig.dehumidifier());
}

#[test]
fn rain_closed_vent_with_cool_outdoor_air_runs_dehumidifier() {
    // Cool outdoor air but raining: vent shut, nothing else dries the room.
    let mut rig = Rig::new(config(), MockOutdoor::new(10, 95.0, 65.0), MockIndoor::new(70.0, 65.0));
    let report = rig.engine.update(&mut rig.sink).unwrap();

    assert_eq!(report.vent.rule, VentRule::RainGuard);
    assert!(!rig.vent());
    assert!(report.conditions.outdoor_cooler_than_ideal);
    assert_eq!(report.dehumidifier, DehumRule::CoolOutdoorVentClosed);
    assert_eq!(report.dehumidifier_actuation, Actuation::Applied { on: true });
    assert!(rig.dehumidifier());
}

// ── Idempotence ───────────────────────────────────────────────

#[test]
fn steady_conditions_switch_each_line_once() {
    let mut rig = Rig::new(config(), MockOutdoor::new(10, 40.0, 50.0), MockIndoor::new(95.0, 40.0));
    for _ in 0..10 {
        rig.engine.update(&mut rig.sink).unwrap();
        rig.advance_secs(30);
    }
    let actuators = rig.engine.actuators();
    assert_eq!(actuators.calls, vec![ActuatorCall::Activate(Line::Vent)]);
    assert_eq!(actuators.transitions_on(Line::Vent), 1);
    assert_eq!(actuators.transitions_on(Line::Dehumidifier), 0);
    assert_eq!(rig.engine.cycle_count(), 10);
}

// ── Sensor failures ───────────────────────────────────────────

#[test]
fn outdoor_failure_aborts_without_touching_lines() {
    let mut rig = Rig::with_actuators(
        config(),
        MockOutdoor::new(10, 40.0, 50.0),
        MockIndoor::new(95.0, 40.0),
        MockActuators::with_state(true, true),
    );
    rig.engine.outdoor_mut().fail(SensorError::RequestFailed);

    let result = rig.engine.update(&mut rig.sink);
    assert_eq!(result, Err(SensorError::RequestFailed));
    assert_eq!(rig.engine.indoor_mut().reads, 0);
    assert!(rig.engine.actuators().calls.is_empty());
    assert!(rig.vent() && rig.dehumidifier());
    assert_eq!(rig.engine.telemetry().avg_aqi, 0.0);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::CycleAborted { .. })),
        1
    );

    // The next good cycle runs normally.
    rig.engine.outdoor_mut().set(10, 40.0, 50.0);
    assert!(rig.engine.update(&mut rig.sink).is_ok());
}

#[test]
fn indoor_failure_without_history_uses_fallbacks() {
    let mut rig = Rig::new(config(), MockOutdoor::new(10, 40.0, 65.0), MockIndoor::failing());
    let report = rig.engine.update(&mut rig.sink).unwrap();

    assert_eq!(report.indoor_source, IndoorSourceKind::Fallback);
    assert_eq!(report.indoor_temp_f, 70.0);
    assert_eq!(report.indoor_humidity, 40.0);
    // Fallback values are never pushed into the indoor windows.
    assert_eq!(rig.engine.telemetry().avg_indoor_temp_f, 0.0);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::IndoorDegraded {
                source: IndoorSourceKind::Fallback,
                ..
            }
        )),
        1
    );
}

#[test]
fn indoor_hint_overrides_fixed_fallback() {
    let mut rig = Rig::new(config(), MockOutdoor::new(10, 40.0, 65.0), MockIndoor::failing());
    let hint = IndoorHint {
        humidity: Some(55.0),
        temperature_f: None,
    };
    let report = rig.engine.update_with_hint(hint, &mut rig.sink).unwrap();
    assert_eq!(report.indoor_humidity, 55.0);
    assert_eq!(report.indoor_temp_f, 70.0);
}

#[test]
fn indoor_failure_with_history_reuses_averages() {
    let mut rig = Rig::new(config(), MockOutdoor::new(10, 40.0, 65.0), MockIndoor::new(76.0, 60.0));
    rig.engine.update(&mut rig.sink).unwrap();
    rig.engine.indoor_mut().set(78.0, 62.0);
    rig.engine.update(&mut rig.sink).unwrap();

    rig.engine.indoor_mut().fail();
    let hint = IndoorHint {
        humidity: Some(10.0),
        temperature_f: Some(10.0),
    };
    let report = rig.engine.update_with_hint(hint, &mut rig.sink).unwrap();
    assert_eq!(report.indoor_source, IndoorSourceKind::History);
    assert!((report.indoor_temp_f - 77.0).abs() < 1e-4);
    assert!((report.indoor_humidity - 61.0).abs() < 1e-4);
}

// ── Actuator faults ───────────────────────────────────────────

#[test]
fn query_fault_skips_line_and_cycle_continues() {
    let mut actuators = MockActuators::new();
    actuators.fail_query = Some(Line::Vent);
    let mut rig = Rig::with_actuators(
        config(),
        MockOutdoor::new(10, 40.0, 65.0),
        MockIndoor::new(70.0, 65.0),
        actuators,
    );
    let report = rig.engine.update(&mut rig.sink).unwrap();

    assert_eq!(
        report.vent_actuation,
        Actuation::Failed(ActuatorError::GpioReadFailed)
    );
    assert_eq!(report.dehumidifier_actuation, Actuation::Applied { on: true });
    assert!(!rig.vent());
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::ActuatorFault {
                line: Line::Vent,
                ..
            }
        )),
        1
    );
}

#[test]
fn failed_write_is_not_debounced() {
    let mut actuators = MockActuators::new();
    actuators.fail_write = Some(Line::Dehumidifier);
    let mut rig = Rig::with_actuators(
        config(),
        MockOutdoor::new(10, 40.0, 65.0),
        MockIndoor::new(70.0, 65.0),
        actuators,
    );
    let report = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(
        report.dehumidifier_actuation,
        Actuation::Failed(ActuatorError::GpioWriteFailed)
    );
    assert_eq!(rig.engine.last_change_ms(Line::Dehumidifier), None);

    // Fault clears; retry goes through at once.
    rig.engine.actuators_mut().fail_write = None;
    rig.advance_secs(5);
    let retry = rig.engine.update(&mut rig.sink).unwrap();
    assert_eq!(retry.dehumidifier_actuation, Actuation::Applied { on: true });
    assert!(rig.dehumidifier());
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_tracks_smoothed_averages() {
    let mut rig = Rig::new(config(), MockOutdoor::new(10, 40.0, 65.0), MockIndoor::new(72.0, 40.0));
    for aqi in [10, 20, 30] {
        rig.engine.outdoor_mut().set(aqi, 40.0, 65.0);
        rig.engine.update(&mut rig.sink).unwrap();
    }
    let t = rig.engine.telemetry();
    assert_eq!(t.cycle, 3);
    assert!((t.avg_aqi - 20.0).abs() < 1e-4);
    assert!((t.avg_indoor_temp_f - 72.0).abs() < 1e-4);
    assert!(matches!(t.mode, CyclingMode::LimitedVent { .. }));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))),
        3
    );
}
