//! VentCtl — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  AirStationClient  Dht11Sensor   RelayBank      LogEventSink │
//! │  (OutdoorSource)   (IndoorSource)(ActuatorPort) (EventSink)  │
//! │  JsonConfigFile    MonotonicClock                            │
//! │  (ConfigPort)      (TimePort)                                │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │          DecisionEngine (pure logic)                   │  │
//! │  │  smoothing · rules · cycling · debounce                │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ventctl::adapters::air_station::AirStationClient;
use ventctl::adapters::config_file::JsonConfigFile;
use ventctl::adapters::dht11::{Dht11Sensor, IioHumitureBus};
use ventctl::adapters::hardware::RelayBank;
use ventctl::adapters::log_sink::LogEventSink;
use ventctl::adapters::shutdown::Shutdown;
use ventctl::adapters::sysfs_gpio::SysfsOutputPin;
use ventctl::adapters::time::MonotonicClock;
use ventctl::app::engine::DecisionEngine;
use ventctl::app::ports::{ConfigPort, IndoorSource, OutdoorSource};

#[derive(Parser)]
#[command(name = "ventctl")]
#[command(version)]
#[command(about = "Vent and dehumidifier controller", long_about = None)]
struct Args {
    /// JSON configuration file (defaults are used when it does not exist)
    #[arg(short, long, value_name = "PATH", default_value = "/etc/ventctl.json")]
    config: PathBuf,

    /// Stop after this many cycles (runs forever when omitted)
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Override the configured update interval
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("VentCtl v{} starting", env!("CARGO_PKG_VERSION"));
    let shutdown = Shutdown::install().context("installing signal handlers")?;

    // ── 1. Configuration ──────────────────────────────────────
    let store = JsonConfigFile::new(&args.config);
    let config = store
        .load()
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    let interval = Duration::from_secs(
        args.interval
            .unwrap_or(u64::from(config.update_interval_secs))
            .max(1),
    );

    // ── 2. Sensors (initial readings are informational only) ──
    let mut station = AirStationClient::from_config(&config);
    match station.refresh() {
        Ok(r) => info!(
            "Initial station reading from {} - AQI: {}, temperature: {:.1}\u{00b0}F",
            station.sensor_id().unwrap_or("unknown sensor"),
            r.pm25_aqi,
            r.temperature_f
        ),
        Err(e) => error!("Failed to get initial station reading: {}", e),
    }

    let mut probe = Dht11Sensor::new(IioHumitureBus::new(&config.dht11_iio_device));
    match probe.read() {
        Ok(r) => info!(
            "Initial DHT11 reading - temperature: {:.1}\u{00b0}F, humidity: {:.1}%",
            r.temperature_f, r.humidity
        ),
        Err(e) => warn!("DHT11 - failed to get initial reading: {}", e),
    }

    // ── 3. Actuators (released by RelayBank's Drop once main returns) ──
    let vent = SysfsOutputPin::export(config.vent_gpio).context("opening vent relay GPIO")?;
    let dehumidifier = SysfsOutputPin::export(config.dehumidifier_gpio)
        .context("opening dehumidifier relay GPIO")?;
    let relays = RelayBank::new(vent, dehumidifier);

    // ── 4. Engine ─────────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut engine = DecisionEngine::new(config, station, probe, relays, MonotonicClock::new())
        .context("invalid configuration")?;
    engine.start(&mut sink);
    info!(
        "System ready, updating every {}s{}",
        interval.as_secs(),
        args.cycles
            .map(|n| format!(" for {n} cycles"))
            .unwrap_or_default()
    );

    // ── 5. Polling loop ───────────────────────────────────────
    let mut completed: u64 = 0;
    while !shutdown.requested() {
        // Errors are already reported through the sink; the loop keeps going.
        if let Err(e) = engine.update(&mut sink) {
            debug!("Cycle {} ended early: {}", completed + 1, e);
        }
        completed += 1;
        if args.cycles.is_some_and(|limit| completed >= limit) {
            break;
        }
        if shutdown.wait(interval) {
            break;
        }
    }

    info!("Completed {} cycles, shutting down", completed);
    Ok(())
}
