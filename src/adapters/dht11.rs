//! Indoor DHT11 temperature/humidity probe.
//!
//! The DHT11 is slow and flaky: it must not be polled more often than
//! every 2 s and individual reads fail regularly.  [`Dht11Sensor`] wraps a
//! raw [`HumitureBus`] with:
//!
//! - a minimum spacing after each good read (inside the window that
//!   reading is returned again; a failed read does not start a window),
//! - up to [`DEFAULT_ATTEMPTS`] attempts spaced by a retry delay,
//! - plausibility checks (0–100 %RH, −40–80 °C) so bad samples never
//!   reach the engine,
//! - °C → °F conversion.
//!
//! On Linux the kernel `dht11` driver exposes the probe through IIO sysfs;
//! [`IioHumitureBus`] reads those files.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::app::ports::{IndoorReading, IndoorSource};
use crate::error::SensorError;

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_ATTEMPTS: u8 = 3;

const HUMIDITY_RANGE: core::ops::RangeInclusive<f32> = 0.0..=100.0;
const TEMP_C_RANGE: core::ops::RangeInclusive<f32> = -40.0..=80.0;

/// One raw sample straight off the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHumiture {
    pub temperature_c: f32,
    pub humidity: f32,
}

/// Raw access to a temperature/humidity probe.  No retries, no validation.
pub trait HumitureBus {
    fn read_raw(&mut self) -> Result<RawHumiture, SensorError>;
}

// ---------------------------------------------------------------------------
// IIO sysfs bus
// ---------------------------------------------------------------------------

/// Reads `in_temp_input` (m°C) and `in_humidityrelative_input` (m%RH).
pub struct IioHumitureBus {
    device_dir: PathBuf,
}

impl IioHumitureBus {
    pub fn new(device_dir: impl AsRef<Path>) -> Self {
        Self {
            device_dir: device_dir.as_ref().to_path_buf(),
        }
    }

    fn read_milli(&self, file: &str) -> Result<f32, SensorError> {
        let raw = fs::read_to_string(self.device_dir.join(file)).map_err(|e| {
            debug!("DHT11: {} read failed: {}", file, e);
            SensorError::ReadFailed
        })?;
        let milli: i32 = raw
            .trim()
            .parse()
            .map_err(|_| SensorError::MalformedPayload)?;
        Ok(milli as f32 / 1000.0)
    }
}

impl HumitureBus for IioHumitureBus {
    fn read_raw(&mut self) -> Result<RawHumiture, SensorError> {
        Ok(RawHumiture {
            temperature_c: self.read_milli("in_temp_input")?,
            humidity: self.read_milli("in_humidityrelative_input")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Sensor
// ---------------------------------------------------------------------------

pub fn celsius_to_fahrenheit(c: f32) -> f32 {
    c * 9.0 / 5.0 + 32.0
}

pub struct Dht11Sensor<B> {
    bus: B,
    min_interval: Duration,
    retry_delay: Duration,
    attempts: u8,
    /// Last valid reading and when it was taken.
    last_good: Option<(Instant, IndoorReading)>,
}

impl<B: HumitureBus> Dht11Sensor<B> {
    pub fn new(bus: B) -> Self {
        Self::with_timing(bus, DEFAULT_MIN_INTERVAL, DEFAULT_RETRY_DELAY, DEFAULT_ATTEMPTS)
    }

    pub fn with_timing(bus: B, min_interval: Duration, retry_delay: Duration, attempts: u8) -> Self {
        Self {
            bus,
            min_interval,
            retry_delay,
            attempts: attempts.max(1),
            last_good: None,
        }
    }

    /// Most recent valid reading, if any.
    pub fn last_reading(&self) -> Option<IndoorReading> {
        self.last_good.map(|(_, reading)| reading)
    }

    fn validate(raw: RawHumiture) -> Result<IndoorReading, SensorError> {
        if !HUMIDITY_RANGE.contains(&raw.humidity) || !TEMP_C_RANGE.contains(&raw.temperature_c) {
            return Err(SensorError::OutOfRange);
        }
        Ok(IndoorReading {
            temperature_f: celsius_to_fahrenheit(raw.temperature_c),
            humidity: raw.humidity,
        })
    }
}

impl<B: HumitureBus> IndoorSource for Dht11Sensor<B> {
    fn read(&mut self) -> Result<IndoorReading, SensorError> {
        if let Some((taken, reading)) = self.last_good {
            if taken.elapsed() < self.min_interval {
                debug!("DHT11: read requested inside minimum spacing, reusing last reading");
                return Ok(reading);
            }
        }

        let mut error = SensorError::ReadFailed;
        for attempt in 1..=self.attempts {
            if attempt > 1 {
                thread::sleep(self.retry_delay);
            }
            match self.bus.read_raw().and_then(Self::validate) {
                Ok(reading) => {
                    debug!(
                        "DHT11: attempt {} ok, {:.1}\u{00b0}F {:.1}%",
                        attempt, reading.temperature_f, reading.humidity
                    );
                    self.last_good = Some((Instant::now(), reading));
                    return Ok(reading);
                }
                Err(e) => {
                    warn!("DHT11: attempt {}/{} failed: {}", attempt, self.attempts, e);
                    error = e;
                }
            }
        }
        warn!("DHT11: no valid reading after {} attempts", self.attempts);
        Err(error)
    }
}
