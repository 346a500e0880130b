//! System configuration parameters
//!
//! All thresholds and durations for the vent controller.  Values are loaded
//! from a JSON file at startup and are fixed for the lifetime of one
//! [`DecisionEngine`](crate::app::engine::DecisionEngine).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::control::cycling::QUICK_VENT_PERIOD_SECS;
use crate::sensors::smoothing::MAX_SMOOTHING_WINDOW;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Air quality ---
    /// Averaged PM2.5 AQI above which the vent is forced closed
    pub aqi_threshold: f32,

    // --- Comfort targets ---
    /// Target indoor relative humidity (%)
    pub ideal_humidity: f32,
    /// Target indoor temperature (°F)
    pub ideal_temperature_f: f32,

    // --- Outdoor guards ---
    /// Outdoor humidity (%) above which venting is refused (rain guard)
    pub max_outdoor_humidity: f32,
    /// Lowest outdoor temperature (°F) at which venting is allowed
    pub min_outdoor_temp_f: f32,
    /// Highest outdoor temperature (°F) at which venting is allowed
    pub max_outdoor_temp_f: f32,

    // --- Dehumidifier ---
    /// Indoor humidity (%) at or below which the dehumidifier is never considered
    pub dehum_min_humidity: f32,
    /// Indoor humidity (%) above which a warm, unvented room is dehumidified
    pub dehum_without_vent_humidity: f32,

    // --- Smoothing / debounce ---
    /// Samples per rolling average (1–32)
    pub smoothing_samples: usize,
    /// Minimum seconds between state changes of the same actuator
    pub min_change_interval_secs: u32,

    // --- Duty cycles ---
    /// Limited-vent ON phase (seconds)
    pub limited_on_secs: u32,
    /// Limited-vent OFF phase (seconds)
    pub limited_off_secs: u32,
    /// Quick-vent ON phase within the fixed 60 minute cycle (seconds)
    pub quick_vent_secs: u32,

    // --- Indoor fallback ---
    /// Indoor humidity (%) assumed before the first valid probe reading
    pub fallback_indoor_humidity: f32,
    /// Indoor temperature (°F) assumed before the first valid probe reading
    pub fallback_indoor_temp_f: f32,

    // --- Timing ---
    /// Seconds between engine updates
    pub update_interval_secs: u32,

    // --- Peripherals ---
    /// Outdoor station live JSON endpoint
    pub station_url: String,
    /// Outdoor station request timeout (seconds)
    pub station_timeout_secs: u32,
    /// BCM header offset of the vent relay (sysfs chip base is added on open)
    pub vent_gpio: u32,
    /// BCM header offset of the dehumidifier relay
    pub dehumidifier_gpio: u32,
    /// IIO device directory exposed by the dht11 kernel driver
    pub dht11_iio_device: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            aqi_threshold: 50.0,

            ideal_humidity: 35.0,
            ideal_temperature_f: 72.0,

            max_outdoor_humidity: 85.0,
            min_outdoor_temp_f: 0.0,
            max_outdoor_temp_f: 90.0,

            dehum_min_humidity: 50.0,
            dehum_without_vent_humidity: 60.0,

            smoothing_samples: 5,
            min_change_interval_secs: 60,

            limited_on_secs: 10 * 60,
            limited_off_secs: 50 * 60,
            quick_vent_secs: 5 * 60,

            fallback_indoor_humidity: 40.0,
            fallback_indoor_temp_f: 70.0,

            update_interval_secs: 30,

            station_url: "http://192.168.4.4/json?live=true".into(),
            station_timeout_secs: 10,
            vent_gpio: 5,
            dehumidifier_gpio: 22,
            dht11_iio_device: "/sys/bus/iio/devices/iio:device0".into(),
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            self.aqi_threshold,
            self.ideal_humidity,
            self.ideal_temperature_f,
            self.max_outdoor_humidity,
            self.min_outdoor_temp_f,
            self.max_outdoor_temp_f,
            self.dehum_min_humidity,
            self.dehum_without_vent_humidity,
            self.fallback_indoor_humidity,
            self.fallback_indoor_temp_f,
        ];
        if floats.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::ValidationFailed(
                "thresholds must be finite numbers",
            ));
        }
        if !(0.0..=500.0).contains(&self.aqi_threshold) {
            return Err(ConfigError::ValidationFailed(
                "aqi_threshold must be 0–500",
            ));
        }
        let humidities = [
            self.ideal_humidity,
            self.max_outdoor_humidity,
            self.dehum_min_humidity,
            self.dehum_without_vent_humidity,
            self.fallback_indoor_humidity,
        ];
        if humidities.iter().any(|h| !(0.0..=100.0).contains(h)) {
            return Err(ConfigError::ValidationFailed(
                "humidity values must be 0–100",
            ));
        }
        if self.min_outdoor_temp_f >= self.max_outdoor_temp_f {
            return Err(ConfigError::ValidationFailed(
                "min_outdoor_temp_f must be < max_outdoor_temp_f",
            ));
        }
        if !(1..=MAX_SMOOTHING_WINDOW).contains(&self.smoothing_samples) {
            return Err(ConfigError::ValidationFailed(
                "smoothing_samples must be 1–32",
            ));
        }
        if self.limited_on_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "limited_on_secs must be > 0",
            ));
        }
        if u64::from(self.limited_on_secs) + u64::from(self.limited_off_secs) == 0 {
            return Err(ConfigError::ValidationFailed(
                "limited_on_secs + limited_off_secs must be > 0",
            ));
        }
        if self.quick_vent_secs == 0 || self.quick_vent_secs >= QUICK_VENT_PERIOD_SECS {
            return Err(ConfigError::ValidationFailed(
                "quick_vent_secs must be 1–3599",
            ));
        }
        if self.update_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "update_interval_secs must be > 0",
            ));
        }
        if self.station_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "station_timeout_secs must be > 0",
            ));
        }
        if self.vent_gpio == self.dehumidifier_gpio {
            return Err(ConfigError::ValidationFailed(
                "vent_gpio and dehumidifier_gpio must differ",
            ));
        }
        Ok(())
    }

    /// Debounce interval in milliseconds.
    pub fn min_change_interval_ms(&self) -> u64 {
        u64::from(self.min_change_interval_secs) * 1000
    }
}
