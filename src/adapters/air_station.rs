//! Outdoor air station adapter (PurpleAir-style local JSON endpoint).
//!
//! Polls `GET <station_url>` and extracts PM2.5 AQI, relative humidity and
//! temperature.  Every failure (transport, decode, implausible value) is
//! returned as a [`SensorError`]; nothing here panics.

use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use crate::app::ports::{OutdoorReading, OutdoorSource};
use crate::config::SystemConfig;
use crate::error::SensorError;

/// Plausible AQI range (EPA scale).
const AQI_RANGE: core::ops::RangeInclusive<i32> = 0..=500;
const HUMIDITY_RANGE: core::ops::RangeInclusive<f32> = 0.0..=100.0;
/// Station's internal sensor reads hotter than ambient; allow headroom.
const TEMP_F_RANGE: core::ops::RangeInclusive<f32> = -40.0..=140.0;

#[derive(Debug, Deserialize)]
struct StationPayload {
    #[serde(rename = "pm2.5_aqi")]
    pm25_aqi: i32,
    current_humidity: f32,
    current_temp_f: f32,
    #[serde(rename = "SensorId", default)]
    sensor_id: Option<String>,
}

/// Decode and validate one station response body.
pub fn parse_payload(body: &str) -> Result<OutdoorReading, SensorError> {
    decode(body).map(|(reading, _)| reading)
}

fn decode(body: &str) -> Result<(OutdoorReading, Option<String>), SensorError> {
    let payload: StationPayload =
        serde_json::from_str(body).map_err(|_| SensorError::MalformedPayload)?;

    if !AQI_RANGE.contains(&payload.pm25_aqi)
        || !HUMIDITY_RANGE.contains(&payload.current_humidity)
        || !TEMP_F_RANGE.contains(&payload.current_temp_f)
    {
        warn!(
            "AirStation: implausible reading AQI={} hum={} temp={}",
            payload.pm25_aqi, payload.current_humidity, payload.current_temp_f
        );
        return Err(SensorError::OutOfRange);
    }

    let reading = OutdoorReading {
        pm25_aqi: payload.pm25_aqi,
        humidity: payload.current_humidity,
        temperature_f: payload.current_temp_f,
    };
    Ok((reading, payload.sensor_id))
}

/// HTTP client for the outdoor station.
pub struct AirStationClient {
    agent: ureq::Agent,
    url: String,
    sensor_id: Option<String>,
    last: Option<OutdoorReading>,
}

impl AirStationClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            url: url.into(),
            sensor_id: None,
            last: None,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(
            config.station_url.clone(),
            Duration::from_secs(u64::from(config.station_timeout_secs)),
        )
    }

    /// Station identifier reported in the most recent good payload.
    pub fn sensor_id(&self) -> Option<&str> {
        self.sensor_id.as_deref()
    }

    pub fn last_reading(&self) -> Option<OutdoorReading> {
        self.last
    }

    fn fetch(&self) -> Result<String, SensorError> {
        let response = self.agent.get(&self.url).call().map_err(|e| {
            warn!("AirStation: GET {} failed: {}", self.url, e);
            SensorError::RequestFailed
        })?;
        response.into_string().map_err(|e| {
            warn!("AirStation: failed to read response body: {}", e);
            SensorError::RequestFailed
        })
    }
}

impl OutdoorSource for AirStationClient {
    fn refresh(&mut self) -> Result<OutdoorReading, SensorError> {
        let body = self.fetch()?;
        let (reading, sensor_id) = decode(&body)?;
        if sensor_id.is_some() {
            self.sensor_id = sensor_id;
        }
        debug!(
            "AirStation: AQI={} hum={:.1}% temp={:.1}\u{00b0}F",
            reading.pm25_aqi, reading.humidity, reading.temperature_f
        );
        self.last = Some(reading);
        Ok(reading)
    }
}
