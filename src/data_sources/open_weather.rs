//! OpenWeather air-pollution client.
//!
//! OpenWeather reports raw component concentrations (µg/m³) instead of a
//! composite index, so this client converts PM2.5 to a US-EPA AQI before
//! handing the sample to the engine.
//!
//! # API Reference
//!
//! See: <https://openweathermap.org/api/air-pollution>

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{AqiSample, Coordinate, Pollutants};

/// Base URL for the OpenWeather air-pollution API.
const OPEN_WEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

/// Request timeout; a slow provider is treated as a failed one.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Client for the OpenWeather air-pollution endpoint.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    /// Create a new OpenWeather client with the given API key.
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.to_string(),
            base_url: OPEN_WEATHER_API_BASE.to_string(),
        }
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::new(api_key)
        }
    }

    /// Fetch the current reading for a coordinate.
    pub async fn current(&self, location: Coordinate) -> anyhow::Result<AqiSample> {
        let url = format!(
            "{}/air_pollution?lat={}&lon={}&appid={}",
            self.base_url,
            location.lat,
            location.lng,
            urlencoding::encode(&self.api_key)
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let pollution = response.json::<AirPollutionResponse>().await?;

        let entry = pollution
            .list
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("OpenWeather returned an empty reading list"))?;

        let components = entry.components;
        let timestamp = DateTime::from_timestamp(entry.dt, 0).unwrap_or_else(Utc::now);

        Ok(AqiSample {
            location,
            aqi: aqi_from_pm25(components.pm2_5),
            pollutants: Pollutants {
                pm25: components.pm2_5,
                pm10: components.pm10,
                o3: components.o3,
                no2: components.no2,
                so2: components.so2,
                co: components.co,
            },
            timestamp,
            station: Some("OpenWeather".to_string()),
            source: "open-weather".to_string(),
        })
    }
}

/// Convert a PM2.5 concentration (µg/m³) to a US-EPA AQI value.
///
/// Linear interpolation within the EPA breakpoint table, clamped to 0-500.
fn aqi_from_pm25(pm25: f64) -> i32 {
    let aqi = if pm25 <= 12.0 {
        (50.0 / 12.0) * pm25
    } else if pm25 <= 35.4 {
        (100.0 - 51.0) / (35.4 - 12.1) * (pm25 - 12.1) + 51.0
    } else if pm25 <= 55.4 {
        (150.0 - 101.0) / (55.4 - 35.5) * (pm25 - 35.5) + 101.0
    } else if pm25 <= 150.4 {
        (200.0 - 151.0) / (150.4 - 55.5) * (pm25 - 55.5) + 151.0
    } else if pm25 <= 250.4 {
        (300.0 - 201.0) / (250.4 - 150.5) * (pm25 - 150.5) + 201.0
    } else {
        (500.0 - 301.0) / (500.4 - 250.5) * (pm25 - 250.5) + 301.0
    };

    (aqi.round() as i32).clamp(0, 500)
}

/// Top-level air-pollution response.
#[derive(Debug, Deserialize)]
struct AirPollutionResponse {
    #[serde(default)]
    list: Vec<AirPollutionEntry>,
}

/// One reading in the response list.
#[derive(Debug, Deserialize)]
struct AirPollutionEntry {
    /// Unix observation time, seconds.
    dt: i64,
    components: PollutionComponents,
}

/// Component concentrations in µg/m³.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PollutionComponents {
    pm2_5: f64,
    pm10: f64,
    o3: f64,
    no2: f64,
    so2: f64,
    co: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_pm25_breakpoints() {
        assert_eq!(aqi_from_pm25(0.0), 0);
        assert_eq!(aqi_from_pm25(12.0), 50);
        assert_eq!(aqi_from_pm25(35.4), 100);
        assert_eq!(aqi_from_pm25(55.4), 150);
        assert_eq!(aqi_from_pm25(150.4), 200);
        assert_eq!(aqi_from_pm25(250.4), 300);
    }

    #[test]
    fn clamps_extreme_concentrations() {
        assert_eq!(aqi_from_pm25(1000.0), 500);
        assert_eq!(aqi_from_pm25(-5.0), 0);
    }

    #[test]
    fn midband_values_interpolate() {
        // 6 µg/m³ sits halfway through the Good band
        assert_eq!(aqi_from_pm25(6.0), 25);

        // Deep in the Unhealthy band
        let aqi = aqi_from_pm25(100.0);
        assert!((151..=200).contains(&aqi));
    }

    #[test]
    fn parses_air_pollution_response() {
        let raw = r#"{
            "coord": {"lon": 77.59, "lat": 12.97},
            "list": [{
                "main": {"aqi": 3},
                "components": {
                    "co": 250.34, "no": 0.1, "no2": 15.6, "o3": 68.7,
                    "so2": 7.2, "pm2_5": 42.0, "pm10": 61.3, "nh3": 2.1
                },
                "dt": 1750000000
            }]
        }"#;

        let response: AirPollutionResponse = serde_json::from_str(raw).unwrap();
        let entry = &response.list[0];

        assert_eq!(entry.dt, 1750000000);
        assert_eq!(entry.components.pm2_5, 42.0);
        // Extra fields like "no" and "nh3" are ignored
        assert_eq!(entry.components.so2, 7.2);
    }

    #[test]
    fn empty_list_parses() {
        let response: AirPollutionResponse = serde_json::from_str(r#"{"list": []}"#).unwrap();
        assert!(response.list.is_empty());
    }
}
