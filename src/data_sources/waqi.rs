//! World Air Quality Index (WAQI) feed client.
//!
//! WAQI aggregates government monitoring stations worldwide and reports a
//! composite AQI per station, which is what the scoring engine wants.
//!
//! # API Reference
//!
//! See: <https://aqicn.org/json-api/doc/>

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;

use crate::model::{AqiSample, Coordinate, Pollutants};

/// Base URL for the WAQI API.
const WAQI_API_BASE: &str = "https://api.waqi.info";

/// Request timeout; a slow provider is treated as a failed one.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Client for the WAQI geolocated feed endpoint.
#[derive(Clone)]
pub struct WaqiClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl WaqiClient {
    /// Create a new WAQI client with the given API token.
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            token: token.to_string(),
            base_url: WAQI_API_BASE.to_string(),
        }
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(token: &str, base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::new(token)
        }
    }

    /// Fetch the current reading for a coordinate from the nearest station.
    pub async fn current(&self, location: Coordinate) -> anyhow::Result<AqiSample> {
        let url = format!(
            "{}/feed/geo:{};{}/?token={}",
            self.base_url,
            location.lat,
            location.lng,
            urlencoding::encode(&self.token)
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let feed = response.json::<WaqiFeedResponse>().await?;

        if feed.status != "ok" {
            anyhow::bail!("WAQI returned status {:?}", feed.status);
        }
        let data = feed
            .data
            .ok_or_else(|| anyhow::anyhow!("WAQI response missing data"))?;

        let timestamp = data
            .time
            .as_ref()
            .and_then(|t| chrono::DateTime::parse_from_rfc3339(&t.iso).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(AqiSample {
            location,
            aqi: data.aqi,
            pollutants: Pollutants {
                pm25: data.iaqi_value("pm25"),
                pm10: data.iaqi_value("pm10"),
                o3: data.iaqi_value("o3"),
                no2: data.iaqi_value("no2"),
                so2: data.iaqi_value("so2"),
                co: data.iaqi_value("co"),
            },
            timestamp,
            station: data.city.map(|c| c.name),
            source: "waqi".to_string(),
        })
    }
}

/// Top-level WAQI feed response.
#[derive(Debug, Deserialize)]
struct WaqiFeedResponse {
    status: String,
    data: Option<WaqiFeedData>,
}

/// Station data for a feed lookup.
#[derive(Debug, Deserialize)]
struct WaqiFeedData {
    /// Composite AQI. Stations occasionally report "-"; `default` turns an
    /// absent value into 0 and a non-numeric one into a parse failure,
    /// which the tiered source treats as a provider miss.
    #[serde(default)]
    aqi: i32,

    /// Per-pollutant sub-indices.
    #[serde(default)]
    iaqi: HashMap<String, WaqiIaqiValue>,

    time: Option<WaqiTime>,
    city: Option<WaqiCity>,
}

impl WaqiFeedData {
    fn iaqi_value(&self, key: &str) -> f64 {
        self.iaqi.get(key).map(|v| v.v).unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct WaqiIaqiValue {
    v: f64,
}

#[derive(Debug, Deserialize)]
struct WaqiTime {
    /// ISO-8601 observation time.
    iso: String,
}

#[derive(Debug, Deserialize)]
struct WaqiCity {
    name: String,
}
