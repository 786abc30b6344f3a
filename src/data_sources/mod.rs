//! External collaborators: air-quality providers and the mapping provider.
//!
//! The engine never talks to a provider directly; it goes through the
//! [`AirQualitySource`] trait so tests can inject deterministic fakes and
//! production can compose real providers.
//!
//! # Providers
//!
//! - [`waqi`]: World Air Quality Index feed (composite AQI per station)
//! - [`open_weather`]: OpenWeather air-pollution endpoint (component
//!   concentrations, converted to AQI)
//! - [`maps`]: Google-style directions and geocoding, plus keyless mock
//!   directions for development

pub mod maps;
pub mod open_weather;
pub mod waqi;

use tracing::warn;

use crate::model::{AqiSample, Coordinate};

pub use maps::MapsClient;
pub use open_weather::OpenWeatherClient;
pub use waqi::WaqiClient;

/// A provider of per-coordinate air-quality readings.
///
/// Implementations are cheap to clone (reqwest clients are internally
/// reference-counted) and safe to call concurrently. A failed call is an
/// ordinary error; the fallback-substitution policy lives in the caller.
pub trait AirQualitySource: Send + Sync {
    /// Fetch the current reading for a coordinate.
    fn sample(
        &self,
        location: Coordinate,
    ) -> impl Future<Output = anyhow::Result<AqiSample>> + Send;
}

/// The production source: try WAQI first (richer composite AQI), fall back
/// to OpenWeather. Either client may be absent when its key is not
/// configured; the source fails only when every configured provider fails.
#[derive(Clone, Default)]
pub struct TieredAirQualitySource {
    waqi: Option<WaqiClient>,
    open_weather: Option<OpenWeatherClient>,
}

impl TieredAirQualitySource {
    /// Build a source from whichever provider keys are configured.
    pub fn new(waqi: Option<WaqiClient>, open_weather: Option<OpenWeatherClient>) -> Self {
        Self { waqi, open_weather }
    }

    /// True when at least one live provider is configured.
    pub fn has_providers(&self) -> bool {
        self.waqi.is_some() || self.open_weather.is_some()
    }
}

impl AirQualitySource for TieredAirQualitySource {
    async fn sample(&self, location: Coordinate) -> anyhow::Result<AqiSample> {
        if let Some(waqi) = &self.waqi {
            match waqi.current(location).await {
                Ok(sample) => return Ok(sample),
                Err(e) => {
                    warn!(
                        lat = location.lat,
                        lng = location.lng,
                        error = %e,
                        "WAQI lookup failed, trying OpenWeather"
                    );
                }
            }
        }

        if let Some(open_weather) = &self.open_weather {
            match open_weather.current(location).await {
                Ok(sample) => return Ok(sample),
                Err(e) => {
                    warn!(
                        lat = location.lat,
                        lng = location.lng,
                        error = %e,
                        "OpenWeather lookup failed"
                    );
                }
            }
        }

        anyhow::bail!("no air-quality provider produced a reading")
    }
}
