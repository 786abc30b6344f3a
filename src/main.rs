//! Airpath - A health-aware trip planner that scores routes by air-quality
//! exposure.
//!
//! # Overview
//!
//! Airpath discovers candidate routes between two points, samples air
//! quality along each one, and ranks the candidates by a preference-weighted
//! breathability score, with personalized health impact, proactive alerts,
//! and departure-time advice attached.
//!
//! # API Endpoints
//!
//! - `POST /routes/plan` - Discover and rank routes between two points
//! - `POST /routes/compare` - Rank caller-supplied route geometries
//! - `POST /routes/analyze` - Full analysis bundle for one route
//! - `POST /routes/timing` - Departure-time projection for an average AQI
//! - `POST /geocode` - Resolve an address to a coordinate
//! - `GET /geocode/reverse` - Resolve a coordinate to an address
//! - `GET /health` - Health check
//!
//! # Configuration
//!
//! All configuration is via environment variables; every provider key is
//! optional and the server degrades to mock/synthetic data without them.
//!
//! - `AIRPATH_PORT`: listen port (default 3000)
//! - `WAQI_API_TOKEN`: World Air Quality Index token
//! - `OPENWEATHER_API_KEY`: OpenWeather air-pollution key
//! - `GOOGLE_MAPS_API_KEY`: directions and geocoding key
//! - `AIRPATH_SAMPLE_GAP_MS`: pause between provider lookups (default 200)

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use airpath::analysis::RouteAnalyzer;
use airpath::api::{AppState, router};
use airpath::data_sources::{
    MapsClient, OpenWeatherClient, TieredAirQualitySource, WaqiClient,
};

/// Default port if not specified via environment variable.
const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("airpath=info".parse()?))
        .init();

    // Load configuration from environment
    let port: u16 = env::var("AIRPATH_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let waqi = env::var("WAQI_API_TOKEN")
        .ok()
        .map(|token| WaqiClient::new(&token));
    let open_weather = env::var("OPENWEATHER_API_KEY")
        .ok()
        .map(|key| OpenWeatherClient::new(&key));
    let maps = env::var("GOOGLE_MAPS_API_KEY")
        .ok()
        .map(|key| MapsClient::new(&key));

    let source = TieredAirQualitySource::new(waqi, open_weather);
    info!(
        live_providers = source.has_providers(),
        maps_configured = maps.is_some(),
        "Configured data sources"
    );

    let mut analyzer = RouteAnalyzer::new(source);
    if let Some(gap_ms) = env::var("AIRPATH_SAMPLE_GAP_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
    {
        analyzer = analyzer.with_sample_gap(Duration::from_millis(gap_ms));
    }

    let state = AppState { analyzer, maps };
    let app = router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Airpath is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
