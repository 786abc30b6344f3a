//! Directions and geocoding client, plus keyless mock directions.
//!
//! Talks to a Google-style Maps API for real routes. When no key is
//! configured the API layer falls back to [`mock_directions`], which builds
//! a plausible fastest/healthiest route pair by interpolating between the
//! endpoints, so the engine runs end to end in development.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{Coordinate, Quantity, RouteGeometry, RouteLeg, RouteStep};

/// Base URL for the Maps API.
const MAPS_API_BASE: &str = "https://maps.googleapis.com/maps/api";

/// Request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Mock routes are built from this many interpolated steps.
const MOCK_STEP_COUNT: usize = 8;

/// Options for a directions lookup.
#[derive(Debug, Clone)]
pub struct DirectionsOptions {
    /// Request alternative routes alongside the fastest one.
    pub alternatives: bool,
    pub avoid_tolls: bool,
    /// Traffic-aware departure time, when the caller has one.
    pub departure_time: Option<DateTime<Utc>>,
}

impl Default for DirectionsOptions {
    fn default() -> Self {
        Self {
            alternatives: true,
            avoid_tolls: false,
            departure_time: None,
        }
    }
}

/// A geocoded place.
#[derive(Debug, Clone)]
pub struct GeocodedPlace {
    pub address: String,
    pub location: Coordinate,
    pub place_id: String,
}

/// Client for the directions and geocoding endpoints.
#[derive(Clone)]
pub struct MapsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl MapsClient {
    /// Create a new maps client with the given API key.
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.to_string(),
            base_url: MAPS_API_BASE.to_string(),
        }
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::new(api_key)
        }
    }

    /// Fetch candidate routes between two points.
    ///
    /// Every returned route carries a fingerprint id derived from its
    /// endpoints and summary. `ZERO_RESULTS` is not an error; it yields an
    /// empty list so the caller decides how to report it.
    pub async fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        options: &DirectionsOptions,
    ) -> anyhow::Result<Vec<RouteGeometry>> {
        let mut url = format!(
            "{}/directions/json?origin={},{}&destination={},{}&alternatives={}&mode=driving&units=metric&language=en&key={}",
            self.base_url,
            origin.lat,
            origin.lng,
            destination.lat,
            destination.lng,
            options.alternatives,
            urlencoding::encode(&self.api_key)
        );
        if options.avoid_tolls {
            url.push_str("&avoid=tolls");
        }
        if let Some(departure) = options.departure_time {
            url.push_str(&format!("&departure_time={}", departure.timestamp()));
        }

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let directions = response.json::<DirectionsResponse>().await?;

        match directions.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(directions
                .routes
                .into_iter()
                .map(|mut route| {
                    route.route_id =
                        Some(route_fingerprint(origin, destination, &route.summary));
                    route
                })
                .collect()),
            status => anyhow::bail!("directions lookup failed: {status}"),
        }
    }

    /// Geocode a free-form address to a coordinate.
    pub async fn geocode(&self, address: &str) -> anyhow::Result<GeocodedPlace> {
        let url = format!(
            "{}/geocode/json?address={}&language=en&key={}",
            self.base_url,
            urlencoding::encode(address),
            urlencoding::encode(&self.api_key)
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let geocoding = response.json::<GeocodeResponse>().await?;

        match geocoding.status.as_str() {
            "OK" => {
                let result = geocoding
                    .results
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("geocoding returned no results"))?;
                Ok(GeocodedPlace {
                    address: result.formatted_address,
                    location: result.geometry.location,
                    place_id: result.place_id,
                })
            }
            "ZERO_RESULTS" => {
                anyhow::bail!("location not found, try a more specific address")
            }
            status => anyhow::bail!("geocoding failed: {status}"),
        }
    }

    /// Reverse-geocode a coordinate. Falls back to the raw coordinate text
    /// when no address is found; address display is never load-bearing.
    pub async fn reverse_geocode(&self, location: Coordinate) -> String {
        let url = format!(
            "{}/geocode/json?latlng={},{}&language=en&key={}",
            self.base_url,
            location.lat,
            location.lng,
            urlencoding::encode(&self.api_key)
        );

        let address = async {
            let response = self.client.get(&url).send().await?.error_for_status()?;
            let geocoding = response.json::<GeocodeResponse>().await?;
            anyhow::ensure!(geocoding.status == "OK", "status {}", geocoding.status);
            geocoding
                .results
                .into_iter()
                .next()
                .map(|r| r.formatted_address)
                .ok_or_else(|| anyhow::anyhow!("no results"))
        }
        .await;

        address.unwrap_or_else(|_| format!("{}, {}", location.lat, location.lng))
    }
}

/// Stable fingerprint for a route, from its endpoints and summary.
pub fn route_fingerprint(origin: Coordinate, destination: Coordinate, summary: &str) -> String {
    let mut hasher = DefaultHasher::new();
    format!(
        "{},{}-{},{}-{summary}",
        origin.lat, origin.lng, destination.lat, destination.lng
    )
    .hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Great-circle distance between two points, kilometers.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Build mock routes between two points: a fastest route, plus a healthiest
/// alternative that trades 15% more distance and 20% more time.
pub fn mock_directions(
    origin: Coordinate,
    destination: Coordinate,
    alternatives: bool,
) -> Vec<RouteGeometry> {
    let distance_km = haversine_km(origin, destination);
    let base_seconds = (distance_km * 2.0).floor() as i64 * 60; // 2 min per km

    let mut routes = vec![mock_route(
        origin,
        destination,
        "Fastest Route",
        distance_km,
        base_seconds,
    )];

    if alternatives {
        routes.push(mock_route(
            origin,
            destination,
            "Healthiest Route",
            distance_km * 1.15,
            (base_seconds as f64 * 1.2) as i64,
        ));
    }

    routes
}

fn mock_route(
    origin: Coordinate,
    destination: Coordinate,
    summary: &str,
    distance_km: f64,
    duration_seconds: i64,
) -> RouteGeometry {
    RouteGeometry {
        route_id: Some(route_fingerprint(origin, destination, summary)),
        summary: summary.to_string(),
        legs: vec![RouteLeg {
            distance: Quantity {
                text: format!("{distance_km:.1} km"),
                value: (distance_km * 1000.0).floor() as i64,
            },
            duration: Quantity {
                text: format_duration(duration_seconds),
                value: duration_seconds,
            },
            start_location: origin,
            end_location: destination,
            steps: mock_steps(origin, destination, MOCK_STEP_COUNT),
        }],
    }
}

/// Interpolate steps along the straight line between the endpoints.
fn mock_steps(origin: Coordinate, destination: Coordinate, count: usize) -> Vec<RouteStep> {
    let d_lat = destination.lat - origin.lat;
    let d_lng = destination.lng - origin.lng;

    (0..count)
        .map(|i| {
            let progress = i as f64 / (count - 1) as f64;
            let start = Coordinate {
                lat: origin.lat + d_lat * progress,
                lng: origin.lng + d_lng * progress,
            };
            let instruction = if i == 0 {
                "Head towards destination"
            } else if i == count - 1 {
                "Arrive at destination"
            } else {
                "Continue straight"
            };

            RouteStep {
                start_location: start,
                end_location: Coordinate {
                    lat: start.lat + d_lat / count as f64,
                    lng: start.lng + d_lng / count as f64,
                },
                distance: Some(Quantity {
                    text: "0.5 km".to_string(),
                    value: 500,
                }),
                duration: Some(Quantity {
                    text: "2 min".to_string(),
                    value: 120,
                }),
                html_instructions: Some(instruction.to_string()),
            }
        })
        .collect()
}

/// "2h 5m" / "24m" display form.
fn format_duration(seconds: i64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<RouteGeometry>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: GeocodeGeometry,
    #[serde(default)]
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: Coordinate,
}
