//! HTTP API handlers for Airpath.
//!
//! Thin layer over [`RouteAnalyzer`]: handlers deserialize the request,
//! delegate to the analyzer (and the maps client for route discovery), and
//! map [`AnalysisError`] variants to status codes. No scoring logic lives
//! here.
//!
//! The maps client is optional. Without a key the planner serves mock
//! directions, so the whole API works in development; geocoding, which has
//! no mock, answers `503`.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::analysis::{AnalysisError, RouteAnalyzer};
use crate::data_sources::maps::{mock_directions, DirectionsOptions, MapsClient};
use crate::data_sources::AirQualitySource;
use crate::model::{
    Coordinate, HealthProfile, RouteAnalysis, RouteComparison, RouteGeometry,
    TimeRecommendations,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState<S> {
    pub analyzer: RouteAnalyzer<S>,
    /// Directions and geocoding collaborator; absent when no maps key is
    /// configured.
    pub maps: Option<MapsClient>,
}

/// Build the application router.
pub fn router<S>(state: AppState<S>) -> Router
where
    S: AirQualitySource + Clone + Send + 'static,
{
    Router::new()
        .route("/routes/plan", post(plan_routes))
        .route("/routes/compare", post(compare_routes))
        .route("/routes/analyze", post(analyze_route))
        .route("/routes/timing", post(route_timing))
        .route("/geocode", post(geocode))
        .route("/geocode/reverse", get(reverse_geocode))
        .route("/health", get(health_check))
        .with_state(state)
}

fn error_status(e: &AnalysisError) -> StatusCode {
    match e {
        AnalysisError::NoRoutesFound => StatusCode::NOT_FOUND,
        AnalysisError::InvalidRouteGeometry(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::AirQualityUnavailable => StatusCode::BAD_GATEWAY,
        AnalysisError::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Request body for `POST /routes/plan`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,

    #[serde(default = "default_alternatives")]
    pub alternatives: bool,

    #[serde(default)]
    pub avoid_tolls: bool,

    #[serde(default)]
    pub departure_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub profile: HealthProfile,
}

fn default_alternatives() -> bool {
    true
}

/// POST /routes/plan - Discover routes between two points and rank them by
/// air quality.
///
/// # Request Body
///
/// ```json
/// {
///     "origin": {"lat": 12.9352, "lng": 77.6245},
///     "destination": {"lat": 12.9698, "lng": 77.7500},
///     "profile": {"hasRespiratoryConditions": true}
/// }
/// ```
///
/// All fields except the endpoints are optional.
///
/// # Response
///
/// The ranked comparison, best route first, with a recommendation verdict.
/// `404` when no route exists between the endpoints.
#[instrument(skip(state, request))]
pub async fn plan_routes<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<RouteComparison>, StatusCode>
where
    S: AirQualitySource + Clone + Send + 'static,
{
    let now = Utc::now();

    let routes = match &state.maps {
        Some(maps) => {
            let options = DirectionsOptions {
                alternatives: request.alternatives,
                avoid_tolls: request.avoid_tolls,
                departure_time: request.departure_time,
            };
            match maps
                .directions(request.origin, request.destination, &options)
                .await
            {
                Ok(routes) => routes,
                Err(e) => {
                    // Without geometry nothing can proceed; report it as the
                    // domain-level "no routes" rather than a generic failure
                    warn!(error = %e, "Directions lookup failed");
                    return Err(error_status(&AnalysisError::NoRoutesFound));
                }
            }
        }
        None => mock_directions(request.origin, request.destination, request.alternatives),
    };

    match state
        .analyzer
        .compare_routes(&routes, &request.profile, now)
        .await
    {
        Ok(comparison) => {
            info!(
                route_count = comparison.routes.len(),
                verdict = ?comparison.recommendation.kind,
                "Routes planned"
            );
            Ok(Json(comparison))
        }
        Err(e) => {
            warn!(error = %e, "Route planning failed");
            Err(error_status(&e))
        }
    }
}

/// Request body for `POST /routes/compare`.
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub routes: Vec<RouteGeometry>,

    #[serde(default)]
    pub profile: HealthProfile,
}

/// POST /routes/compare - Rank caller-supplied route geometries.
///
/// Unlike `/routes/plan`, no directions lookup happens; the caller already
/// has candidate routes and wants the air-quality verdict.
///
/// # Response
///
/// The ranked comparison. `404` for an empty candidate list, `422` when a
/// geometry has no legs or steps.
#[instrument(skip(state, request))]
pub async fn compare_routes<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<RouteComparison>, StatusCode>
where
    S: AirQualitySource + Clone + Send + 'static,
{
    match state
        .analyzer
        .compare_routes(&request.routes, &request.profile, Utc::now())
        .await
    {
        Ok(comparison) => {
            info!(
                route_count = comparison.routes.len(),
                verdict = ?comparison.recommendation.kind,
                "Routes compared"
            );
            Ok(Json(comparison))
        }
        Err(e) => {
            warn!(error = %e, "Route comparison failed");
            Err(error_status(&e))
        }
    }
}

/// Request body for `POST /routes/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub route: RouteGeometry,

    #[serde(default)]
    pub profile: HealthProfile,
}

/// POST /routes/analyze - Full analysis bundle for a single route.
#[instrument(skip(state, request))]
pub async fn analyze_route<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<RouteAnalysis>, StatusCode>
where
    S: AirQualitySource + Clone + Send + 'static,
{
    match state
        .analyzer
        .analyze_route(&request.route, &request.profile, Utc::now())
        .await
    {
        Ok(analysis) => {
            info!(
                route_id = %analysis.route_id,
                breathability = analysis.breathability_score.score,
                alert_count = analysis.alerts.len(),
                "Route analyzed"
            );
            Ok(Json(analysis))
        }
        Err(e) => {
            warn!(error = %e, "Route analysis failed");
            Err(error_status(&e))
        }
    }
}

/// Request body for `POST /routes/timing`.
#[derive(Debug, Deserialize)]
pub struct TimingRequest {
    /// The route's current average AQI.
    #[serde(rename = "avgAQI")]
    pub avg_aqi: f64,

    /// Hour of day to anchor the projection to; the server clock when
    /// absent.
    #[serde(default)]
    pub hour: Option<u32>,
}

/// POST /routes/timing - Departure-time projection for a known average AQI.
///
/// Pure computation; no provider lookups.
#[instrument(skip(request))]
pub async fn route_timing(Json(request): Json<TimingRequest>) -> Json<TimeRecommendations> {
    use chrono::Timelike;
    let hour = request.hour.unwrap_or_else(|| Utc::now().hour());
    let recommendations = crate::timing::recommend(request.avg_aqi, hour);

    info!(
        avg_aqi = request.avg_aqi,
        hour = recommendations.current_hour,
        optimal_count = recommendations.optimal_times.len(),
        "Timing projected"
    );
    Json(recommendations)
}

/// Request body for `POST /geocode`.
#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
}

/// POST /geocode - Resolve a free-form address to a coordinate.
///
/// `503` when no maps key is configured, `404` when the address does not
/// resolve.
#[instrument(skip(state, request))]
pub async fn geocode<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<GeocodeRequest>,
) -> Result<Json<serde_json::Value>, StatusCode>
where
    S: AirQualitySource + Clone + Send + 'static,
{
    let maps = state.maps.as_ref().ok_or_else(|| {
        warn!("Geocoding not configured");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    if request.address.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    match maps.geocode(&request.address).await {
        Ok(place) => {
            info!(address = %place.address, "Address geocoded");
            Ok(Json(serde_json::json!({
                "address": place.address,
                "location": place.location,
                "placeId": place.place_id,
            })))
        }
        Err(e) => {
            warn!(error = %e, "Geocoding failed");
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// Query parameters for `GET /geocode/reverse`.
#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeQuery {
    pub lat: f64,
    pub lng: f64,
}

/// GET /geocode/reverse - Resolve a coordinate to a display address.
///
/// Never fails on lookup trouble: the raw coordinate text is the fallback
/// address.
#[instrument(skip(state))]
pub async fn reverse_geocode<S>(
    State(state): State<AppState<S>>,
    Query(query): Query<ReverseGeocodeQuery>,
) -> Result<Json<serde_json::Value>, StatusCode>
where
    S: AirQualitySource + Clone + Send + 'static,
{
    let maps = state.maps.as_ref().ok_or_else(|| {
        warn!("Geocoding not configured");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    let location = Coordinate {
        lat: query.lat,
        lng: query.lng,
    };
    let address = maps.reverse_geocode(location).await;

    Ok(Json(serde_json::json!({ "address": address })))
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
