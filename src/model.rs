//! Data models for Airpath.
//!
//! Everything the scoring engine consumes or produces lives here: pollutant
//! samples, rider health profiles, breathability and health-impact scores,
//! positional alerts, departure-time projections, route geometry, and the
//! per-route analysis bundle.
//!
//! Wire names follow the JSON contract the browser client already speaks
//! (`avgAQI`, `breathabilityScore`, `type`, ...), so serde renames are
//! explicit where camel-casing alone would not produce them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WGS84 point, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Per-pollutant breakdown attached to a sample.
///
/// Carried through to the caller but not consulted by any scoring formula;
/// providers that report only a composite AQI leave these at zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Pollutants {
    #[serde(default)]
    pub pm25: f64,
    #[serde(default)]
    pub pm10: f64,
    #[serde(default)]
    pub o3: f64,
    #[serde(default)]
    pub no2: f64,
    #[serde(default)]
    pub so2: f64,
    #[serde(default)]
    pub co: f64,
}

/// A single air-quality reading at a point along a route.
///
/// Produced by an [`AirQualitySource`](crate::data_sources::AirQualitySource)
/// (or the synthetic fallback generator) and consumed transiently by the
/// scoring components. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqiSample {
    /// Where the reading applies.
    pub location: Coordinate,

    /// Composite air-quality index. Conventionally 0-500 but unbounded
    /// above; classification must not assume an upper limit.
    pub aqi: i32,

    #[serde(flatten)]
    pub pollutants: Pollutants,

    /// When the reading was taken.
    pub timestamp: DateTime<Utc>,

    /// Reporting station name, when the provider exposes one.
    #[serde(default)]
    pub station: Option<String>,

    /// Provider attribution ("waqi", "open-weather", "synthetic").
    pub source: String,
}

/// How sensitive the rider is to air pollution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensitivityLevel {
    #[default]
    Normal,
    Sensitive,
    VerySensitive,
}

/// What the rider optimizes for when routes are ranked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutePreference {
    Healthiest,
    Fastest,
    #[default]
    Balanced,
}

/// A rider's health profile, supplied by the caller and read-only to the
/// engine. Every field has a defined default so an anonymous request (`{}`)
/// is a valid profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthProfile {
    pub has_respiratory_conditions: bool,
    pub has_heart_conditions: bool,
    pub is_pregnant: bool,

    /// Age in years; unknown when absent. Riders over 65 or under 12 get an
    /// extra exposure weighting.
    pub age: Option<u32>,

    pub sensitivity_level: SensitivityLevel,

    /// Ranking preference for multi-route comparison.
    pub preferred_commute: RoutePreference,
}

/// Aggregate air-quality judgment for one route.
///
/// Recomputed wholesale whenever a new sample set arrives (mid-trip
/// updates); never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathabilityScore {
    /// 0-100, higher is better air.
    pub score: i32,

    /// "A+" through "F", or "N/A" when no samples were available.
    pub grade: String,

    #[serde(rename = "avgAQI")]
    pub avg_aqi: i32,
    #[serde(rename = "maxAQI")]
    pub max_aqi: i32,
    #[serde(rename = "minAQI")]
    pub min_aqi: i32,

    /// Spread between the best and worst sample (`maxAQI - minAQI`).
    pub variability: i32,

    /// One-line tier description for display.
    pub analysis: String,
}

/// Risk tier derived from profile-adjusted AQI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }
}

/// Personalized assessment for one route and one rider.
///
/// `healthScore` is a different 0-100 scale from
/// [`BreathabilityScore::score`]: the former penalizes for exposure tier and
/// profile risk factors independently, the latter rates the route's
/// intrinsic air. They are not interchangeable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthImpact {
    #[serde(rename = "avgAQI")]
    pub avg_aqi: i32,

    /// `avgAQI` scaled by the rider's risk multiplier.
    #[serde(rename = "adjustedAQI")]
    pub adjusted_aqi: i32,

    #[serde(rename = "maxAQI")]
    pub max_aqi: i32,
    #[serde(rename = "minAQI")]
    pub min_aqi: i32,

    /// 0-100 after tier penalty and profile deductions.
    pub health_score: i32,

    pub risk_level: RiskLevel,

    /// Additive-factor scalar, >= 1.0, two decimal places.
    pub risk_multiplier: f64,

    /// Actionable advice for the matched risk bucket, in display order.
    pub recommendations: Vec<String>,

    /// Rough PM2.5 exposure estimate derived from the average AQI.
    #[serde(rename = "estimatedPM25Exposure")]
    pub estimated_pm25_exposure: i32,

    /// Suggested indoor-recovery window after the trip.
    pub recovery_time: String,
}

/// Alert classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    HighPollution,
    SensitiveAdvisory,
    Improvement,
}

/// Alert urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    High,
    Moderate,
    Low,
    Info,
}

/// A positional notice tied to one point in a route's sample sequence.
///
/// Generated fresh per analysis pass and never persisted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique within one generation pass.
    pub id: String,

    #[serde(rename = "type")]
    pub kind: AlertKind,

    pub severity: AlertSeverity,

    /// Approximate distance along the route ("0 km", "4.0 km"). Derived
    /// from the sample index, not the true path distance.
    pub distance: String,

    pub aqi: i32,

    /// Classifier level label for `aqi` ("Good", "Unhealthy", ...).
    #[serde(rename = "aqiLevel")]
    pub aqi_level: String,

    pub message: String,

    /// Short imperative for the UI ("Close Windows", "Plan Break").
    pub action: String,

    pub location: Coordinate,
}

/// Projected AQI for one hour of the day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPrediction {
    /// Hour of day, 0-23.
    pub hour: u32,

    pub aqi: i32,

    /// Travel advice bucket for the projected value.
    pub recommendation: String,

    /// True when at least 20% better than the route's current average.
    pub is_optimal: bool,
}

/// One recommended departure window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimalSlot {
    /// "H:00" display form.
    pub time: String,

    pub aqi: i32,

    /// AQI points saved versus the route's current average.
    pub improvement: i32,
}

/// Departure-time projection for a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRecommendations {
    /// The hour the projection was anchored to (caller-supplied).
    pub current_hour: u32,

    /// Advice bucket for the projection at `current_hour`.
    pub current_recommendation: String,

    /// One entry per hour, 0-23.
    pub hourly_predictions: Vec<HourlyPrediction>,

    /// Up to three optimal departure windows, best first.
    pub optimal_times: Vec<OptimalSlot>,

    /// Headline for the best window, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
}

/// A distance or duration with its display text, as mapping providers
/// return them (`value` is meters or seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quantity {
    pub text: String,
    pub value: i64,
}

/// One step of a route leg. Only the endpoints matter to the engine; the
/// instruction text is carried for the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    pub start_location: Coordinate,
    pub end_location: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_instructions: Option<String>,
}

/// One leg of a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance: Quantity,
    pub duration: Quantity,
    pub start_location: Coordinate,
    pub end_location: Coordinate,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

/// Route geometry as supplied by the mapping collaborator.
///
/// The engine depends only on the ability to read the leg endpoints,
/// subsample step coordinates, and the first leg's distance/duration
/// values. Everything else is opaque payload for the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteGeometry {
    /// Stable identity assigned upstream, when present. The analyzer
    /// derives a fingerprint from the endpoints and summary otherwise.
    #[serde(default, rename = "routeId", skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,

    #[serde(default)]
    pub summary: String,

    pub legs: Vec<RouteLeg>,
}

impl RouteGeometry {
    /// First leg, if the geometry has one.
    pub fn primary_leg(&self) -> Option<&RouteLeg> {
        self.legs.first()
    }

    /// Trip duration in seconds from the first leg, zero when absent.
    pub fn duration_seconds(&self) -> i64 {
        self.primary_leg().map(|l| l.duration.value).unwrap_or(0)
    }
}

/// The full output bundle for one candidate route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAnalysis {
    pub route_id: String,

    /// The geometry this analysis was computed from, echoed back so the
    /// client can render the route alongside its scores.
    pub route: RouteGeometry,

    pub air_quality_data: Vec<AqiSample>,
    pub breathability_score: BreathabilityScore,
    pub health_impact: HealthImpact,
    pub alerts: Vec<Alert>,
    pub time_recommendations: TimeRecommendations,

    /// Preference-weighted ranking score, 0-100.
    pub overall_score: f64,

    pub analysis_timestamp: DateTime<Utc>,
}

/// Strength of the comparison verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    /// Only one candidate route existed.
    Single,
    /// Best route beats the worst by more than 20 points.
    StrongPreference,
    /// Best route beats the worst by more than 10 points.
    ModeratePreference,
    /// Candidates are close; choose by time preference.
    Similar,
}

/// Natural-language verdict for a multi-route comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,

    pub message: String,

    /// Index into the ranked list, when a route is singled out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_route: Option<usize>,

    /// "N AQI points less exposure" figure, when a route is singled out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// The winner's overall score, for single-route verdicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Ranked result of comparing every candidate route between a pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteComparison {
    /// Analyses in rank order, best first. Ties keep input order.
    pub routes: Vec<RouteAnalysis>,

    pub recommendation: ComparisonRecommendation,

    pub comparison_timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_profile_deserializes_with_defaults() {
        let profile: HealthProfile = serde_json::from_str("{}").unwrap();

        assert!(!profile.has_respiratory_conditions);
        assert!(!profile.has_heart_conditions);
        assert!(!profile.is_pregnant);
        assert_eq!(profile.age, None);
        assert_eq!(profile.sensitivity_level, SensitivityLevel::Normal);
        assert_eq!(profile.preferred_commute, RoutePreference::Balanced);
    }

    #[test]
    fn profile_accepts_kebab_case_sensitivity() {
        let profile: HealthProfile = serde_json::from_str(
            r#"{"sensitivityLevel": "very-sensitive", "preferredCommute": "healthiest"}"#,
        )
        .unwrap();

        assert_eq!(profile.sensitivity_level, SensitivityLevel::VerySensitive);
        assert_eq!(profile.preferred_commute, RoutePreference::Healthiest);
    }

    #[test]
    fn breathability_serializes_legacy_field_names() {
        let score = BreathabilityScore {
            score: 71,
            grade: "B".to_string(),
            avg_aqi: 132,
            max_aqi: 165,
            min_aqi: 95,
            variability: 70,
            analysis: "Moderate air quality".to_string(),
        };

        let json = serde_json::to_value(&score).unwrap();
        assert_eq!(json["avgAQI"], 132);
        assert_eq!(json["maxAQI"], 165);
        assert_eq!(json["minAQI"], 95);
    }

    #[test]
    fn alert_kind_serializes_as_type() {
        let alert = Alert {
            id: "alert_0_1".to_string(),
            kind: AlertKind::HighPollution,
            severity: AlertSeverity::Moderate,
            distance: "0 km".to_string(),
            aqi: 180,
            aqi_level: "Unhealthy".to_string(),
            message: "High pollution zone ahead".to_string(),
            action: "Use Recirculation".to_string(),
            location: Coordinate { lat: 0.0, lng: 0.0 },
        };

        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "high-pollution");
        assert_eq!(json["severity"], "moderate");
    }

    #[test]
    fn route_geometry_parses_provider_shape() {
        let raw = r#"{
            "summary": "NH48",
            "legs": [{
                "distance": {"text": "12.0 km", "value": 12000},
                "duration": {"text": "24m", "value": 1440},
                "start_location": {"lat": 12.93, "lng": 77.61},
                "end_location": {"lat": 12.98, "lng": 77.59},
                "steps": [{
                    "start_location": {"lat": 12.93, "lng": 77.61},
                    "end_location": {"lat": 12.95, "lng": 77.60}
                }]
            }]
        }"#;

        let route: RouteGeometry = serde_json::from_str(raw).unwrap();
        assert_eq!(route.duration_seconds(), 1440);
        assert_eq!(route.primary_leg().unwrap().steps.len(), 1);
        assert!(route.route_id.is_none());
    }
}
