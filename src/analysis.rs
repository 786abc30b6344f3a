//! The route analyzer: orchestrates sampling, scoring, and comparison.
//!
//! [`RouteAnalyzer`] is the engine's front door. Given a route geometry and
//! a rider profile it subsamples the path, fetches a reading per point from
//! its [`AirQualitySource`], and runs every scoring component over the
//! result. Comparison analyzes each candidate concurrently, ranks by the
//! preference-weighted overall score, and attaches a verdict.
//!
//! Provider failures are substituted point-by-point with synthetic readings
//! unless the analyzer was built [`without_fallback`], in which case a
//! failed point aborts the whole analysis.
//!
//! [`without_fallback`]: RouteAnalyzer::without_fallback

use std::cmp::Ordering;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use thiserror::Error;
use tracing::warn;

use crate::data_sources::{maps, AirQualitySource};
use crate::fallback::SyntheticReadings;
use crate::model::{
    AqiSample, ComparisonRecommendation, Coordinate, HealthProfile, RecommendationKind,
    RouteAnalysis, RouteComparison, RouteGeometry, RoutePreference,
};
use crate::{alerts, health, scoring, timing};

/// Upper bound on air-quality lookups per route.
const MAX_SAMPLE_POINTS: usize = 10;

/// Pause between consecutive provider lookups, to stay friendly to
/// rate-limited free tiers.
const DEFAULT_SAMPLE_GAP: Duration = Duration::from_millis(200);

/// Best-to-worst score gap above which the verdict is a strong preference.
const STRONG_PREFERENCE_GAP: f64 = 20.0;

/// Best-to-worst score gap above which the verdict is a moderate preference.
const MODERATE_PREFERENCE_GAP: f64 = 10.0;

/// Failures the analyzer reports to its caller.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no routes found between these locations")]
    NoRoutesFound,

    #[error("air quality data is unavailable for this route")]
    AirQualityUnavailable,

    #[error("invalid route geometry: {0}")]
    InvalidRouteGeometry(String),

    #[error("route analysis task failed: {0}")]
    TaskFailed(String),
}

/// Analyzes and compares routes against an air-quality source.
///
/// Cheap to clone; comparison clones one analyzer per candidate route.
#[derive(Clone)]
pub struct RouteAnalyzer<S> {
    source: S,
    fallback: Option<SyntheticReadings>,
    sample_gap: Duration,
}

impl<S> RouteAnalyzer<S>
where
    S: AirQualitySource + Clone + 'static,
{
    /// Create an analyzer with synthetic fallback and the default
    /// inter-lookup gap.
    pub fn new(source: S) -> Self {
        Self {
            source,
            fallback: Some(SyntheticReadings::default()),
            sample_gap: DEFAULT_SAMPLE_GAP,
        }
    }

    /// Disable synthetic substitution: any provider failure surfaces as
    /// [`AnalysisError::AirQualityUnavailable`].
    pub fn without_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    /// Override the pause between provider lookups (tests use zero).
    pub fn with_sample_gap(mut self, gap: Duration) -> Self {
        self.sample_gap = gap;
        self
    }

    /// Analyze one route for one rider.
    ///
    /// `now` anchors the alert ids, the time-of-day projection, and any
    /// synthetic readings, so a fixed `now` makes the whole pass
    /// reproducible.
    pub async fn analyze_route(
        &self,
        route: &RouteGeometry,
        profile: &HealthProfile,
        now: DateTime<Utc>,
    ) -> Result<RouteAnalysis, AnalysisError> {
        let coordinates = sample_coordinates(route)?;
        let samples = self.route_samples(&coordinates, now).await?;

        let breathability_score = scoring::breathability(&samples);
        let health_impact = health::assess(&samples, profile);
        let alerts = alerts::generate(&samples, profile, now);

        let avg_aqi =
            samples.iter().map(|s| f64::from(s.aqi)).sum::<f64>() / samples.len() as f64;
        let time_recommendations = timing::recommend(avg_aqi, now.hour());

        let overall_score = overall_score(
            breathability_score.score,
            health_impact.health_score,
            route.duration_seconds(),
            profile.preferred_commute,
        );

        Ok(RouteAnalysis {
            route_id: route_identity(route),
            route: route.clone(),
            air_quality_data: samples,
            breathability_score,
            health_impact,
            alerts,
            time_recommendations,
            overall_score,
            analysis_timestamp: now,
        })
    }

    /// Analyze every candidate and rank them best-first.
    ///
    /// Candidates are analyzed concurrently; ranking is a stable descending
    /// sort on the overall score, so equal-scoring routes keep their input
    /// order.
    pub async fn compare_routes(
        &self,
        routes: &[RouteGeometry],
        profile: &HealthProfile,
        now: DateTime<Utc>,
    ) -> Result<RouteComparison, AnalysisError> {
        if routes.is_empty() {
            return Err(AnalysisError::NoRoutesFound);
        }

        let handles: Vec<_> = routes
            .iter()
            .map(|route| {
                let analyzer = self.clone();
                let route = route.clone();
                let profile = profile.clone();
                tokio::spawn(async move { analyzer.analyze_route(&route, &profile, now).await })
            })
            .collect();

        let mut ranked = Vec::with_capacity(handles.len());
        for handle in handles {
            ranked.push(
                handle
                    .await
                    .map_err(|e| AnalysisError::TaskFailed(e.to_string()))??,
            );
        }

        ranked.sort_by(|a, b| {
            b.overall_score
                .partial_cmp(&a.overall_score)
                .unwrap_or(Ordering::Equal)
        });

        let recommendation = comparison_recommendation(&ranked);

        Ok(RouteComparison {
            routes: ranked,
            recommendation,
            comparison_timestamp: now,
        })
    }

    /// Fetch one reading per coordinate, throttled, with per-point
    /// fallback substitution.
    async fn route_samples(
        &self,
        coordinates: &[Coordinate],
        now: DateTime<Utc>,
    ) -> Result<Vec<AqiSample>, AnalysisError> {
        let mut samples = Vec::with_capacity(coordinates.len());

        for (i, &coordinate) in coordinates.iter().enumerate() {
            if i > 0 && !self.sample_gap.is_zero() {
                tokio::time::sleep(self.sample_gap).await;
            }

            match self.source.sample(coordinate).await {
                Ok(sample) => samples.push(sample),
                Err(e) => match self.fallback {
                    Some(generator) => {
                        warn!(
                            lat = coordinate.lat,
                            lng = coordinate.lng,
                            error = %e,
                            "provider lookup failed, substituting synthetic reading"
                        );
                        samples.push(generator.reading(coordinate, now));
                    }
                    None => return Err(AnalysisError::AirQualityUnavailable),
                },
            }
        }

        Ok(samples)
    }
}

/// Subsample a route's step coordinates for air-quality lookups.
///
/// Always includes the first step's start and the last step's end, plus
/// intermediate step starts subsampled evenly, filling up to
/// [`MAX_SAMPLE_POINTS`] total when the route has enough steps.
fn sample_coordinates(route: &RouteGeometry) -> Result<Vec<Coordinate>, AnalysisError> {
    let leg = route
        .primary_leg()
        .ok_or_else(|| AnalysisError::InvalidRouteGeometry("route has no legs".to_string()))?;
    if leg.steps.is_empty() {
        return Err(AnalysisError::InvalidRouteGeometry(
            "route leg has no steps".to_string(),
        ));
    }

    let steps = &leg.steps;
    let mut coordinates = vec![steps[0].start_location];

    // Spread as many intermediate step starts as the cap allows evenly
    // across the remaining steps.
    let intermediate = (steps.len() - 1).min(MAX_SAMPLE_POINTS - 2);
    for k in 1..=intermediate {
        let i = k * (steps.len() - 1) / intermediate;
        coordinates.push(steps[i].start_location);
    }

    coordinates.push(steps[steps.len() - 1].end_location);
    Ok(coordinates)
}

/// Preference-weighted ranking score, clamped to 0-100.
///
/// Healthiest blends in the personal health score; fastest blends in a time
/// factor that loses 10 points per travel hour down to a floor of 50;
/// balanced is the breathability score unchanged.
fn overall_score(
    breathability: i32,
    health_score: i32,
    duration_seconds: i64,
    preference: RoutePreference,
) -> f64 {
    let base = f64::from(breathability);

    let score = match preference {
        RoutePreference::Healthiest => base * 0.8 + f64::from(health_score) * 0.2,
        RoutePreference::Fastest => {
            let time_factor = (1.0 - (duration_seconds as f64 / 3600.0) * 0.1).max(0.5);
            base * 0.6 + time_factor * 100.0 * 0.4
        }
        RoutePreference::Balanced => base,
    };

    score.clamp(0.0, 100.0)
}

/// Verdict for a ranked (best-first) list of analyses.
fn comparison_recommendation(ranked: &[RouteAnalysis]) -> ComparisonRecommendation {
    let best = &ranked[0];
    let worst = &ranked[ranked.len() - 1];

    if ranked.len() == 1 {
        return ComparisonRecommendation {
            kind: RecommendationKind::Single,
            message: format!(
                "Route has {} air quality rating",
                best.breathability_score.grade
            ),
            recommended_route: None,
            benefit: None,
            note: None,
            score: Some(best.overall_score),
        };
    }

    let gap = best.overall_score - worst.overall_score;
    let exposure_benefit = format!(
        "{} AQI points less exposure",
        worst.health_impact.avg_aqi - best.health_impact.avg_aqi
    );

    if gap > STRONG_PREFERENCE_GAP {
        ComparisonRecommendation {
            kind: RecommendationKind::StrongPreference,
            message: format!(
                "Healthiest route is significantly better ({gap:.0} points higher)"
            ),
            recommended_route: Some(0),
            benefit: Some(exposure_benefit),
            note: None,
            score: None,
        }
    } else if gap > MODERATE_PREFERENCE_GAP {
        ComparisonRecommendation {
            kind: RecommendationKind::ModeratePreference,
            message: "Healthiest route offers moderate improvement".to_string(),
            recommended_route: Some(0),
            benefit: Some(exposure_benefit),
            note: None,
            score: None,
        }
    } else {
        ComparisonRecommendation {
            kind: RecommendationKind::Similar,
            message: "Routes have similar air quality impact".to_string(),
            recommended_route: None,
            benefit: None,
            note: Some("Choose based on time preference".to_string()),
            score: None,
        }
    }
}

/// Upstream route id when present, endpoint fingerprint otherwise.
fn route_identity(route: &RouteGeometry) -> String {
    if let Some(id) = &route.route_id {
        return id.clone();
    }

    match route.primary_leg() {
        Some(leg) => {
            maps::route_fingerprint(leg.start_location, leg.end_location, &route.summary)
        }
        None => route.summary.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pollutants, Quantity, RouteLeg, RouteStep};
    use chrono::TimeZone;

    /// Source returning a fixed AQI derived from the coordinate's latitude
    /// band, so tests can give different routes different air.
    #[derive(Clone)]
    struct BandedSource;

    impl AirQualitySource for BandedSource {
        async fn sample(&self, location: Coordinate) -> anyhow::Result<AqiSample> {
            let aqi = if location.lat < 5.0 { 40 } else { 220 };
            Ok(AqiSample {
                location,
                aqi,
                pollutants: Pollutants::default(),
                timestamp: Utc::now(),
                station: None,
                source: "test".to_string(),
            })
        }
    }

    #[derive(Clone)]
    struct FailingSource;

    impl AirQualitySource for FailingSource {
        async fn sample(&self, _location: Coordinate) -> anyhow::Result<AqiSample> {
            anyhow::bail!("provider offline")
        }
    }

    fn route_with_steps(base_lat: f64, step_count: usize, duration: i64) -> RouteGeometry {
        let steps: Vec<RouteStep> = (0..step_count)
            .map(|i| RouteStep {
                start_location: Coordinate {
                    lat: base_lat + i as f64 * 0.001,
                    lng: 77.6,
                },
                end_location: Coordinate {
                    lat: base_lat + (i + 1) as f64 * 0.001,
                    lng: 77.6,
                },
                distance: None,
                duration: None,
                html_instructions: None,
            })
            .collect();

        RouteGeometry {
            route_id: None,
            summary: format!("lat {base_lat} route"),
            legs: vec![RouteLeg {
                distance: Quantity { text: "12.0 km".to_string(), value: 12000 },
                duration: Quantity { text: "24m".to_string(), value: duration },
                start_location: steps[0].start_location,
                end_location: steps[step_count - 1].end_location,
                steps,
            }],
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn analyzer<S: AirQualitySource + Clone + 'static>(source: S) -> RouteAnalyzer<S> {
        RouteAnalyzer::new(source).with_sample_gap(Duration::ZERO)
    }

    #[test]
    fn subsampling_keeps_endpoints_and_caps_points() {
        let route = route_with_steps(0.0, 40, 1440);
        let coordinates = sample_coordinates(&route).unwrap();

        assert_eq!(coordinates.len(), MAX_SAMPLE_POINTS);

        let steps = &route.legs[0].steps;
        assert_eq!(coordinates[0], steps[0].start_location);
        assert_eq!(*coordinates.last().unwrap(), steps[39].end_location);
    }

    #[test]
    fn subsampling_fills_the_cap_when_steps_allow() {
        // 9 steps fit exactly: start, the starts of steps 1-8, and the end
        let route = route_with_steps(0.0, 9, 1440);
        let coordinates = sample_coordinates(&route).unwrap();

        assert_eq!(coordinates.len(), MAX_SAMPLE_POINTS);

        let steps = &route.legs[0].steps;
        for (k, coordinate) in coordinates[1..9].iter().enumerate() {
            assert_eq!(*coordinate, steps[k + 1].start_location);
        }
    }

    #[test]
    fn short_routes_sample_every_step() {
        let route = route_with_steps(0.0, 3, 600);
        let coordinates = sample_coordinates(&route).unwrap();

        // start, steps 1 and 2, end
        assert_eq!(coordinates.len(), 4);
    }

    #[test]
    fn rejects_geometry_without_legs_or_steps() {
        let no_legs = RouteGeometry {
            route_id: None,
            summary: String::new(),
            legs: vec![],
        };
        assert!(matches!(
            sample_coordinates(&no_legs),
            Err(AnalysisError::InvalidRouteGeometry(_))
        ));

        let mut no_steps = route_with_steps(0.0, 2, 600);
        no_steps.legs[0].steps.clear();
        assert!(matches!(
            sample_coordinates(&no_steps),
            Err(AnalysisError::InvalidRouteGeometry(_))
        ));
    }

    #[tokio::test]
    async fn analyzes_a_route_end_to_end() {
        let route = route_with_steps(0.0, 8, 1440);
        let analysis = analyzer(BandedSource)
            .analyze_route(&route, &HealthProfile::default(), fixed_now())
            .await
            .unwrap();

        // Every sample in the low band reads 40
        assert_eq!(analysis.breathability_score.avg_aqi, 40);
        assert_eq!(analysis.breathability_score.grade, "A+");
        assert_eq!(analysis.health_impact.risk_level.label(), "Low");
        assert!(analysis.alerts.is_empty());
        assert_eq!(analysis.time_recommendations.hourly_predictions.len(), 24);
        assert_eq!(analysis.analysis_timestamp, fixed_now());

        // Balanced preference ranks by breathability alone
        assert_eq!(
            analysis.overall_score,
            f64::from(analysis.breathability_score.score)
        );
    }

    #[tokio::test]
    async fn derives_route_identity_when_absent() {
        let mut route = route_with_steps(0.0, 4, 600);
        let analysis = analyzer(BandedSource)
            .analyze_route(&route, &HealthProfile::default(), fixed_now())
            .await
            .unwrap();
        assert_eq!(analysis.route_id.len(), 16);

        route.route_id = Some("upstream-id".to_string());
        let analysis = analyzer(BandedSource)
            .analyze_route(&route, &HealthProfile::default(), fixed_now())
            .await
            .unwrap();
        assert_eq!(analysis.route_id, "upstream-id");
    }

    #[tokio::test]
    async fn failed_lookups_substitute_synthetic_readings() {
        let route = route_with_steps(12.9, 6, 600);
        let analysis = analyzer(FailingSource)
            .analyze_route(&route, &HealthProfile::default(), fixed_now())
            .await
            .unwrap();

        assert!(!analysis.air_quality_data.is_empty());
        assert!(analysis
            .air_quality_data
            .iter()
            .all(|s| s.source == "synthetic"));
    }

    #[tokio::test]
    async fn without_fallback_surfaces_provider_failure() {
        let route = route_with_steps(12.9, 6, 600);
        let result = analyzer(FailingSource)
            .without_fallback()
            .analyze_route(&route, &HealthProfile::default(), fixed_now())
            .await;

        assert!(matches!(result, Err(AnalysisError::AirQualityUnavailable)));
    }

    #[tokio::test]
    async fn comparison_rejects_empty_candidate_list() {
        let result = analyzer(BandedSource)
            .compare_routes(&[], &HealthProfile::default(), fixed_now())
            .await;

        assert!(matches!(result, Err(AnalysisError::NoRoutesFound)));
    }

    #[tokio::test]
    async fn comparison_ranks_cleaner_route_first() {
        // Polluted route (lat 10 band, AQI 220) listed first; clean route
        // (AQI 40) must still win the ranking.
        let polluted = route_with_steps(10.0, 8, 1440);
        let clean = route_with_steps(0.0, 8, 1440);

        let comparison = analyzer(BandedSource)
            .compare_routes(&[polluted, clean], &HealthProfile::default(), fixed_now())
            .await
            .unwrap();

        assert_eq!(comparison.routes.len(), 2);
        assert_eq!(comparison.routes[0].breathability_score.avg_aqi, 40);
        assert_eq!(comparison.routes[1].breathability_score.avg_aqi, 220);
        assert!(
            comparison.routes[0].overall_score > comparison.routes[1].overall_score
        );

        // 96 vs 38: a strong preference with the exposure delta spelled out
        let rec = &comparison.recommendation;
        assert_eq!(rec.kind, RecommendationKind::StrongPreference);
        assert_eq!(rec.recommended_route, Some(0));
        assert_eq!(rec.benefit.as_deref(), Some("180 AQI points less exposure"));
    }

    #[tokio::test]
    async fn single_route_comparison_reports_grade() {
        let comparison = analyzer(BandedSource)
            .compare_routes(
                &[route_with_steps(0.0, 8, 1440)],
                &HealthProfile::default(),
                fixed_now(),
            )
            .await
            .unwrap();

        let rec = &comparison.recommendation;
        assert_eq!(rec.kind, RecommendationKind::Single);
        assert!(rec.message.contains("A+"));
        assert!(rec.score.is_some());
    }

    #[tokio::test]
    async fn equal_routes_read_as_similar() {
        let a = route_with_steps(0.0, 8, 1440);
        let b = route_with_steps(0.5, 8, 1440);

        let comparison = analyzer(BandedSource)
            .compare_routes(&[a, b], &HealthProfile::default(), fixed_now())
            .await
            .unwrap();

        let rec = &comparison.recommendation;
        assert_eq!(rec.kind, RecommendationKind::Similar);
        assert_eq!(rec.note.as_deref(), Some("Choose based on time preference"));

        // Equal scores keep input order
        assert_eq!(comparison.routes[0].route.summary, "lat 0 route");
        assert_eq!(comparison.routes[1].route.summary, "lat 0.5 route");
    }

    #[test]
    fn overall_score_weighs_preferences() {
        // Balanced: breathability unchanged
        assert_eq!(overall_score(70, 90, 1800, RoutePreference::Balanced), 70.0);

        // Healthiest: 70*0.8 + 90*0.2 = 74
        assert_eq!(
            overall_score(70, 90, 1800, RoutePreference::Healthiest),
            74.0
        );

        // Fastest, 30 min trip: time factor 0.95 -> 70*0.6 + 95*0.4 = 80
        assert_eq!(overall_score(70, 90, 1800, RoutePreference::Fastest), 80.0);

        // Fastest, marathon trip: time factor floors at 0.5
        assert_eq!(
            overall_score(70, 90, 36_000, RoutePreference::Fastest),
            62.0
        );
    }
}
