//! Proactive alert generation over a route's ordered sample sequence.
//!
//! This is the one scoring component that cares about sample order, not
//! just aggregates: high-pollution zones and sensitivity advisories are
//! flagged at the index where they occur, and consecutive pairs are scanned
//! for significant improvements (good spots for a break).
//!
//! The reported `distance` is the `index x 2 km` approximation inherited
//! from the original heuristic, not true distance along the path; callers
//! render it as-is.

use chrono::{DateTime, Utc};

use crate::model::{
    Alert, AlertKind, AlertSeverity, AqiSample, HealthProfile, SensitivityLevel,
};
use crate::scoring::AqiCategory;

/// AQI above this flags a high-pollution zone.
const HIGH_POLLUTION_THRESHOLD: i32 = 150;

/// AQI above this escalates a high-pollution alert to `High` severity.
const SEVERE_POLLUTION_THRESHOLD: i32 = 200;

/// AQI above this triggers an advisory for sensitive riders.
const SENSITIVE_ADVISORY_THRESHOLD: i32 = 100;

/// A drop of at least this many AQI points between consecutive samples is
/// reported as an improvement.
const IMPROVEMENT_DROP: i32 = 50;

/// Generate positional alerts for an ordered sample sequence.
///
/// `now` is the generation timestamp used for alert ids; ids only need to
/// be unique within one pass. An empty sequence yields no alerts. The
/// returned list interleaves zone alerts and improvement alerts in
/// discovery order; it is not globally distance-sorted.
pub fn generate(samples: &[AqiSample], profile: &HealthProfile, now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let stamp = now.timestamp_millis();

    for (i, point) in samples.iter().enumerate() {
        let category = AqiCategory::classify(point.aqi);

        if point.aqi > HIGH_POLLUTION_THRESHOLD {
            let severity = if point.aqi > SEVERE_POLLUTION_THRESHOLD {
                AlertSeverity::High
            } else {
                AlertSeverity::Moderate
            };

            alerts.push(Alert {
                id: format!("alert_{i}_{stamp}"),
                kind: AlertKind::HighPollution,
                severity,
                distance: approximate_distance(i),
                aqi: point.aqi,
                aqi_level: category.level().to_string(),
                message: format!(
                    "High pollution zone ahead (AQI {}). {}",
                    point.aqi,
                    zone_recommendation(point.aqi, profile)
                ),
                action: zone_action(point.aqi).to_string(),
                location: point.location,
            });
        } else if point.aqi > SENSITIVE_ADVISORY_THRESHOLD && sensitive_rider(profile) {
            alerts.push(Alert {
                id: format!("alert_sensitive_{i}_{stamp}"),
                kind: AlertKind::SensitiveAdvisory,
                severity: AlertSeverity::Low,
                distance: approximate_distance(i),
                aqi: point.aqi,
                aqi_level: category.level().to_string(),
                message: format!(
                    "Moderate pollution ahead (AQI {}). Consider precautions due to your health profile.",
                    point.aqi
                ),
                action: "Monitor Symptoms".to_string(),
                location: point.location,
            });
        }
    }

    for (improvement_index, (i, point)) in improvement_points(samples).into_iter().enumerate() {
        alerts.push(Alert {
            id: format!("improvement_{improvement_index}_{stamp}"),
            kind: AlertKind::Improvement,
            severity: AlertSeverity::Info,
            distance: format!("{:.1} km", (i * 2) as f64),
            aqi: point.aqi,
            aqi_level: AqiCategory::classify(point.aqi).level().to_string(),
            message: "Air quality improving ahead! Good area for a break if needed.".to_string(),
            action: "Plan Break".to_string(),
            location: point.location,
        });
    }

    alerts
}

/// Approximate distance along the route for a sample index.
fn approximate_distance(index: usize) -> String {
    if index == 0 {
        "0 km".to_string()
    } else {
        format!("{:.1} km", (index * 2) as f64)
    }
}

/// Whether the rider should receive advisories below the zone threshold.
fn sensitive_rider(profile: &HealthProfile) -> bool {
    profile.has_respiratory_conditions || profile.sensitivity_level == SensitivityLevel::Sensitive
}

/// Zone-entry advice, nested by severity and profile.
fn zone_recommendation(aqi: i32, profile: &HealthProfile) -> &'static str {
    if aqi > SEVERE_POLLUTION_THRESHOLD {
        "Close windows immediately and use A/C recirculation."
    } else if aqi > HIGH_POLLUTION_THRESHOLD {
        if profile.has_respiratory_conditions {
            "Close windows and consider wearing a mask."
        } else {
            "Close windows and use A/C recirculation."
        }
    } else {
        "Monitor air quality and consider precautions."
    }
}

/// Short UI action for a zone alert.
fn zone_action(aqi: i32) -> &'static str {
    if aqi > SEVERE_POLLUTION_THRESHOLD {
        "Close Windows"
    } else if aqi > HIGH_POLLUTION_THRESHOLD {
        "Use Recirculation"
    } else {
        "Monitor"
    }
}

/// Indices where air quality improves by at least [`IMPROVEMENT_DROP`]
/// relative to the previous sample.
fn improvement_points(samples: &[AqiSample]) -> Vec<(usize, &AqiSample)> {
    samples
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].aqi - pair[1].aqi >= IMPROVEMENT_DROP)
        .map(|(i, pair)| (i + 1, &pair[1]))
        .collect()
}
