//! Personalized health-impact assessment.
//!
//! Combines a route's sample set with the rider's health profile: an
//! additive risk multiplier scales the average AQI, and the scaled value
//! drives the risk tier, recommendation list, health score, and recovery
//! estimate.

use crate::model::{AqiSample, HealthImpact, HealthProfile, RiskLevel, SensitivityLevel};

/// Extra exposure weighting per applicable risk factor. Contributions are
/// additive, so a rider with respiratory and heart conditions lands at
/// exactly 1.0 + 0.5 + 0.4 = 1.9.
fn risk_multiplier(profile: &HealthProfile) -> f64 {
    let mut multiplier = 1.0;

    if profile.has_respiratory_conditions {
        multiplier += 0.5;
    }
    if profile.has_heart_conditions {
        multiplier += 0.4;
    }
    if profile.is_pregnant {
        multiplier += 0.3;
    }
    if age_sensitive(profile) {
        multiplier += 0.2;
    }
    multiplier += match profile.sensitivity_level {
        SensitivityLevel::VerySensitive => 0.3,
        SensitivityLevel::Sensitive => 0.2,
        SensitivityLevel::Normal => 0.0,
    };

    multiplier
}

/// Riders over 65 or under 12 carry an extra weighting. Unknown age does
/// not.
fn age_sensitive(profile: &HealthProfile) -> bool {
    matches!(profile.age, Some(age) if age > 65 || age < 12)
}

/// 0-100 health score: a tier penalty for the adjusted AQI (only the
/// highest matching tier applies) followed by flat deductions per profile
/// risk factor, clamped to range.
fn health_score(adjusted_aqi: f64, profile: &HealthProfile) -> i32 {
    let mut score = 100i32;

    score -= if adjusted_aqi > 300.0 {
        70
    } else if adjusted_aqi > 200.0 {
        50
    } else if adjusted_aqi > 150.0 {
        30
    } else if adjusted_aqi > 100.0 {
        15
    } else if adjusted_aqi > 50.0 {
        5
    } else {
        0
    };

    if profile.has_respiratory_conditions {
        score -= 10;
    }
    if profile.has_heart_conditions {
        score -= 8;
    }
    if profile.is_pregnant {
        score -= 6;
    }
    if age_sensitive(profile) {
        score -= 5;
    }

    score.clamp(0, 100)
}

/// Risk tier for a profile-adjusted AQI. Both the <=50 and <=100 buckets
/// deliberately map to `Low`; the recommendation lists still distinguish
/// them.
fn risk_level(adjusted_aqi: f64) -> RiskLevel {
    if adjusted_aqi <= 100.0 {
        RiskLevel::Low
    } else if adjusted_aqi <= 150.0 {
        RiskLevel::Moderate
    } else if adjusted_aqi <= 200.0 {
        RiskLevel::High
    } else {
        RiskLevel::VeryHigh
    }
}

/// Ordered advice list for the adjusted-AQI bucket. Uses the same
/// <=50/<=100/<=150/<=200/else split as the risk tier.
fn recommendations(adjusted_aqi: f64) -> Vec<String> {
    let advice: &[&str] = if adjusted_aqi <= 50.0 {
        &[
            "Excellent conditions for travel",
            "No special precautions needed",
            "Great time for outdoor activities",
        ]
    } else if adjusted_aqi <= 100.0 {
        &[
            "Good conditions for most people",
            "Stay hydrated during travel",
            "Monitor air quality if you're sensitive",
        ]
    } else if adjusted_aqi <= 150.0 {
        &[
            "Consider closing car windows in high AQI areas",
            "Use A/C recirculation mode",
            "Limit outdoor stops if possible",
        ]
    } else if adjusted_aqi <= 200.0 {
        &[
            "Wear N95 mask if traveling by two-wheeler",
            "Keep windows closed and use A/C recirculation",
            "Consider postponing travel if possible",
            "Use air purifier for 2+ hours post-trip",
        ]
    } else {
        &[
            "Strongly consider postponing non-essential travel",
            "If travel is necessary, wear N95 mask",
            "Keep all windows closed",
            "Use air purifier for 3+ hours post-trip",
            "Monitor for respiratory symptoms",
        ]
    };

    advice.iter().map(|s| s.to_string()).collect()
}

/// Suggested indoor-recovery window after exposure at the adjusted AQI.
fn recovery_time(adjusted_aqi: f64) -> &'static str {
    if adjusted_aqi <= 50.0 {
        "0 hours"
    } else if adjusted_aqi <= 100.0 {
        "30 minutes"
    } else if adjusted_aqi <= 150.0 {
        "1-2 hours"
    } else if adjusted_aqi <= 200.0 {
        "2-3 hours"
    } else if adjusted_aqi <= 300.0 {
        "3-4 hours"
    } else {
        "4+ hours"
    }
}

/// Assess the personalized health impact of a route for one rider.
///
/// Pure function of the sample set and profile. An empty sample set yields
/// zeroed aggregates rather than an error; upstream callers guard against
/// feeding it where that would be meaningless.
pub fn assess(samples: &[AqiSample], profile: &HealthProfile) -> HealthImpact {
    let avg_aqi = if samples.is_empty() {
        0.0
    } else {
        samples.iter().map(|s| f64::from(s.aqi)).sum::<f64>() / samples.len() as f64
    };
    let max_aqi = samples.iter().map(|s| s.aqi).max().unwrap_or(0);
    let min_aqi = samples.iter().map(|s| s.aqi).min().unwrap_or(0);

    let multiplier = risk_multiplier(profile);
    let adjusted_aqi = avg_aqi * multiplier;

    HealthImpact {
        avg_aqi: avg_aqi.floor() as i32,
        adjusted_aqi: adjusted_aqi.floor() as i32,
        max_aqi,
        min_aqi,
        health_score: health_score(adjusted_aqi, profile),
        risk_level: risk_level(adjusted_aqi),
        risk_multiplier: (multiplier * 100.0).round() / 100.0,
        recommendations: recommendations(adjusted_aqi),
        estimated_pm25_exposure: (avg_aqi * 0.6).floor() as i32,
        recovery_time: recovery_time(adjusted_aqi).to_string(),
    }
}
