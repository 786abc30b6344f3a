//! AQI classification and route breathability scoring.
//!
//! Both operations here are pure functions over in-memory samples. The
//! classifier maps any finite AQI to a discrete severity tier; the scorer
//! collapses an ordered sample set into a single 0-100 rating with a letter
//! grade and summary statistics.

use serde::{Deserialize, Serialize};

use crate::model::{AqiSample, BreathabilityScore};

/// Discrete AQI severity tier (US EPA banding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Classify an AQI value into its tier.
    ///
    /// Total over `i32`: negative input clamps to the lowest tier, and
    /// values past 500 stay `Hazardous`. Never panics.
    ///
    /// # Thresholds
    ///
    /// - `Good`: <= 50
    /// - `Moderate`: 51-100
    /// - `UnhealthySensitive`: 101-150
    /// - `Unhealthy`: 151-200
    /// - `VeryUnhealthy`: 201-300
    /// - `Hazardous`: 301+
    pub fn classify(aqi: i32) -> Self {
        Self::classify_mean(f64::from(aqi))
    }

    /// Classify a fractional mean AQI into its tier.
    ///
    /// A mean of 150.5 already sits past the 150 boundary and must read as
    /// `Unhealthy`, so means are never floored before classification.
    pub fn classify_mean(avg_aqi: f64) -> Self {
        if avg_aqi <= 50.0 {
            AqiCategory::Good
        } else if avg_aqi <= 100.0 {
            AqiCategory::Moderate
        } else if avg_aqi <= 150.0 {
            AqiCategory::UnhealthySensitive
        } else if avg_aqi <= 200.0 {
            AqiCategory::Unhealthy
        } else if avg_aqi <= 300.0 {
            AqiCategory::VeryUnhealthy
        } else {
            AqiCategory::Hazardous
        }
    }

    /// Display level label.
    pub fn level(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthySensitive => "Unhealthy for Sensitive",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Display color for map and badge rendering.
    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#00E400",
            AqiCategory::Moderate => "#FFFF00",
            AqiCategory::UnhealthySensitive => "#FF7E00",
            AqiCategory::Unhealthy => "#FF0000",
            AqiCategory::VeryUnhealthy => "#8F3F97",
            AqiCategory::Hazardous => "#7E0023",
        }
    }

    /// Letter grade for the tier.
    pub fn grade(&self) -> &'static str {
        match self {
            AqiCategory::Good => "A+",
            AqiCategory::Moderate => "A",
            AqiCategory::UnhealthySensitive => "B",
            AqiCategory::Unhealthy => "C",
            AqiCategory::VeryUnhealthy => "D",
            AqiCategory::Hazardous => "F",
        }
    }

    /// One-line route summary for the tier.
    fn route_analysis(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Excellent air quality throughout the route",
            AqiCategory::Moderate => "Good air quality with minimal health concerns",
            AqiCategory::UnhealthySensitive => {
                "Moderate air quality, consider precautions for sensitive individuals"
            }
            AqiCategory::Unhealthy => "Unhealthy air quality, take protective measures",
            AqiCategory::VeryUnhealthy => "Very unhealthy air quality, avoid if possible",
            AqiCategory::Hazardous => "Hazardous air quality, emergency conditions",
        }
    }
}

/// Score an ordered sample set into a route breathability rating.
///
/// The grade follows the tier of the (unfloored) mean AQI, and the score
/// decreases within each tier as the mean approaches the tier's worse
/// boundary, so two routes in the same tier still rank by actual exposure.
/// The final score is clamped to 0-100.
///
/// An empty sample set is not an error: it yields the degenerate
/// `{score: 0, grade: "N/A"}` result so sparse-data pipelines never crash.
pub fn breathability(samples: &[AqiSample]) -> BreathabilityScore {
    if samples.is_empty() {
        return BreathabilityScore {
            score: 0,
            grade: "N/A".to_string(),
            avg_aqi: 0,
            max_aqi: 0,
            min_aqi: 0,
            variability: 0,
            analysis: "No data available".to_string(),
        };
    }

    let avg_aqi = samples.iter().map(|s| f64::from(s.aqi)).sum::<f64>() / samples.len() as f64;
    let max_aqi = samples.iter().map(|s| s.aqi).max().unwrap_or(0);
    let min_aqi = samples.iter().map(|s| s.aqi).min().unwrap_or(0);

    // One classification of the unfloored mean drives the grade, the
    // analysis line, and the score branch, so a mean straddling a tier
    // boundary can never wear one tier's grade with another tier's score.
    let category = AqiCategory::classify_mean(avg_aqi);

    // Within-tier gradient: score falls as the mean climbs toward the
    // tier's worse boundary.
    let raw_score = match category {
        AqiCategory::Good => 95.0 + (50.0 - avg_aqi) / 10.0,
        AqiCategory::Moderate => 85.0 + (100.0 - avg_aqi) / 10.0,
        AqiCategory::UnhealthySensitive => 70.0 + (150.0 - avg_aqi) / 10.0,
        AqiCategory::Unhealthy => 50.0 + (200.0 - avg_aqi) / 10.0,
        AqiCategory::VeryUnhealthy => 30.0 + (300.0 - avg_aqi) / 10.0,
        AqiCategory::Hazardous => (30.0 - (avg_aqi - 300.0) / 10.0).max(0.0),
    };

    BreathabilityScore {
        score: (raw_score.floor() as i32).clamp(0, 100),
        grade: category.grade().to_string(),
        avg_aqi: avg_aqi.floor() as i32,
        max_aqi,
        min_aqi,
        variability: max_aqi - min_aqi,
        analysis: category.route_analysis().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinate, Pollutants};
    use chrono::Utc;

    fn sample(aqi: i32) -> AqiSample {
        AqiSample {
            location: Coordinate { lat: 12.97, lng: 77.59 },
            aqi,
            pollutants: Pollutants::default(),
            timestamp: Utc::now(),
            station: None,
            source: "test".to_string(),
        }
    }

    #[test]
    fn classify_tier_boundaries() {
        assert_eq!(AqiCategory::classify(0), AqiCategory::Good);
        assert_eq!(AqiCategory::classify(50), AqiCategory::Good);
        assert_eq!(AqiCategory::classify(51), AqiCategory::Moderate);
        assert_eq!(AqiCategory::classify(100), AqiCategory::Moderate);
        assert_eq!(AqiCategory::classify(101), AqiCategory::UnhealthySensitive);
        assert_eq!(AqiCategory::classify(150), AqiCategory::UnhealthySensitive);
        assert_eq!(AqiCategory::classify(151), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::classify(200), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::classify(201), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::classify(300), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::classify(301), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::classify(500), AqiCategory::Hazardous);
    }

    #[test]
    fn classify_handles_out_of_range_input() {
        // Negative and absurd inputs resolve to a tier instead of panicking
        assert_eq!(AqiCategory::classify(-5), AqiCategory::Good);
        assert_eq!(AqiCategory::classify(i32::MIN), AqiCategory::Good);
        assert_eq!(AqiCategory::classify(i32::MAX), AqiCategory::Hazardous);
    }

    #[test]
    fn classify_grades_and_levels() {
        assert_eq!(AqiCategory::classify(50).grade(), "A+");
        assert_eq!(AqiCategory::classify(50).level(), "Good");
        assert_eq!(AqiCategory::classify(51).grade(), "A");
        assert_eq!(AqiCategory::classify(500).grade(), "F");
        assert_eq!(AqiCategory::classify(500).level(), "Hazardous");
    }

    #[test]
    fn empty_samples_yield_degenerate_score() {
        let score = breathability(&[]);

        assert_eq!(score.score, 0);
        assert_eq!(score.grade, "N/A");
        assert_eq!(score.analysis, "No data available");
        assert_eq!(score.variability, 0);
    }

    #[test]
    fn scores_mixed_route() {
        // avg = 132.5 -> floored 132, tier B, score floor(70 + 17.5/10) = 71
        let samples: Vec<_> = [145, 165, 125, 95].into_iter().map(sample).collect();
        let score = breathability(&samples);

        assert_eq!(score.avg_aqi, 132);
        assert_eq!(score.grade, "B");
        assert_eq!(score.score, 71);
        assert!((70..=80).contains(&score.score));
        assert_eq!(score.max_aqi, 165);
        assert_eq!(score.min_aqi, 95);
        assert_eq!(score.variability, 70);
    }

    #[test]
    fn fractional_boundary_mean_grades_and_scores_from_one_tier() {
        // Mean 150.5 is past the 150 boundary: the whole result must read
        // as the Unhealthy tier, not a B grade on a C-tier score.
        let samples: Vec<_> = [150, 151].into_iter().map(sample).collect();
        let score = breathability(&samples);

        assert_eq!(score.grade, "C");
        assert_eq!(score.score, 54); // floor(50 + (200 - 150.5) / 10)
        assert_eq!(score.analysis, "Unhealthy air quality, take protective measures");
        assert_eq!(score.avg_aqi, 150);

        // Same agreement one tier down
        let samples: Vec<_> = [100, 101].into_iter().map(sample).collect();
        let score = breathability(&samples);

        assert_eq!(score.grade, "B");
        assert_eq!(score.score, 74); // floor(70 + (150 - 100.5) / 10)

        // An exact integer boundary still belongs to the lower tier
        let score = breathability(&[sample(150)]);
        assert_eq!(score.grade, "B");
        assert_eq!(score.score, 70);
    }

    #[test]
    fn score_is_monotonic_within_a_tier() {
        for (lo, hi) in [(10, 40), (60, 95), (110, 145), (160, 195), (210, 290)] {
            let better = breathability(&[sample(lo)]);
            let worse = breathability(&[sample(hi)]);
            assert!(
                better.score >= worse.score,
                "score({lo}) = {} < score({hi}) = {}",
                better.score,
                worse.score
            );
        }
    }

    #[test]
    fn pristine_air_caps_at_100() {
        let score = breathability(&[sample(0)]);
        assert_eq!(score.score, 100);
        assert_eq!(score.grade, "A+");
    }

    #[test]
    fn extreme_pollution_floors_at_zero() {
        let score = breathability(&[sample(700)]);
        assert_eq!(score.score, 0);
        assert_eq!(score.grade, "F");
    }

    #[test]
    fn deterministic_for_fixed_input() {
        let samples: Vec<_> = [88, 132, 45].into_iter().map(sample).collect();
        let a = breathability(&samples);
        let b = breathability(&samples);

        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
