//! Time-of-day departure recommendations.
//!
//! Projects a route's average AQI across 24 hourly multipliers that follow
//! the usual traffic/pollution diurnal pattern, then picks the departure
//! windows that beat the current average by at least 20%. Pure function of
//! the average and the caller-supplied hour, so tests never depend on the
//! wall clock.

use crate::model::{HourlyPrediction, OptimalSlot, TimeRecommendations};

/// A projected hour qualifies as optimal below this fraction of the
/// route's current average.
const OPTIMAL_FRACTION: f64 = 0.8;

/// How many optimal departure windows to surface.
const MAX_OPTIMAL_TIMES: usize = 3;

/// Diurnal AQI multiplier for an hour of day.
///
/// Morning rush 7-10 and evening rush 17-20 push pollution up; the night
/// hours pull it down; afternoons sit slightly above baseline.
fn hour_multiplier(hour: u32) -> f64 {
    match hour {
        7..=10 => 1.3,
        17..=20 => 1.4,
        22..=23 | 0..=5 => 0.7,
        11..=16 => 1.1,
        _ => 1.0,
    }
}

/// Travel advice bucket for a projected AQI.
fn hour_recommendation(aqi: i32) -> &'static str {
    if aqi < 50 {
        "Excellent time to travel"
    } else if aqi < 100 {
        "Good conditions for travel"
    } else if aqi < 150 {
        "Acceptable conditions with precautions"
    } else if aqi < 200 {
        "Consider postponing if possible"
    } else {
        "Avoid travel if not essential"
    }
}

/// Project departure-time recommendations for a route.
///
/// `avg_aqi` is the route's current average; `current_hour` is 0-23
/// (values beyond 23 wrap). The current-conditions bucket is taken from
/// the projection at `current_hour`, not the raw average, so a request at
/// rush hour already reflects the rush-hour penalty.
pub fn recommend(avg_aqi: f64, current_hour: u32) -> TimeRecommendations {
    let current_hour = current_hour % 24;

    let hourly_predictions: Vec<HourlyPrediction> = (0..24)
        .map(|hour| {
            let aqi = (avg_aqi * hour_multiplier(hour)).floor() as i32;
            HourlyPrediction {
                hour,
                aqi,
                recommendation: hour_recommendation(aqi).to_string(),
                is_optimal: f64::from(aqi) < avg_aqi * OPTIMAL_FRACTION,
            }
        })
        .collect();

    let mut optimal: Vec<&HourlyPrediction> =
        hourly_predictions.iter().filter(|p| p.is_optimal).collect();
    optimal.sort_by_key(|p| p.aqi);

    let optimal_times: Vec<OptimalSlot> = optimal
        .iter()
        .take(MAX_OPTIMAL_TIMES)
        .map(|p| OptimalSlot {
            time: format!("{}:00", p.hour),
            aqi: p.aqi,
            improvement: (avg_aqi - f64::from(p.aqi)).floor() as i32,
        })
        .collect();

    let headline = optimal_times.first().map(|best| {
        format!(
            "Better air quality expected at {} (AQI {})",
            best.time, best.aqi
        )
    });

    let current_prediction = &hourly_predictions[current_hour as usize];

    TimeRecommendations {
        current_hour,
        current_recommendation: current_prediction.recommendation.clone(),
        hourly_predictions,
        optimal_times,
        headline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_24_hours() {
        let rec = recommend(100.0, 12);
        assert_eq!(rec.hourly_predictions.len(), 24);
        assert_eq!(rec.hourly_predictions[0].hour, 0);
        assert_eq!(rec.hourly_predictions[23].hour, 23);
    }

    #[test]
    fn morning_rush_projection_and_bucket() {
        // avg 100 at hour 8: multiplier 1.3 -> 130 -> "acceptable" bucket
        let rec = recommend(100.0, 8);

        assert_eq!(rec.hourly_predictions[8].aqi, 130);
        assert_eq!(
            rec.current_recommendation,
            "Acceptable conditions with precautions"
        );
    }

    #[test]
    fn applies_diurnal_multipliers() {
        let rec = recommend(100.0, 0);
        let by_hour = &rec.hourly_predictions;

        assert_eq!(by_hour[3].aqi, 70); // night 0.7
        assert_eq!(by_hour[8].aqi, 130); // morning rush 1.3
        assert_eq!(by_hour[14].aqi, 110); // afternoon 1.1
        assert_eq!(by_hour[18].aqi, 140); // evening rush 1.4
        assert_eq!(by_hour[6].aqi, 100); // baseline
        assert_eq!(by_hour[23].aqi, 70); // late night 0.7
    }

    #[test]
    fn optimal_times_are_night_hours_best_first() {
        // Only the 0.7 hours fall below 80% of average
        let rec = recommend(100.0, 12);

        assert_eq!(rec.optimal_times.len(), 3);
        for slot in &rec.optimal_times {
            assert_eq!(slot.aqi, 70);
            assert_eq!(slot.improvement, 30);
        }
        assert!(rec.headline.as_deref().unwrap().contains("AQI 70"));
    }

    #[test]
    fn optimal_list_sorted_ascending_by_aqi() {
        let rec = recommend(180.0, 12);

        let aqis: Vec<i32> = rec.optimal_times.iter().map(|s| s.aqi).collect();
        let mut sorted = aqis.clone();
        sorted.sort_unstable();
        assert_eq!(aqis, sorted);
    }

    #[test]
    fn clean_air_has_no_optimal_windows() {
        // At avg 0 nothing can be 20% better
        let rec = recommend(0.0, 12);
        assert!(rec.optimal_times.is_empty());
        assert!(rec.headline.is_none());
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(hour_recommendation(49), "Excellent time to travel");
        assert_eq!(hour_recommendation(50), "Good conditions for travel");
        assert_eq!(hour_recommendation(99), "Good conditions for travel");
        assert_eq!(hour_recommendation(100), "Acceptable conditions with precautions");
        assert_eq!(hour_recommendation(150), "Consider postponing if possible");
        assert_eq!(hour_recommendation(200), "Avoid travel if not essential");
    }

    #[test]
    fn wraps_out_of_range_hour() {
        let rec = recommend(100.0, 26);
        assert_eq!(rec.current_hour, 2);
    }

    #[test]
    fn deterministic_for_fixed_input() {
        let a = recommend(137.0, 17);
        let b = recommend(137.0, 17);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
