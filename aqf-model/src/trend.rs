//! Trend extrapolation used when no regression model is available.
//!
//! Three least squares slopes (last 12 values, last 24 values, the whole
//! window) are blended, scaled by a seasonal and a time-of-day multiplier
//! and projected `horizon` hours past the latest value.

use aqf_core::{MeasurementRecord, Pollutant};
use aqf_utils::dates;
use chrono::{NaiveDateTime, Timelike};

/// Values needed before a slope is trusted; below this the profile default is used.
pub const MIN_TREND_VALUES: usize = 3;

const RECENT_WINDOW: usize = 12;
const DAILY_WINDOW: usize = 24;

const RECENT_WEIGHT: f64 = 0.5;
const DAILY_WEIGHT: f64 = 0.3;
const WEEKLY_WEIGHT: f64 = 0.2;

const RUSH_HOUR_FACTOR: f64 = 1.3;
const NIGHT_FACTOR: f64 = 0.8;

/// Per-series extrapolation constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendProfile {
    pub default_value: f64,
    pub min: f64,
    pub max: f64,
    /// Indexed by zero-based month
    pub seasonal: [f64; 12],
}

impl TrendProfile {
    pub fn for_pollutant(pollutant: Pollutant) -> Self {
        let (min, max) = pollutant.bounds();
        TrendProfile {
            default_value: pollutant.trend_default(),
            min,
            max,
            seasonal: pollutant.seasonal_factors(),
        }
    }

    pub fn seasonal_factor(&self, month0: u32) -> f64 {
        self.seasonal.get(month0 as usize).copied().unwrap_or(1.0)
    }
}

/// Least squares slope of `values` against their position.
///
/// `values` is newest-first and x is the index, so x = 0 is the newest
/// value: a series that rose over time has a negative slope and
/// extrapolates back down. Fewer than two values give 0.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / nf;
    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - mean_x;
            (num + dx * (y - mean_y), den + dx * dx)
        });
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Time-of-day multiplier: rush hours raise, night hours lower.
pub fn diurnal_factor(hour: u32) -> f64 {
    let mut factor = 1.0;
    if dates::is_rush_hour(hour) {
        factor *= RUSH_HOUR_FACTOR;
    }
    if dates::is_night_hour(hour) {
        factor *= NIGHT_FACTOR;
    }
    factor
}

/// Extrapolate a newest-first series `horizon` hours past `now`.
pub fn extrapolate(
    values: &[f64],
    profile: &TrendProfile,
    horizon: u32,
    now: &NaiveDateTime,
) -> f64 {
    if values.len() < MIN_TREND_VALUES {
        return profile.default_value;
    }

    let recent = linear_slope(&values[..values.len().min(RECENT_WINDOW)]);
    let daily = linear_slope(&values[..values.len().min(DAILY_WINDOW)]);
    let weekly = linear_slope(values);
    let slope = RECENT_WEIGHT * recent + DAILY_WEIGHT * daily + WEEKLY_WEIGHT * weekly;

    let target_hour = (now.hour() + horizon) % 24;
    let seasonal = profile.seasonal_factor(dates::month0(now));
    let diurnal = diurnal_factor(target_hour);

    let predicted = values[0] + slope * horizon as f64 * seasonal * diurnal;
    predicted.clamp(profile.min, profile.max)
}

/// Trend estimate for one pollutant from a newest-first history.
///
/// Only the first `window` records are considered; missing values are
/// skipped.
pub fn trend_prediction(
    history: &[MeasurementRecord],
    pollutant: Pollutant,
    horizon: u32,
    now: &NaiveDateTime,
    window: usize,
) -> f64 {
    let values: Vec<f64> = history
        .iter()
        .take(window)
        .filter_map(|r| r.pollutant(pollutant))
        .collect();
    extrapolate(&values, &TrendProfile::for_pollutant(pollutant), horizon, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(month: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn history(values: &[Option<f64>]) -> Vec<MeasurementRecord> {
        let now = at(3, 12);
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                MeasurementRecord::new(now - Duration::hours(i as i64), "x")
                    .with_pollutant(Pollutant::Pm25, *v)
            })
            .collect()
    }

    #[test]
    fn test_too_few_values_returns_default() {
        let h = history(&[Some(80.0), None, Some(90.0), None]);
        assert_eq!(trend_prediction(&h, Pollutant::Pm25, 5, &at(3, 12), 48), 35.0);
        assert_eq!(trend_prediction(&[], Pollutant::O3, 1, &at(3, 12), 48), 60.0);
        assert_eq!(
            extrapolate(&[1.0], &TrendProfile::for_pollutant(Pollutant::No2), 1, &at(3, 12)),
            25.0
        );
    }

    #[test]
    fn test_slope_is_measured_along_index() {
        // x = 0 is the newest value
        assert!((linear_slope(&[30.0, 20.0, 10.0]) + 10.0).abs() < 1e-12);
        assert!((linear_slope(&[10.0, 20.0, 30.0]) - 10.0).abs() < 1e-12);
        assert_eq!(linear_slope(&[5.0]), 0.0);
        assert_eq!(linear_slope(&[7.0, 7.0, 7.0]), 0.0);
    }

    #[test]
    fn test_extrapolates_from_latest_with_index_slope() {
        // March (factor 1.0 for pm25), 12:00 + 1h = 13:00 (no diurnal adjustment)
        let profile = TrendProfile::for_pollutant(Pollutant::Pm25);
        let predicted = extrapolate(&[30.0, 20.0, 10.0], &profile, 1, &at(3, 12));
        assert!((predicted - 20.0).abs() < 1e-9);

        let predicted = extrapolate(&[30.0, 28.0, 26.0, 24.0], &profile, 1, &at(3, 12));
        assert!((predicted - 28.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonal_and_diurnal_factors_compose() {
        let values = [30.0, 28.0, 26.0, 24.0];
        let profile = TrendProfile::for_pollutant(Pollutant::Pm25);
        // December (1.4), 6:00 + 2h = 08:00 rush hour (1.3): 30 - 2 * 2 * 1.4 * 1.3
        let predicted = extrapolate(&values, &profile, 2, &at(12, 6));
        assert!((predicted - (30.0 - 4.0 * 1.4 * 1.3)).abs() < 1e-9);
        // 21:00 + 2h = 23:00 night (0.8)
        let predicted = extrapolate(&values, &profile, 2, &at(3, 21));
        assert!((predicted - (30.0 - 4.0 * 0.8)).abs() < 1e-9);
    }

    #[test]
    fn test_diurnal_factor_table() {
        assert_eq!(diurnal_factor(8), 1.3);
        assert_eq!(diurnal_factor(18), 1.3);
        assert_eq!(diurnal_factor(23), 0.8);
        assert_eq!(diurnal_factor(3), 0.8);
        assert_eq!(diurnal_factor(13), 1.0);
    }

    #[test]
    fn test_result_is_clamped() {
        // slope +45 along the index
        let up = [5.0, 50.0, 95.0, 140.0];
        let profile = TrendProfile::for_pollutant(Pollutant::Pm25);
        assert_eq!(extrapolate(&up, &profile, 24, &at(3, 12)), 300.0);

        // slope -40 along the index
        let down = [290.0, 250.0, 210.0, 170.0];
        assert_eq!(extrapolate(&down, &profile, 24, &at(3, 12)), 0.0);

        let aqi = TrendProfile::for_pollutant(Pollutant::Aqi);
        assert_eq!(extrapolate(&[100.0, 50.0, 2.0], &aqi, 12, &at(3, 12)), 1.0);
        assert_eq!(extrapolate(&[2.0, 100.0, 200.0], &aqi, 12, &at(3, 12)), 500.0);
    }

    #[test]
    fn test_window_limits_history() {
        // only the first 3 records are inside the window; the rest would flip the trend
        let mut values = vec![Some(30.0), Some(20.0), Some(10.0)];
        values.extend(std::iter::repeat(Some(500.0)).take(40));
        let h = history(&values);
        let predicted = trend_prediction(&h, Pollutant::Pm25, 1, &at(3, 12), 3);
        assert!((predicted - 20.0).abs() < 1e-9);
    }
}
