use aqf_core::{MeasurementRecord, Pollutant};
use aqf_utils::dates;
use chrono::{Datelike, NaiveDateTime};
use log::debug;
use serde::Serialize;
use std::f64::consts::PI;

use crate::defaults;

/// Calendar features derived from a single timestamp.
///
/// `month` is zero-based so that the seasonal encoding puts January at
/// angle 0 and December next to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeFeatures {
    pub hour: u32,
    /// Sunday = 0
    pub day_of_week: u32,
    pub day_of_month: u32,
    /// January = 0
    pub month: u32,
    pub is_weekend: bool,
    pub is_rush_hour: bool,
    pub season_sin: f64,
    pub season_cos: f64,
    pub hour_sin: f64,
    pub hour_cos: f64,
}

impl TimeFeatures {
    pub fn from_timestamp(ts: &NaiveDateTime) -> Self {
        let hour = dates::hour(ts);
        let day_of_week = dates::day_of_week(ts);
        let month = dates::month0(ts);
        let season_angle = 2.0 * PI * month as f64 / 12.0;
        let hour_angle = 2.0 * PI * hour as f64 / 24.0;
        TimeFeatures {
            hour,
            day_of_week,
            day_of_month: ts.day(),
            month,
            is_weekend: dates::is_weekend(day_of_week),
            is_rush_hour: dates::is_rush_hour(hour),
            season_sin: season_angle.sin(),
            season_cos: season_angle.cos(),
            hour_sin: hour_angle.sin(),
            hour_cos: hour_angle.cos(),
        }
    }
}

/// Derived features for one measurement record.
///
/// Produced in parallel with the input sequence; the vector at index `i`
/// belongs to record `i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    #[serde(flatten)]
    pub time: TimeFeatures,

    pub temperature: f64,
    pub humidity: f64,
    pub pressure: Option<f64>,
    pub wind_speed: f64,
    pub wind_direction: f64,

    pub prev_pm25: Option<f64>,
    pub prev_pm10: Option<f64>,
    pub prev_aqi: Option<f64>,
    pub prev_no2: Option<f64>,
    pub prev_o3: Option<f64>,

    pub ma_pm25: f64,
    pub ma_pm10: f64,
    pub ma_temp: f64,

    pub temp_humidity: f64,
    pub wind_temp: f64,

    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub aqi: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
}

impl FeatureVector {
    /// Regression target for a pollutant (the record's own value).
    pub fn target(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::Aqi => self.aqi,
            Pollutant::No2 => self.no2,
            Pollutant::O3 => self.o3,
        }
    }

    /// Lag value for a pollutant (the preceding record's value).
    pub fn lag(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.prev_pm25,
            Pollutant::Pm10 => self.prev_pm10,
            Pollutant::Aqi => self.prev_aqi,
            Pollutant::No2 => self.prev_no2,
            Pollutant::O3 => self.prev_o3,
        }
    }
}

/// Build one feature vector per record.
///
/// `records` is expected newest-first, as returned by the reading store.
/// Lag values come from the record at the preceding index; the first
/// record has no predecessor and lags to its own values. Moving averages
/// cover up to [`defaults::MOVING_AVERAGE_WINDOW`] records ending at the
/// current one. Missing weather values take the defaults in
/// [`crate::defaults`]; missing targets stay missing.
pub fn build_features(records: &[MeasurementRecord]) -> Vec<FeatureVector> {
    debug!("Building feature vectors for {} records", records.len());
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let lag_source = if index > 0 { &records[index - 1] } else { record };

            let window_size = defaults::MOVING_AVERAGE_WINDOW.min(index + 1);
            let window = &records[index + 1 - window_size..=index];
            let n = window.len() as f64;
            let ma_pm25 = window.iter().map(|r| r.pm25.unwrap_or(0.0)).sum::<f64>() / n;
            let ma_pm10 = window.iter().map(|r| r.pm10.unwrap_or(0.0)).sum::<f64>() / n;
            let ma_temp = window
                .iter()
                .map(|r| r.temperature.unwrap_or(defaults::TEMPERATURE))
                .sum::<f64>()
                / n;

            let temperature = record.temperature.unwrap_or(defaults::TEMPERATURE);
            let humidity = record.humidity.unwrap_or(defaults::HUMIDITY);
            let wind_speed = record.wind_speed.unwrap_or(defaults::WIND_SPEED);

            FeatureVector {
                time: TimeFeatures::from_timestamp(&record.timestamp),
                temperature,
                humidity,
                pressure: record.pressure,
                wind_speed,
                wind_direction: record.wind_direction.unwrap_or(defaults::WIND_DIRECTION),
                prev_pm25: lag_source.pm25,
                prev_pm10: lag_source.pm10,
                prev_aqi: lag_source.aqi,
                prev_no2: lag_source.no2,
                prev_o3: lag_source.o3,
                ma_pm25,
                ma_pm10,
                ma_temp,
                temp_humidity: temperature * humidity / 100.0,
                wind_temp: wind_speed * temperature,
                pm25: record.pm25,
                pm10: record.pm10,
                aqi: record.aqi,
                no2: record.no2,
                o3: record.o3,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    /// Hourly records, newest first, pm25 = 10, 20, 30, ...
    fn series(n: usize) -> Vec<MeasurementRecord> {
        let start = ts(2024, 3, 11, 12);
        (0..n)
            .map(|i| {
                let mut r = MeasurementRecord::new(start - Duration::hours(i as i64), "test")
                    .with_pollutant(Pollutant::Pm25, Some(10.0 * (i + 1) as f64))
                    .with_pollutant(Pollutant::Pm10, Some(100.0));
                r.temperature = Some(20.0 + i as f64);
                r
            })
            .collect()
    }

    #[test]
    fn test_one_vector_per_record() {
        for n in [1, 2, 7, 30] {
            assert_eq!(build_features(&series(n)).len(), n);
        }
        assert!(build_features(&[]).is_empty());
    }

    #[test]
    fn test_first_record_lags_to_itself() {
        let records = series(3);
        let features = build_features(&records);
        assert_eq!(features[0].prev_pm25, records[0].pm25);
        assert_eq!(features[0].prev_pm10, records[0].pm10);
        assert_eq!(features[1].prev_pm25, records[0].pm25);
        assert_eq!(features[2].prev_pm25, records[1].pm25);
        // missing values lag through as missing
        assert_eq!(features[2].prev_o3, None);
    }

    #[test]
    fn test_moving_average_window_shrinks_at_start() {
        let features = build_features(&series(8));
        // index 0: only itself
        assert_eq!(features[0].ma_pm25, 10.0);
        // index 1: (10 + 20) / 2
        assert_eq!(features[1].ma_pm25, 15.0);
        // index 4: (10..=50) / 5
        assert_eq!(features[4].ma_pm25, 30.0);
        // index 7: window capped at 5 -> (40 + 50 + 60 + 70 + 80) / 5
        assert_eq!(features[7].ma_pm25, 60.0);
        assert_eq!(features[7].ma_temp, (23.0 + 24.0 + 25.0 + 26.0 + 27.0) / 5.0);
    }

    #[test]
    fn test_missing_values_in_moving_average() {
        let mut records = series(2);
        records[1].pm25 = None;
        records[1].temperature = None;
        let features = build_features(&records);
        // missing pm25 counts as 0, missing temperature as the default
        assert_eq!(features[1].ma_pm25, 5.0);
        assert_eq!(features[1].ma_temp, (20.0 + 25.0) / 2.0);
    }

    #[test]
    fn test_weather_defaults() {
        let record = MeasurementRecord::new(ts(2024, 6, 1, 3), "test");
        let f = &build_features(&[record])[0];
        assert_eq!(f.temperature, 25.0);
        assert_eq!(f.humidity, 60.0);
        assert_eq!(f.pressure, None);
        assert_eq!(f.wind_speed, 5.0);
        assert_eq!(f.wind_direction, 0.0);
        assert_eq!(f.temp_humidity, 15.0);
        assert_eq!(f.wind_temp, 125.0);
        assert_eq!(f.pm25, None);
    }

    #[test]
    fn test_time_flags() {
        // 2024-03-09 is a Saturday, 2024-03-11 a Monday
        for hour in 0..24 {
            let sat = TimeFeatures::from_timestamp(&ts(2024, 3, 9, hour));
            assert!(sat.is_weekend);
            let mon = TimeFeatures::from_timestamp(&ts(2024, 3, 11, hour));
            assert!(!mon.is_weekend);
            let rush = (7..=9).contains(&hour) || (17..=19).contains(&hour);
            assert_eq!(mon.is_rush_hour, rush, "hour {}", hour);
        }
        let sun = TimeFeatures::from_timestamp(&ts(2024, 3, 10, 12));
        assert_eq!(sun.day_of_week, 0);
        assert!(sun.is_weekend);
    }

    #[test]
    fn test_cyclical_encodings() {
        let jan_midnight = TimeFeatures::from_timestamp(&ts(2024, 1, 1, 0));
        assert_eq!(jan_midnight.month, 0);
        assert_eq!(jan_midnight.season_sin, 0.0);
        assert_eq!(jan_midnight.season_cos, 1.0);
        assert_eq!(jan_midnight.hour_cos, 1.0);

        // December sits next to January on the circle
        let dec = TimeFeatures::from_timestamp(&ts(2024, 12, 1, 23));
        let dist = ((dec.season_sin - jan_midnight.season_sin).powi(2)
            + (dec.season_cos - jan_midnight.season_cos).powi(2))
        .sqrt();
        assert!(dist < 0.6);
        let hour_dist = ((dec.hour_sin - jan_midnight.hour_sin).powi(2)
            + (dec.hour_cos - jan_midnight.hour_cos).powi(2))
        .sqrt();
        assert!(hour_dist < 0.3);
    }

    #[test]
    fn test_builder_is_idempotent() {
        let records = series(12);
        assert_eq!(build_features(&records), build_features(&records));
    }
}
