//! Flat numeric input vectors for the regression models.
//!
//! The column order is shared by training and prediction and must not change
//! without retraining every model.

use aqf_core::MeasurementRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::builder::{FeatureVector, TimeFeatures};
use crate::defaults;

/// Number of model inputs.
pub const INPUT_DIM: usize = 21;

/// Model input vector.
pub type InputVector = [f64; INPUT_DIM];

/// Column names, in input order.
pub const INPUT_NAMES: [&str; INPUT_DIM] = [
    "hour",
    "day_of_week",
    "month",
    "is_weekend",
    "is_rush_hour",
    "temperature",
    "humidity",
    "pressure",
    "wind_speed",
    "season_sin",
    "season_cos",
    "hour_sin",
    "hour_cos",
    "prev_pm25",
    "prev_pm10",
    "prev_aqi",
    "ma_pm25",
    "ma_pm10",
    "ma_temp",
    "temp_humidity",
    "wind_temp",
];

// Latest-record fallbacks for lag inputs at prediction time.
const PREDICTION_PM25: f64 = 35.0;
const PREDICTION_PM10: f64 = 50.0;
const PREDICTION_AQI: f64 = 75.0;

/// Weather conditions for one forecast step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherConditions {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
}

impl WeatherConditions {
    /// Current conditions of a record, with defaults for missing values.
    pub fn from_record(record: &MeasurementRecord) -> Self {
        WeatherConditions {
            temperature: record.temperature.unwrap_or(defaults::TEMPERATURE),
            humidity: record.humidity.unwrap_or(defaults::HUMIDITY),
            pressure: record.pressure.unwrap_or(defaults::PRESSURE),
            wind_speed: record.wind_speed.unwrap_or(defaults::WIND_SPEED),
            wind_direction: record.wind_direction.unwrap_or(defaults::WIND_DIRECTION),
        }
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl FeatureVector {
    /// Flatten into the model input order.
    ///
    /// Missing pressure takes the standard atmosphere; missing lag values are 0.
    pub fn to_input(&self) -> InputVector {
        let t = &self.time;
        [
            t.hour as f64,
            t.day_of_week as f64,
            t.month as f64,
            flag(t.is_weekend),
            flag(t.is_rush_hour),
            self.temperature,
            self.humidity,
            self.pressure.unwrap_or(defaults::PRESSURE),
            self.wind_speed,
            t.season_sin,
            t.season_cos,
            t.hour_sin,
            t.hour_cos,
            self.prev_pm25.unwrap_or(0.0),
            self.prev_pm10.unwrap_or(0.0),
            self.prev_aqi.unwrap_or(0.0),
            self.ma_pm25,
            self.ma_pm10,
            self.ma_temp,
            self.temp_humidity,
            self.wind_temp,
        ]
    }
}

/// Input vector for predicting at a future time.
///
/// Calendar inputs come from `at`, weather inputs from the synthesized
/// `weather`, and the lag and moving-average inputs are the latest
/// record's values (not rolled forward between steps).
pub fn prediction_input(
    at: &NaiveDateTime,
    latest: &MeasurementRecord,
    weather: &WeatherConditions,
) -> InputVector {
    let t = TimeFeatures::from_timestamp(at);
    let pm25 = latest.pm25.unwrap_or(PREDICTION_PM25);
    let pm10 = latest.pm10.unwrap_or(PREDICTION_PM10);
    let aqi = latest.aqi.unwrap_or(PREDICTION_AQI);
    [
        t.hour as f64,
        t.day_of_week as f64,
        t.month as f64,
        flag(t.is_weekend),
        flag(t.is_rush_hour),
        weather.temperature,
        weather.humidity,
        weather.pressure,
        weather.wind_speed,
        t.season_sin,
        t.season_cos,
        t.hour_sin,
        t.hour_cos,
        pm25,
        pm10,
        aqi,
        pm25,
        pm10,
        weather.temperature,
        weather.temperature * weather.humidity / 100.0,
        weather.wind_speed * weather.temperature,
    ]
}
