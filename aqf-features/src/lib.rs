//! Feature engineering for air quality measurement series.
//!
//! This crate turns the newest-first record sequences delivered by the
//! reading store into numeric features for the regression models:
//! calendar encodings, weather values with defaults, lag values,
//! short moving averages and interaction terms.

pub mod builder;
pub mod input;

pub use builder::{build_features, FeatureVector, TimeFeatures};
pub use input::{prediction_input, InputVector, WeatherConditions, INPUT_DIM, INPUT_NAMES};

/// Values substituted for missing weather readings.
pub mod defaults {
    /// °C
    pub const TEMPERATURE: f64 = 25.0;
    /// percent
    pub const HUMIDITY: f64 = 60.0;
    /// hPa, standard atmosphere
    pub const PRESSURE: f64 = 1013.0;
    /// m/s
    pub const WIND_SPEED: f64 = 5.0;
    /// degrees
    pub const WIND_DIRECTION: f64 = 0.0;

    /// Maximum number of records in a moving-average window.
    pub const MOVING_AVERAGE_WINDOW: usize = 5;
}
