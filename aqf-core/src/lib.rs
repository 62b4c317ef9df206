//! Core types for air quality measurements, pollutants and forecasts.
//!
//! Everything downstream (feature engineering, model training, the reading
//! store and the CLI) speaks in terms of the types defined here.

pub mod aqi;
pub mod error;
pub mod forecast;
pub mod measurement;
pub mod pollutant;

pub use error::{PipelineError, Result};
pub use forecast::{ForecastMethod, ForecastRecord, UncertaintyBand};
pub use measurement::MeasurementRecord;
pub use pollutant::Pollutant;
