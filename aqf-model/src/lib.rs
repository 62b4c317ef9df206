//! Per-pollutant regression models, trend fallback and forecast generation.
//!
//! # Pipeline
//!
//! - [`trainer::ModelTrainer`] fits one [`regression::PolynomialRegression`]
//!   per tracked pollutant from a newest-first history and keeps the
//!   validation [`metrics::ModelMetrics`] next to it.
//! - [`forecast::generate_forecast`] refreshes stale models, synthesizes a
//!   weather trajectory ([`weather`]) and produces one
//!   [`aqf_core::ForecastRecord`] per (hour, pollutant), falling back to
//!   [`trend`] extrapolation when no model is available or a prediction fails.
//! - [`registry::ModelRegistry`] scopes trainers per location so that
//!   retraining for one location never replaces another location's models.
//!
//! # Usage
//!
//! ```rust
//! use aqf_core::MeasurementRecord;
//! use aqf_model::{ModelRegistry, PipelineConfig};
//! use chrono::NaiveDate;
//!
//! let now = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let history = vec![MeasurementRecord::new(now, "bengaluru")];
//!
//! let registry: ModelRegistry = ModelRegistry::new(PipelineConfig::default());
//! let forecasts = registry
//!     .forecast("bengaluru", &history, 6, now, &mut rand::thread_rng())
//!     .unwrap();
//! // not enough history to train: every value is a trend fallback
//! assert_eq!(forecasts.len(), 6 * 5);
//! ```

pub mod config;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod registry;
pub mod regression;
pub mod trainer;
pub mod trend;
pub mod weather;

pub use config::PipelineConfig;
pub use error::{ConfigError, RegressionError};
pub use forecast::generate_forecast;
pub use metrics::ModelMetrics;
pub use registry::ModelRegistry;
pub use regression::{PolynomialRegression, Regressor};
pub use trainer::{ModelInfo, ModelSlot, ModelTrainer, TrainingOutcome, TrainingReport};
