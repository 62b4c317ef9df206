use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pollutant::Pollutant;

/// How a forecast value was produced.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ForecastMethod {
    /// Predicted by a trained regression model
    #[serde(rename = "ml-model")]
    Model,
    /// Trend extrapolation because no model has been trained
    #[serde(rename = "trend-based")]
    Trend,
    /// Trend extrapolation because the model failed to predict
    #[serde(rename = "fallback")]
    Fallback,
}

impl ForecastMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::Model => "ml-model",
            ForecastMethod::Trend => "trend-based",
            ForecastMethod::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symmetric uncertainty interval around a model prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyBand {
    pub lower: f64,
    pub upper: f64,
}

/// One forecast value for a (location, horizon hour, pollutant) triple.
///
/// Created by the forecast generator and never mutated afterwards;
/// the caller decides whether to persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub location: String,
    /// Time the forecast is for
    pub timestamp: NaiveDateTime,
    /// Hours ahead of the generation time (1-based)
    pub horizon: u32,
    #[serde(rename = "type")]
    pub pollutant: Pollutant,
    /// Rounded to one decimal place
    pub value: f64,
    /// In [0, 1], rounded to two decimal places
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<UncertaintyBand>,
    pub method: ForecastMethod,
    /// Validation R² of the model that produced the value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_r2: Option<f64>,
    /// Model input vector used for this step
    pub features: Vec<f64>,
}
