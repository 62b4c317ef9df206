//! Query result structs that are not core pipeline types.

use aqf_core::Pollutant;
use serde::Serialize;

/// Aggregate confidence of the stored forecasts for one pollutant.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConfidenceSummary {
    pub pollutant: Pollutant,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Number of stored forecasts aggregated
    pub count: i64,
}

/// Row counts reported by a CSV load.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    /// Records whose missing AQI was derived from PM2.5
    pub aqi_derived: usize,
}
