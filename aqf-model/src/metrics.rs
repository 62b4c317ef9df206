use serde::{Deserialize, Serialize};

/// Relative error within which a prediction counts as accurate.
pub const ACCURACY_TOLERANCE: f64 = 0.2;

/// Validation metrics for one pollutant model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Percentage of predictions within [`ACCURACY_TOLERANCE`] of the actual value
    pub accuracy: f64,
    /// Mean squared error
    pub mse: f64,
    /// Coefficient of determination
    pub r2: f64,
}

impl ModelMetrics {
    /// Metrics reported for a model that could not predict at all.
    pub fn failed() -> Self {
        ModelMetrics {
            accuracy: 0.0,
            mse: f64::INFINITY,
            r2: 0.0,
        }
    }
}

/// Compare predictions with actual values.
///
/// R² is 0 when the actual values have no variance. The accuracy test
/// divides by `max(actual, 1)` so near-zero actuals do not blow up the
/// relative error. Empty input yields all-zero metrics.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> ModelMetrics {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return ModelMetrics::default();
    }
    let actual = &actual[..n];
    let predicted = &predicted[..n];

    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let mse = ss_res / n as f64;

    let mean = actual.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    let accurate = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| (*a - *p).abs() / a.max(1.0) <= ACCURACY_TOLERANCE)
        .count();
    let accuracy = accurate as f64 / n as f64 * 100.0;

    ModelMetrics { accuracy, mse, r2 }
}
