//! Forecast generation.
//!
//! For every hour `1..=horizon` and every pollutant (in [`Pollutant::ALL`]
//! order) one [`ForecastRecord`] is produced: from the trained model when
//! there is one, otherwise from the trend fallback. Output order is
//! generation order; callers needing another order sort it themselves.

use aqf_core::{
    ForecastMethod, ForecastRecord, MeasurementRecord, PipelineError, Pollutant, UncertaintyBand,
};
use aqf_features::{prediction_input, WeatherConditions};
use aqf_utils::numbers::round_to;
use chrono::{Duration, NaiveDateTime};
use log::{debug, warn};
use rand::Rng;

use crate::regression::Regressor;
use crate::trainer::{ensure_single_location, ModelSlot, ModelTrainer};
use crate::trend::trend_prediction;
use crate::weather::synthesize_weather;

/// Confidence of a trend value used because the model failed to predict.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Upper limit on the R²-derived part of model confidence.
pub const MAX_BASE_CONFIDENCE: f64 = 0.95;

/// Base confidence when the model has no usable R² (exactly 0).
pub const UNKNOWN_R2_CONFIDENCE: f64 = 0.5;

/// Floor for models that validated worse than the mean (negative R²).
pub const MIN_BASE_CONFIDENCE: f64 = 0.05;

/// Error assumed when the model's validation MSE is 0.
const DEFAULT_MSE: f64 = 100.0;

/// Model confidence `h` hours ahead: the validation R² (capped) times a
/// horizon decay of 3% per hour, floored at 10%.
pub fn model_confidence(r2: f64, horizon: u32) -> f64 {
    let base = if r2 == 0.0 {
        UNKNOWN_R2_CONFIDENCE
    } else {
        r2.clamp(MIN_BASE_CONFIDENCE, MAX_BASE_CONFIDENCE)
    };
    let decay = (1.0 - 0.03 * horizon as f64).max(0.1);
    base * decay
}

/// Confidence of a trend value used because no model exists.
pub fn trend_confidence(horizon: u32) -> f64 {
    (0.6 - 0.02 * horizon as f64).max(0.2)
}

/// Half-width of the uncertainty band: RMSE grown by 10% per hour.
pub fn uncertainty(mse: f64, horizon: u32) -> f64 {
    let mse = if mse > 0.0 { mse } else { DEFAULT_MSE };
    mse.sqrt() * (1.0 + 0.1 * horizon as f64)
}

/// Produce forecasts for `horizon` hours after `now`.
///
/// `history` is newest-first and must come from a single location. Models
/// are retrained first when [`ModelTrainer::needs_retraining`] says so.
/// Weather for each step is synthesized from the latest record using `rng`.
///
/// # Errors
///
/// [`PipelineError::EmptyHistory`] for an empty history,
/// [`PipelineError::InvalidHorizon`] for a horizon of 0 or above
/// `max_horizon_hours`, [`PipelineError::MixedLocations`] for a mixed batch.
pub fn generate_forecast<M: Regressor, R: Rng + ?Sized>(
    trainer: &mut ModelTrainer<M>,
    history: &[MeasurementRecord],
    horizon: u32,
    now: NaiveDateTime,
    rng: &mut R,
) -> aqf_core::Result<Vec<ForecastRecord>> {
    let max = trainer.config().max_horizon_hours;
    if horizon == 0 || horizon > max {
        return Err(PipelineError::InvalidHorizon {
            requested: horizon,
            max,
        });
    }
    let latest = history.first().ok_or(PipelineError::EmptyHistory)?;
    ensure_single_location(history)?;

    if trainer.needs_retraining(now) {
        trainer.train(history, now)?;
    }

    let trend_window = trainer.config().trend_window;
    let weather = synthesize_weather(&WeatherConditions::from_record(latest), horizon, rng);
    let mut forecasts = Vec::with_capacity(horizon as usize * Pollutant::ALL.len());

    for (h, step_weather) in (1..=horizon).zip(&weather) {
        let at = now + Duration::hours(h as i64);
        let features = prediction_input(&at, latest, step_weather);

        for pollutant in Pollutant::ALL {
            let trend = || trend_prediction(history, pollutant, h, &now, trend_window);
            let record = |value: f64,
                          confidence: f64,
                          method: ForecastMethod,
                          uncertainty: Option<UncertaintyBand>,
                          model_r2: Option<f64>| {
                ForecastRecord {
                    location: latest.location.clone(),
                    timestamp: at,
                    horizon: h,
                    pollutant,
                    value: round_to(value, 1),
                    confidence: round_to(confidence, 2),
                    uncertainty,
                    method,
                    model_r2,
                    features: features.to_vec(),
                }
            };

            let forecast = match trainer.slot(pollutant) {
                ModelSlot::Trained { model, metrics } => match model.predict(&features) {
                    Ok(predicted) => {
                        let value = predicted.max(0.0);
                        let spread = uncertainty(metrics.mse, h);
                        let band = UncertaintyBand {
                            lower: round_to(value - spread, 1),
                            upper: round_to(value + spread, 1),
                        };
                        record(
                            value,
                            model_confidence(metrics.r2, h),
                            ForecastMethod::Model,
                            Some(band),
                            Some(metrics.r2),
                        )
                    }
                    Err(e) => {
                        warn!("Error predicting {} at +{}h: {}", pollutant, h, e);
                        record(
                            trend(),
                            FALLBACK_CONFIDENCE,
                            ForecastMethod::Fallback,
                            None,
                            None,
                        )
                    }
                },
                ModelSlot::Untrained => record(
                    trend(),
                    trend_confidence(h),
                    ForecastMethod::Trend,
                    None,
                    None,
                ),
            };
            forecasts.push(forecast);
        }
    }

    debug!(
        "generated {} forecasts for {} over {}h",
        forecasts.len(),
        latest.location,
        horizon
    );
    Ok(forecasts)
}
