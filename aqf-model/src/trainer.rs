//! Per-pollutant model training and evaluation.
//!
//! A trainer owns one [`ModelSlot`] per tracked pollutant. Each slot starts
//! `Untrained` and becomes `Trained` only after a fit on at least
//! `min_data_points` non-missing targets; later retrains replace the model
//! and its metrics wholesale, and a skipped or failed retrain leaves the
//! previous slot untouched.

use aqf_core::{MeasurementRecord, PipelineError, Pollutant};
use aqf_features::{build_features, InputVector, INPUT_DIM};
use chrono::NaiveDateTime;
use log::{error, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::PipelineConfig;
use crate::metrics::{calculate_metrics, ModelMetrics};
use crate::regression::{PolynomialRegression, Regressor};

/// Reported in [`ModelInfo`].
pub const MODEL_VERSION: &str = "2.0.0";

/// State of one pollutant's model.
#[derive(Debug, Clone)]
pub enum ModelSlot<M = PolynomialRegression> {
    Untrained,
    Trained { model: M, metrics: ModelMetrics },
}

impl<M> ModelSlot<M> {
    pub fn is_trained(&self) -> bool {
        matches!(self, ModelSlot::Trained { .. })
    }

    pub fn metrics(&self) -> Option<&ModelMetrics> {
        match self {
            ModelSlot::Trained { metrics, .. } => Some(metrics),
            ModelSlot::Untrained => None,
        }
    }
}

/// Summary of a training pass that met the data-size precondition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub data_points: usize,
    /// Pollutants whose model was replaced, with their new metrics
    pub trained: Vec<(Pollutant, ModelMetrics)>,
    /// Too few non-missing targets
    pub skipped: Vec<Pollutant>,
    /// Fit or validation failed
    pub failed: Vec<Pollutant>,
}

/// Result of [`ModelTrainer::train`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TrainingOutcome {
    /// Fewer records than `min_data_points`; nothing changed
    NotTrained { available: usize, required: usize },
    Trained(TrainingReport),
}

impl TrainingOutcome {
    /// Whether the training pass ran at all.
    pub fn performed(&self) -> bool {
        matches!(self, TrainingOutcome::Trained(_))
    }
}

/// Snapshot of a trainer's state for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub models_trained: Vec<Pollutant>,
    pub model_metrics: BTreeMap<Pollutant, ModelMetrics>,
    pub last_training: Option<NaiveDateTime>,
    pub training_interval_secs: u64,
    pub min_data_points: usize,
    pub version: &'static str,
    pub features_count: usize,
    pub algorithms: Vec<&'static str>,
}

/// Trains and holds one model per pollutant.
#[derive(Debug, Clone)]
pub struct ModelTrainer<M = PolynomialRegression> {
    config: PipelineConfig,
    slots: BTreeMap<Pollutant, ModelSlot<M>>,
    last_trained: Option<NaiveDateTime>,
}

/// Every record in a batch must share the first record's location.
pub(crate) fn ensure_single_location(records: &[MeasurementRecord]) -> aqf_core::Result<()> {
    if let Some(first) = records.first() {
        if let Some(other) = records.iter().find(|r| r.location != first.location) {
            return Err(PipelineError::MixedLocations {
                expected: first.location.clone(),
                found: other.location.clone(),
            });
        }
    }
    Ok(())
}

impl<M: Regressor> ModelTrainer<M> {
    pub fn new(config: PipelineConfig) -> Self {
        let slots = Pollutant::ALL
            .iter()
            .map(|p| (*p, ModelSlot::Untrained))
            .collect();
        ModelTrainer {
            config,
            slots,
            last_trained: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn slot(&self, pollutant: Pollutant) -> &ModelSlot<M> {
        // every pollutant gets a slot in `new`
        &self.slots[&pollutant]
    }

    pub fn last_trained(&self) -> Option<NaiveDateTime> {
        self.last_trained
    }

    /// True when no training pass has run yet or the last one is older
    /// than the configured interval.
    pub fn needs_retraining(&self, now: NaiveDateTime) -> bool {
        match self.last_trained {
            None => true,
            Some(last) => now.signed_duration_since(last) > self.config.training_interval(),
        }
    }

    /// Fit one model per pollutant from a newest-first history.
    ///
    /// Returns [`TrainingOutcome::NotTrained`] when the history is shorter
    /// than `min_data_points`. Per-pollutant shortfalls and fit failures
    /// are logged and reported; they never fail the call. The only error is
    /// a batch that mixes locations.
    pub fn train(
        &mut self,
        history: &[MeasurementRecord],
        now: NaiveDateTime,
    ) -> aqf_core::Result<TrainingOutcome> {
        ensure_single_location(history)?;
        let required = self.config.min_data_points;
        if history.len() < required {
            warn!(
                "Insufficient data for training: {} < {}",
                history.len(),
                required
            );
            return Ok(TrainingOutcome::NotTrained {
                available: history.len(),
                required,
            });
        }

        info!("Training models with {} data points", history.len());
        let features = build_features(history);
        let inputs: Vec<InputVector> = features.iter().map(|f| f.to_input()).collect();

        let mut report = TrainingReport {
            data_points: history.len(),
            trained: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        };

        for pollutant in Pollutant::ALL {
            let (rows, targets): (Vec<InputVector>, Vec<f64>) = features
                .iter()
                .zip(&inputs)
                .filter_map(|(f, x)| f.target(pollutant).map(|y| (*x, y)))
                .unzip();

            if targets.len() < required {
                warn!("Insufficient {} data: {}", pollutant, targets.len());
                report.skipped.push(pollutant);
                continue;
            }

            match self.fit_and_validate(&rows, &targets) {
                Ok((model, metrics)) => {
                    info!(
                        "{} model trained - R²: {:.3}, MSE: {:.2}, accuracy: {:.1}%",
                        pollutant, metrics.r2, metrics.mse, metrics.accuracy
                    );
                    self.slots
                        .insert(pollutant, ModelSlot::Trained { model, metrics });
                    report.trained.push((pollutant, metrics));
                }
                Err(e) => {
                    error!("Error training {} model: {}", pollutant, e);
                    report.failed.push(pollutant);
                }
            }
        }

        self.last_trained = Some(now);
        info!(
            "Model training completed: {} trained, {} skipped, {} failed",
            report.trained.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(TrainingOutcome::Trained(report))
    }

    fn fit_and_validate(
        &self,
        rows: &[InputVector],
        targets: &[f64],
    ) -> Result<(M, ModelMetrics), crate::error::RegressionError> {
        if rows.is_empty() {
            return Err(crate::error::RegressionError::NoSamples);
        }
        let split = ((rows.len() as f64 * self.config.train_fraction).floor() as usize)
            .clamp(1, rows.len());
        let model = M::fit(&rows[..split], &targets[..split])?;

        let validation_rows = &rows[split..];
        if validation_rows.is_empty() {
            return Ok((model, ModelMetrics::default()));
        }
        let predictions = validation_rows
            .iter()
            .map(|x| model.predict(x))
            .collect::<Result<Vec<f64>, _>>()?;
        let metrics = calculate_metrics(&targets[split..], &predictions);
        Ok((model, metrics))
    }

    /// Score the current models on held-out records.
    ///
    /// Untrained pollutants are left out. A model that fails to predict is
    /// reported with [`ModelMetrics::failed`]. Returns `None` for empty input.
    pub fn evaluate(
        &self,
        test_records: &[MeasurementRecord],
    ) -> Option<BTreeMap<Pollutant, ModelMetrics>> {
        if test_records.is_empty() {
            return None;
        }
        let features = build_features(test_records);
        let mut evaluation = BTreeMap::new();

        for (pollutant, slot) in &self.slots {
            let ModelSlot::Trained { model, .. } = slot else {
                continue;
            };
            let (rows, actual): (Vec<InputVector>, Vec<f64>) = features
                .iter()
                .filter_map(|f| f.target(*pollutant).map(|y| (f.to_input(), y)))
                .unzip();
            if actual.is_empty() {
                continue;
            }
            let metrics = match rows
                .iter()
                .map(|x| model.predict(x))
                .collect::<Result<Vec<f64>, _>>()
            {
                Ok(predicted) => calculate_metrics(&actual, &predicted),
                Err(e) => {
                    error!("Error evaluating {} model: {}", pollutant, e);
                    ModelMetrics::failed()
                }
            };
            evaluation.insert(*pollutant, metrics);
        }
        Some(evaluation)
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            models_trained: self
                .slots
                .iter()
                .filter(|(_, s)| s.is_trained())
                .map(|(p, _)| *p)
                .collect(),
            model_metrics: self
                .slots
                .iter()
                .map(|(p, s)| (*p, s.metrics().copied().unwrap_or_default()))
                .collect(),
            last_training: self.last_trained,
            training_interval_secs: self.config.training_interval_secs,
            min_data_points: self.config.min_data_points,
            version: MODEL_VERSION,
            features_count: INPUT_DIM,
            algorithms: vec![
                "Polynomial Regression",
                "Trend Analysis",
                "Seasonal Decomposition",
            ],
        }
    }
}
