//! Location-scoped model state.
//!
//! Each location gets its own [`ModelTrainer`] behind its own lock. A
//! forecast holds that lock across the lazy retrain and the generation
//! pass, so concurrent forecasts for one location never observe a half
//! replaced model, and forecasts for different locations never contend.

use aqf_core::{ForecastRecord, MeasurementRecord, PipelineError, Pollutant};
use chrono::NaiveDateTime;
use log::debug;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::forecast::generate_forecast;
use crate::metrics::ModelMetrics;
use crate::regression::{PolynomialRegression, Regressor};
use crate::trainer::{ModelInfo, ModelTrainer, TrainingOutcome};

pub struct ModelRegistry<M = PolynomialRegression> {
    config: PipelineConfig,
    trainers: Mutex<HashMap<String, Arc<Mutex<ModelTrainer<M>>>>>,
}

impl<M: Regressor> ModelRegistry<M> {
    pub fn new(config: PipelineConfig) -> Self {
        ModelRegistry {
            config,
            trainers: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The trainer for `location`, created untrained on first use.
    pub fn trainer(&self, location: &str) -> Arc<Mutex<ModelTrainer<M>>> {
        let mut trainers = self.trainers.lock();
        trainers
            .entry(location.to_string())
            .or_insert_with(|| {
                debug!("creating model state for {}", location);
                Arc::new(Mutex::new(ModelTrainer::new(self.config.clone())))
            })
            .clone()
    }

    /// Locations with model state, sorted.
    pub fn locations(&self) -> Vec<String> {
        let mut locations: Vec<String> = self.trainers.lock().keys().cloned().collect();
        locations.sort();
        locations
    }

    pub fn train(
        &self,
        location: &str,
        history: &[MeasurementRecord],
        now: NaiveDateTime,
    ) -> aqf_core::Result<TrainingOutcome> {
        ensure_location(location, history)?;
        self.trainer(location).lock().train(history, now)
    }

    pub fn forecast<R: Rng + ?Sized>(
        &self,
        location: &str,
        history: &[MeasurementRecord],
        horizon: u32,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> aqf_core::Result<Vec<ForecastRecord>> {
        ensure_location(location, history)?;
        let trainer = self.trainer(location);
        let mut trainer = trainer.lock();
        generate_forecast(&mut trainer, history, horizon, now, rng)
    }

    pub fn evaluate(
        &self,
        location: &str,
        test_records: &[MeasurementRecord],
    ) -> aqf_core::Result<Option<BTreeMap<Pollutant, ModelMetrics>>> {
        ensure_location(location, test_records)?;
        Ok(self.trainer(location).lock().evaluate(test_records))
    }

    pub fn info(&self, location: &str) -> ModelInfo {
        self.trainer(location).lock().info()
    }
}

fn ensure_location(location: &str, records: &[MeasurementRecord]) -> aqf_core::Result<()> {
    match records.iter().find(|r| r.location != location) {
        Some(other) => Err(PipelineError::MixedLocations {
            expected: location.to_string(),
            found: other.location.clone(),
        }),
        None => Ok(()),
    }
}
