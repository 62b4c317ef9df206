//! Forecast, evaluation and confidence commands.

use aqf_core::{ForecastRecord, Pollutant};
use aqf_db::models::ConfidenceSummary;
use aqf_db::Database;
use aqf_model::{ModelInfo, ModelMetrics, ModelRegistry, PipelineConfig, TrainingOutcome};
use chrono::{Local, NaiveDateTime};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{MIN_EVALUATION_RECORDS, MIN_FORECAST_HISTORY};

/// Parameters of one forecast run.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub location: String,
    pub hours: u32,
    pub limit: usize,
    pub persist: bool,
}

#[derive(Debug, Serialize)]
pub struct ForecastReport {
    pub location: String,
    pub generated_at: NaiveDateTime,
    pub data_points_used: usize,
    pub persisted: bool,
    pub forecasts: Vec<ForecastRecord>,
    pub model_info: ModelInfo,
}

#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub location: String,
    pub evaluated_at: NaiveDateTime,
    pub training_data_points: usize,
    pub test_data_points: usize,
    pub evaluation: BTreeMap<Pollutant, ModelMetrics>,
}

#[derive(Debug, Serialize)]
pub struct ConfidenceReport {
    pub location: String,
    pub summary: Vec<ConfidenceSummary>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => Ok(PipelineConfig::load(path)?),
        None => Ok(PipelineConfig::default()),
    }
}

pub async fn run_forecast(
    db_path: &Path,
    config_path: Option<&Path>,
    request: ForecastRequest,
) -> anyhow::Result<serde_json::Value> {
    let config = load_config(config_path)?;
    let db_path: PathBuf = db_path.to_path_buf();
    let now = Local::now().naive_local();

    let report = tokio::task::spawn_blocking(move || {
        let db = Database::open(&db_path)?;
        let registry = ModelRegistry::new(config);
        forecast_location(&db, &registry, &request, now, &mut rand::thread_rng())
    })
    .await??;
    Ok(serde_json::to_value(report)?)
}

/// Forecast one location from its stored history.
///
/// Fails when fewer than [`MIN_FORECAST_HISTORY`] readings are stored.
pub fn forecast_location<R: rand::Rng + ?Sized>(
    db: &Database,
    registry: &ModelRegistry,
    request: &ForecastRequest,
    now: NaiveDateTime,
    rng: &mut R,
) -> anyhow::Result<ForecastReport> {
    let history = db.recent_measurements(&request.location, request.limit)?;
    if history.len() < MIN_FORECAST_HISTORY {
        anyhow::bail!(
            "Insufficient historical data for {}: {} readings, {} required",
            request.location,
            history.len(),
            MIN_FORECAST_HISTORY
        );
    }

    let forecasts = registry.forecast(&request.location, &history, request.hours, now, rng)?;
    if request.persist {
        db.insert_forecasts(&forecasts, now)?;
    }
    info!(
        "Generated {} forecasts for {} from {} readings",
        forecasts.len(),
        request.location,
        history.len()
    );

    Ok(ForecastReport {
        location: request.location.clone(),
        generated_at: now,
        data_points_used: history.len(),
        persisted: request.persist,
        forecasts,
        model_info: registry.info(&request.location),
    })
}

pub async fn run_evaluate(
    db_path: &Path,
    config_path: Option<&Path>,
    location: &str,
    limit: usize,
    test_limit: usize,
) -> anyhow::Result<serde_json::Value> {
    let config = load_config(config_path)?;
    let db_path = db_path.to_path_buf();
    let location = location.to_string();
    let now = Local::now().naive_local();

    let report = tokio::task::spawn_blocking(move || {
        let db = Database::open(&db_path)?;
        let registry = ModelRegistry::new(config);
        evaluate_location(&db, &registry, &location, limit, test_limit, now)
    })
    .await??;
    Ok(serde_json::to_value(report)?)
}

/// Hold out the newest `test_limit` readings, train on up to `limit` older
/// ones and score the trained models on the held-out readings.
pub fn evaluate_location(
    db: &Database,
    registry: &ModelRegistry,
    location: &str,
    limit: usize,
    test_limit: usize,
    now: NaiveDateTime,
) -> anyhow::Result<EvaluationReport> {
    let mut history = db.recent_measurements(location, test_limit.saturating_add(limit))?;
    let split = test_limit.min(history.len());
    let training = history.split_off(split);
    let test = history;

    if test.len() < MIN_EVALUATION_RECORDS {
        anyhow::bail!(
            "Insufficient data for model evaluation of {}: {} readings, {} required",
            location,
            test.len(),
            MIN_EVALUATION_RECORDS
        );
    }

    if let TrainingOutcome::NotTrained {
        available,
        required,
    } = registry.train(location, &training, now)?
    {
        anyhow::bail!(
            "Not enough training data for {}: {} readings, {} required",
            location,
            available,
            required
        );
    }

    let evaluation = registry.evaluate(location, &test)?.unwrap_or_default();
    Ok(EvaluationReport {
        location: location.to_string(),
        evaluated_at: now,
        training_data_points: training.len(),
        test_data_points: test.len(),
        evaluation,
    })
}

pub async fn run_confidence(db_path: &Path, location: &str) -> anyhow::Result<serde_json::Value> {
    let db_path = db_path.to_path_buf();
    let location = location.to_string();
    let report = tokio::task::spawn_blocking(move || {
        let db = Database::open(&db_path)?;
        let summary = db.forecast_confidence_summary(&location)?;
        Ok::<_, anyhow::Error>(ConfidenceReport { location, summary })
    })
    .await??;
    Ok(serde_json::to_value(report)?)
}
