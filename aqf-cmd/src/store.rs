//! Data management commands: CSV import and retention.

use aqf_db::Database;
use chrono::{Duration, Local, NaiveDateTime};
use log::info;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Import a measurement CSV into the database.
pub async fn run_load(db_path: &Path, csv_path: &Path) -> anyhow::Result<serde_json::Value> {
    let csv_data = tokio::fs::read_to_string(csv_path).await?;
    let db_path: PathBuf = db_path.to_path_buf();

    let summary = tokio::task::spawn_blocking(move || {
        let db = Database::open(&db_path)?;
        db.load_measurements_csv(&csv_data)
    })
    .await??;

    info!(
        "Loaded {} measurements from {}",
        summary.loaded,
        csv_path.display()
    );
    Ok(json!({
        "loaded": summary.loaded,
        "aqi_derived": summary.aqi_derived,
    }))
}

/// Delete readings older than `days` days.
pub async fn run_purge(db_path: &Path, days: u32) -> anyhow::Result<serde_json::Value> {
    let db_path = db_path.to_path_buf();
    let now = Local::now().naive_local();
    let (cutoff, removed) = tokio::task::spawn_blocking(move || {
        let db = Database::open(&db_path)?;
        purge_older_than(&db, days, now)
    })
    .await??;

    Ok(json!({
        "removed": removed,
        "cutoff": cutoff.to_string(),
    }))
}

pub fn purge_older_than(
    db: &Database,
    days: u32,
    now: NaiveDateTime,
) -> anyhow::Result<(NaiveDateTime, usize)> {
    let cutoff = now - Duration::days(days as i64);
    let removed = db.purge_measurements_before(cutoff)?;
    info!("Purged {} measurements older than {} days", removed, days);
    Ok((cutoff, removed))
}
