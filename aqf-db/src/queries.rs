//! Typed query methods.
//!
//! Measurement queries return newest-first records for a single location,
//! the order the forecasting pipeline consumes them in.

use aqf_core::{ForecastRecord, MeasurementRecord, Pollutant};
use chrono::NaiveDateTime;
use rusqlite::{params, Row};

use crate::models::ConfidenceSummary;
use crate::Database;

const MEASUREMENT_COLUMNS: &str = "location, timestamp, pm25, pm10, no2, so2, co, o3, aqi, \
     temperature, humidity, pressure, wind_speed, wind_direction";

fn measurement_from_row(row: &Row<'_>) -> rusqlite::Result<MeasurementRecord> {
    Ok(MeasurementRecord {
        location: row.get(0)?,
        timestamp: row.get(1)?,
        pm25: row.get(2)?,
        pm10: row.get(3)?,
        no2: row.get(4)?,
        so2: row.get(5)?,
        co: row.get(6)?,
        o3: row.get(7)?,
        aqi: row.get(8)?,
        temperature: row.get(9)?,
        humidity: row.get(10)?,
        pressure: row.get(11)?,
        wind_speed: row.get(12)?,
        wind_direction: row.get(13)?,
    })
}

/// SQLite limits are i64; anything larger means no limit.
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl Database {
    // ───────────────────── Measurements ─────────────────────

    /// The latest `limit` measurements for a location, newest first.
    pub fn recent_measurements(
        &self,
        location: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<MeasurementRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM measurements
             WHERE location = ?1
             ORDER BY timestamp DESC
             LIMIT ?2",
            MEASUREMENT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![location, sql_limit(limit)], measurement_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[aqf-db] query: recent_measurements({}) returned {} records",
            location,
            rows.len()
        );
        Ok(rows)
    }

    /// Measurements at or after `since` for a location, newest first.
    pub fn measurements_since(
        &self,
        location: &str,
        since: NaiveDateTime,
        limit: usize,
    ) -> anyhow::Result<Vec<MeasurementRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM measurements
             WHERE location = ?1 AND timestamp >= ?2
             ORDER BY timestamp DESC
             LIMIT ?3",
            MEASUREMENT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![location, since, sql_limit(limit)], measurement_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[aqf-db] query: measurements_since({}, {}) returned {} records",
            location,
            since,
            rows.len()
        );
        Ok(rows)
    }

    /// Distinct locations with at least one measurement, sorted.
    pub fn locations(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT DISTINCT location FROM measurements ORDER BY location")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    /// Delete measurements older than `cutoff`; returns the number removed.
    pub fn purge_measurements_before(&self, cutoff: NaiveDateTime) -> anyhow::Result<usize> {
        let conn = self.conn.lock();
        let removed = conn.execute(
            "DELETE FROM measurements WHERE timestamp < ?1",
            params![cutoff],
        )?;
        log::info!(
            "[aqf-db] query: purged {} measurements before {}",
            removed,
            cutoff
        );
        Ok(removed)
    }

    // ───────────────────── Forecasts ─────────────────────

    /// Store forecasts in one transaction, replacing any earlier value for
    /// the same (location, timestamp, pollutant).
    pub fn insert_forecasts(
        &self,
        forecasts: &[ForecastRecord],
        created_at: NaiveDateTime,
    ) -> anyhow::Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO forecasts
                 (location, timestamp, pollutant, horizon, value, confidence,
                  lower_bound, upper_bound, method, model_r2, features, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for f in forecasts {
                let features = serde_json::to_string(&f.features)?;
                stmt.execute(params![
                    f.location,
                    f.timestamp,
                    f.pollutant.name(),
                    f.horizon,
                    f.value,
                    f.confidence,
                    f.uncertainty.map(|u| u.lower),
                    f.uncertainty.map(|u| u.upper),
                    f.method.as_str(),
                    f.model_r2,
                    features,
                    created_at
                ])?;
            }
        }
        tx.commit()?;
        log::info!("[aqf-db] query: stored {} forecasts", forecasts.len());
        Ok(forecasts.len())
    }

    /// Average, min and max confidence of the stored forecasts per pollutant.
    pub fn forecast_confidence_summary(
        &self,
        location: &str,
    ) -> anyhow::Result<Vec<ConfidenceSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT pollutant, AVG(confidence), MIN(confidence), MAX(confidence), COUNT(*)
             FROM forecasts
             WHERE location = ?1
             GROUP BY pollutant
             ORDER BY pollutant",
        )?;
        let raw_rows: Vec<(String, f64, f64, f64, i64)> = stmt
            .query_map(params![location], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = Vec::with_capacity(raw_rows.len());
        for (name, average, min, max, count) in raw_rows {
            results.push(ConfidenceSummary {
                pollutant: name.parse::<Pollutant>()?,
                average,
                min,
                max,
                count,
            });
        }
        log::info!(
            "[aqf-db] query: forecast_confidence_summary({}) returned {} records",
            location,
            results.len()
        );
        Ok(results)
    }
}
