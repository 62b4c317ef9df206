//! Writing measurements into the database.
//!
//! # CSV Format
//!
//! Headers are required: `timestamp,location` plus any of `pm25,pm10,no2,
//! so2,co,o3,aqi,temperature,humidity,pressure,wind_speed,wind_direction`.
//! Empty cells are stored as NULL. A row for an existing (location,
//! timestamp) replaces it.

use aqf_core::aqi::aqi_from_pm25;
use aqf_core::MeasurementRecord;
use rusqlite::{params, Connection};

use crate::models::LoadSummary;
use crate::Database;

fn insert_row(conn: &Connection, r: &MeasurementRecord) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT OR REPLACE INTO measurements
         (location, timestamp, pm25, pm10, no2, so2, co, o3, aqi,
          temperature, humidity, pressure, wind_speed, wind_direction)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            r.location,
            r.timestamp,
            r.pm25,
            r.pm10,
            r.no2,
            r.so2,
            r.co,
            r.o3,
            r.aqi,
            r.temperature,
            r.humidity,
            r.pressure,
            r.wind_speed,
            r.wind_direction
        ],
    )
}

impl Database {
    /// Load measurements from a CSV string inside one transaction.
    ///
    /// A missing `aqi` is derived from `pm25` when that is present. Any
    /// malformed row aborts the whole load.
    ///
    /// # Example CSV
    /// ```text
    /// timestamp,location,pm25,pm10,aqi,temperature
    /// 2024-03-09 14:00:00,bengaluru,41.2,77.0,,29.5
    /// ```
    pub fn load_measurements_csv(&self, csv_data: &str) -> anyhow::Result<LoadSummary> {
        let records = MeasurementRecord::parse_csv(csv_data)?;
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let mut summary = LoadSummary::default();
        for mut record in records {
            if record.aqi.is_none() {
                if let Some(pm25) = record.pm25 {
                    record.aqi = Some(aqi_from_pm25(pm25) as f64);
                    summary.aqi_derived += 1;
                }
            }
            insert_row(&tx, &record)?;
            summary.loaded += 1;
        }
        tx.commit()?;
        log::info!(
            "[aqf-db] loader: Loaded {} measurements, derived {} AQI values",
            summary.loaded,
            summary.aqi_derived
        );
        Ok(summary)
    }

    /// Store a single measurement as-is.
    pub fn insert_measurement(&self, record: &MeasurementRecord) -> anyhow::Result<()> {
        let conn = self.conn.lock();
        insert_row(&conn, record)?;
        log::debug!(
            "[aqf-db] loader: stored measurement {} @ {}",
            record.location,
            record.timestamp
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use aqf_core::{MeasurementRecord, Pollutant};
    use chrono::NaiveDate;

    fn count(db: &Database) -> i64 {
        db.conn
            .lock()
            .query_row("SELECT COUNT(*) FROM measurements", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn load_measurements_from_csv() {
        let db = Database::new().unwrap();
        let csv = "\
timestamp,location,pm25,pm10,aqi,temperature,humidity
2024-03-09 14:00:00,bengaluru,41.2,77.0,115,29.5,48
2024-03-09 15:00:00,bengaluru,39.8,74.1,112,30.1,45
2024-03-09 15:00:00,delhi,160.0,240.0,310,24.0,60
";
        let summary = db.load_measurements_csv(csv).unwrap();
        assert_eq!(summary.loaded, 3);
        assert_eq!(summary.aqi_derived, 0);
        assert_eq!(count(&db), 3);

        let humidity: f64 = db
            .conn
            .lock()
            .query_row(
                "SELECT humidity FROM measurements WHERE location = 'delhi'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!((humidity - 60.0).abs() < 1e-9);
    }

    #[test]
    fn load_measurements_replaces_on_conflict() {
        let db = Database::new().unwrap();
        db.load_measurements_csv("timestamp,location,pm25\n2024-03-09 14:00:00,x,10\n")
            .unwrap();
        db.load_measurements_csv("timestamp,location,pm25\n2024-03-09T14:00:00,x,20\n")
            .unwrap();
        assert_eq!(count(&db), 1, "Should have 1 row after upsert");
        let latest = db.recent_measurements("x", 1).unwrap();
        assert_eq!(latest[0].pm25, Some(20.0));
    }

    #[test]
    fn load_measurements_stores_empty_cells_as_null() {
        let db = Database::new().unwrap();
        db.load_measurements_csv("timestamp,location,pm25,pressure\n2024-03-09 14:00:00,x,,\n")
            .unwrap();
        let record = &db.recent_measurements("x", 1).unwrap()[0];
        assert!(record.pm25.is_none());
        assert!(record.pressure.is_none());
        assert!(record.aqi.is_none(), "No AQI without PM2.5");
    }

    #[test]
    fn load_measurements_derives_missing_aqi() {
        let db = Database::new().unwrap();
        let summary = db
            .load_measurements_csv("timestamp,location,pm25,aqi\n2024-03-09 14:00:00,x,35.4,\n")
            .unwrap();
        assert_eq!(summary.aqi_derived, 1);
        let record = &db.recent_measurements("x", 1).unwrap()[0];
        assert_eq!(record.pollutant(Pollutant::Aqi), Some(100.0));
    }

    #[test]
    fn load_measurements_rejects_malformed_rows() {
        let db = Database::new().unwrap();
        let csv = "\
timestamp,location,pm25
2024-03-09 14:00:00,x,10
2024-03-09 15:00:00,x,lots
";
        assert!(db.load_measurements_csv(csv).is_err());
        assert_eq!(count(&db), 0, "A failed load should not leave partial rows");
        assert!(db.load_measurements_csv("location,pm25\nx,1\n").is_err());
    }

    #[test]
    fn insert_single_measurement() {
        let db = Database::new().unwrap();
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        let record = MeasurementRecord::new(ts, "x")
            .with_pollutant(Pollutant::O3, Some(61.0))
            .with_weather(Some(28.0), None, Some(1009.0), None, None);
        db.insert_measurement(&record).unwrap();
        assert_eq!(db.recent_measurements("x", 5).unwrap(), vec![record]);
    }
}
