//! SQLite store for air quality measurements and generated forecasts.
//!
//! Measurements are loaded from CSV (or inserted one at a time by an
//! ingestion job) and read back newest-first per location, which is the
//! order the forecasting pipeline expects. Forecasts can be persisted and
//! summarized per pollutant.
//!
//! # Usage
//!
//! ```rust
//! use aqf_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_measurements_csv(
//!     "timestamp,location,pm25,pm10\n2024-03-09 14:00:00,bengaluru,41.2,77.0\n",
//! )
//! .unwrap();
//!
//! let history = db.recent_measurements("bengaluru", 200).unwrap();
//! assert_eq!(history.len(), 1);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.
//!
//! - `measurements` - One reading per (location, timestamp)
//! - `forecasts` - One value per (location, timestamp, pollutant)

pub mod schema;
mod loader;
mod queries;
pub mod models;

use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// SQLite connection with the schema applied.
///
/// Cheaply cloneable; clones share the connection, so the handle can be
/// moved into blocking tasks.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Open (or create) a database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let db = Self::from_connection(Connection::open(path)?)?;
        log::info!("[aqf-db] opened {}", path.display());
        Ok(db)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
timestamp,location,pm25
2024-03-09 14:00:00,bengaluru,41.2
";

    #[test]
    fn database_creates_successfully() {
        let db = Database::new();
        assert!(db.is_ok(), "Database should create without errors");
    }

    #[test]
    fn database_is_cloneable() {
        let db = Database::new().unwrap();
        let db2 = db.clone();
        db.load_measurements_csv(CSV).unwrap();
        let history = db2.recent_measurements("bengaluru", 10).unwrap();
        assert_eq!(history.len(), 1, "Clone should see the same data");
    }

    #[test]
    fn database_starts_empty() {
        let db = Database::new().unwrap();
        assert!(db.locations().unwrap().is_empty());
    }

    #[test]
    fn database_file_persists_between_opens() {
        let path = std::env::temp_dir().join(format!("aqf-db-test-{}.sqlite", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let db = Database::open(&path).unwrap();
            db.load_measurements_csv(CSV).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.locations().unwrap(), vec!["bengaluru"]);
        drop(db);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn database_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Database>();
    }
}
