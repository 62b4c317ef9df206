//! SQL schema definitions.
//!
//! The schema is applied as a single batch when the database is opened.
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text so that string
//! order is time order.

/// Returns the full SQL schema as a single batch string.
///
/// - `measurements` - Pollutant and weather readings, every value nullable
/// - `forecasts` - Generated forecast values with their confidence,
///   uncertainty band, method and the input vector as JSON
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS measurements (
        location TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        pm25 REAL,
        pm10 REAL,
        no2 REAL,
        so2 REAL,
        co REAL,
        o3 REAL,
        aqi REAL,
        temperature REAL,
        humidity REAL,
        pressure REAL,
        wind_speed REAL,
        wind_direction REAL,
        PRIMARY KEY (location, timestamp)
    );
    CREATE INDEX IF NOT EXISTS idx_measurements_timestamp ON measurements(timestamp);

    CREATE TABLE IF NOT EXISTS forecasts (
        location TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        pollutant TEXT NOT NULL,
        horizon INTEGER NOT NULL,
        value REAL NOT NULL,
        confidence REAL NOT NULL,
        lower_bound REAL,
        upper_bound REAL,
        method TEXT NOT NULL,
        model_r2 REAL,
        features TEXT NOT NULL,
        created_at TEXT NOT NULL,
        PRIMARY KEY (location, timestamp, pollutant)
    );
    CREATE INDEX IF NOT EXISTS idx_forecasts_location ON forecasts(location);
    "#
}
