use aqf_utils::dates::parse_timestamp;
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{PipelineError, Result};
use crate::pollutant::Pollutant;

/// A single air quality and weather reading for one location.
///
/// Any value may be missing when the upstream sensor or API had a gap.
/// Records are never mutated once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Local wall-clock time of the reading
    pub timestamp: NaiveDateTime,
    /// Location identifier (e.g. "bengaluru")
    pub location: String,
    /// Fine particulate matter, µg/m³
    pub pm25: Option<f64>,
    /// Coarse particulate matter, µg/m³
    pub pm10: Option<f64>,
    /// Nitrogen dioxide, µg/m³
    pub no2: Option<f64>,
    /// Sulfur dioxide, µg/m³
    pub so2: Option<f64>,
    /// Carbon monoxide, µg/m³
    pub co: Option<f64>,
    /// Ozone, µg/m³
    pub o3: Option<f64>,
    /// Aggregate air quality index
    pub aqi: Option<f64>,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Relative humidity, percent
    pub humidity: Option<f64>,
    /// hPa
    pub pressure: Option<f64>,
    /// m/s
    pub wind_speed: Option<f64>,
    /// Degrees
    pub wind_direction: Option<f64>,
}

impl MeasurementRecord {
    /// A reading with no values; fill in with the `with_*` helpers or struct update syntax.
    pub fn new(timestamp: NaiveDateTime, location: impl Into<String>) -> Self {
        MeasurementRecord {
            timestamp,
            location: location.into(),
            pm25: None,
            pm10: None,
            no2: None,
            so2: None,
            co: None,
            o3: None,
            aqi: None,
            temperature: None,
            humidity: None,
            pressure: None,
            wind_speed: None,
            wind_direction: None,
        }
    }

    /// Value of one of the tracked pollutants.
    pub fn pollutant(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::Aqi => self.aqi,
            Pollutant::No2 => self.no2,
            Pollutant::O3 => self.o3,
        }
    }

    /// Builder-style setter for a tracked pollutant.
    pub fn with_pollutant(mut self, pollutant: Pollutant, value: Option<f64>) -> Self {
        match pollutant {
            Pollutant::Pm25 => self.pm25 = value,
            Pollutant::Pm10 => self.pm10 = value,
            Pollutant::Aqi => self.aqi = value,
            Pollutant::No2 => self.no2 = value,
            Pollutant::O3 => self.o3 = value,
        }
        self
    }

    /// Builder-style setter for the weather fields.
    pub fn with_weather(
        mut self,
        temperature: Option<f64>,
        humidity: Option<f64>,
        pressure: Option<f64>,
        wind_speed: Option<f64>,
        wind_direction: Option<f64>,
    ) -> Self {
        self.temperature = temperature;
        self.humidity = humidity;
        self.pressure = pressure;
        self.wind_speed = wind_speed;
        self.wind_direction = wind_direction;
        self
    }

    /// Parse a CSV string of measurements into records.
    ///
    /// The header row must contain `timestamp` and `location`; any of the
    /// pollutant and weather columns (`pm25`, `pm10`, `no2`, `so2`, `co`,
    /// `o3`, `aqi`, `temperature`, `humidity`, `pressure`, `wind_speed`,
    /// `wind_direction`) may be present in any order. Empty cells are
    /// treated as missing values. Records are returned in file order.
    ///
    /// # Example CSV
    /// ```text
    /// timestamp,location,pm25,pm10,aqi,temperature
    /// 2024-03-09 14:00:00,bengaluru,41.2,77.0,115,29.5
    /// ```
    pub fn parse_csv(csv_data: &str) -> Result<Vec<MeasurementRecord>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_data.as_bytes());

        let headers = rdr.headers()?.clone();
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_ascii_lowercase(), i))
            .collect();
        let ts_idx = *index
            .get("timestamp")
            .ok_or_else(|| PipelineError::MissingColumn("timestamp".to_string()))?;
        let loc_idx = *index
            .get("location")
            .ok_or_else(|| PipelineError::MissingColumn("location".to_string()))?;

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row?;
            let ts_raw = row.get(ts_idx).unwrap_or("");
            let timestamp = parse_timestamp(ts_raw)
                .map_err(|_| PipelineError::InvalidTimestamp(ts_raw.to_string()))?;
            let location = row.get(loc_idx).unwrap_or("").to_string();

            let value = |column: &str| -> Result<Option<f64>> {
                parse_optional(&row, index.get(column).copied(), column)
            };

            records.push(MeasurementRecord {
                timestamp,
                location,
                pm25: value("pm25")?,
                pm10: value("pm10")?,
                no2: value("no2")?,
                so2: value("so2")?,
                co: value("co")?,
                o3: value("o3")?,
                aqi: value("aqi")?,
                temperature: value("temperature")?,
                humidity: value("humidity")?,
                pressure: value("pressure")?,
                wind_speed: value("wind_speed")?,
                wind_direction: value("wind_direction")?,
            });
        }
        log::debug!("parsed {} measurement records", records.len());
        Ok(records)
    }
}

fn parse_optional(row: &StringRecord, idx: Option<usize>, column: &str) -> Result<Option<f64>> {
    let raw = match idx.and_then(|i| row.get(i)) {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| PipelineError::InvalidNumber {
            column: column.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CSV: &str = r#"timestamp,location,pm25,pm10,no2,so2,co,o3,aqi,temperature,humidity,pressure,wind_speed,wind_direction
2024-03-09 14:00:00,bengaluru,41.2,77.0,22.1,4.0,310.5,58.0,115,29.5,48,1011.2,3.4,270
2024-03-09T13:00:00,bengaluru,,70.5,,,,,,28.0,,,,
"#;

    #[test]
    fn test_parse_csv() {
        let records = MeasurementRecord::parse_csv(CSV).unwrap();
        assert_eq!(records.len(), 2);
        let first = &records[0];
        assert_eq!(
            first.timestamp,
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap()
        );
        assert_eq!(first.location, "bengaluru");
        assert_eq!(first.pm25, Some(41.2));
        assert_eq!(first.aqi, Some(115.0));
        assert_eq!(first.wind_direction, Some(270.0));

        let second = &records[1];
        assert_eq!(second.pm25, None);
        assert_eq!(second.pm10, Some(70.5));
        assert_eq!(second.temperature, Some(28.0));
        assert_eq!(second.humidity, None);
    }

    #[test]
    fn test_parse_csv_subset_of_columns() {
        let csv = "location,timestamp,pm25\ndelhi,2024-01-01 00:00:00,180\n";
        let records = MeasurementRecord::parse_csv(csv).unwrap();
        assert_eq!(records[0].location, "delhi");
        assert_eq!(records[0].pm25, Some(180.0));
        assert_eq!(records[0].o3, None);
    }

    #[test]
    fn test_parse_csv_errors() {
        let missing = "location,pm25\ndelhi,10\n";
        assert!(matches!(
            MeasurementRecord::parse_csv(missing),
            Err(PipelineError::MissingColumn(_))
        ));

        let bad_ts = "timestamp,location\nyesterday,delhi\n";
        assert!(matches!(
            MeasurementRecord::parse_csv(bad_ts),
            Err(PipelineError::InvalidTimestamp(_))
        ));

        let bad_value = "timestamp,location,pm25\n2024-01-01 00:00:00,delhi,high\n";
        assert!(matches!(
            MeasurementRecord::parse_csv(bad_value),
            Err(PipelineError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_pollutant_accessors() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let record = MeasurementRecord::new(ts, "x")
            .with_pollutant(Pollutant::No2, Some(12.0))
            .with_pollutant(Pollutant::Aqi, Some(60.0));
        assert_eq!(record.pollutant(Pollutant::No2), Some(12.0));
        assert_eq!(record.pollutant(Pollutant::Aqi), Some(60.0));
        assert_eq!(record.pollutant(Pollutant::Pm25), None);
    }
}
