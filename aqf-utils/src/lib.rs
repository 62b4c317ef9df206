//! Shared utility functions for AQF crates.

/// Timestamp and calendar helpers
pub mod dates {
    use chrono::{Datelike, NaiveDateTime, Timelike};

    /// Parse a timestamp in either the canonical or the ISO-8601 form.
    ///
    /// Fractional seconds are accepted in both forms.
    pub fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
        let s = s.trim();
        let parsed = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))?;
        Ok(parsed)
    }

    /// Day of week with Sunday = 0 ... Saturday = 6.
    pub fn day_of_week(ts: &NaiveDateTime) -> u32 {
        ts.weekday().num_days_from_sunday()
    }

    /// Zero-based month (January = 0 ... December = 11).
    pub fn month0(ts: &NaiveDateTime) -> u32 {
        ts.month0()
    }

    /// Hour of the day (0-23).
    pub fn hour(ts: &NaiveDateTime) -> u32 {
        ts.hour()
    }

    /// Saturday and Sunday.
    pub fn is_weekend(day_of_week: u32) -> bool {
        day_of_week == 0 || day_of_week == 6
    }

    /// Morning (07:00-09:59) and evening (17:00-19:59) commute windows.
    pub fn is_rush_hour(hour: u32) -> bool {
        (7..=9).contains(&hour) || (17..=19).contains(&hour)
    }

    /// Night hours: 22:00 through 05:59.
    pub fn is_night_hour(hour: u32) -> bool {
        hour >= 22 || hour <= 5
    }

}

/// Numeric helpers
pub mod numbers {
    /// Round to a fixed number of decimal places. Halves round toward
    /// positive infinity, so -1.25 becomes -1.2.
    pub fn round_to(value: f64, places: i32) -> f64 {
        let factor = 10f64.powi(places);
        (value * factor + 0.5).floor() / factor
    }

}
