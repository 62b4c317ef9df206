use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// A tracked quantity that is modelled and forecast independently.
///
/// The declaration order is the order forecasts are emitted in.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    /// Fine particulate matter (PM2.5), µg/m³
    Pm25,
    /// Coarse particulate matter (PM10), µg/m³
    Pm10,
    /// Aggregate air quality index
    Aqi,
    /// Nitrogen dioxide, µg/m³
    No2,
    /// Ozone, µg/m³
    O3,
}

impl Pollutant {
    /// Every tracked pollutant, in forecast order.
    pub const ALL: [Pollutant; 5] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::Aqi,
        Pollutant::No2,
        Pollutant::O3,
    ];

    /// Identifier used in storage, JSON and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm25",
            Pollutant::Pm10 => "pm10",
            Pollutant::Aqi => "aqi",
            Pollutant::No2 => "no2",
            Pollutant::O3 => "o3",
        }
    }

    /// Typical value used when there is not enough history to extrapolate.
    pub fn trend_default(&self) -> f64 {
        match self {
            Pollutant::Pm25 => 35.0,
            Pollutant::Pm10 => 55.0,
            Pollutant::Aqi => 85.0,
            Pollutant::No2 => 25.0,
            Pollutant::O3 => 60.0,
        }
    }

    /// Plausible (min, max) range; extrapolated values are clamped into it.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Pollutant::Pm25 => (0.0, 300.0),
            Pollutant::Pm10 => (0.0, 500.0),
            Pollutant::Aqi => (1.0, 500.0),
            Pollutant::No2 => (0.0, 200.0),
            Pollutant::O3 => (0.0, 300.0),
        }
    }

    /// Seasonal multipliers indexed by zero-based month.
    ///
    /// Particulates and NO2 peak in winter, ozone in late spring.
    pub fn seasonal_factors(&self) -> [f64; 12] {
        match self {
            Pollutant::Pm25 => [1.2, 1.1, 1.0, 0.9, 0.8, 0.7, 0.8, 0.9, 1.0, 1.1, 1.3, 1.4],
            Pollutant::Pm10 => [1.3, 1.2, 1.1, 0.9, 0.8, 0.7, 0.8, 0.9, 1.0, 1.1, 1.2, 1.3],
            Pollutant::Aqi => [1.2, 1.1, 1.0, 0.9, 0.8, 0.7, 0.8, 0.9, 1.0, 1.1, 1.2, 1.3],
            Pollutant::No2 => [1.1, 1.0, 0.9, 0.9, 0.8, 0.8, 0.9, 1.0, 1.0, 1.1, 1.1, 1.2],
            Pollutant::O3 => [0.9, 1.0, 1.1, 1.2, 1.3, 1.2, 1.1, 1.0, 0.9, 0.9, 0.9, 0.9],
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pollutant {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pm25" | "pm2.5" => Ok(Pollutant::Pm25),
            "pm10" => Ok(Pollutant::Pm10),
            "aqi" => Ok(Pollutant::Aqi),
            "no2" => Ok(Pollutant::No2),
            "o3" => Ok(Pollutant::O3),
            other => Err(PipelineError::UnknownPollutant(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for p in Pollutant::ALL {
            assert_eq!(p.name().parse::<Pollutant>().unwrap(), p);
        }
        assert_eq!("PM2.5".parse::<Pollutant>().unwrap(), Pollutant::Pm25);
        assert!(matches!(
            "so2".parse::<Pollutant>(),
            Err(PipelineError::UnknownPollutant(_))
        ));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Pollutant::Pm25).unwrap();
        assert_eq!(json, "\"pm25\"");
        let back: Pollutant = serde_json::from_str("\"o3\"").unwrap();
        assert_eq!(back, Pollutant::O3);
    }

    #[test]
    fn test_bounds_are_non_negative() {
        for p in Pollutant::ALL {
            let (min, max) = p.bounds();
            assert!(min >= 0.0);
            assert!(max > min);
        }
    }

    #[test]
    fn test_forecast_order() {
        let names: Vec<&str> = Pollutant::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["pm25", "pm10", "aqi", "no2", "o3"]);
    }
}
