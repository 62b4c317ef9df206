//! Placeholder weather trajectory for forecast steps.
//!
//! This is not a physical model: each hour starts from the current
//! conditions, adds a daily temperature swing and bounded noise. The random
//! source is supplied by the caller so tests can seed it.

use aqf_features::WeatherConditions;
use rand::Rng;
use std::f64::consts::PI;

/// Peak deviation of the daily temperature cycle, °C.
pub const DAILY_TEMPERATURE_AMPLITUDE: f64 = 5.0;

const TEMPERATURE_JITTER: f64 = 1.0;
const HUMIDITY_JITTER: f64 = 5.0;
const PRESSURE_JITTER: f64 = 2.5;
const WIND_SPEED_JITTER: f64 = 1.0;
const WIND_DIRECTION_JITTER: f64 = 15.0;

pub const HUMIDITY_MIN: f64 = 20.0;
pub const HUMIDITY_MAX: f64 = 90.0;

/// Conditions for hours `1..=hours`; element `h - 1` is hour `h`.
pub fn synthesize_weather<R: Rng + ?Sized>(
    current: &WeatherConditions,
    hours: u32,
    rng: &mut R,
) -> Vec<WeatherConditions> {
    (1..=hours)
        .map(|h| {
            let cycle = DAILY_TEMPERATURE_AMPLITUDE * (2.0 * PI * h as f64 / 24.0).sin();
            WeatherConditions {
                temperature: current.temperature
                    + cycle
                    + rng.gen_range(-TEMPERATURE_JITTER..=TEMPERATURE_JITTER),
                humidity: (current.humidity + rng.gen_range(-HUMIDITY_JITTER..=HUMIDITY_JITTER))
                    .clamp(HUMIDITY_MIN, HUMIDITY_MAX),
                pressure: current.pressure + rng.gen_range(-PRESSURE_JITTER..=PRESSURE_JITTER),
                wind_speed: (current.wind_speed
                    + rng.gen_range(-WIND_SPEED_JITTER..=WIND_SPEED_JITTER))
                .max(0.0),
                wind_direction: (current.wind_direction
                    + rng.gen_range(-WIND_DIRECTION_JITTER..=WIND_DIRECTION_JITTER))
                .rem_euclid(360.0),
            }
        })
        .collect()
}
