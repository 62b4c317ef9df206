//! US EPA air quality index from PM2.5 concentration.

/// (concentration low, concentration high, index low, index high)
const PM25_BREAKPOINTS: [(f64, f64, f64, f64); 7] = [
    (0.0, 12.0, 0.0, 50.0),
    (12.1, 35.4, 51.0, 100.0),
    (35.5, 55.4, 101.0, 150.0),
    (55.5, 150.4, 151.0, 200.0),
    (150.5, 250.4, 201.0, 300.0),
    (250.5, 350.4, 301.0, 400.0),
    (350.5, 500.4, 401.0, 500.0),
];

/// Highest index value on the scale.
pub const AQI_MAX: u32 = 500;

/// Compute the AQI for a 24h PM2.5 concentration (µg/m³).
///
/// The concentration is truncated to one decimal before the breakpoint
/// lookup, so values between two segments (e.g. 12.05) fall in the lower one.
pub fn aqi_from_pm25(pm25: f64) -> u32 {
    if !pm25.is_finite() || pm25 <= 0.0 {
        return 0;
    }
    let c = (pm25 * 10.0 + 1e-9).floor() / 10.0;
    for (c_low, c_high, i_low, i_high) in PM25_BREAKPOINTS {
        if c >= c_low && c <= c_high {
            let index = (i_high - i_low) / (c_high - c_low) * (c - c_low) + i_low;
            return index.round() as u32;
        }
    }
    AQI_MAX
}
