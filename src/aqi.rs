//! EPA Air Quality Index conversion for PM2.5.

use serde::Serialize;

/// One linear segment of the concentration → AQI mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub conc_low: f64,
    pub conc_high: f64,
    pub aqi_low: u16,
    pub aqi_high: u16,
}

impl Breakpoint {
    const fn new(conc_low: f64, conc_high: f64, aqi_low: u16, aqi_high: u16) -> Self {
        Self {
            conc_low,
            conc_high,
            aqi_low,
            aqi_high,
        }
    }

    pub fn contains(&self, ugm3: f64) -> bool {
        self.conc_low <= ugm3 && ugm3 <= self.conc_high
    }

    /// Linear interpolation inside the band, before rounding.
    pub fn interpolate(&self, ugm3: f64) -> f64 {
        let slope = f64::from(self.aqi_high - self.aqi_low) / (self.conc_high - self.conc_low);
        slope * (ugm3 - self.conc_low) + f64::from(self.aqi_low)
    }
}

/// PM2.5 (µg/m³, 24-hour) breakpoints, ascending and non-overlapping.
pub static PM25_BREAKPOINTS: [Breakpoint; 6] = [
    Breakpoint::new(0.0, 12.0, 0, 50),
    Breakpoint::new(12.1, 35.4, 51, 100),
    Breakpoint::new(35.5, 55.4, 101, 150),
    Breakpoint::new(55.5, 150.4, 151, 200),
    Breakpoint::new(150.5, 250.4, 201, 300),
    Breakpoint::new(250.5, 500.4, 301, 500),
];

/// Ceiling of the scale, returned for anything the table does not cover.
pub const AQI_CEILING: u16 = 500;

/// Converts a PM2.5 concentration in µg/m³ to an AQI value.
///
/// The first band whose range contains `ugm3` is interpolated and rounded
/// half-up. Inputs no band contains (negative, NaN, above 500.4, or between
/// two bands) map to [`AQI_CEILING`].
pub fn epa_aqi_pm25(ugm3: f64) -> u16 {
    PM25_BREAKPOINTS
        .iter()
        .find(|bp| bp.contains(ugm3))
        .map(|bp| round_aqi(bp.interpolate(ugm3)))
        .unwrap_or(AQI_CEILING)
}

/// Rounds an interpolated AQI half-up (`2.5` → `3`).
pub fn round_aqi(value: f64) -> u16 {
    value.round().clamp(0.0, f64::from(AQI_CEILING)) as u16
}

/// Health category of an AQI value.
///
/// | AQI     | Category                       | Colour    |
/// |---------|--------------------------------|-----------|
/// | 0–50    | Good                           | `#00e400` |
/// | 51–100  | Moderate                       | `#ffff00` |
/// | 101–150 | Unhealthy for Sensitive Groups | `#ff7e00` |
/// | 151–200 | Unhealthy                      | `#ff0000` |
/// | 201–300 | Very Unhealthy                 | `#8f3f97` |
/// | 301+    | Hazardous                      | `#7e0023` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Map legend colour as a hex string.
    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#00e400",
            AqiCategory::Moderate => "#ffff00",
            AqiCategory::UnhealthyForSensitiveGroups => "#ff7e00",
            AqiCategory::Unhealthy => "#ff0000",
            AqiCategory::VeryUnhealthy => "#8f3f97",
            AqiCategory::Hazardous => "#7e0023",
        }
    }
}
