//! Observation loaders for ground stations, satellite columns and weather.
//!
//! [`ObservationSource`] is the seam a real data provider plugs into;
//! [`SyntheticSource`] fabricates placeholder data with the same schema.

mod clock;
mod synthetic;
mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use synthetic::{STATIONS, Station, SyntheticSource, TILE_COUNT, WEATHER_FIELDS, tile_ids};
pub use types::{BoundingBox, ColumnRow, ObservationRow, Pollutant, WeatherRow};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

/// Default satellite column variable.
pub const DEFAULT_COLUMN_VAR: &str = "NO2_column";

/// Provider of the three observation tables over a window `[start, end)`.
pub trait ObservationSource {
    fn ground_observations(
        &mut self,
        bbox: &BoundingBox,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        pollutant: Pollutant,
    ) -> Result<Vec<ObservationRow>>;

    fn satellite_columns(
        &mut self,
        bbox: &BoundingBox,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        var: &str,
    ) -> Result<Vec<ColumnRow>>;

    fn weather(
        &mut self,
        bbox: &BoundingBox,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WeatherRow>>;
}

/// Hourly instants from `start`, stopping before `end`.
pub fn hourly_steps(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut steps = Vec::new();
    let mut t = start;
    while t < end {
        steps.push(t);
        t += Duration::hours(1);
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hourly_steps_exclude_end() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        let steps = hourly_steps(start, end);

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0], start);
        assert_eq!(steps[2], Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap());
    }

    #[test]
    fn test_hourly_steps_partial_hour() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();
        assert_eq!(hourly_steps(start, end).len(), 2);
    }

    #[test]
    fn test_hourly_steps_empty_window() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(hourly_steps(t, t).is_empty());
        assert!(hourly_steps(t, t - Duration::hours(2)).is_empty());
    }
}
