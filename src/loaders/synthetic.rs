//! Placeholder generators standing in for real ground, satellite and
//! weather-model feeds. Output carries no real-world fidelity, only the
//! schema downstream consumers expect.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, instrument};

use super::clock::Clock;
use super::types::{BoundingBox, ColumnRow, ObservationRow, Pollutant, WeatherRow};
use super::{ObservationSource, hourly_steps};
use crate::stats::linspace;

/// A fixed ground monitoring site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station {
    pub id: &'static str,
    pub lat: f64,
    pub lon: f64,
}

pub static STATIONS: [Station; 3] = [
    Station {
        id: "STN001",
        lat: 47.25,
        lon: -122.44,
    },
    Station {
        id: "STN002",
        lat: 47.62,
        lon: -122.33,
    },
    Station {
        id: "STN003",
        lat: 47.57,
        lon: -122.20,
    },
];

pub const TILE_COUNT: usize = 24;

/// Weather variables emitted per tile and step: (name, value, units).
pub static WEATHER_FIELDS: [(&str, f64, &str); 5] = [
    ("U10", 2.0, "m/s"),
    ("V10", -1.0, "m/s"),
    ("PBLH", 450.0, "m"),
    ("T2", 293.0, "K"),
    ("RH2", 55.0, "%"),
];

const GROUND_SOURCE: &str = "synthetic";
const PLACEHOLDER_URL: &str = "about:blank";
const TEMPO_PRODUCT: &str = "TEMPO_L2_NO2_NRT_V02";
const TEMPO_UNITS: &str = "mol/m2";
const PLACEHOLDER_WKT: &str = "POLYGON(...)";
const WEATHER_MODEL: &str = "HRRR";

const GROUND_AMPLITUDE: f64 = 4.0;
const GROUND_PHASE_SPAN: f64 = 8.0;
const GROUND_NOISE_SD: f64 = 1.2;

const COLUMN_BASELINE: f64 = 0.25;
const COLUMN_AMPLITUDE: f64 = 0.1;
const COLUMN_PHASE_SPAN: f64 = 3.0;
const COLUMN_NOISE_SD: f64 = 0.02;

/// Tile identifiers `T001` through `T024`.
pub fn tile_ids() -> Vec<String> {
    (1..=TILE_COUNT).map(|i| format!("T{i:03}")).collect()
}

fn ground_baseline(pollutant: Pollutant) -> f64 {
    match pollutant {
        Pollutant::Pm25 => 8.0,
        Pollutant::O3 | Pollutant::No2 => 35.0,
    }
}

/// Fabricates observation tables from an injected random generator and clock.
///
/// Seed the generator (e.g. `StdRng::seed_from_u64`) and use a
/// [`FixedClock`](super::FixedClock) for reproducible output.
#[derive(Debug)]
pub struct SyntheticSource<R, C> {
    rng: R,
    clock: C,
}

impl<R: Rng, C: Clock> SyntheticSource<R, C> {
    pub fn new(rng: R, clock: C) -> Self {
        Self { rng, clock }
    }

    /// Sinusoid over `n` steps plus gaussian noise, floored at zero.
    fn signal(
        &mut self,
        n: usize,
        baseline: f64,
        amplitude: f64,
        span: f64,
        noise_sd: f64,
    ) -> Vec<f64> {
        linspace(0.0, span, n)
            .into_iter()
            .map(|x| {
                let noise: f64 = self.rng.sample(StandardNormal);
                (baseline + amplitude * x.sin() + noise_sd * noise).max(0.0)
            })
            .collect()
    }

    /// Three fixed stations, one row per station per hour.
    #[instrument(
        level = "debug",
        skip(self, bbox),
        fields(minx = bbox.minx(), miny = bbox.miny(), maxx = bbox.maxx(), maxy = bbox.maxy())
    )]
    pub fn load_ground_observations(
        &mut self,
        bbox: &BoundingBox,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        pollutant: Pollutant,
    ) -> Vec<ObservationRow> {
        let steps = hourly_steps(start, end);
        let baseline = ground_baseline(pollutant);
        let mut rows = Vec::with_capacity(STATIONS.len() * steps.len());

        for station in &STATIONS {
            if !bbox.contains(station.lon, station.lat) {
                debug!(
                    station = station.id,
                    lat = station.lat,
                    lon = station.lon,
                    "Station outside bounding box"
                );
            }
            let values = self.signal(
                steps.len(),
                baseline,
                GROUND_AMPLITUDE,
                GROUND_PHASE_SPAN,
                GROUND_NOISE_SD,
            );
            for (ts, value) in steps.iter().zip(values) {
                rows.push(ObservationRow {
                    station_id: station.id.to_string(),
                    ts: *ts,
                    pollutant,
                    value,
                    units: pollutant.units().to_string(),
                    qa_flag: None,
                    source: GROUND_SOURCE.to_string(),
                    source_url: PLACEHOLDER_URL.to_string(),
                    ingested_at: self.clock.now(),
                });
            }
        }

        debug!(rows = rows.len(), "Generated ground observations");
        rows
    }

    /// 24 tiles of satellite column retrievals named `var`.
    #[instrument(
        level = "debug",
        skip(self, bbox),
        fields(minx = bbox.minx(), miny = bbox.miny(), maxx = bbox.maxx(), maxy = bbox.maxy())
    )]
    pub fn load_tempo_columns(
        &mut self,
        bbox: &BoundingBox,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        var: &str,
    ) -> Vec<ColumnRow> {
        let steps = hourly_steps(start, end);
        let mut rows = Vec::with_capacity(TILE_COUNT * steps.len());

        for tile in tile_ids() {
            let values = self.signal(
                steps.len(),
                COLUMN_BASELINE,
                COLUMN_AMPLITUDE,
                COLUMN_PHASE_SPAN,
                COLUMN_NOISE_SD,
            );
            for (ts, value) in steps.iter().zip(values) {
                rows.push(ColumnRow {
                    tile_id: tile.clone(),
                    ts: *ts,
                    product: TEMPO_PRODUCT.to_string(),
                    var: var.to_string(),
                    value,
                    units: TEMPO_UNITS.to_string(),
                    qa_flag: None,
                    geom_wkt: PLACEHOLDER_WKT.to_string(),
                    source_url: PLACEHOLDER_URL.to_string(),
                    ingested_at: self.clock.now(),
                });
            }
        }

        debug!(rows = rows.len(), "Generated satellite columns");
        rows
    }

    /// Constant weather-model fields for every tile and hour.
    #[instrument(
        level = "debug",
        skip(self, bbox),
        fields(minx = bbox.minx(), miny = bbox.miny(), maxx = bbox.maxx(), maxy = bbox.maxy())
    )]
    pub fn load_weather(
        &mut self,
        bbox: &BoundingBox,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<WeatherRow> {
        let steps = hourly_steps(start, end);
        let mut rows = Vec::with_capacity(TILE_COUNT * steps.len() * WEATHER_FIELDS.len());

        for tile in tile_ids() {
            for ts in &steps {
                for (var, value, units) in WEATHER_FIELDS {
                    rows.push(WeatherRow {
                        tile_id: tile.clone(),
                        ts: *ts,
                        var: var.to_string(),
                        value,
                        units: units.to_string(),
                        model: WEATHER_MODEL.to_string(),
                        ingested_at: self.clock.now(),
                    });
                }
            }
        }

        debug!(rows = rows.len(), "Generated weather rows");
        rows
    }
}

impl<R: Rng, C: Clock> ObservationSource for SyntheticSource<R, C> {
    fn ground_observations(
        &mut self,
        bbox: &BoundingBox,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        pollutant: Pollutant,
    ) -> Result<Vec<ObservationRow>> {
        Ok(self.load_ground_observations(bbox, start, end, pollutant))
    }

    fn satellite_columns(
        &mut self,
        bbox: &BoundingBox,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        var: &str,
    ) -> Result<Vec<ColumnRow>> {
        Ok(self.load_tempo_columns(bbox, start, end, var))
    }

    fn weather(
        &mut self,
        bbox: &BoundingBox,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WeatherRow>> {
        Ok(self.load_weather(bbox, start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::{DEFAULT_COLUMN_VAR, FixedClock};
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn window() -> (BoundingBox, DateTime<Utc>, DateTime<Utc>) {
        (
            BoundingBox::new(-122.6, 47.1, -122.0, 47.8).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap(),
        )
    }

    fn source(seed: u64) -> SyntheticSource<StdRng, FixedClock> {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        SyntheticSource::new(StdRng::seed_from_u64(seed), FixedClock(now))
    }

    #[test]
    fn test_ground_row_count_and_schema() {
        let (bbox, start, end) = window();
        let rows = source(1).load_ground_observations(&bbox, start, end, Pollutant::Pm25);

        assert_eq!(rows.len(), 9);
        assert!(rows.iter().all(|r| r.value >= 0.0));
        assert!(rows.iter().all(|r| r.units == "ug/m3" && r.qa_flag.is_none()));
        assert!(rows.iter().all(|r| r.source == "synthetic"));
        assert_eq!(rows[0].station_id, "STN001");
        assert_eq!(rows[8].station_id, "STN003");
        assert_eq!(rows[8].ts, Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap());
    }

    #[test]
    fn test_ground_values_hover_near_baseline() {
        let (bbox, start, end) = window();
        let rows = source(2).load_ground_observations(&bbox, start, end, Pollutant::O3);

        assert!(rows.iter().all(|r| r.units == "ppb"));
        // 35 ± 4 amplitude, noise sd 1.2
        assert!(rows.iter().all(|r| r.value > 20.0 && r.value < 50.0));
    }

    #[test]
    fn test_ingested_at_comes_from_clock() {
        let (bbox, start, end) = window();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let rows = source(3).load_weather(&bbox, start, end);
        assert!(rows.iter().all(|r| r.ingested_at == now));
    }

    #[test]
    fn test_same_seed_reproduces_output() {
        let (bbox, start, end) = window();
        let a = source(42).load_ground_observations(&bbox, start, end, Pollutant::Pm25);
        let b = source(42).load_ground_observations(&bbox, start, end, Pollutant::Pm25);
        assert_eq!(a, b);

        let c = source(43).load_ground_observations(&bbox, start, end, Pollutant::Pm25);
        assert_ne!(a, c);
    }

    #[test]
    fn test_tempo_columns() {
        let (bbox, start, end) = window();
        let rows = source(4).load_tempo_columns(&bbox, start, end, DEFAULT_COLUMN_VAR);

        assert_eq!(rows.len(), TILE_COUNT * 3);
        assert_eq!(rows[0].tile_id, "T001");
        assert_eq!(rows.last().unwrap().tile_id, "T024");
        assert!(rows.iter().all(|r| r.value >= 0.0));
        assert!(rows.iter().all(|r| r.product == "TEMPO_L2_NO2_NRT_V02"));
        assert!(rows.iter().all(|r| r.var == "NO2_column" && r.units == "mol/m2"));
        assert!(rows.iter().all(|r| r.geom_wkt == "POLYGON(...)"));
    }

    #[test]
    fn test_weather_constants() {
        let (bbox, start, end) = window();
        let rows = source(5).load_weather(&bbox, start, end);

        assert_eq!(rows.len(), 360);
        assert!(rows.iter().all(|r| r.model == "HRRR"));
        for (var, value, units) in WEATHER_FIELDS {
            let matching: Vec<_> = rows.iter().filter(|r| r.var == var).collect();
            assert_eq!(matching.len(), 72, "{var}");
            assert!(matching.iter().all(|r| r.value == value && r.units == units));
        }
    }

    #[test]
    fn test_empty_window_yields_no_rows() {
        let (bbox, start, _) = window();
        let mut src = source(6);
        assert!(src.load_ground_observations(&bbox, start, start, Pollutant::Pm25).is_empty());
        assert!(src.load_tempo_columns(&bbox, start, start, "NO2_column").is_empty());
        assert!(src.load_weather(&bbox, start, start).is_empty());
    }

    #[test]
    fn test_stations_lie_in_default_box() {
        let (bbox, _, _) = window();
        assert!(STATIONS.iter().all(|s| bbox.contains(s.lon, s.lat)));
    }

    #[test]
    fn test_stations_outside_box_still_reported() {
        let (_, start, end) = window();
        let far = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let rows = source(8).load_ground_observations(&far, start, end, Pollutant::No2);
        assert_eq!(rows.len(), 9);
    }

    #[test]
    fn test_tile_ids() {
        let ids = tile_ids();
        assert_eq!(ids.len(), 24);
        assert_eq!(ids[0], "T001");
        assert_eq!(ids[9], "T010");
        assert_eq!(ids[23], "T024");
    }
}
