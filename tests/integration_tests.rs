use aq_nowcast::aqi::epa_aqi_pm25;
use aq_nowcast::features::feature_engineer;
use aq_nowcast::fusion::{DEFAULT_OBS_VARIANCE, FusionState, fuse};
use aq_nowcast::loaders::{
    BoundingBox, DEFAULT_COLUMN_VAR, FixedClock, ObservationSource, Pollutant, SyntheticSource,
};
use aq_nowcast::table::{Column, Table};
use chrono::{DateTime, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn window() -> (BoundingBox, DateTime<Utc>, DateTime<Utc>) {
    (
        BoundingBox::new(-122.6, 47.1, -122.0, 47.8).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap(),
    )
}

fn source() -> impl ObservationSource {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 4, 0, 0).unwrap();
    SyntheticSource::new(StdRng::seed_from_u64(7), FixedClock(now))
}

/// Pivots weather rows and joins satellite columns on (tile, ts) the way a
/// downstream pipeline would before feature engineering.
fn merge_tile(tile: &str, src: &mut impl ObservationSource) -> Table {
    let (bbox, start, end) = window();
    let columns = src
        .satellite_columns(&bbox, start, end, DEFAULT_COLUMN_VAR)
        .unwrap();
    let weather = src.weather(&bbox, start, end).unwrap();

    let tile_columns: Vec<_> = columns.iter().filter(|c| c.tile_id == tile).collect();
    let ts: Vec<_> = tile_columns.iter().map(|c| c.ts).collect();
    let no2: Vec<_> = tile_columns.iter().map(|c| Some(c.value)).collect();

    let mut table = Table::new()
        .with_column("ts", Column::Timestamp(ts.clone()))
        .unwrap()
        .with_column("NO2_column", Column::Float(no2))
        .unwrap();

    // PBLH left out on purpose
    for var in ["U10", "V10", "T2", "RH2"] {
        let values = ts
            .iter()
            .map(|t| {
                weather
                    .iter()
                    .find(|w| w.tile_id == tile && w.ts == *t && w.var == var)
                    .map(|w| w.value)
            })
            .collect();
        table.set_column(var, Column::Float(values)).unwrap();
    }
    table
}

#[test]
fn test_loader_window_counts() {
    let (bbox, start, end) = window();
    let mut src = source();

    let ground = src
        .ground_observations(&bbox, start, end, Pollutant::Pm25)
        .unwrap();
    assert_eq!(ground.len(), 9);
    assert!(ground.iter().all(|r| r.value >= 0.0));

    let weather = src.weather(&bbox, start, end).unwrap();
    assert_eq!(weather.len(), 360);
    assert!(
        weather
            .iter()
            .filter(|w| w.var == "U10")
            .all(|w| w.value == 2.0)
    );
}

#[test]
fn test_full_pipeline() {
    let mut src = source();
    let merged = merge_tile("T005", &mut src);
    let features = feature_engineer(&merged).expect("feature engineering failed");

    assert_eq!(features.n_rows(), 3);
    for name in [
        "hour",
        "dow",
        "no2_scaled",
        "U10_norm",
        "V10_norm",
        "PBLH_norm",
        "T2_norm",
        "RH2_norm",
    ] {
        assert!(features.contains(name), "missing {name}");
    }
    assert_eq!(features.column("hour"), Some(&Column::Int(vec![0, 1, 2])));
    assert_eq!(features.column("PBLH_norm"), Some(&Column::constant(0.0, 3)));
    // weather fields are constant, so their z-scores collapse to zero
    assert_eq!(features.column("T2_norm"), Some(&Column::constant(0.0, 3)));
}

#[test]
fn test_nowcast_and_aqi() {
    let (bbox, start, end) = window();
    let ground = source()
        .ground_observations(&bbox, start, end, Pollutant::Pm25)
        .unwrap();

    let mut state = FusionState::new(8.0, 4.0);
    for row in ground.iter().filter(|r| r.station_id == "STN002") {
        let before = state.variance;
        state.update(row.value, DEFAULT_OBS_VARIANCE).unwrap();
        assert!(state.variance < before);
    }

    let aqi = epa_aqi_pm25(state.mean);
    assert!(aqi <= 100, "synthetic PM2.5 should stay moderate, got {aqi}");

    let textbook = fuse(FusionState::new(0.0, 1.0), 2.0, 1.0).unwrap();
    assert_eq!(textbook, FusionState::new(1.0, 0.5));
}
