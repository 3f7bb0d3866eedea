//! Feature engineering over a merged observation table.
//!
//! Adds calendar fields derived from `ts` and z-scored copies of the
//! satellite NO2 column and the weather-model variables. Optional inputs
//! that are absent still produce their derived column, filled with 0.0, so
//! downstream consumers always see the same schema.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use tracing::debug;

use crate::error::{NowcastError, Result};
use crate::stats::{mean, median, stddev};
use crate::table::{Column, Table};

/// Timestamp column every merged table must carry.
pub const TS_COLUMN: &str = "ts";

/// Satellite NO2 column and the feature derived from it.
pub const NO2_COLUMN: &str = "NO2_column";
pub const NO2_SCALED: &str = "no2_scaled";

/// Weather-model variables normalized into `<name>_norm`.
pub const WEATHER_VARS: [&str; 5] = ["U10", "V10", "PBLH", "T2", "RH2"];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Returns a copy of `input` with `hour`, `dow`, `no2_scaled` and
/// `{U10,V10,PBLH,T2,RH2}_norm` added.
///
/// `ts` is rewritten as a UTC timestamp column. `dow` counts Monday as 0
/// through Sunday as 6. Present optional columns are median-imputed in
/// place before scaling.
///
/// # Errors
///
/// [`NowcastError::InvalidInput`] if `ts` is missing or unparsable, or if an
/// optional column is present but not numeric.
pub fn feature_engineer(input: &Table) -> Result<Table> {
    let mut df = input.clone();

    let ts = parse_timestamps(
        input
            .column(TS_COLUMN)
            .ok_or_else(|| NowcastError::invalid("merged table has no 'ts' column"))?,
    )?;

    df.set_column("hour", Column::Int(ts.iter().map(|t| i64::from(t.hour())).collect()))?;
    df.set_column(
        "dow",
        Column::Int(ts.iter().map(|t| i64::from(t.weekday().num_days_from_monday())).collect()),
    )?;
    df.set_column(TS_COLUMN, Column::Timestamp(ts))?;

    normalize_into(&mut df, NO2_COLUMN, NO2_SCALED)?;
    for var in WEATHER_VARS {
        normalize_into(&mut df, var, &format!("{var}_norm"))?;
    }

    debug!(rows = df.n_rows(), cols = df.n_cols(), "Feature engineering complete");
    Ok(df)
}

/// Writes the z-score of `source` into `target`, or a 0.0 column when
/// `source` is absent.
fn normalize_into(df: &mut Table, source: &str, target: &str) -> Result<()> {
    let rows = df.n_rows();

    let Some(column) = df.column(source) else {
        debug!(column = source, "Column absent, filling with zeros");
        return df.set_column(target, Column::constant(0.0, rows));
    };

    let values = column.as_floats().ok_or_else(|| {
        NowcastError::invalid(format!(
            "column '{source}' must be numeric, found {}",
            column.kind()
        ))
    })?;

    let Some(filled) = impute_median(&values) else {
        debug!(column = source, "Column has no values, filling with zeros");
        return df.set_column(target, Column::constant(0.0, rows));
    };

    let scaled = zscore(&filled);
    df.set_column(source, Column::Float(filled.into_iter().map(Some).collect()))?;
    df.set_column(target, Column::Float(scaled.into_iter().map(Some).collect()))
}

/// Replaces missing entries with the median of the present ones. `None` when
/// nothing is present to take a median of.
pub fn impute_median(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let fill = median(values)?;
    Some(
        values
            .iter()
            .map(|v| match v {
                Some(x) if !x.is_nan() => *x,
                _ => fill,
            })
            .collect(),
    )
}

/// `(v - mean) / std` with the population standard deviation, using a
/// scale of 1.0 when the values have no spread.
///
/// A constant column is all zeros, even when its mean does not round
/// back to the value exactly.
pub fn zscore(values: &[f64]) -> Vec<f64> {
    if values.iter().all(|v| *v == values[0]) {
        return vec![0.0; values.len()];
    }

    let m = mean(values);
    let sd = stddev(values, m);
    let scale = if sd == 0.0 { 1.0 } else { sd };

    values.iter().map(|v| (v - m) / scale).collect()
}

fn parse_timestamps(column: &Column) -> Result<Vec<DateTime<Utc>>> {
    match column {
        Column::Timestamp(v) => Ok(v.clone()),
        Column::Text(v) => v
            .iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                Some(s) => parse_timestamp(s),
                None => Err(NowcastError::invalid(format!("'ts' is missing in row {row}"))),
            })
            .collect(),
        other => Err(NowcastError::invalid(format!(
            "'ts' must hold timestamps, found {}",
            other.kind()
        ))),
    }
}

/// Parses an RFC 3339 timestamp, or a naive one taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| NowcastError::invalid(format!("unparsable timestamp '{s}'")))
}
