//! Row types produced by the observation loaders.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{NowcastError, Result};

/// Rectangular spatial window in longitude/latitude degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    minx: f64,
    miny: f64,
    maxx: f64,
    maxy: f64,
}

impl BoundingBox {
    /// # Errors
    ///
    /// Fails on non-finite bounds or when a minimum exceeds its maximum.
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Result<Self> {
        if ![minx, miny, maxx, maxy].iter().all(|v| v.is_finite()) {
            return Err(NowcastError::invalid("bounding box bounds must be finite"));
        }
        if minx > maxx || miny > maxy {
            return Err(NowcastError::invalid(format!(
                "bounding box min exceeds max: ({minx}, {miny}) > ({maxx}, {maxy})"
            )));
        }
        Ok(Self {
            minx,
            miny,
            maxx,
            maxy,
        })
    }

    pub fn minx(&self) -> f64 {
        self.minx
    }

    pub fn miny(&self) -> f64 {
        self.miny
    }

    pub fn maxx(&self) -> f64 {
        self.maxx
    }

    pub fn maxy(&self) -> f64 {
        self.maxy
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.minx <= lon && lon <= self.maxx && self.miny <= lat && lat <= self.maxy
    }
}

/// Pollutants a ground network can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pollutant {
    Pm25,
    O3,
    No2,
}

impl Pollutant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM25",
            Pollutant::O3 => "O3",
            Pollutant::No2 => "NO2",
        }
    }

    /// Reporting units: mass concentration for particulates, mixing ratio otherwise.
    pub fn units(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "ug/m3",
            Pollutant::O3 | Pollutant::No2 => "ppb",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pollutant {
    type Err = NowcastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().replace('.', "").as_str() {
            "PM25" => Ok(Pollutant::Pm25),
            "O3" | "OZONE" => Ok(Pollutant::O3),
            "NO2" => Ok(Pollutant::No2),
            other => Err(NowcastError::invalid(format!("unknown pollutant '{other}'"))),
        }
    }
}

/// One ground-station reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRow {
    pub station_id: String,
    pub ts: DateTime<Utc>,
    pub pollutant: Pollutant,
    pub value: f64,
    pub units: String,
    pub qa_flag: Option<String>,
    pub source: String,
    pub source_url: String,
    pub ingested_at: DateTime<Utc>,
}

/// One satellite column retrieval for a tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRow {
    pub tile_id: String,
    pub ts: DateTime<Utc>,
    pub product: String,
    pub var: String,
    pub value: f64,
    pub units: String,
    pub qa_flag: Option<String>,
    pub geom_wkt: String,
    pub source_url: String,
    pub ingested_at: DateTime<Utc>,
}

/// One weather-model variable for a tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRow {
    pub tile_id: String,
    pub ts: DateTime<Utc>,
    pub var: String,
    pub value: f64,
    pub units: String,
    pub model: String,
    pub ingested_at: DateTime<Utc>,
}
