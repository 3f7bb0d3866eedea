//! Output formatting and CSV persistence for loader rows and feature tables.
//!
//! Supports pretty-printing, JSON serialization, CSV append and CSV
//! read/write of [`Table`]s.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

use crate::table::{Column, Table};
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &impl Serialize) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

/// Writes `rows` to a fresh CSV file at `path`, replacing any existing file.
pub fn write_records<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path, rows = rows.len(), "Wrote CSV");
    Ok(())
}

/// Reads a CSV file into a [`Table`].
///
/// A column whose non-empty cells all parse as numbers becomes a float
/// column; anything else is kept as text. Empty cells are missing values.
pub fn read_table(path: &str) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("opening {path}"))?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for result in rdr.records() {
        let record = result?;
        for (i, cell) in record.iter().enumerate().take(headers.len()) {
            let cell = cell.trim();
            cells[i].push((!cell.is_empty()).then(|| cell.to_string()));
        }
    }

    let mut table = Table::new();
    for (name, values) in headers.iter().zip(cells) {
        table.set_column(name, infer_column(values))?;
    }

    debug!(path, rows = table.n_rows(), cols = table.n_cols(), "Read CSV table");
    Ok(table)
}

fn infer_column(values: Vec<Option<String>>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = values
        .iter()
        .map(|v| match v {
            Some(s) => s.parse::<f64>().ok().map(Some),
            None => Some(None),
        })
        .collect();

    match parsed {
        Some(floats) => Column::Float(floats),
        None => Column::Text(values),
    }
}

/// Writes a [`Table`] to `path` as CSV with a header row.
pub fn write_table(path: &str, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;

    writer.write_record(table.column_names())?;
    let columns: Vec<&Column> = table.columns().map(|(_, c)| c).collect();
    for row in 0..table.n_rows() {
        writer.write_record(columns.iter().map(|c| c.cell(row)))?;
    }
    writer.flush()?;

    info!(path, rows = table.n_rows(), "Wrote table");
    Ok(())
}
