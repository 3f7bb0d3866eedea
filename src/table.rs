//! Minimal typed column store used for merged observation tables.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{NowcastError, Result};

/// A single named column's values. Every variant holds one entry per row.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<Option<f64>>),
    Int(Vec<i64>),
    Text(Vec<Option<String>>),
    Timestamp(Vec<DateTime<Utc>>),
}

impl Column {
    /// A float column holding `value` in each of `len` rows.
    pub fn constant(value: f64, len: usize) -> Self {
        Column::Float(vec![Some(value); len])
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Text(v) => v.len(),
            Column::Timestamp(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Column::Float(_) => "float",
            Column::Int(_) => "int",
            Column::Text(_) => "text",
            Column::Timestamp(_) => "timestamp",
        }
    }

    /// Numeric view of the column, or `None` for text and timestamps.
    pub fn as_floats(&self) -> Option<Vec<Option<f64>>> {
        match self {
            Column::Float(v) => Some(v.clone()),
            Column::Int(v) => Some(v.iter().map(|x| Some(*x as f64)).collect()),
            Column::Text(_) | Column::Timestamp(_) => None,
        }
    }

    /// Renders row `row` for tabular output; missing values are empty.
    pub fn cell(&self, row: usize) -> String {
        match self {
            Column::Float(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
            Column::Int(v) => v[row].to_string(),
            Column::Text(v) => v[row].clone().unwrap_or_default(),
            Column::Timestamp(v) => v[row].to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

/// Ordered collection of equal-length named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<(String, Column)>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Table::set_column`].
    pub fn with_column(mut self, name: &str, column: Column) -> Result<Self> {
        self.set_column(name, column)?;
        Ok(self)
    }

    /// Replaces the column called `name` in place, or appends it.
    ///
    /// # Errors
    ///
    /// Fails if the column's length differs from the table's row count.
    pub fn set_column(&mut self, name: &str, column: Column) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(NowcastError::invalid(format!(
                "column '{name}' has {} rows, table has {}",
                column.len(),
                self.n_rows()
            )));
        }

        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name.to_string(), column)),
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }
}
