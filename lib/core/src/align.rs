//! Feature alignment
//!
//! Projects schema-less records onto a scheme's feature order. Categorical
//! columns become text, rendered per column the way a typed frame would
//! render them. Other columns become numbers where the value is numeric and
//! pass through as text otherwise; the model decides whether it can use
//! them. Row `i` of the matrix is record `i`.

use ahash::AHashSet;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::feature::FeatureSpec;
use crate::record::{float_text, parse_number, value_to_text, Cell, Record};

/// Row-major model input
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    cells: Vec<Cell>,
    n_rows: usize,
}

impl FeatureMatrix {
    /// Build a matrix from explicit rows. Every row must have one cell
    /// per column.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let n_rows = rows.len();
        let mut cells = Vec::with_capacity(n_rows * columns.len());
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::InvalidFeatureSpec(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    columns.len()
                )));
            }
            cells.extend(row);
        }
        Ok(Self { columns, cells, n_rows })
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Get a row by position
    pub fn row(&self, i: usize) -> Option<&[Cell]> {
        if i >= self.n_rows {
            return None;
        }
        let width = self.n_cols();
        Some(&self.cells[i * width..(i + 1) * width])
    }

    /// Iterate rows in input order
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        // chunks_exact panics on zero width; a zero-width matrix has no cells
        let width = self.n_cols().max(1);
        self.cells.chunks_exact(width)
    }
}

/// Align records to the spec's column order.
///
/// A column counts as present when at least one record carries it;
/// records missing a present column contribute a null cell.
pub fn align(records: &[Record], spec: &FeatureSpec) -> Result<FeatureMatrix> {
    let present: AHashSet<&str> = records
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect();

    if let Some(missing) = spec.features().iter().find(|f| !present.contains(f.as_str())) {
        return Err(Error::MissingColumn(missing.clone()));
    }

    // Integral numbers in a float column render as floats ("1.0")
    let float_columns: Vec<bool> = spec
        .features()
        .iter()
        .enumerate()
        .map(|(position, column)| spec.is_categorical(position) && is_float_column(records, column))
        .collect();

    let mut cells = Vec::with_capacity(records.len() * spec.len());
    for record in records {
        for (position, column) in spec.features().iter().enumerate() {
            let value = record.get(column).unwrap_or(&Value::Null);
            let cell = if spec.is_categorical(position) {
                Cell::Text(categorical_text(value, float_columns[position]))
            } else {
                numeric_cell(value)
            };
            cells.push(cell);
        }
    }

    tracing::debug!(
        rows = records.len(),
        columns = spec.len(),
        categorical = spec.categorical().len(),
        "aligned feature matrix"
    );

    Ok(FeatureMatrix {
        columns: spec.features().to_vec(),
        cells,
        n_rows: records.len(),
    })
}

/// Whether a column would be typed as float: only numbers and nulls, with
/// at least one null, gap or non-integral number
fn is_float_column(records: &[Record], column: &str) -> bool {
    let mut float = false;
    for record in records {
        match record.get(column) {
            None | Some(Value::Null) => float = true,
            Some(Value::Number(n)) => float |= n.as_i64().is_none() && n.as_u64().is_none(),
            Some(_) => return false,
        }
    }
    float
}

fn categorical_text(value: &Value, float_column: bool) -> String {
    match value {
        Value::Number(n) if float_column => float_text(n.as_f64().unwrap_or(f64::NAN)),
        other => value_to_text(other),
    }
}

fn numeric_cell(value: &Value) -> Cell {
    match value {
        Value::Number(n) => Cell::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::Null => Cell::Number(f64::NAN),
        Value::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => parse_number(s).map_or_else(|| Cell::Text(s.clone()), Cell::Number),
        other => Cell::Text(other.to_string()),
    }
}
