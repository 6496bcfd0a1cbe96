//! Raw tabular input
//!
//! A `Table` is the untyped form of a course dataset: ordered column names
//! and rows of JSON values. CSV and JSON readers both produce it, and
//! `Corpus::from_table` turns it into the typed corpus.

use courserec_common::{CourseRecError, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Untyped table: column names plus rows aligned with them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names in input order
    pub columns: Vec<String>,

    /// Rows, each holding one value per column
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create table, padding short rows with nulls
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let width = columns.len();
        let mut padded = Vec::with_capacity(rows.len());
        for (row_idx, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(CourseRecError::schema(format!(
                    "Row {} has {} values but the table has {} columns",
                    row_idx,
                    row.len(),
                    width
                )));
            }
            row.resize(width, Value::Null);
            padded.push(row);
        }

        Ok(Self {
            columns,
            rows: padded,
        })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a column: exact name first, then case-insensitive
    pub fn resolve_column(&self, canonical: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == canonical)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(canonical))
            })
    }

    /// Read a table from a file, choosing the reader by extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Self::from_csv_path(path),
            Some("json") => Self::from_json_path(path),
            other => Err(CourseRecError::schema(format!(
                "Unsupported corpus format {:?} for {} (expected .csv or .json)",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// Read CSV with a header row; every cell becomes a string value
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|cell| Value::String(cell.to_string()))
                    .collect(),
            );
        }

        debug!("CSV table read: {} columns, {} rows", columns.len(), rows.len());
        Self::new(columns, rows)
    }

    pub fn from_json_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_json_value(value)
    }

    /// Accepts records orientation (`[{col: v}, ...]`) or columns
    /// orientation (`{col: [v, ...]}`)
    pub fn from_json_value(value: Value) -> Result<Self> {
        let table = match value {
            Value::Array(records) => Self::from_records(records)?,
            Value::Object(columns) => Self::from_columns(columns)?,
            other => {
                return Err(CourseRecError::schema(format!(
                    "Expected a JSON array of records or an object of columns, got {}",
                    json_type_name(&other)
                )))
            }
        };

        debug!(
            "JSON table read: {} columns, {} rows",
            table.columns.len(),
            table.rows.len()
        );
        Ok(table)
    }

    fn from_records(records: Vec<Value>) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        let mut objects = Vec::with_capacity(records.len());

        for (row_idx, record) in records.into_iter().enumerate() {
            let Value::Object(object) = record else {
                return Err(CourseRecError::schema(format!(
                    "Record {} is not a JSON object",
                    row_idx
                )));
            };
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
            objects.push(object);
        }

        let rows = objects
            .into_iter()
            .map(|mut object| {
                columns
                    .iter()
                    .map(|c| object.remove(c).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self::new(columns, rows)
    }

    fn from_columns(object: Map<String, Value>) -> Result<Self> {
        let mut columns = Vec::with_capacity(object.len());
        let mut values = Vec::with_capacity(object.len());

        for (name, column) in object {
            let Value::Array(cells) = column else {
                return Err(CourseRecError::schema(format!(
                    "Column '{}' is not a JSON array",
                    name
                )));
            };
            columns.push(name);
            values.push(cells);
        }

        let n_rows = values.first().map(Vec::len).unwrap_or(0);
        if let Some((name, cells)) = columns
            .iter()
            .zip(&values)
            .find(|(_, cells)| cells.len() != n_rows)
        {
            return Err(CourseRecError::schema(format!(
                "Column '{}' has {} values, expected {}",
                name,
                cells.len(),
                n_rows
            )));
        }

        let mut iters: Vec<_> = values.into_iter().map(Vec::into_iter).collect();
        let rows = (0..n_rows)
            .map(|_| {
                iters
                    .iter_mut()
                    .map(|it| it.next().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self::new(columns, rows)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
