//! Core data model types for loaded datasets.
//!
//! A load produces [`Row`]s of scalar [`Value`]s, positionally aligned to the requested columns.
//! [`Table`] wraps those rows with their column labels.

use std::fmt;

use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::error::{RefDataError, RefDataResult};

/// Logical data type declared for a schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    #[default]
    Utf8,
}

impl DataType {
    /// Parse a descriptor `dtype` tag (case-insensitive).
    pub fn from_tag(tag: &str) -> RefDataResult<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" | "int64" => Ok(Self::Int64),
            "float" | "double" | "decimal" | "float64" => Ok(Self::Float64),
            "bool" | "boolean" => Ok(Self::Bool),
            "str" | "string" | "text" | "utf8" => Ok(Self::Utf8),
            other => Err(RefDataError::invalid_descriptor(format!(
                "unknown column dtype '{other}'"
            ))),
        }
    }
}

/// A single scalar value in a [`Row`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the string payload for [`Value::Utf8`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Utf8(s.to_owned())
    }
}

/// One loaded record. Fields are aligned to the requested projection, not to the schema.
pub type Row = Vec<Value>;

/// Column-labeled, row-ordered in-memory table.
///
/// Rows are stored as `Vec<Row>` in the same order as [`Table::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column labels, in projection order.
    pub columns: Vec<String>,
    /// Row-major value storage, in source order.
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// Returns the index of a column label, if present.
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, column: &str) -> Option<Vec<&Value>> {
        let idx = self.index_of(column)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).unwrap_or(&Value::Null))
                .collect(),
        )
    }

    /// Convert into a polars [`DataFrame`] for downstream analysis.
    ///
    /// The dtype of each series is inferred from its non-null values: all integers give `i64`,
    /// any mix of integers and floats gives `f64`, all booleans give `bool`. Everything else
    /// (including mixed columns) is rendered as strings.
    ///
    /// Fails with [`RefDataError::Polars`] when a label repeats, since a `DataFrame` requires
    /// unique column names.
    pub fn to_dataframe(&self) -> RefDataResult<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<&Value> = self
                    .rows
                    .iter()
                    .map(|row| row.get(idx).unwrap_or(&Value::Null))
                    .collect();
                Column::from(column_series(name, &values))
            })
            .collect();
        Ok(DataFrame::new(self.rows.len(), columns)?)
    }
}

fn column_series(name: &str, values: &[&Value]) -> Series {
    let non_null = || values.iter().filter(|v| !v.is_null());

    if non_null().all(|v| matches!(v, Value::Int64(_))) && non_null().next().is_some() {
        let data: Vec<Option<i64>> = values
            .iter()
            .map(|v| match v {
                Value::Int64(n) => Some(*n),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), data);
    }
    if non_null().all(|v| matches!(v, Value::Int64(_) | Value::Float64(_)))
        && non_null().next().is_some()
    {
        let data: Vec<Option<f64>> = values
            .iter()
            .map(|v| match v {
                Value::Int64(n) => Some(*n as f64),
                Value::Float64(n) => Some(*n),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), data);
    }
    if non_null().all(|v| matches!(v, Value::Bool(_))) && non_null().next().is_some() {
        let data: Vec<Option<bool>> = values
            .iter()
            .map(|v| match v {
                Value::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), data);
    }

    let data: Vec<Option<String>> = values
        .iter()
        .map(|v| (!v.is_null()).then(|| v.to_string()))
        .collect();
    Series::new(name.into(), data)
}
