//! Record-oriented JSON loader.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A JSON document holding the record array at `recordPath`: `{"data": {"rows": [{"a":1}]}}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Nested fields are addressed with dot paths (e.g. `user.name`), either directly as the column
//! identifier or through the `references` parameter.

use std::collections::BTreeMap;
use std::io::BufRead;

use serde_json::{Map, Value as JsonValue};

use crate::error::{RefDataError, RefDataResult};
use crate::types::{Row, Value};

use super::FormatLoader;

/// Options for record-oriented files, read from the descriptor's format parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonOptions {
    /// Dot path to the record array inside the document. `None` means the document root.
    pub record_path: Option<String>,
    /// Column identifier -> dot path of the field inside each record.
    pub references: BTreeMap<String, String>,
}

impl JsonOptions {
    pub fn from_parameters(parameters: &Map<String, JsonValue>) -> RefDataResult<Self> {
        let mut opts = Self::default();
        match parameters.get("recordPath") {
            None | Some(JsonValue::Null) => {}
            Some(JsonValue::String(path)) => {
                if !path.is_empty() {
                    opts.record_path = Some(path.clone());
                }
            }
            Some(other) => {
                return Err(RefDataError::invalid_descriptor(format!(
                    "json parameter 'recordPath' must be a string, got {other}"
                )));
            }
        }
        match parameters.get("references") {
            None | Some(JsonValue::Null) => {}
            Some(JsonValue::Object(refs)) => {
                for (column, path) in refs {
                    let path = path.as_str().ok_or_else(|| {
                        RefDataError::invalid_descriptor(format!(
                            "json reference for column '{column}' must be a string, got {path}"
                        ))
                    })?;
                    opts.references.insert(column.clone(), path.to_string());
                }
            }
            Some(other) => {
                return Err(RefDataError::invalid_descriptor(format!(
                    "json parameter 'references' must be an object, got {other}"
                )));
            }
        }
        Ok(opts)
    }

    fn field_path<'a>(&'a self, column: &'a str) -> &'a str {
        self.references.get(column).map(String::as_str).unwrap_or(column)
    }
}

/// Loader for record-oriented JSON files.
///
/// Fields are looked up by key in every record. A record that lacks a requested key yields
/// [`Value::Null`] for that field instead of failing the read.
#[derive(Debug, Clone, Default)]
pub struct JsonLoader {
    options: JsonOptions,
}

impl JsonLoader {
    pub fn new(options: JsonOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &JsonOptions {
        &self.options
    }

    fn records(&self, input: &str) -> RefDataResult<Vec<JsonValue>> {
        // First try parsing as a single JSON value (array or object).
        match serde_json::from_str::<JsonValue>(input) {
            Ok(doc) => return self.select_records(doc),
            // NDJSON never starts with an array; report the document's own syntax error.
            Err(e) if input.starts_with('[') => return Err(e.into()),
            Err(_) => {}
        }

        // Fall back to NDJSON.
        let mut records = Vec::new();
        for (i, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record =
                serde_json::from_str::<JsonValue>(line).map_err(|e| RefDataError::MalformedRecord {
                    row: i + 1,
                    message: format!("invalid ndjson: {e}"),
                })?;
            records.push(record);
        }
        Ok(records)
    }

    fn select_records(&self, doc: JsonValue) -> RefDataResult<Vec<JsonValue>> {
        let selected = match &self.options.record_path {
            None => doc,
            Some(path) => {
                let found = doc
                    .as_object()
                    .and_then(|obj| get_by_dot_path(obj, path))
                    .ok_or_else(|| RefDataError::MalformedDocument {
                        message: format!("record path '{path}' not found"),
                    })?;
                found.clone()
            }
        };
        match selected {
            JsonValue::Array(items) => Ok(items),
            obj @ JsonValue::Object(_) if self.options.record_path.is_none() => Ok(vec![obj]),
            _ => Err(RefDataError::MalformedDocument {
                message: "json must be an array of records, a single record, or NDJSON".to_string(),
            }),
        }
    }
}

impl FormatLoader for JsonLoader {
    fn read(&self, stream: &mut dyn BufRead, columns: &[&str]) -> RefDataResult<Vec<Row>> {
        let mut text = String::new();
        stream.read_to_string(&mut text)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.records(trimmed)?;
        let paths: Vec<&str> = columns.iter().map(|c| self.options.field_path(c)).collect();

        let mut rows: Vec<Row> = Vec::with_capacity(records.len());
        for (idx0, record) in records.iter().enumerate() {
            let obj = record.as_object().ok_or_else(|| RefDataError::MalformedRecord {
                row: idx0 + 1,
                message: "not a json object".to_string(),
            })?;
            rows.push(
                paths
                    .iter()
                    .map(|path| {
                        get_by_dot_path(obj, path)
                            .map(convert_json_value)
                            .unwrap_or(Value::Null)
                    })
                    .collect(),
            );
        }

        Ok(rows)
    }
}

fn get_by_dot_path<'a>(root: &'a Map<String, JsonValue>, path: &str) -> Option<&'a JsonValue> {
    // Keys that themselves contain dots win over nested lookup.
    if let Some(v) = root.get(path) {
        return Some(v);
    }

    let mut segments = path.split('.');
    let mut current: &JsonValue = root.get(segments.next()?)?;
    for segment in segments {
        match current {
            JsonValue::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

fn convert_json_value(v: &JsonValue) -> Value {
    match v {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::Utf8(s.clone()),
        nested => Value::Utf8(nested.to_string()),
    }
}
