//! Delimited-text loader.

use std::io::BufRead;

use serde_json::{Map, Value as JsonValue};

use crate::descriptor::ColumnSchema;
use crate::error::{RefDataError, RefDataResult};
use crate::types::{DataType, Row, Value};

use super::FormatLoader;

/// Dialect of a delimited-text file, read from the descriptor's format parameters.
///
/// Recognized parameters:
///
/// - `delim`: single-character field delimiter (default `,`). `\t` may be given literally or as
///   the escaped two-character string `"\\t"`.
/// - `quotechar`: single-character quote (default `"`).
/// - `header`: whether the first line is a header row (default `true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub quote: u8,
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            has_header: true,
        }
    }
}

impl CsvOptions {
    pub fn from_parameters(parameters: &Map<String, JsonValue>) -> RefDataResult<Self> {
        let mut opts = Self::default();
        if let Some(v) = parameters.get("delim") {
            opts.delimiter = single_byte("delim", v)?;
        }
        if let Some(v) = parameters.get("quotechar") {
            opts.quote = single_byte("quotechar", v)?;
        }
        if let Some(v) = parameters.get("header") {
            opts.has_header = v.as_bool().ok_or_else(|| {
                RefDataError::invalid_descriptor(format!(
                    "csv parameter 'header' must be a bool, got {v}"
                ))
            })?;
        }
        Ok(opts)
    }
}

fn single_byte(name: &str, v: &JsonValue) -> RefDataResult<u8> {
    let s = v.as_str().ok_or_else(|| {
        RefDataError::invalid_descriptor(format!(
            "csv parameter '{name}' must be a string, got {v}"
        ))
    })?;
    let s = if s == "\\t" { "\t" } else { s };
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(RefDataError::invalid_descriptor(format!(
            "csv parameter '{name}' must be a single ASCII character, got '{s}'"
        ))),
    }
}

/// Loader for delimited-text files.
///
/// Rules:
///
/// - With a header row, requested columns are located by name in the header (order can differ
///   from the schema). A requested column missing from the header fails the read before any row
///   is produced.
/// - Without a header row, requested columns are located by their position in the schema.
/// - String columns keep the field exactly as read. Typed columns (int, float, bool) are trimmed
///   and parsed; an empty typed field becomes [`Value::Null`].
/// - Fields missing from a short record are [`Value::Null`] whatever the dtype.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    options: CsvOptions,
    schema: ColumnSchema,
}

impl CsvLoader {
    pub fn new(options: CsvOptions, schema: ColumnSchema) -> Self {
        Self { options, schema }
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    fn column_positions<R: std::io::Read>(
        &self,
        rdr: &mut csv::Reader<R>,
        columns: &[&str],
    ) -> RefDataResult<Vec<usize>> {
        if self.options.has_header {
            let headers = rdr.headers()?.clone();
            columns
                .iter()
                .map(|column| {
                    headers.iter().position(|h| h.trim() == *column).ok_or_else(|| {
                        RefDataError::SchemaMismatch {
                            column: column.to_string(),
                            message: format!(
                                "not found in file header. headers={:?}",
                                headers.iter().collect::<Vec<_>>()
                            ),
                        }
                    })
                })
                .collect()
        } else {
            columns
                .iter()
                .map(|column| {
                    self.schema.index_of(column).ok_or_else(|| RefDataError::SchemaMismatch {
                        column: column.to_string(),
                        message: "not declared in the dataset schema".to_string(),
                    })
                })
                .collect()
        }
    }
}

impl FormatLoader for CsvLoader {
    fn read(&self, stream: &mut dyn BufRead, columns: &[&str]) -> RefDataResult<Vec<Row>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .flexible(true)
            .from_reader(stream);

        let positions = self.column_positions(&mut rdr, columns)?;
        let dtypes: Vec<DataType> = columns
            .iter()
            .map(|c| self.schema.get(c).map(|c| c.dtype).unwrap_or_default())
            .collect();
        // 1-based line numbers for users; the header occupies line 1 when present.
        let first_row = if self.options.has_header { 2 } else { 1 };

        let mut rows: Vec<Row> = Vec::new();
        for (row_idx0, result) in rdr.records().enumerate() {
            let user_row = row_idx0 + first_row;
            let record = result?;

            let mut row: Row = Vec::with_capacity(columns.len());
            for ((column, &pos), dtype) in columns.iter().zip(&positions).zip(&dtypes) {
                let value = match record.get(pos) {
                    Some(raw) => parse_typed_value(user_row, column, dtype, raw)?,
                    None => Value::Null,
                };
                row.push(value);
            }
            rows.push(row);
        }

        Ok(rows)
    }
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: &DataType,
    raw: &str,
) -> RefDataResult<Value> {
    // String fields are kept byte for byte, including padding and empty quoted values.
    if *data_type == DataType::Utf8 {
        return Ok(Value::Utf8(raw.to_owned()));
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_error = |message: String| RefDataError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(raw.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_error),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::CsvOptions;

    #[test]
    fn options_default_to_comma_with_header() {
        let opts = CsvOptions::from_parameters(&serde_json::Map::new()).unwrap();
        assert_eq!(opts, CsvOptions::default());
    }

    #[test]
    fn options_accept_escaped_tab_and_no_header() {
        let params = json!({"delim": "\\t", "quotechar": "'", "header": false});
        let opts = CsvOptions::from_parameters(params.as_object().unwrap()).unwrap();
        assert_eq!(opts.delimiter, b'\t');
        assert_eq!(opts.quote, b'\'');
        assert!(!opts.has_header);
    }

    #[test]
    fn options_reject_multi_character_delimiter() {
        let params = json!({"delim": "::"});
        let err = CsvOptions::from_parameters(params.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("single ASCII character"));
    }

    #[test]
    fn options_reject_non_bool_header() {
        let params = json!({"header": "yes"});
        let err = CsvOptions::from_parameters(params.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("'header' must be a bool"));
    }
}
