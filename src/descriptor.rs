//! Dataset descriptors.
//!
//! A descriptor document is the metadata an external catalog hands over together with the path of
//! the downloaded data file. It declares the dataset's columns, the on-disk format and the
//! compression of the payload:
//!
//! ```json
//! {
//!   "id": "cities",
//!   "name": "U.S. Cities",
//!   "compression": "gzip",
//!   "schema": [{"id": "city"}, {"id": "state", "dtype": "str"}],
//!   "format": {"type": "csv", "parameters": {"delim": ",", "header": true}}
//! }
//! ```
//!
//! Parsing is strict: unknown format kinds, unsupported compression tags, duplicate column
//! identifiers and unknown dtypes are rejected here, before any data file is touched.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{RefDataError, RefDataResult};
use crate::types::DataType;

/// Closed set of supported on-disk encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Delimited text (CSV, TSV, ...).
    Csv,
    /// Record-oriented JSON (array of objects, nested record list, or NDJSON).
    Json,
}

impl FormatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Csv => "csv",
            FormatKind::Json => "json",
        }
    }
}

impl FromStr for FormatKind {
    type Err = RefDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" | "tsv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(RefDataError::InvalidFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared compression of the data file. Never sniffed from file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl FromStr for Compression {
    type Err = RefDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "gzip" | "gz" => Ok(Self::Gzip),
            _ => Err(RefDataError::UnsupportedCompression {
                compression: s.to_string(),
            }),
        }
    }
}

/// On-disk encoding of a dataset: format kind, format-specific parameters and compression.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatDescriptor {
    kind: FormatKind,
    compression: Compression,
    parameters: Map<String, JsonValue>,
}

impl FormatDescriptor {
    pub fn new(
        kind: FormatKind,
        compression: Compression,
        parameters: Map<String, JsonValue>,
    ) -> Self {
        Self {
            kind,
            compression,
            parameters,
        }
    }

    pub fn kind(&self) -> FormatKind {
        self.kind
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Format-specific options, e.g. `delim` for CSV or `recordPath` for JSON.
    pub fn parameters(&self) -> &Map<String, JsonValue> {
        &self.parameters
    }
}

/// A single declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Unique column identifier used in projections.
    pub identifier: String,
    /// Display name (defaults to the identifier).
    pub name: String,
    pub description: Option<String>,
    pub dtype: DataType,
}

impl Column {
    pub fn new(identifier: impl Into<String>, dtype: DataType) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.clone(),
            identifier,
            description: None,
            dtype,
        }
    }
}

/// Ordered set of declared columns. Identifiers never repeat.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSchema {
    columns: Vec<Column>,
}

impl ColumnSchema {
    /// Build a schema, rejecting duplicate identifiers.
    pub fn new(columns: Vec<Column>) -> RefDataResult<Self> {
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|c| c.identifier == column.identifier) {
                return Err(RefDataError::invalid_descriptor(format!(
                    "duplicate column identifier '{}'",
                    column.identifier
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate column identifiers in declared order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.identifier.as_str())
    }

    /// Returns the position of a column identifier, if declared.
    pub fn index_of(&self, identifier: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.identifier == identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.identifier == identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index_of(identifier).is_some()
    }
}

/// Parsed dataset descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDescriptor {
    pub identifier: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub checksum: Option<String>,
    format: FormatDescriptor,
    schema: ColumnSchema,
}

#[derive(Debug, Deserialize)]
struct DescriptorDoc {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    checksum: Option<String>,
    #[serde(default)]
    compression: Option<String>,
    #[serde(default)]
    schema: Vec<ColumnDoc>,
    format: FormatDoc,
}

#[derive(Debug, Deserialize)]
struct ColumnDoc {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    dtype: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FormatDoc {
    #[serde(rename = "type")]
    format_type: String,
    #[serde(default)]
    parameters: Map<String, JsonValue>,
}

impl DatasetDescriptor {
    pub fn new(
        identifier: impl Into<String>,
        format: FormatDescriptor,
        schema: ColumnSchema,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: None,
            description: None,
            url: None,
            checksum: None,
            format,
            schema,
        }
    }

    /// Parse a descriptor from its JSON document.
    pub fn from_value(doc: &JsonValue) -> RefDataResult<Self> {
        let doc = DescriptorDoc::deserialize(doc)?;
        Self::from_doc(doc)
    }

    pub fn from_json_str(input: &str) -> RefDataResult<Self> {
        let doc: DescriptorDoc = serde_json::from_str(input)?;
        Self::from_doc(doc)
    }

    /// Read and parse a descriptor file.
    pub fn from_path(path: impl AsRef<Path>) -> RefDataResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| RefDataError::io(path, e))?;
        Self::from_json_str(&text)
    }

    fn from_doc(doc: DescriptorDoc) -> RefDataResult<Self> {
        let kind = doc.format.format_type.parse::<FormatKind>()?;
        let compression = match doc.compression.as_deref() {
            Some(tag) => tag.parse::<Compression>()?,
            None => Compression::None,
        };

        let mut columns = Vec::with_capacity(doc.schema.len());
        for c in doc.schema {
            let dtype = match c.dtype.as_deref() {
                Some(tag) => DataType::from_tag(tag)?,
                None => DataType::Utf8,
            };
            columns.push(Column {
                name: c.name.unwrap_or_else(|| c.id.clone()),
                identifier: c.id,
                description: c.description,
                dtype,
            });
        }

        Ok(Self {
            identifier: doc.id,
            name: doc.name,
            description: doc.description,
            url: doc.url,
            checksum: doc.checksum,
            format: FormatDescriptor::new(kind, compression, doc.format.parameters),
            schema: ColumnSchema::new(columns)?,
        })
    }

    pub fn format(&self) -> &FormatDescriptor {
        &self.format
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn compression(&self) -> Compression {
        self.format.compression
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Compression, DatasetDescriptor, FormatKind};
    use crate::error::RefDataError;
    use crate::types::DataType;

    fn cities_doc() -> serde_json::Value {
        json!({
            "id": "cities",
            "name": "U.S. Cities",
            "url": "http://example.org/cities.csv.gz",
            "compression": "gzip",
            "schema": [
                {"id": "city", "name": "City"},
                {"id": "state", "dtype": "str"},
                {"id": "pop", "dtype": "int"}
            ],
            "format": {"type": "csv", "parameters": {"delim": "\t"}}
        })
    }

    #[test]
    fn parses_full_document() {
        let d = DatasetDescriptor::from_value(&cities_doc()).unwrap();
        assert_eq!(d.identifier, "cities");
        assert_eq!(d.name.as_deref(), Some("U.S. Cities"));
        assert_eq!(d.compression(), Compression::Gzip);
        assert_eq!(d.format().kind(), FormatKind::Csv);
        assert_eq!(d.format().parameters()["delim"], json!("\t"));
        assert_eq!(d.schema().identifiers().collect::<Vec<_>>(), vec!["city", "state", "pop"]);
        assert_eq!(d.schema().get("city").unwrap().name, "City");
        assert_eq!(d.schema().get("state").unwrap().name, "state");
        assert_eq!(d.schema().get("pop").unwrap().dtype, DataType::Int64);
    }

    #[test]
    fn missing_compression_means_none() {
        let mut doc = cities_doc();
        doc.as_object_mut().unwrap().remove("compression");
        let d = DatasetDescriptor::from_value(&doc).unwrap();
        assert_eq!(d.compression(), Compression::None);
    }

    #[test]
    fn rejects_unknown_format_kind() {
        let mut doc = cities_doc();
        doc["format"]["type"] = json!("xml");
        let err = DatasetDescriptor::from_value(&doc).unwrap_err();
        assert!(matches!(err, RefDataError::InvalidFormat { ref format } if format == "xml"));
    }

    #[test]
    fn rejects_unsupported_compression() {
        let mut doc = cities_doc();
        doc["compression"] = json!("bz2");
        let err = DatasetDescriptor::from_value(&doc).unwrap_err();
        assert!(matches!(err, RefDataError::UnsupportedCompression { .. }));
        assert!(err.to_string().contains("'bz2'"));
    }

    #[test]
    fn rejects_duplicate_column_identifiers() {
        let mut doc = cities_doc();
        doc["schema"] = json!([{"id": "city"}, {"id": "city"}]);
        let err = DatasetDescriptor::from_value(&doc).unwrap_err();
        assert!(err.to_string().contains("duplicate column identifier 'city'"));
    }

    #[test]
    fn rejects_document_without_format() {
        let err = DatasetDescriptor::from_json_str(r#"{"id": "x", "schema": []}"#).unwrap_err();
        assert!(matches!(err, RefDataError::Json(_)));
    }
}
