//! Format-specific loaders.
//!
//! Every loader implements [`FormatLoader`]: it consumes one already opened text stream, top to
//! bottom, and returns one [`Row`] per source record with fields aligned to the requested columns.
//!
//! [`DatasetLoader`] is the closed set of loaders a dataset handle can bind. It is selected once
//! from the [`FormatDescriptor`] and then dispatches by `match`:
//!
//! - [`csv::CsvLoader`]: strict. A requested column missing from the file header is an error.
//! - [`json::JsonLoader`]: tolerant. A record missing a requested key yields
//!   [`crate::types::Value::Null`].

pub mod csv;
pub mod json;

use std::io::BufRead;

use tracing::debug;

use crate::descriptor::{ColumnSchema, FormatDescriptor, FormatKind};
use crate::error::RefDataResult;
use crate::types::Row;

pub use self::csv::{CsvLoader, CsvOptions};
pub use self::json::{JsonLoader, JsonOptions};

/// Shared read contract of all format loaders.
pub trait FormatLoader {
    /// Read all records from `stream`, projecting each onto `columns` (in that order).
    ///
    /// The stream is consumed sequentially and exactly once. Row order follows the source.
    fn read(&self, stream: &mut dyn BufRead, columns: &[&str]) -> RefDataResult<Vec<Row>>;
}

/// The loader bound to a dataset handle.
#[derive(Debug, Clone)]
pub enum DatasetLoader {
    Csv(CsvLoader),
    Json(JsonLoader),
}

impl DatasetLoader {
    /// Instantiate the loader for a format descriptor.
    ///
    /// The CSV loader receives the full column schema (header-less files are addressed by schema
    /// position, and fields are typed by the declared dtype); the JSON loader looks fields up by
    /// key and only needs the format parameters.
    pub fn for_format(format: &FormatDescriptor, schema: &ColumnSchema) -> RefDataResult<Self> {
        let loader = match format.kind() {
            FormatKind::Csv => Self::Csv(CsvLoader::new(
                CsvOptions::from_parameters(format.parameters())?,
                schema.clone(),
            )),
            FormatKind::Json => Self::Json(JsonLoader::new(JsonOptions::from_parameters(
                format.parameters(),
            )?)),
        };
        debug!(format = %format.kind(), "selected dataset loader");
        Ok(loader)
    }

    pub fn kind(&self) -> FormatKind {
        match self {
            Self::Csv(_) => FormatKind::Csv,
            Self::Json(_) => FormatKind::Json,
        }
    }
}

impl FormatLoader for DatasetLoader {
    fn read(&self, stream: &mut dyn BufRead, columns: &[&str]) -> RefDataResult<Vec<Row>> {
        match self {
            Self::Csv(loader) => loader.read(stream, columns),
            Self::Json(loader) => loader.read(stream, columns),
        }
    }
}
