use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for descriptor parsing and dataset loads.
pub type RefDataResult<T> = Result<T, RefDataError>;

/// Error type returned by descriptor parsing, handle construction and loads.
///
/// This is a single error enum shared across the CSV and JSON loaders.
#[derive(Debug, Error)]
pub enum RefDataError {
    /// The data file could not be opened (e.g. file not found, permission denied).
    #[error("io error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from an already opened stream failed (truncated or corrupt gzip, invalid UTF-8).
    #[error("io error while reading stream: {0}")]
    Stream(#[from] std::io::Error),

    /// CSV decoding error (includes I/O errors raised while the CSV reader pulls from the stream).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error, either in a descriptor document or in a record-oriented data file.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Conversion of a loaded table into a polars `DataFrame` failed (e.g. repeated labels).
    #[error("dataframe error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// The descriptor declares a format kind that has no loader.
    #[error("invalid format: unknown format '{format}'")]
    InvalidFormat { format: String },

    /// The descriptor declares a compression scheme other than `none` / `gzip`.
    #[error("unsupported compression '{compression}'")]
    UnsupportedCompression { compression: String },

    /// The descriptor document is structurally invalid (duplicate column, bad parameter, ...).
    #[error("invalid descriptor: {message}")]
    InvalidDescriptor { message: String },

    /// A requested column is not declared in the schema or not present in the file header.
    #[error("schema mismatch for column '{column}': {message}")]
    SchemaMismatch { column: String, message: String },

    /// A value could not be parsed into the declared [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A record-oriented data file has no record list where one is expected.
    #[error("malformed document: {message}")]
    MalformedDocument { message: String },

    /// A record-oriented data file contains an entry that is not a record.
    #[error("malformed record {row}: {message}")]
    MalformedRecord { row: usize, message: String },
}

impl RefDataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_descriptor(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            message: message.into(),
        }
    }

    /// Returns `true` if the error originates from the file system or the decompressor.
    pub fn is_io(&self) -> bool {
        match self {
            Self::Io { .. } | Self::Stream(_) => true,
            Self::Csv(err) => matches!(err.kind(), csv::ErrorKind::Io(_)),
            Self::Json(err) => err.is_io(),
            _ => false,
        }
    }
}
