//! `refdata-store` is the data-access layer of a reference-data repository: given a downloaded
//! dataset file and its descriptor, it returns the requested columns as rows, or as a labeled
//! [`types::Table`].
//!
//! The primary entrypoint is [`store::DatasetHandle`]. A handle is built once per dataset from a
//! [`descriptor::DatasetDescriptor`] and the resolved path of the data file; it selects the
//! format loader at construction and re-reads the file on every load.
//!
//! ## What you can load
//!
//! **Formats (declared by the descriptor's `format.type`):**
//!
//! - **CSV** (`csv`, `tsv`): delimiter, quote character and header presence come from
//!   `format.parameters` (`delim`, `quotechar`, `header`).
//! - **JSON** (`json`): an array of records, a document with the records at `recordPath`, or
//!   newline-delimited records. Fields are looked up by key (or by the dot path given in
//!   `references`).
//!
//! **Compression (declared by the descriptor's `compression`):** `none` or `gzip`.
//!
//! **Missing data:** the CSV loader is strict about columns (a requested column absent from the
//! header is a [`RefDataError::SchemaMismatch`]); the JSON loader is tolerant about records (a
//! record without a requested key yields [`types::Value::Null`]). In both cases every requested
//! column must be declared in the descriptor's schema.
//!
//! ## Quick example
//!
//! ```no_run
//! use refdata_store::descriptor::DatasetDescriptor;
//! use refdata_store::store::DatasetHandle;
//!
//! # fn main() -> Result<(), refdata_store::RefDataError> {
//! let descriptor = DatasetDescriptor::from_json_str(
//!     r#"{
//!         "id": "cities",
//!         "schema": [{"id": "city"}, {"id": "state"}],
//!         "format": {"type": "csv", "parameters": {"delim": ","}}
//!     }"#,
//! )?;
//! let handle = DatasetHandle::new(descriptor, "cities.csv")?;
//!
//! // Rows aligned to the requested columns.
//! let rows = handle.load(&["state", "city"])?;
//! println!("rows={}", rows.len());
//!
//! // All declared columns, as a table (and as a polars DataFrame).
//! let table = handle.load_table(None)?;
//! println!("{}", table.to_dataframe()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`descriptor`]: dataset descriptors (format, compression, column schema)
//! - [`loader`]: the CSV and JSON format loaders
//! - [`store`]: dataset handles, stream opening, and load observers
//! - [`types`]: values, rows and tables
//! - [`error`]: the error type shared across the crate

pub mod descriptor;
pub mod error;
pub mod loader;
pub mod store;
pub mod types;

pub use error::{RefDataError, RefDataResult};
