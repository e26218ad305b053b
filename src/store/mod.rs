//! Local data store access.
//!
//! Most callers should construct a [`DatasetHandle`] from a descriptor and the path of the
//! downloaded file, then call [`DatasetHandle::load`] or [`DatasetHandle::load_table`]:
//!
//! - the projection is checked against the declared schema
//! - the file is opened via a [`StreamOpener`] (plain or gzip, as declared)
//! - the bound loader reads the stream, and the stream is closed before the call returns
//! - success/failure/alerts are optionally reported to a [`LoadObserver`]

pub mod dataset;
pub mod observability;
pub mod opener;

pub use dataset::{DatasetHandle, LoadOptions};
pub use observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats, TracingObserver};
pub use opener::{DataStream, FileOpener, StreamOpener};
