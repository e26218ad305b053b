//! Handle for one downloaded dataset.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::descriptor::DatasetDescriptor;
use crate::error::{RefDataError, RefDataResult};
use crate::loader::{DatasetLoader, FormatLoader};
use crate::types::{Row, Table};

use super::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats};
use super::opener::{FileOpener, StreamOpener};

/// Options controlling load reporting.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

/// Handle for a dataset in the local data store.
///
/// Binds a descriptor, the path of the downloaded data file, and the loader for the descriptor's
/// format. The loader is selected once, at construction; the handle is immutable afterwards and
/// holds no read position, so one handle can serve concurrent loads from several threads.
pub struct DatasetHandle {
    descriptor: DatasetDescriptor,
    datafile: PathBuf,
    loader: DatasetLoader,
    opener: Arc<dyn StreamOpener>,
    options: LoadOptions,
}

impl fmt::Debug for DatasetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetHandle")
            .field("dataset", &self.descriptor.identifier)
            .field("datafile", &self.datafile)
            .field("format", &self.loader.kind())
            .field("compression", &self.descriptor.compression())
            .field("options", &self.options)
            .finish()
    }
}

impl DatasetHandle {
    /// Create a handle for `datafile`, instantiating the loader for the descriptor's format.
    ///
    /// Does not touch the file system.
    pub fn new(descriptor: DatasetDescriptor, datafile: impl Into<PathBuf>) -> RefDataResult<Self> {
        let loader = DatasetLoader::for_format(descriptor.format(), descriptor.schema())?;
        Ok(Self {
            descriptor,
            datafile: datafile.into(),
            loader,
            opener: Arc::new(FileOpener),
            options: LoadOptions::default(),
        })
    }

    /// Create a handle from a descriptor document.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use refdata_store::store::DatasetHandle;
    ///
    /// # fn main() -> Result<(), refdata_store::RefDataError> {
    /// let doc = serde_json::json!({
    ///     "id": "cities",
    ///     "compression": "gzip",
    ///     "schema": [{"id": "city"}, {"id": "state"}],
    ///     "format": {"type": "csv"}
    /// });
    /// let handle = DatasetHandle::from_document(&doc, "data/cities.csv.gz")?;
    /// let table = handle.load_table(None)?;
    /// println!("shape={:?}", table.shape());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_document(
        doc: &serde_json::Value,
        datafile: impl Into<PathBuf>,
    ) -> RefDataResult<Self> {
        Self::new(DatasetDescriptor::from_value(doc)?, datafile)
    }

    /// Replace the stream opener (the default reads from the local file system).
    pub fn with_opener(mut self, opener: Arc<dyn StreamOpener>) -> Self {
        self.opener = opener;
        self
    }

    /// Attach load options (observer and alert threshold).
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn descriptor(&self) -> &DatasetDescriptor {
        &self.descriptor
    }

    pub fn datafile(&self) -> &Path {
        &self.datafile
    }

    pub fn loader(&self) -> &DatasetLoader {
        &self.loader
    }

    /// Load the given columns from the data file.
    ///
    /// Every column must be declared in the dataset schema; an undeclared identifier fails with
    /// [`RefDataError::SchemaMismatch`] before the file is opened. Each call opens the file once,
    /// reads it from the start, and closes it before returning, whether the read succeeded or not.
    pub fn load<S: AsRef<str>>(&self, columns: &[S]) -> RefDataResult<Vec<Row>> {
        let columns: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
        let result = self.load_columns(&columns);
        self.report(&result, columns.len());
        result
    }

    /// Load columns as a labeled [`Table`].
    ///
    /// If `columns` is `None`, all columns of the dataset schema are loaded in declared order.
    pub fn load_table(&self, columns: Option<&[&str]>) -> RefDataResult<Table> {
        let columns: Vec<&str> = match columns {
            Some(columns) => columns.to_vec(),
            None => self.descriptor.schema().identifiers().collect(),
        };
        let rows = self.load(&columns)?;
        Ok(Table::new(
            columns.into_iter().map(str::to_owned).collect(),
            rows,
        ))
    }

    fn load_columns(&self, columns: &[&str]) -> RefDataResult<Vec<Row>> {
        let schema = self.descriptor.schema();
        if let Some(column) = columns.iter().find(|c| !schema.contains(c)) {
            return Err(RefDataError::SchemaMismatch {
                column: column.to_string(),
                message: format!(
                    "not declared in the schema of dataset '{}'",
                    self.descriptor.identifier
                ),
            });
        }

        let mut stream = self.opener.open(&self.datafile, self.descriptor.compression())?;
        let rows = self.loader.read(&mut stream, columns);
        drop(stream);
        debug!(path = %self.datafile.display(), "closed data file");
        rows
    }

    fn report(&self, result: &RefDataResult<Vec<Row>>, columns: usize) {
        let Some(obs) = self.options.observer.as_ref() else {
            return;
        };
        let ctx = LoadContext {
            dataset: self.descriptor.identifier.clone(),
            path: self.datafile.clone(),
            format: self.loader.kind(),
        };
        match result {
            Ok(rows) => obs.on_success(
                &ctx,
                LoadStats {
                    rows: rows.len(),
                    columns,
                },
            ),
            Err(e) => {
                let sev = LoadSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= self.options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }
}
