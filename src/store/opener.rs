//! Opening data files as buffered text streams.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::descriptor::Compression;
use crate::error::{RefDataError, RefDataResult};

/// A forward-only stream over one data file, owned by a single load.
pub type DataStream = Box<dyn BufRead + Send>;

/// Opens data files for reading.
///
/// The returned stream is released when it is dropped; callers keep it in a local binding so that
/// every exit path (success, loader error, unwind) closes the underlying file.
pub trait StreamOpener: Send + Sync {
    fn open(&self, path: &Path, compression: Compression) -> RefDataResult<DataStream>;
}

/// Default opener reading from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOpener;

impl StreamOpener for FileOpener {
    fn open(&self, path: &Path, compression: Compression) -> RefDataResult<DataStream> {
        let file = File::open(path).map_err(|e| RefDataError::io(path, e))?;
        debug!(path = %path.display(), ?compression, "opened data file");
        Ok(match compression {
            Compression::None => Box::new(BufReader::new(file)),
            // Multi-member aware: concatenated gzip files decode as one stream.
            Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        })
    }
}
