//! Load outcome reporting.
//!
//! A [`DatasetHandle`](super::DatasetHandle) reports every load to an optional [`LoadObserver`].
//! [`TracingObserver`] turns those reports into `tracing` events; callers that need metrics or
//! alert routing implement the trait themselves.

use std::path::PathBuf;

use crate::descriptor::FormatKind;
use crate::error::RefDataError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the load failed).
    Error,
    /// Critical error (file system or decompression failures).
    Critical,
}

impl LoadSeverity {
    /// Classify a load failure.
    pub fn for_error(error: &RefDataError) -> Self {
        if error.is_io() {
            LoadSeverity::Critical
        } else {
            LoadSeverity::Error
        }
    }
}

/// Context about one load attempt.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// Identifier of the dataset descriptor.
    pub dataset: String,
    /// The data file being read.
    pub path: PathBuf,
    /// Format of the data file.
    pub format: FormatKind,
}

/// Minimal stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of loaded rows.
    pub rows: usize,
    /// Number of projected columns.
    pub columns: usize,
}

/// Receives the outcome of each [`DatasetHandle::load`](super::DatasetHandle::load) call.
///
/// Every method has a no-op default, so an implementation only overrides what it needs.
pub trait LoadObserver: Send + Sync {
    /// Called when a load succeeds.
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called when a load fails.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &RefDataError) {}

    /// Called, after [`Self::on_failure`], when the failure's severity reaches
    /// [`LoadOptions::alert_at_or_above`](super::LoadOptions::alert_at_or_above).
    ///
    /// Defaults to doing nothing more.
    fn on_alert(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &RefDataError) {}
}

/// Forwards load events to `tracing` (`info` on success, `warn` on failure, `error` on alerts).
#[derive(Debug, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        tracing::info!(
            dataset = %ctx.dataset,
            format = %ctx.format,
            path = %ctx.path.display(),
            rows = stats.rows,
            columns = stats.columns,
            "dataset loaded"
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &RefDataError) {
        tracing::warn!(
            dataset = %ctx.dataset,
            format = %ctx.format,
            path = %ctx.path.display(),
            ?severity,
            "dataset load failed: {error}"
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &RefDataError) {
        tracing::error!(
            dataset = %ctx.dataset,
            format = %ctx.format,
            path = %ctx.path.display(),
            ?severity,
            "dataset load alert: {error}"
        );
    }
}
