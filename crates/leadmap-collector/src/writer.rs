//! Persisting run reports as pretty-printed JSON files.

use std::path::{Path, PathBuf};

use leadmap_core::{file_slug, RunReport};

use crate::error::ReportError;

/// Output file name for a sector collected in `city`, e.g.
/// `("Clínicas", "Huancayo")` -> `clinicas_huancayo.json`.
#[must_use]
pub fn report_filename(sector: &str, city: &str) -> String {
    format!("{}_{}.json", file_slug(sector), file_slug(city))
}

/// Write `report` to `dir/file_name`, creating `dir` if needed. An existing
/// file is overwritten.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if the directory cannot be created or the file
/// cannot be written, and [`ReportError::Serialize`] if the report cannot be
/// encoded.
pub fn write_report(
    dir: &Path,
    file_name: &str,
    report: &RunReport,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let path = dir.join(file_name);
    let body = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, body).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        total = report.meta.total_results,
        "report written"
    );
    Ok(path)
}

/// Receives partial reports while a multi-query run is still going.
pub trait SnapshotSink: Send {
    /// # Errors
    ///
    /// Returns a [`ReportError`] if the snapshot could not be persisted. The
    /// pipeline logs it and keeps collecting.
    fn write_snapshot(&mut self, report: &RunReport) -> Result<(), ReportError>;
}

/// Snapshot sink that overwrites the run's final report file, so a crash
/// mid-run leaves the last complete query's results on disk.
#[derive(Debug, Clone)]
pub struct FileSnapshotSink {
    dir: PathBuf,
    file_name: String,
}

impl FileSnapshotSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

impl SnapshotSink for FileSnapshotSink {
    fn write_snapshot(&mut self, report: &RunReport) -> Result<(), ReportError> {
        write_report(&self.dir, &self.file_name, report).map(|_| ())
    }
}
