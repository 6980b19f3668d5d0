use std::path::{Path, PathBuf};

use super::status::ProgressStatus;

/// Immutable per-file result threaded through the pipeline stages.
///
/// Stages never mutate a record in place; each one consumes the record it was
/// given and returns a new one, so records can cross worker threads freely.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRecord {
    path: PathBuf,
    json: Option<String>,
    status: ProgressStatus,
}

impl ConversionRecord {
    /// Record for a file whose conversion succeeded
    pub fn converted(path: impl Into<PathBuf>, json: String) -> Self {
        Self {
            path: path.into(),
            json: Some(json),
            status: ProgressStatus::InProgress,
        }
    }

    /// Record for a file that could not be read; carries no JSON
    pub fn read_failed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            json: None,
            status: ProgressStatus::ErrorReadingFile,
        }
    }

    /// Same record with a new status
    pub fn with_status(self, status: ProgressStatus) -> Self {
        Self { status, ..self }
    }

    /// Source file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Converted JSON text, absent when reading failed
    pub fn json(&self) -> Option<&str> {
        self.json.as_deref()
    }

    /// Current status
    pub fn status(&self) -> ProgressStatus {
        self.status
    }

    /// Key identifying this file in reports
    pub fn key(&self) -> String {
        self.path.display().to_string()
    }
}
