//! Per-file state machine.
//!
//! ```text
//! read ──ok──▶ converted ──▶ move to processed (best effort) ──▶ write JSON ──▶ Successful | WriteFault
//!   └──err──▶ ErrorReadingFile ──▶ move to error ──▶ MovedToError | ErrorMovingToTmp
//! ```
//!
//! Each stage consumes a [`ConversionRecord`] and returns a new one. No stage
//! returns an error: failures are logged and become the record's status, so
//! one bad file never affects its siblings.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use rayon::prelude::*;

use super::fsops::{move_into, write_text};
use super::record::ConversionRecord;
use super::settings::WorkLayout;
use super::status::ProgressStatus;
use crate::convert::Converter;
use crate::mat::ContainerReader;

/// Final status of every file of one batch, keyed by source path
pub type BatchReport = HashMap<String, ProgressStatus>;

/// Outcome of the relocation stage
#[derive(Debug)]
enum Relocated {
    /// Unreadable file; its status is terminal
    Finished(ConversionRecord),
    /// Converted file, ready for the JSON write
    Converted(ConversionRecord),
}

/// Runs files through read, convert, relocate and write
pub struct FilePipeline<R> {
    reader: R,
    converter: Converter,
    layout: WorkLayout,
}

impl<R: ContainerReader> FilePipeline<R> {
    /// Create a pipeline over the given reader, converter and directories
    pub fn new(reader: R, converter: Converter, layout: WorkLayout) -> Self {
        Self {
            reader,
            converter,
            layout,
        }
    }

    /// Working directories
    pub fn layout(&self) -> &WorkLayout {
        &self.layout
    }

    /// Process one file to a terminal status
    pub fn process(&self, path: &Path) -> ConversionRecord {
        let record = self.read(path);
        match self.relocate(record) {
            Relocated::Finished(record) => record,
            Relocated::Converted(record) => self.write_json(record),
        }
    }

    /// Process the files of one batch concurrently, in no particular order
    pub fn process_batch(&self, files: &[PathBuf]) -> BatchReport {
        files
            .par_iter()
            .map(|path| self.process(path))
            .map(|record| (record.key(), record.status()))
            .collect()
    }

    /// Read and convert; a failure produces a record without JSON
    fn read(&self, path: &Path) -> ConversionRecord {
        match self.reader.read_entries(path) {
            Ok(entries) => {
                debug!("Read {} variables from {}", entries.len(), path.display());
                ConversionRecord::converted(path, self.converter.convert(&entries))
            }
            Err(e) => {
                error!(
                    "Error while reading and converting MAT file {}: {}",
                    path.display(),
                    e
                );
                ConversionRecord::read_failed(path)
            }
        }
    }

    fn relocate(&self, record: ConversionRecord) -> Relocated {
        if record.json().is_none() {
            return Relocated::Finished(self.move_to_error(record));
        }
        self.move_to_processed(&record);
        Relocated::Converted(record)
    }

    fn move_to_error(&self, record: ConversionRecord) -> ConversionRecord {
        let error_dir = self.layout.error_dir();
        match move_into(record.path(), &error_dir) {
            Ok(moved) => {
                debug!("Moved {} to {}", record.path().display(), moved.display());
                record.with_status(ProgressStatus::MovedToError)
            }
            Err(e) => {
                error!(
                    "Can't move file from {} to {}: {}",
                    record.path().display(),
                    error_dir.display(),
                    e
                );
                record.with_status(ProgressStatus::ErrorMovingToTmp)
            }
        }
    }

    /// Best effort: a failed move is logged and does not change the status
    fn move_to_processed(&self, record: &ConversionRecord) {
        let processed_dir = self.layout.processed_dir();
        if let Err(e) = move_into(record.path(), &processed_dir) {
            warn!(
                "Can't move file from {} to {}: {}",
                record.path().display(),
                processed_dir.display(),
                e
            );
        }
    }

    fn write_json(&self, record: ConversionRecord) -> ConversionRecord {
        let Some(target) = json_path(&self.layout.target_dir, record.path()) else {
            error!("Can't derive a JSON file name for {}", record.path().display());
            return record.with_status(ProgressStatus::WriteFault);
        };

        let written = match record.json() {
            Some(json) => write_text(&target, json),
            None => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "record carries no converted JSON",
            )),
        };
        match written {
            Ok(()) => {
                debug!("Wrote {}", target.display());
                record.with_status(ProgressStatus::Successful)
            }
            Err(e) => {
                error!("Can't write to file {}: {}", target.display(), e);
                record.with_status(ProgressStatus::WriteFault)
            }
        }
    }
}

/// `<target_dir>/<file stem>.json`
pub fn json_path(target_dir: &Path, source: &Path) -> Option<PathBuf> {
    let stem = source.file_stem()?;
    let mut name = stem.to_os_string();
    name.push(".json");
    Some(target_dir.join(name))
}
