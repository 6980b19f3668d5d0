use std::fmt;

/// Progress of one source file through the pipeline.
///
/// Every status except [`ProgressStatus::InProgress`] is terminal: once a
/// record carries it, no later stage touches that file again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProgressStatus {
    /// Converted, awaiting relocation and JSON write
    InProgress,
    /// The container could not be opened or decoded
    ErrorReadingFile,
    /// Unreadable file moved to the `error` folder
    MovedToError,
    /// Unreadable file that could not be moved to the `error` folder
    ErrorMovingToTmp,
    /// JSON written
    Successful,
    /// Converted, but the JSON file could not be written
    WriteFault,
}

impl ProgressStatus {
    /// All statuses, in pipeline order
    pub const ALL: [ProgressStatus; 6] = [
        ProgressStatus::InProgress,
        ProgressStatus::ErrorReadingFile,
        ProgressStatus::MovedToError,
        ProgressStatus::ErrorMovingToTmp,
        ProgressStatus::Successful,
        ProgressStatus::WriteFault,
    ];

    /// Whether no later stage changes this status
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressStatus::InProgress)
    }

    /// Whether the file ended in a failure state
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ProgressStatus::ErrorReadingFile
                | ProgressStatus::MovedToError
                | ProgressStatus::ErrorMovingToTmp
                | ProgressStatus::WriteFault
        )
    }

    /// Text used in the run report
    pub fn label(&self) -> &'static str {
        match self {
            ProgressStatus::InProgress => "In progress",
            ProgressStatus::ErrorReadingFile => "Error reading MAT file",
            ProgressStatus::MovedToError => "Moved to tmp",
            ProgressStatus::ErrorMovingToTmp => "Error move to tmp",
            ProgressStatus::Successful => "Successfully",
            ProgressStatus::WriteFault => "Fault",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
