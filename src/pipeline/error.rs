/// Errors that stop a run before or after the per-file work.
///
/// Failures of individual files are never reported through this type; they
/// end up as a [`ProgressStatus`](super::ProgressStatus) in the run summary.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The source path does not exist or cannot be listed
    #[error("Cannot read source {path}: {source}")]
    SourceUnreadable {
        /// Configured source path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A working or output directory could not be created
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be started
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Two batches reported the same file under the `fail` collision policy
    #[error("File reported by more than one batch: {0}")]
    DuplicateResult(String),
}
