//! # Batch Conversion Pipeline
//!
//! Drives a directory of MAT-files through reading, conversion, relocation
//! and JSON output.
//!
//! ## Flow
//!
//! 1. [`list_source_files`] collects the input files
//! 2. [`BatchScheduler`] splits them into batches and runs the batches on a
//!    bounded rayon pool
//! 3. [`FilePipeline`] takes each file to a terminal [`ProgressStatus`]
//! 4. [`ResultAggregator`] merges the per-batch reports into a [`RunSummary`]
//!
//! Files that fail never abort the run; only setup problems (an unreadable
//! source, a directory that cannot be created, a pool that cannot start)
//! surface as [`PipelineError`].
//!
//! ## Directory Layout
//!
//! ```text
//! <tmp>/error/       unreadable sources
//! <tmp>/processed/   converted sources
//! <target>/<stem>.json
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use matjson::pipeline::{run, PipelineSettings, WorkLayout};
//!
//! let settings = PipelineSettings::new("data/in", WorkLayout::under("data".as_ref()));
//! let summary = run(&settings)?;
//! summary.log();
//! # Ok::<(), matjson::pipeline::PipelineError>(())
//! ```

mod aggregate;
mod error;
mod fsops;
mod orchestrator;
mod record;
mod scheduler;
mod settings;
mod status;


use log::info;

use crate::convert::Converter;
use crate::mat::{ContainerReader, Mat5Reader};

pub use aggregate::{ResultAggregator, RunSummary, RESULT_BANNER};
pub use error::PipelineError;
pub use fsops::{ensure_dir, list_source_files, move_into, write_text};
pub use orchestrator::{json_path, BatchReport, FilePipeline};
pub use record::ConversionRecord;
pub use scheduler::BatchScheduler;
pub use settings::{
    default_workers, CollisionPolicy, PipelineSettings, WorkLayout, DEFAULT_BATCH_SIZE,
};
pub use status::ProgressStatus;

/// Run the pipeline with the built-in MAT reader
pub fn run(settings: &PipelineSettings) -> Result<RunSummary, PipelineError> {
    run_with_reader(settings, Mat5Reader::new())
}

/// Run the pipeline with a custom container reader
pub fn run_with_reader<R: ContainerReader>(
    settings: &PipelineSettings,
    reader: R,
) -> Result<RunSummary, PipelineError> {
    settings.layout.prepare()?;
    let files = list_source_files(&settings.source)?;
    info!(
        "Found {} files in {}",
        files.len(),
        settings.source.display()
    );

    let pipeline = FilePipeline::new(
        reader,
        Converter::with_options(settings.render.clone()),
        settings.layout.clone(),
    );
    let scheduler = BatchScheduler::new(settings.batch_size, settings.workers);
    let reports = scheduler.run(&pipeline, &files)?;

    let mut aggregator = ResultAggregator::new(settings.collision_policy);
    aggregator.merge_all(reports)?;
    Ok(aggregator.finish())
}
