//! # matjson - MATLAB MAT-file to JSON Converter
//!
//! `matjson` reads Level 5 MAT-files and writes one JSON document per file,
//! processing whole directories in parallel batches.
//!
//! ## Key Features
//!
//! - **Native MAT v5 Reader**: Both byte orders, zlib-compressed variables,
//!   numeric, char, cell, struct, object, sparse and function handle arrays.
//!
//! - **Rule-Based JSON Rendering**: An ordered rule list maps every array
//!   kind onto a compact JSON form (see [`convert`]).
//!
//! - **Fault-Isolated Batches**: Every file moves through its own state
//!   machine; unreadable files are set aside, the rest keep going.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matjson::mat::Mat5Reader;
//! use matjson::convert::Converter;
//!
//! let file = Mat5Reader::new().read_file("measurement.mat")?;
//! let json = Converter::new().convert(&file.entries);
//! println!("{}", json);
//! # Ok::<(), matjson::mat::MatError>(())
//! ```
//!
//! ## Converting a Directory
//!
//! ```rust,no_run
//! use matjson::pipeline::{run, PipelineSettings, WorkLayout};
//!
//! let layout = WorkLayout::new("work/tmp", "work/result");
//! let settings = PipelineSettings::new("incoming", layout).with_batch_size(50);
//! let summary = run(&settings)?;
//! summary.log();
//! # Ok::<(), matjson::pipeline::PipelineError>(())
//! ```
//!
//! ## Modules
//!
//! - [`mat`]: MAT-file container model, reader and writer
//! - [`convert`]: array tree to JSON conversion
//! - [`pipeline`]: per-file state machine, batch scheduler, result aggregation

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]

pub mod convert;
pub mod mat;
pub mod pipeline;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::convert::{Converter, RenderOptions};
    pub use crate::mat::{ArrayEntry, ArrayNode, ContainerReader, Mat5Reader, Mat5Writer};
    pub use crate::pipeline::{
        run, CollisionPolicy, PipelineError, PipelineSettings, ProgressStatus, RunSummary,
        WorkLayout,
    };
}
