use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use super::error::PipelineError;
use super::fsops::ensure_dir;
use crate::convert::RenderOptions;

/// Files per scheduled batch
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Worker threads to use when none are configured: one less than the
/// available hardware parallelism, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

/// What to do when two batches report the same file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Keep the status merged last
    #[default]
    LastWriteWins,
    /// Append the later status text to the earlier one
    Concatenate,
    /// Abort aggregation with [`PipelineError::DuplicateResult`]
    Fail,
}

/// Working directories of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLayout {
    /// Scratch directory holding the `error` and `processed` folders
    pub tmp_dir: PathBuf,
    /// Directory receiving the JSON files
    pub target_dir: PathBuf,
}

impl WorkLayout {
    /// Layout with explicit directories
    pub fn new(tmp_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            tmp_dir: tmp_dir.into(),
            target_dir: target_dir.into(),
        }
    }

    /// Layout rooted at `root`: `root/tmp` and `root/result`
    pub fn under(root: &Path) -> Self {
        Self::new(root.join("tmp"), root.join("result"))
    }

    /// Where unreadable sources are moved
    pub fn error_dir(&self) -> PathBuf {
        self.tmp_dir.join("error")
    }

    /// Where successfully converted sources are moved
    pub fn processed_dir(&self) -> PathBuf {
        self.tmp_dir.join("processed")
    }

    /// Create the tmp and target directories
    pub fn prepare(&self) -> Result<(), PipelineError> {
        for dir in [&self.tmp_dir, &self.target_dir] {
            ensure_dir(dir).map_err(|source| PipelineError::CreateDir {
                path: dir.display().to_string(),
                source,
            })?;
            debug!("Directory ready: {}", dir.display());
        }
        Ok(())
    }
}

/// Everything a run needs
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Directory of container files, or a single file
    pub source: PathBuf,
    /// Working directories
    pub layout: WorkLayout,
    /// Files per batch
    pub batch_size: usize,
    /// Worker threads
    pub workers: usize,
    /// Aggregation collision handling
    pub collision_policy: CollisionPolicy,
    /// Converter options
    pub render: RenderOptions,
}

impl PipelineSettings {
    /// Settings with default tuning for the given source and layout
    pub fn new(source: impl Into<PathBuf>, layout: WorkLayout) -> Self {
        Self {
            source: source.into(),
            layout,
            batch_size: DEFAULT_BATCH_SIZE,
            workers: default_workers(),
            collision_policy: CollisionPolicy::default(),
            render: RenderOptions::default(),
        }
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the collision policy
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Set the converter options
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }
}
