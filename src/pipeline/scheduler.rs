use std::path::PathBuf;

use log::info;
use rayon::prelude::*;

use super::error::PipelineError;
use super::orchestrator::{BatchReport, FilePipeline};
use crate::mat::ContainerReader;

/// Splits the file list into batches and runs them on a bounded pool.
///
/// Batches and the files inside them are both processed with rayon parallel
/// iterators installed on one pool, so the total number of threads touching
/// the filesystem never exceeds `workers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduler {
    batch_size: usize,
    workers: usize,
}

impl BatchScheduler {
    /// Create a scheduler; zero values are raised to one
    pub fn new(batch_size: usize, workers: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            workers: workers.max(1),
        }
    }

    /// Files per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Worker threads
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Consecutive batches of at most `batch_size` files, in input order
    pub fn partition(&self, files: &[PathBuf]) -> Vec<Vec<PathBuf>> {
        files
            .chunks(self.batch_size)
            .map(<[PathBuf]>::to_vec)
            .collect()
    }

    /// Run every batch through `pipeline` and collect one report per batch.
    ///
    /// Reports come back in batch order; only a pool that fails to start is
    /// an error.
    pub fn run<R: ContainerReader>(
        &self,
        pipeline: &FilePipeline<R>,
        files: &[PathBuf],
    ) -> Result<Vec<BatchReport>, PipelineError> {
        let batches = self.partition(files);
        info!(
            "Processing {} files in {} batches on {} workers",
            files.len(),
            batches.len(),
            self.workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("matjson-worker-{}", i))
            .build()?;

        let reports = pool.install(|| {
            batches
                .par_iter()
                .map(|batch| pipeline.process_batch(batch))
                .collect()
        });
        Ok(reports)
    }
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(super::DEFAULT_BATCH_SIZE, super::default_workers())
    }
}
