use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::info;

use super::error::PipelineError;
use super::orchestrator::BatchReport;
use super::settings::CollisionPolicy;
use super::status::ProgressStatus;

/// Banner opening the run report
pub const RESULT_BANNER: &str = "=================RESULT===============";

/// Merges batch reports into one run summary
#[derive(Debug, Default)]
pub struct ResultAggregator {
    policy: CollisionPolicy,
    merged: BTreeMap<String, String>,
    counts: HashMap<ProgressStatus, usize>,
}

impl ResultAggregator {
    /// Create an aggregator applying `policy` to paths reported twice
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Merge one batch report
    pub fn merge(&mut self, report: BatchReport) -> Result<(), PipelineError> {
        for (path, status) in report {
            *self.counts.entry(status).or_insert(0) += 1;
            match self.merged.entry(path) {
                Entry::Vacant(slot) => {
                    slot.insert(status.label().to_string());
                }
                Entry::Occupied(mut slot) => match self.policy {
                    CollisionPolicy::LastWriteWins => {
                        slot.insert(status.label().to_string());
                    }
                    CollisionPolicy::Concatenate => slot.get_mut().push_str(status.label()),
                    CollisionPolicy::Fail => {
                        return Err(PipelineError::DuplicateResult(slot.key().clone()))
                    }
                },
            }
        }
        Ok(())
    }

    /// Merge every report in order
    pub fn merge_all(
        &mut self,
        reports: impl IntoIterator<Item = BatchReport>,
    ) -> Result<(), PipelineError> {
        for report in reports {
            self.merge(report)?;
        }
        Ok(())
    }

    /// Finish aggregation
    pub fn finish(self) -> RunSummary {
        RunSummary {
            entries: self.merged,
            counts: self.counts,
        }
    }
}

/// Final status text of every processed file, ordered by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    entries: BTreeMap<String, String>,
    counts: HashMap<ProgressStatus, usize>,
}

impl RunSummary {
    /// Number of files in the summary
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no file was processed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Status text reported for `path`
    pub fn status(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// `(path, status)` pairs ordered by path
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, status)| (path.as_str(), status.as_str()))
    }

    /// How many times `status` was reported, duplicates included
    pub fn count(&self, status: ProgressStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// Number of reports that ended in a failure state
    pub fn failures(&self) -> usize {
        ProgressStatus::ALL
            .iter()
            .filter(|status| status.is_failure())
            .map(|status| self.count(*status))
            .sum()
    }

    /// Write the report to the log at info level
    pub fn log(&self) {
        info!("{}", RESULT_BANNER);
        for (path, status) in self.entries() {
            info!("File: {} | Status: {}", path, status);
        }
        info!(
            "{} files, {} successful, {} failed",
            self.len(),
            self.count(ProgressStatus::Successful),
            self.failures()
        );
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RESULT_BANNER)?;
        for (path, status) in self.entries() {
            writeln!(f, "File: {} | Status: {}", path, status)?;
        }
        Ok(())
    }
}
