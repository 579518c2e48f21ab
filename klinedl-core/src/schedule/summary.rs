//! Per-task results and the run summary they fold into.

use crate::checksum::ChecksumError;
use crate::domain::DownloadTask;
use crate::remote::{FetchError, FetchOutcome};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Checksum(#[from] ChecksumError),
}

/// Successful result of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOutcome {
    pub fetch: FetchOutcome,
    /// The paired archive was checked against this checksum file.
    pub verified: bool,
}

impl From<FetchOutcome> for TaskOutcome {
    fn from(fetch: FetchOutcome) -> Self {
        Self {
            fetch,
            verified: false,
        }
    }
}

pub type TaskResult = Result<TaskOutcome, TaskError>;

#[derive(Debug)]
pub struct TaskFailure {
    pub task: DownloadTask,
    pub error: TaskError,
}

/// Summary of a batch run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: usize,
    pub downloaded: usize,
    pub bytes: u64,
    pub skipped: usize,
    /// Data archives absent remotely (outside retention or never published).
    pub not_found: usize,
    /// Checksum files absent remotely; tolerated.
    pub missing_checksums: usize,
    pub verified: usize,
    /// Tasks never attempted because the run was cancelled.
    pub cancelled: usize,
    pub failures: Vec<TaskFailure>,
}

impl RunSummary {
    pub fn record(&mut self, task: &DownloadTask, result: TaskResult) {
        self.total += 1;
        match result {
            Ok(outcome) => {
                match outcome.fetch {
                    FetchOutcome::Downloaded { bytes } => {
                        self.downloaded += 1;
                        self.bytes += bytes;
                    }
                    FetchOutcome::AlreadyExists => self.skipped += 1,
                    FetchOutcome::NotFound if task.is_checksum => self.missing_checksums += 1,
                    FetchOutcome::NotFound => self.not_found += 1,
                }
                if outcome.verified {
                    self.verified += 1;
                }
            }
            Err(error) => self.failures.push(TaskFailure {
                task: task.clone(),
                error,
            }),
        }
    }

    pub fn record_cancelled(&mut self) {
        self.total += 1;
        self.cancelled += 1;
    }

    pub fn merge(&mut self, other: RunSummary) {
        self.total += other.total;
        self.downloaded += other.downloaded;
        self.bytes += other.bytes;
        self.skipped += other.skipped;
        self.not_found += other.not_found;
        self.missing_checksums += other.missing_checksums;
        self.verified += other.verified;
        self.cancelled += other.cancelled;
        self.failures.extend(other.failures);
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty() && self.cancelled == 0
    }
}
