//! Progress callbacks for scheduled runs.

use super::summary::{RunSummary, TaskResult};
use crate::domain::{DownloadTask, Periodicity};
use crate::remote::FetchOutcome;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Progress callback for multi-symbol runs.
///
/// Daily runs call these from worker threads, hence `Sync`.
pub trait DownloadProgress: Send + Sync {
    /// Called before the first task of a symbol.
    fn on_symbol_start(&self, periodicity: Periodicity, symbol: &str, index: usize, total: usize);

    /// Called before the first task of each interval (daily runs).
    fn on_interval_start(&self, symbol: &str, interval: &str, index: usize, total: usize);

    /// Called before the tasks of each date (daily runs).
    fn on_date_start(
        &self,
        symbol: &str,
        interval: &str,
        date: NaiveDate,
        index: usize,
        total: usize,
    );

    /// Called before each fetch attempt.
    fn on_task_start(&self, task: &DownloadTask);

    /// Called when a task finishes.
    fn on_task_complete(&self, task: &DownloadTask, result: &TaskResult);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, periodicity: Periodicity, summary: &RunSummary);
}

/// Reports progress through `tracing`.
pub struct LogProgress;

impl DownloadProgress for LogProgress {
    fn on_symbol_start(&self, periodicity: Periodicity, symbol: &str, index: usize, total: usize) {
        info!("[{}/{total}] - start download {periodicity} {symbol} klines", index + 1);
    }

    fn on_interval_start(&self, symbol: &str, interval: &str, index: usize, total: usize) {
        info!(
            "[{}/{total}] - start download daily {symbol} klines for interval {interval}",
            index + 1
        );
    }

    fn on_date_start(
        &self,
        symbol: &str,
        interval: &str,
        date: NaiveDate,
        index: usize,
        total: usize,
    ) {
        info!(
            %interval,
            "[{}/{total}] - start download daily {symbol} klines for date {date}",
            index + 1
        );
    }

    fn on_task_start(&self, task: &DownloadTask) {
        debug!(
            symbol = %task.symbol,
            interval = %task.interval,
            period = %task.period,
            "fetching {}",
            task.file_name()
        );
    }

    fn on_task_complete(&self, task: &DownloadTask, result: &TaskResult) {
        match result {
            Ok(outcome) => match outcome.fetch {
                FetchOutcome::Downloaded { bytes } => {
                    debug!(file = %task.file_name(), bytes, "downloaded")
                }
                FetchOutcome::AlreadyExists => {
                    debug!(file = %task.file_name(), "file already exists")
                }
                FetchOutcome::NotFound if task.is_checksum => {
                    warn!(file = %task.file_name(), "checksum file not found")
                }
                FetchOutcome::NotFound => info!(file = %task.file_name(), "file not found"),
            },
            Err(e) => warn!(file = %task.file_name(), error = %e, "download failed"),
        }
    }

    fn on_batch_complete(&self, periodicity: Periodicity, summary: &RunSummary) {
        info!(
            %periodicity,
            total = summary.total,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            not_found = summary.not_found,
            missing_checksums = summary.missing_checksums,
            failed = summary.failed(),
            cancelled = summary.cancelled,
            "batch complete"
        );
    }
}

/// Discards all progress events.
pub struct NoopProgress;

impl DownloadProgress for NoopProgress {
    fn on_symbol_start(&self, _: Periodicity, _: &str, _: usize, _: usize) {}
    fn on_interval_start(&self, _: &str, _: &str, _: usize, _: usize) {}
    fn on_date_start(&self, _: &str, _: &str, _: NaiveDate, _: usize, _: usize) {}
    fn on_task_start(&self, _: &DownloadTask) {}
    fn on_task_complete(&self, _: &DownloadTask, _: &TaskResult) {}
    fn on_batch_complete(&self, _: Periodicity, _: &RunSummary) {}
}
