//! Scheduler — runs enumerated tasks against a [`FileFetcher`].
//!
//! - Monthly runs are strictly sequential in enumeration order.
//! - Daily runs give each symbol to one worker of a [`WorkerPool`]; a symbol's
//!   own tasks stay in enumeration order, symbols interleave freely.
//!
//! Symbols are upper-cased and de-duplicated first, so no two workers ever
//! write the same file.
//!
//! A failed task is recorded and the run continues. With `fail_fast` the first
//! failure trips the [`CancelToken`] and every task not yet started is counted
//! as cancelled instead of fetched.

use super::pool::{PoolError, WorkerPool};
use super::progress::DownloadProgress;
use super::summary::{RunSummary, TaskOutcome, TaskResult};
use crate::checksum::verify_archive;
use crate::domain::{normalize_symbols, DownloadTask, Period, Periodicity, YearMonth};
use crate::enumerate::TaskEnumerator;
use crate::paths::ArchiveLayout;
use crate::remote::{FetchOutcome, FileFetcher};
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag. Checked before every task; in-flight fetches finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleOptions {
    /// Re-download files that already exist locally.
    pub overwrite: bool,
    /// Worker count for daily runs.
    pub parallelism: usize,
    /// Stop scheduling new tasks after the first failure.
    pub fail_fast: bool,
    /// Check each archive against its checksum file once both are on disk.
    pub verify: bool,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            parallelism: 1,
            fail_fast: false,
            verify: false,
        }
    }
}

pub struct Scheduler<'a> {
    fetcher: &'a dyn FileFetcher,
    layout: &'a ArchiveLayout,
    progress: &'a dyn DownloadProgress,
    options: ScheduleOptions,
    cancel: CancelToken,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        fetcher: &'a dyn FileFetcher,
        layout: &'a ArchiveLayout,
        progress: &'a dyn DownloadProgress,
        options: ScheduleOptions,
    ) -> Self {
        Self {
            fetcher,
            layout,
            progress,
            options,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }

    /// Download monthly archives one at a time, in enumeration order.
    pub fn run_monthly(
        &self,
        enumerator: &TaskEnumerator,
        symbols: &[String],
        intervals: &[String],
        months: &[YearMonth],
    ) -> RunSummary {
        let symbols = normalize_symbols(symbols);
        let mut summary = RunSummary::default();
        let total = symbols.len();

        for (index, symbol) in symbols.iter().enumerate() {
            self.progress
                .on_symbol_start(Periodicity::Monthly, symbol, index, total);
            for task in enumerator.monthly(std::slice::from_ref(symbol), intervals, months) {
                self.run_task(&task, &mut summary);
            }
        }

        self.progress
            .on_batch_complete(Periodicity::Monthly, &summary);
        summary
    }

    /// Download daily archives, one symbol per worker.
    pub fn run_daily(
        &self,
        enumerator: &TaskEnumerator,
        symbols: &[String],
        intervals: &[String],
        dates: &[NaiveDate],
    ) -> Result<RunSummary, PoolError> {
        let pool = WorkerPool::new(self.options.parallelism)?;
        let symbols = normalize_symbols(symbols);
        let intervals = enumerator.daily_intervals_for(intervals);
        let total = symbols.len();
        let jobs: Vec<&String> = symbols.iter().collect();

        let parts = pool.map(jobs, |index, symbol| {
            let mut summary = RunSummary::default();
            self.progress
                .on_symbol_start(Periodicity::Daily, symbol, index, total);
            for interval in &intervals {
                self.progress
                    .on_interval_start(symbol, interval, index, total);
                let one = std::slice::from_ref(interval);
                for task in enumerator.daily_for_symbol(symbol, one, dates) {
                    if let (Period::Day(date), false) = (task.period, task.is_checksum) {
                        self.progress
                            .on_date_start(symbol, interval, date, index, total);
                    }
                    self.run_task(&task, &mut summary);
                }
            }
            summary
        });

        let mut summary = RunSummary::default();
        for part in parts {
            summary.merge(part);
        }
        self.progress.on_batch_complete(Periodicity::Daily, &summary);
        Ok(summary)
    }

    fn run_task(&self, task: &DownloadTask, summary: &mut RunSummary) {
        if self.cancel.is_cancelled() {
            summary.record_cancelled();
            return;
        }

        self.progress.on_task_start(task);
        let result = self.execute(task);
        self.progress.on_task_complete(task, &result);

        if result.is_err() && self.options.fail_fast {
            self.cancel.cancel();
        }
        summary.record(task, result);
    }

    fn execute(&self, task: &DownloadTask) -> TaskResult {
        let prefix = self
            .layout
            .prefix(task.periodicity(), &task.symbol, &task.interval);
        let dest = self.layout.local_dir(&prefix);
        let file_name = task.file_name();

        let fetch = self
            .fetcher
            .fetch(&prefix, &file_name, &dest, self.options.overwrite)?;

        let mut outcome = TaskOutcome::from(fetch);
        if task.is_checksum && self.options.verify && fetch != FetchOutcome::NotFound {
            let archive = dest.join(task.data_file_name());
            if archive.exists() {
                verify_archive(&archive, &dest.join(&file_name))?;
                outcome.verified = true;
            }
        }
        Ok(outcome)
    }
}
