//! Shared test doubles.

#![allow(dead_code)]

use chrono::NaiveDate;
use klinedl_core::{
    DownloadProgress, DownloadTask, FetchError, FetchOutcome, FileFetcher, Periodicity,
    RunSummary,
};
use klinedl_core::schedule::TaskResult;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Ordered event log shared by a fetcher and a progress recorder.
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// In-memory fetcher that records every call and tracks concurrency.
#[derive(Default)]
pub struct MockFetcher {
    pub calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    pub delay: Duration,
    /// File names reported as absent remotely.
    pub missing: HashSet<String>,
    /// File names that fail with HTTP 500.
    pub failing: HashSet<String>,
    /// Body per file name; anything else gets `b"data"`.
    pub bodies: HashMap<String, Vec<u8>>,
    /// When set, every transfer is appended as `fetch {file_name}`.
    pub log: Option<EventLog>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn with_log(log: EventLog) -> Self {
        Self {
            log: Some(log),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl FileFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(
        &self,
        prefix: &str,
        file_name: &str,
        dest_dir: &Path,
        overwrite: bool,
    ) -> Result<FetchOutcome, FetchError> {
        let target = dest_dir.join(file_name);
        if !overwrite && target.exists() {
            return Ok(FetchOutcome::AlreadyExists);
        }

        self.calls
            .lock()
            .unwrap()
            .push(format!("{prefix}{file_name}"));
        if let Some(log) = &self.log {
            log.lock().unwrap().push(format!("fetch {file_name}"));
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(file_name) {
            return Err(FetchError::Status {
                url: format!("mock://{prefix}{file_name}"),
                status: 500,
            });
        }
        if self.missing.contains(file_name) {
            return Ok(FetchOutcome::NotFound);
        }

        let body = self
            .bodies
            .get(file_name)
            .cloned()
            .unwrap_or_else(|| b"data".to_vec());
        std::fs::create_dir_all(dest_dir).map_err(|e| FetchError::io(dest_dir, e))?;
        std::fs::write(&target, &body).map_err(|e| FetchError::io(&target, e))?;
        Ok(FetchOutcome::Downloaded {
            bytes: body.len() as u64,
        })
    }
}

/// Records every progress callback as a line in an [`EventLog`].
pub struct RecordingProgress {
    pub log: EventLog,
}

impl RecordingProgress {
    fn push(&self, event: String) {
        self.log.lock().unwrap().push(event);
    }
}

impl DownloadProgress for RecordingProgress {
    fn on_symbol_start(&self, periodicity: Periodicity, symbol: &str, index: usize, total: usize) {
        self.push(format!("symbol {periodicity} {symbol} {}/{total}", index + 1));
    }

    fn on_interval_start(&self, symbol: &str, interval: &str, _: usize, _: usize) {
        self.push(format!("interval {symbol} {interval}"));
    }

    fn on_date_start(&self, symbol: &str, interval: &str, date: NaiveDate, _: usize, _: usize) {
        self.push(format!("date {symbol} {interval} {date}"));
    }

    fn on_task_start(&self, task: &DownloadTask) {
        self.push(format!("start {}", task.file_name()));
    }

    fn on_task_complete(&self, task: &DownloadTask, _: &TaskResult) {
        self.push(format!("done {}", task.file_name()));
    }

    fn on_batch_complete(&self, periodicity: Periodicity, summary: &RunSummary) {
        self.push(format!("batch {periodicity} {}", summary.total));
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
