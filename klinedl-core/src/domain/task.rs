//! A single archive file to fetch.

use super::market::Periodicity;
use super::period::Period;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const ARCHIVE_EXTENSION: &str = ".zip";
pub const CHECKSUM_SUFFIX: &str = ".CHECKSUM";

/// One file download: a data archive or its checksum companion.
///
/// Built during enumeration and consumed exactly once by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownloadTask {
    pub symbol: String,
    pub interval: String,
    pub period: Period,
    pub is_checksum: bool,
}

impl DownloadTask {
    pub fn data(symbol: impl Into<String>, interval: impl Into<String>, period: Period) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            period,
            is_checksum: false,
        }
    }

    /// Checksum companion for the same (symbol, interval, period).
    pub fn checksum_of(&self) -> Self {
        Self {
            is_checksum: true,
            ..self.clone()
        }
    }

    pub fn periodicity(&self) -> Periodicity {
        self.period.periodicity()
    }

    /// `{SYMBOL}-{interval}-{period}.zip`, regardless of `is_checksum`.
    pub fn data_file_name(&self) -> String {
        format!(
            "{}-{}-{}{ARCHIVE_EXTENSION}",
            self.symbol.to_uppercase(),
            self.interval,
            self.period
        )
    }

    /// Remote and local file name for this task.
    pub fn file_name(&self) -> String {
        let mut name = self.data_file_name();
        if self.is_checksum {
            name.push_str(CHECKSUM_SUFFIX);
        }
        name
    }
}

/// Upper-case, trim and de-duplicate symbols, keeping first-seen order.
///
/// Remote and local names upper-case the symbol, so `btcusdt` and `BTCUSDT`
/// address the same files and must be scheduled once.
pub fn normalize_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}
