//! Interval allow-lists.

use serde::{Deserialize, Serialize};

/// Every kline interval the archive publishes, shortest first.
pub const KLINE_INTERVALS: &[&str] = &[
    "1s", "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
    "1mo",
];

/// Intervals that have daily archives (up to and including one day).
pub const DAILY_INTERVALS: &[&str] = &[
    "1s", "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d",
];

/// An ordered allow-list of interval names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalSet(Vec<String>);

impl IntervalSet {
    pub fn new<I, S>(intervals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for s in intervals {
            let s = s.into();
            if !out.contains(&s) {
                out.push(s);
            }
        }
        Self(out)
    }

    pub fn all_klines() -> Self {
        Self::new(KLINE_INTERVALS.iter().copied())
    }

    pub fn daily() -> Self {
        Self::new(DAILY_INTERVALS.iter().copied())
    }

    pub fn contains(&self, interval: &str) -> bool {
        self.0.iter().any(|i| i == interval)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_subset_of(&self, other: &IntervalSet) -> bool {
        self.0.iter().all(|i| other.contains(i))
    }

    /// Intersect a caller list with this allow-list.
    ///
    /// Caller order is kept; duplicates are dropped.
    pub fn filter<S: AsRef<str>>(&self, requested: &[S]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for interval in requested {
            let interval = interval.as_ref();
            if self.contains(interval) && !out.iter().any(|i| i == interval) {
                out.push(interval.to_string());
            }
        }
        out
    }

    /// Entries of `requested` that are not in this allow-list.
    pub fn unknown<'a, S: AsRef<str>>(&self, requested: &'a [S]) -> Vec<&'a str> {
        requested
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| !self.contains(s))
            .collect()
    }
}

impl Default for IntervalSet {
    fn default() -> Self {
        Self::all_klines()
    }
}
