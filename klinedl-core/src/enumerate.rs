//! Task enumeration — expands (symbol × interval × period) into download tasks.
//!
//! Nesting order is symbols, then intervals, then periods. Periods outside the
//! configured [`DateRange`] are dropped before emission. With checksums on,
//! every data task is immediately followed by its `.CHECKSUM` companion.
//!
//! All iterators are lazy and borrow their inputs, so the same enumerator can
//! be walked any number of times.

use crate::domain::{DateRange, DownloadTask, IntervalSet, Period, YearMonth};
use chrono::NaiveDate;

/// Expands caller selections into ordered [`DownloadTask`]s.
#[derive(Debug, Clone)]
pub struct TaskEnumerator {
    range: DateRange,
    daily_intervals: IntervalSet,
    emit_checksum: bool,
}

impl TaskEnumerator {
    pub fn new(range: DateRange, daily_intervals: IntervalSet, emit_checksum: bool) -> Self {
        Self {
            range,
            daily_intervals,
            emit_checksum,
        }
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn emits_checksum(&self) -> bool {
        self.emit_checksum
    }

    /// Intervals that survive the daily allow-list, in caller order.
    pub fn daily_intervals_for(&self, intervals: &[String]) -> Vec<String> {
        self.daily_intervals.filter(intervals)
    }

    /// Monthly archives. A month is in range when its first day is.
    pub fn monthly<'a>(
        &'a self,
        symbols: &'a [String],
        intervals: &'a [String],
        months: &'a [YearMonth],
    ) -> impl Iterator<Item = DownloadTask> + 'a {
        symbols.iter().flat_map(move |symbol| {
            intervals.iter().flat_map(move |interval| {
                let periods = months.iter().map(|m| Period::Month(*m));
                self.expand(symbol, interval.clone(), periods)
            })
        })
    }

    /// Daily archives for every symbol.
    ///
    /// Intervals are first intersected with the daily allow-list; when nothing
    /// survives, no task is produced for any symbol.
    pub fn daily<'a>(
        &'a self,
        symbols: &'a [String],
        intervals: &[String],
        dates: &'a [NaiveDate],
    ) -> impl Iterator<Item = DownloadTask> + 'a {
        let valid = self.daily_intervals.filter(intervals);
        symbols
            .iter()
            .flat_map(move |symbol| self.daily_tasks(symbol, valid.clone(), dates))
    }

    /// Daily archives for a single symbol; the per-symbol slice of [`Self::daily`].
    pub fn daily_for_symbol<'a>(
        &'a self,
        symbol: &'a str,
        intervals: &[String],
        dates: &'a [NaiveDate],
    ) -> impl Iterator<Item = DownloadTask> + 'a {
        self.daily_tasks(symbol, self.daily_intervals.filter(intervals), dates)
    }

    fn daily_tasks<'a>(
        &'a self,
        symbol: &'a str,
        intervals: Vec<String>,
        dates: &'a [NaiveDate],
    ) -> impl Iterator<Item = DownloadTask> + 'a {
        intervals.into_iter().flat_map(move |interval| {
            let periods = dates.iter().map(|d| Period::Day(*d));
            self.expand(symbol, interval, periods)
        })
    }

    fn expand<'a, P>(
        &'a self,
        symbol: &'a str,
        interval: String,
        periods: P,
    ) -> impl Iterator<Item = DownloadTask> + 'a
    where
        P: Iterator<Item = Period> + 'a,
    {
        periods
            .filter(move |p| self.range.contains_period(p))
            .flat_map(move |period| {
                let task = DownloadTask::data(symbol, interval.clone(), period);
                let checksum = self.emit_checksum.then(|| task.checksum_of());
                std::iter::once(task).chain(checksum)
            })
    }
}
