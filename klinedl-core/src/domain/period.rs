//! Archive periods and the inclusive date range used to filter them.

use super::market::{DomainError, Periodicity};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month, the unit of monthly archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::InvalidMonth { month });
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month. `None` only outside chrono's supported years.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Cross product of years and months, year-major, skipping invalid months.
    pub fn grid(years: &[i32], months: &[u32]) -> Vec<YearMonth> {
        years
            .iter()
            .flat_map(|&y| months.iter().filter_map(move |&m| YearMonth::new(y, m).ok()))
            .collect()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The period an archive file covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Period {
    Month(YearMonth),
    Day(NaiveDate),
}

impl Period {
    pub fn periodicity(&self) -> Periodicity {
        match self {
            Period::Month(_) => Periodicity::Monthly,
            Period::Day(_) => Periodicity::Daily,
        }
    }

    /// Date compared against the range: first of the month, or the day itself.
    pub fn anchor(&self) -> Option<NaiveDate> {
        match self {
            Period::Month(ym) => ym.first_day(),
            Period::Day(d) => Some(*d),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month(ym) => ym.fmt(f),
            Period::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn contains_period(&self, period: &Period) -> bool {
        period.anchor().is_some_and(|d| self.contains(d))
    }

    /// Every date in the range, inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + Clone {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Every month touched by the range, including a partial first month.
    pub fn months(&self) -> Vec<YearMonth> {
        let last = YearMonth::of(self.end);
        let mut current = YearMonth::of(self.start);
        let mut out = Vec::new();
        while current <= last {
            out.push(current);
            current = current.succ();
        }
        out
    }

    /// Subfolder name used when the caller pinned both bounds.
    pub fn label(&self) -> String {
        format!("{}_{}", self.start, self.end)
    }
}
