//! klinedl core — bulk download of historical kline archives.
//!
//! This crate contains:
//! - Domain types (markets, periods, date ranges, download tasks)
//! - Remote prefix construction and local layout
//! - The task enumerator (symbol × interval × period, range-filtered)
//! - A bounded worker pool and the scheduler built on it
//! - HTTP file fetching and exchange symbol discovery
//! - Checksum verification and configuration

pub mod checksum;
pub mod config;
pub mod domain;
pub mod enumerate;
pub mod paths;
pub mod remote;
pub mod schedule;

pub use config::{ConfigError, DownloaderConfig, ExchangeInfoEndpoints};
pub use domain::{
    normalize_symbols, DataCategory, DateRange, DownloadTask, IntervalSet, Period, Periodicity, TradingType,
    YearMonth,
};
pub use enumerate::TaskEnumerator;
pub use paths::{remote_prefix, ArchiveLayout};
pub use remote::{
    filter_by_suffix, ExchangeInfoLister, FetchError, FetchOutcome, FileFetcher, HttpFetcher,
    SymbolError, SymbolLister,
};
pub use schedule::{
    CancelToken, DownloadProgress, LogProgress, NoopProgress, RunSummary, ScheduleOptions,
    Scheduler, TaskError, TaskFailure,
};
