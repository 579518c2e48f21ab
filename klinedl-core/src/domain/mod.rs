//! Domain types for archive downloads

pub mod interval;
pub mod market;
pub mod period;
pub mod task;

pub use interval::IntervalSet;
pub use market::{DataCategory, DomainError, Periodicity, TradingType};
pub use period::{DateRange, Period, YearMonth};
pub use task::{normalize_symbols, DownloadTask};
