//! Downloader configuration.
//!
//! Loaded from TOML; every field has a default so a partial file (or none at
//! all) is valid. The default date range starts at `epoch` and ends today.

use crate::domain::{DateRange, IntervalSet, TradingType, YearMonth};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://data.binance.vision/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Exchange-info URLs per market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeInfoEndpoints {
    pub spot: String,
    pub um: String,
    pub cm: String,
}

impl Default for ExchangeInfoEndpoints {
    fn default() -> Self {
        Self {
            spot: "https://api.binance.com/api/v3/exchangeInfo".into(),
            um: "https://fapi.binance.com/fapi/v1/exchangeInfo".into(),
            cm: "https://dapi.binance.com/dapi/v1/exchangeInfo".into(),
        }
    }
}

impl ExchangeInfoEndpoints {
    pub fn url_for(&self, trading_type: TradingType) -> &str {
        match trading_type {
            TradingType::Spot => &self.spot,
            TradingType::UsdMargined => &self.um,
            TradingType::CoinMargined => &self.cm,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Archive root; remote prefixes are appended to it.
    pub base_url: String,
    /// Default range start when the caller gives none.
    pub epoch: NaiveDate,
    /// Every interval accepted on the command line.
    pub kline_intervals: IntervalSet,
    /// Intervals that have daily archives.
    pub daily_intervals: IntervalSet,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub exchange_info: ExchangeInfoEndpoints,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            epoch: NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or_default(),
            kline_intervals: IntervalSet::all_klines(),
            daily_intervals: IntervalSet::daily(),
            request_timeout_secs: 60,
            user_agent: concat!("klinedl/", env!("CARGO_PKG_VERSION")).into(),
            exchange_info: ExchangeInfoEndpoints::default(),
        }
    }
}

impl DownloaderConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be http(s), got '{}'",
                self.base_url
            )));
        }
        if self.kline_intervals.is_empty() {
            return Err(ConfigError::Invalid("kline_intervals is empty".into()));
        }
        if !self.daily_intervals.is_subset_of(&self.kline_intervals) {
            return Err(ConfigError::Invalid(
                "daily_intervals must be a subset of kline_intervals".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Resolve the effective range, filling missing bounds with `[epoch, today]`.
    pub fn resolve_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DateRange, ConfigError> {
        let today = Utc::now().date_naive();
        DateRange::new(start.unwrap_or(self.epoch), end.unwrap_or(today))
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Default monthly periods: every month from the epoch year to the current year.
    ///
    /// The enumerator filters these against the range.
    pub fn default_months(&self) -> Vec<YearMonth> {
        let this_year = Utc::now().year();
        let years: Vec<i32> = (self.epoch.year()..=this_year).collect();
        let months: Vec<u32> = (1..=12).collect();
        YearMonth::grid(&years, &months)
    }
}
