//! Closed enumerations that select which remote path template applies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown trading type '{0}' (expected spot, um or cm)")]
    UnknownTradingType(String),

    #[error("unknown data category '{0}'")]
    UnknownCategory(String),

    #[error("data category {category} is not published for {trading_type} markets")]
    UnsupportedCategory {
        trading_type: TradingType,
        category: DataCategory,
    },

    #[error("invalid month {month} (expected 1-12)")]
    InvalidMonth { month: u32 },

    #[error("invalid date range: start {start} is after end {end}")]
    InvertedRange { start: String, end: String },
}

/// Market segment selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingType {
    Spot,
    /// USD-margined futures.
    #[serde(rename = "um")]
    UsdMargined,
    /// Coin-margined futures.
    #[serde(rename = "cm")]
    CoinMargined,
}

impl TradingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingType::Spot => "spot",
            TradingType::UsdMargined => "um",
            TradingType::CoinMargined => "cm",
        }
    }

    pub fn is_futures(&self) -> bool {
        !matches!(self, TradingType::Spot)
    }
}

impl fmt::Display for TradingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradingType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spot" => Ok(TradingType::Spot),
            "um" => Ok(TradingType::UsdMargined),
            "cm" => Ok(TradingType::CoinMargined),
            _ => Err(DomainError::UnknownTradingType(s.to_string())),
        }
    }
}

/// Kline archive family. Only plain klines exist for spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataCategory {
    Klines,
    MarkPriceKlines,
    IndexPriceKlines,
    PremiumIndexKlines,
}

impl DataCategory {
    /// Remote directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataCategory::Klines => "klines",
            DataCategory::MarkPriceKlines => "markPriceKlines",
            DataCategory::IndexPriceKlines => "indexPriceKlines",
            DataCategory::PremiumIndexKlines => "premiumIndexKlines",
        }
    }

    /// Reject category/market combinations the archive does not publish.
    pub fn check_supported(&self, trading_type: TradingType) -> Result<(), DomainError> {
        if *self != DataCategory::Klines && !trading_type.is_futures() {
            return Err(DomainError::UnsupportedCategory {
                trading_type,
                category: *self,
            });
        }
        Ok(())
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "klines" => Ok(DataCategory::Klines),
            "markPriceKlines" | "mark-price-klines" => Ok(DataCategory::MarkPriceKlines),
            "indexPriceKlines" | "index-price-klines" => Ok(DataCategory::IndexPriceKlines),
            "premiumIndexKlines" | "premium-index-klines" => Ok(DataCategory::PremiumIndexKlines),
            _ => Err(DomainError::UnknownCategory(s.to_string())),
        }
    }
}

/// Archive granularity; each has its own remote layout and file naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Daily,
    Monthly,
}

impl Periodicity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Periodicity::Daily => "daily",
            Periodicity::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
