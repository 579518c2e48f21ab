//! Remote prefix construction and local destination layout.
//!
//! Remote layout:
//! - spot:    `data/spot/{periodicity}/{category}/{SYMBOL}/{interval}/`
//! - futures: `data/futures/{um|cm}/{periodicity}/{category}/{SYMBOL}/{interval}/`
//!
//! Local layout mirrors the remote prefix under the store directory, with an
//! extra `{start}_{end}` folder when the caller pinned both range bounds.

use crate::domain::{DataCategory, DateRange, Periodicity, TradingType};
use std::path::{Path, PathBuf};

/// Build the remote storage prefix for one (symbol, interval) archive series.
pub fn remote_prefix(
    trading_type: TradingType,
    category: DataCategory,
    periodicity: Periodicity,
    symbol: &str,
    interval: &str,
) -> String {
    let market = match trading_type {
        TradingType::Spot => "data/spot".to_string(),
        futures => format!("data/futures/{futures}"),
    };
    format!(
        "{market}/{periodicity}/{category}/{}/{interval}/",
        symbol.to_uppercase()
    )
}

/// Where archives for one market/category land on disk.
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    pub trading_type: TradingType,
    pub category: DataCategory,
    store_dir: PathBuf,
    range_folder: Option<String>,
}

impl ArchiveLayout {
    pub fn new(
        trading_type: TradingType,
        category: DataCategory,
        store_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            trading_type,
            category,
            store_dir: store_dir.into(),
            range_folder: None,
        }
    }

    /// Nest downloads under `{start}_{end}`.
    pub fn with_range_folder(mut self, range: &DateRange) -> Self {
        self.range_folder = Some(range.label());
        self
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    pub fn prefix(&self, periodicity: Periodicity, symbol: &str, interval: &str) -> String {
        remote_prefix(self.trading_type, self.category, periodicity, symbol, interval)
    }

    /// Local folder for files under `prefix`.
    pub fn local_dir(&self, prefix: &str) -> PathBuf {
        let mut dir = self.store_dir.clone();
        for part in prefix.split('/').filter(|p| !p.is_empty()) {
            dir.push(part);
        }
        if let Some(folder) = &self.range_folder {
            dir.push(folder);
        }
        dir
    }
}
