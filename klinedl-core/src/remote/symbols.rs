//! Symbol discovery from the exchange-info endpoints.

use crate::config::ExchangeInfoEndpoints;
use crate::domain::TradingType;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("network error querying {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("unexpected exchange info payload: {0}")]
    Parse(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    symbol: String,
}

/// Lists the tradable symbol universe of a market.
pub trait SymbolLister: Send + Sync {
    fn list_symbols(&self, trading_type: TradingType) -> Result<Vec<String>, SymbolError>;
}

/// Queries the exchange-info endpoint for each market.
pub struct ExchangeInfoLister {
    client: reqwest::blocking::Client,
    endpoints: ExchangeInfoEndpoints,
}

impl ExchangeInfoLister {
    pub fn new(
        endpoints: ExchangeInfoEndpoints,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, SymbolError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| SymbolError::Client(e.to_string()))?;
        Ok(Self { client, endpoints })
    }

    /// Parse the `symbols[].symbol` field out of an exchange-info body.
    pub fn parse(body: &str) -> Result<Vec<String>, SymbolError> {
        let info: ExchangeInfo =
            serde_json::from_str(body).map_err(|e| SymbolError::Parse(e.to_string()))?;
        Ok(info.symbols.into_iter().map(|s| s.symbol).collect())
    }
}

impl SymbolLister for ExchangeInfoLister {
    fn list_symbols(&self, trading_type: TradingType) -> Result<Vec<String>, SymbolError> {
        let url = self.endpoints.url_for(trading_type);
        info!(%trading_type, %url, "fetching all symbols from exchange");

        let resp = self.client.get(url).send().map_err(|e| SymbolError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SymbolError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.text().map_err(|e| SymbolError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&body)
    }
}

/// Keep symbols ending with `suffix`; no suffix keeps everything.
pub fn filter_by_suffix(symbols: Vec<String>, suffix: Option<&str>) -> Vec<String> {
    match suffix {
        Some(suffix) if !suffix.is_empty() => symbols
            .into_iter()
            .filter(|s| s.ends_with(suffix))
            .collect(),
        _ => symbols,
    }
}
