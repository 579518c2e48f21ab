//! Remote collaborators: archive file fetching and symbol discovery.

pub mod fetcher;
pub mod http;
pub mod symbols;

pub use fetcher::{FetchError, FetchOutcome, FileFetcher};
pub use http::HttpFetcher;
pub use symbols::{filter_by_suffix, ExchangeInfoLister, SymbolError, SymbolLister};
