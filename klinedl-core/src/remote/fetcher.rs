//! File fetcher trait and structured error types.
//!
//! The FileFetcher trait abstracts over how archive bytes reach the local
//! disk so the scheduler can be driven by the HTTP implementation or by a
//! mock in tests.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// What happened to a single file request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Bytes were transferred and written under the final name.
    Downloaded { bytes: u64 },
    /// The target was already on disk and overwrite was off; no transfer.
    AlreadyExists,
    /// The remote object does not exist.
    NotFound,
}

impl FetchOutcome {
    pub fn transferred(&self) -> bool {
        matches!(self, FetchOutcome::Downloaded { .. })
    }
}

/// Structured error types for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Fetches one remote object into a local folder.
///
/// Implementations must:
/// - return [`FetchOutcome::AlreadyExists`] without transferring when the
///   target exists and `overwrite` is false
/// - create `dest_dir` if it is missing
/// - report a missing remote object as [`FetchOutcome::NotFound`], not an error
pub trait FileFetcher: Send + Sync {
    /// Human-readable name of this fetcher.
    fn name(&self) -> &str;

    /// Fetch `{prefix}{file_name}` into `{dest_dir}/{file_name}`.
    fn fetch(
        &self,
        prefix: &str,
        file_name: &str,
        dest_dir: &Path,
        overwrite: bool,
    ) -> Result<FetchOutcome, FetchError>;
}
