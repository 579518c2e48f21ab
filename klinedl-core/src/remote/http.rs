//! HTTP file fetcher for the public archive bucket.
//!
//! Streams each object into `{file}.part` and renames it into place. An
//! interrupted transfer never leaves a truncated archive under the final name.

use super::fetcher::{FetchError, FetchOutcome, FileFetcher};
use crate::config::DownloaderConfig;
use reqwest::StatusCode;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const PARTIAL_SUFFIX: &str = ".part";

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn from_config(config: &DownloaderConfig) -> Result<Self, FetchError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
            &config.user_agent,
        )
    }

    /// Use a pre-built client (custom proxy or TLS settings).
    pub fn with_client(client: reqwest::blocking::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, prefix: &str, file_name: &str) -> String {
        format!("{}{prefix}{file_name}", self.base_url)
    }

    fn download_to(
        &self,
        url: &str,
        partial: &Path,
        target: &Path,
    ) -> Result<FetchOutcome, FetchError> {
        let mut resp = self.client.get(url).send().map_err(|e| FetchError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut file = File::create(partial).map_err(|e| FetchError::io(partial, e))?;
        let bytes = match resp.copy_to(&mut file) {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                let _ = fs::remove_file(partial);
                return Err(FetchError::Network {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        };
        file.flush().map_err(|e| FetchError::io(partial, e))?;
        drop(file);

        fs::rename(partial, target).map_err(|e| FetchError::io(target, e))?;
        Ok(FetchOutcome::Downloaded { bytes })
    }
}

impl FileFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(
        &self,
        prefix: &str,
        file_name: &str,
        dest_dir: &Path,
        overwrite: bool,
    ) -> Result<FetchOutcome, FetchError> {
        let target = dest_dir.join(file_name);
        if !overwrite && target.exists() {
            debug!(path = %target.display(), "file already exists");
            return Ok(FetchOutcome::AlreadyExists);
        }

        fs::create_dir_all(dest_dir).map_err(|e| FetchError::io(dest_dir, e))?;

        let url = self.url_for(prefix, file_name);
        let partial = dest_dir.join(format!("{file_name}{PARTIAL_SUFFIX}"));
        debug!(%url, "requesting");

        let outcome = self.download_to(&url, &partial, &target)?;
        match outcome {
            FetchOutcome::Downloaded { bytes } => {
                debug!(path = %target.display(), bytes, "downloaded");
            }
            FetchOutcome::NotFound => debug!(%url, "file not found"),
            FetchOutcome::AlreadyExists => {}
        }
        Ok(outcome)
    }
}
