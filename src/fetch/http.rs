//! HTTP downloads.
//!
//! Streams a response body straight to a file on disk. There is no retry
//! and no cache: each task downloads its own fresh copy.

use reqwest::blocking::Client;
use std::fs::{self, File};
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, ServiceError};

/// Downloads files over HTTP/HTTPS.
pub struct Downloader {
    client: Client,
    timeout: Duration,
}

impl Downloader {
    /// Create a downloader with the default 60-second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(60))
    }

    /// Create a downloader with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("crossplane-service/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Other(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Download `url` into `dest`, creating parent directories.
    ///
    /// Returns the number of bytes written.
    pub fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let failed = |message: String| ServiceError::DownloadFailed {
            url: url.to_string(),
            message,
        };

        tracing::debug!("Downloading {} to {}", url, dest.display());

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        }

        let mut file = File::create(dest).map_err(|e| failed(e.to_string()))?;
        let written = response
            .copy_to(&mut file)
            .map_err(|e| failed(e.to_string()))?;

        tracing::debug!("Downloaded {} bytes from {}", written, url);
        Ok(written)
    }
}
