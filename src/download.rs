//! Raw page download.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::constants::ARCHIVAL_USER_AGENT;
use crate::error::{ArchiveError, Producer};
use crate::pipeline::PageDownloader;

/// Build the HTTP client used for page downloads.
#[must_use]
pub fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(ARCHIVAL_USER_AGENT)
        .build()
        .expect("Failed to create HTTP client")
}

/// Downloads the article page with a single GET. No retry, no fallback.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageDownloader for HttpDownloader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ArchiveError> {
        debug!(url = %url, "Downloading page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArchiveError::network(Producer::Download, e))?
            .error_for_status()
            .map_err(|e| ArchiveError::network(Producer::Download, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ArchiveError::network(Producer::Download, e))?;

        debug!(url = %url, size = body.len(), "Page downloaded");

        // The body is buffered whole so downstream consumers can read it
        // more than once (metadata extraction, then readability).
        Ok(body.to_vec())
    }
}
