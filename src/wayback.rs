//! Wayback Machine client: the permanent-archive submission boundary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::constants::ARCHIVAL_USER_AGENT;
use crate::error::{ArchiveError, Producer};
use crate::pipeline::SnapshotRequester;

/// Wayback Machine client.
///
/// One submission per pipeline run, no retry: archiving is idempotent
/// enough that the user simply re-invokes on failure.
pub struct WaybackClient {
    client: Client,
}

impl WaybackClient {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(ARCHIVAL_USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Check if a URL has already been archived.
    ///
    /// Returns the closest existing snapshot URL if available.
    ///
    /// # Errors
    ///
    /// Returns an error if the availability API is unreachable or returns
    /// an unparseable response.
    pub async fn check_existing(&self, url: &str) -> Result<Option<String>, ArchiveError> {
        let check_url = format!(
            "https://archive.org/wayback/available?url={}",
            urlencoding::encode(url)
        );

        let response = self
            .client
            .get(&check_url)
            .send()
            .await
            .map_err(|e| ArchiveError::network(Producer::Snapshot, e))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ArchiveError::network(Producer::Snapshot, e))?;

        let snapshot_url = json
            .get("archived_snapshots")
            .and_then(|s| s.get("closest"))
            .and_then(|c| c.get("url"))
            .and_then(|u| u.as_str())
            .map(String::from);

        Ok(snapshot_url)
    }
}

#[async_trait]
impl SnapshotRequester for WaybackClient {
    /// Submit a URL to the Wayback Machine and return the snapshot URL.
    async fn submit(&self, url: &str) -> Result<String, ArchiveError> {
        // Reuse an existing snapshot when one is already on record.
        if let Some(existing) = self.check_existing(url).await? {
            info!(url = %url, snapshot = %existing, "URL already archived on Wayback Machine");
            return Ok(existing);
        }

        debug!(url = %url, "Submitting URL to Wayback Machine");

        let save_url = format!("https://web.archive.org/save/{url}");

        let response = self
            .client
            .get(&save_url)
            .send()
            .await
            .map_err(|e| ArchiveError::network(Producer::Snapshot, e))?;

        let status = response.status();

        if !status.is_success() && status.as_u16() != 302 {
            return Err(ArchiveError::network(
                Producer::Snapshot,
                format!("Wayback Machine submission failed with status {status}"),
            ));
        }

        // The Content-Location header carries the snapshot path
        if let Some(location) = response.headers().get("content-location") {
            if let Ok(loc_str) = location.to_str() {
                let snapshot_url = format!("https://web.archive.org{loc_str}");
                info!(url = %url, snapshot = %snapshot_url, "Wayback snapshot created");
                return Ok(snapshot_url);
            }
        }

        // Fall back to the memento Link header
        if let Some(link) = response.headers().get("link") {
            if let Ok(link_str) = link.to_str() {
                if let Some(memento) = extract_memento_url(link_str) {
                    info!(url = %url, snapshot = %memento, "Wayback snapshot created");
                    return Ok(memento);
                }
            }
        }

        // Accepted, but no specific snapshot URL in the response
        let generic_url = format!("https://web.archive.org/web/*/{url}");
        info!(url = %url, "Wayback submission accepted (no specific snapshot URL)");
        Ok(generic_url)
    }
}

/// Extract memento URL from a Link header.
fn extract_memento_url(link_header: &str) -> Option<String> {
    // Link headers look like: <url>; rel="memento"; ...
    for part in link_header.split(',') {
        if part.contains("rel=\"memento\"") || part.contains("rel=memento") {
            if let Some(start) = part.find('<') {
                if let Some(end) = part.find('>') {
                    return Some(part[start + 1..end].to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_memento_url() {
        let header = r#"<https://web.archive.org/web/20240101000000/https://example.com>; rel="memento"; datetime="Mon, 01 Jan 2024 00:00:00 GMT""#;
        let result = extract_memento_url(header);
        assert_eq!(
            result,
            Some("https://web.archive.org/web/20240101000000/https://example.com".to_string())
        );
    }

    #[test]
    fn test_extract_memento_url_no_match() {
        let header = r#"<https://example.com>; rel="original""#;
        let result = extract_memento_url(header);
        assert_eq!(result, None);
    }
}
