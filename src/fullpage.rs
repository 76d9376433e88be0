//! Full-page snapshot capture via monolith.
//!
//! Monolith is a CLI tool that bundles a web page with all its resources
//! (CSS, images, fonts, JavaScript) into a single HTML file using data URIs,
//! so the archived page renders correctly offline.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::constants::ARCHIVAL_USER_AGENT;
use crate::error::{ArchiveError, Producer};
use crate::pipeline::FullPageArchiver;

/// Default timeout for monolith execution in seconds.
pub const DEFAULT_MONOLITH_TIMEOUT_SECS: u64 = 60;

/// Archive-service domains excluded from asset fetching, to avoid
/// recursive archive references in the snapshot.
const ARCHIVE_ASSET_EXCLUDES: [&str; 9] = [
    "web.archive.org",
    "archive.org",
    "archive.today",
    "archive.is",
    "archive.ph",
    "archive.fo",
    "archive.li",
    "archive.md",
    "archive.vn",
];

/// Configuration for monolith snapshot capture.
#[derive(Debug, Clone)]
pub struct MonolithConfig {
    /// Path to the monolith executable.
    pub path: String,
    /// Timeout for monolith execution.
    pub timeout: Duration,
    /// Whether to include JavaScript in the snapshot.
    pub include_js: bool,
}

impl Default for MonolithConfig {
    fn default() -> Self {
        Self {
            path: "monolith".to_string(),
            timeout: Duration::from_secs(DEFAULT_MONOLITH_TIMEOUT_SECS),
            include_js: false,
        }
    }
}

/// Captures a self-contained HTML snapshot of a URL with monolith.
pub struct MonolithArchiver {
    config: MonolithConfig,
}

impl MonolithArchiver {
    #[must_use]
    pub fn new(config: MonolithConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FullPageArchiver for MonolithArchiver {
    async fn capture(&self, url: &str) -> Result<Vec<u8>, ArchiveError> {
        let staging = tempfile::Builder::new()
            .prefix("kiep-fullpage-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| ArchiveError::io(Producer::FullPage, std::env::temp_dir(), e))?;
        let output_path = staging.path().to_path_buf();

        debug!(url = %url, output = %output_path.display(), "Capturing full page with monolith");

        let mut cmd = Command::new(&self.config.path);
        cmd.arg(url);
        cmd.arg("-o").arg(&output_path);

        // Isolate mode - prevents external requests when viewing the saved file
        cmd.arg("-I");

        // JS is included by default in monolith v3.0+; `-j` excludes it.
        if !self.config.include_js {
            cmd.arg("-j");
        }

        for domain in ARCHIVE_ASSET_EXCLUDES {
            cmd.arg("-B").arg(domain);
        }

        // Network timeout per asset request (seconds)
        cmd.arg("-t").arg("30");
        cmd.arg("-u").arg(ARCHIVAL_USER_AGENT);

        // Capture stdout+stderr. Some monolith errors are printed to stdout.
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        // The output future is dropped on timeout or when the pipeline
        // aborts this producer; the child must die with it rather than
        // keep fetching the network past the end of the run.
        cmd.kill_on_drop(true);

        let output = tokio::time::timeout(self.config.timeout, cmd.output())
            .await
            .map_err(|_| ArchiveError::Timeout {
                producer: Producer::FullPage,
                timeout: self.config.timeout,
            })?
            .map_err(|e| ArchiveError::io(Producer::FullPage, self.config.path.clone(), e))?;

        let snapshot = tokio::fs::read(&output_path).await.unwrap_or_default();

        if !output.status.success() {
            let stderr = truncate_output(&String::from_utf8_lossy(&output.stderr));
            let stdout = truncate_output(&String::from_utf8_lossy(&output.stdout));

            // Monolith can exit non-zero on individual asset failures while
            // still producing a usable snapshot.
            if snapshot.is_empty() {
                return Err(ArchiveError::network(
                    Producer::FullPage,
                    format!(
                        "monolith exited with code {:?} for {url}: {stderr} {stdout}",
                        output.status.code()
                    ),
                ));
            }
            warn!(
                url = %url,
                exit_code = ?output.status.code(),
                stderr = %stderr,
                "Monolith completed with warnings but produced a snapshot"
            );
        }

        if snapshot.is_empty() {
            return Err(ArchiveError::network(
                Producer::FullPage,
                format!("monolith produced no output for {url}"),
            ));
        }

        debug!(url = %url, size = snapshot.len(), "Full-page snapshot captured");
        Ok(snapshot)
    }
}

/// Limit subprocess output kept in error messages and logs.
fn truncate_output(output: &str) -> String {
    const MAX_OUTPUT_LEN: usize = 2000;
    if output.len() > MAX_OUTPUT_LEN {
        let cut = output
            .char_indices()
            .take_while(|(i, _)| *i <= MAX_OUTPUT_LEN)
            .last()
            .map_or(0, |(i, _)| i);
        format!(
            "{}...[truncated {} more chars]",
            &output[..cut],
            output.len() - cut
        )
    } else {
        output.trim().to_string()
    }
}
