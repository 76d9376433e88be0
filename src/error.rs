//! Error taxonomy for the archival pipeline.
//!
//! Every fallible producer returns an [`ArchiveError`] carrying a [`Producer`]
//! discriminant, so a failed run always names which stage broke. All errors
//! are fatal to the run; the pipeline never retries.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Producer {
    /// Raw page download.
    Download,
    /// Remote permanent-archive submission.
    Snapshot,
    /// Full-page offline snapshot capture.
    FullPage,
    /// Header template load.
    HeaderTemplate,
    /// Footer template load.
    FooterTemplate,
    /// Readability derivation.
    Readability,
    /// Bundle persistence.
    Persist,
}

impl fmt::Display for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Download => "page download",
            Self::Snapshot => "snapshot request",
            Self::FullPage => "full-page archive",
            Self::HeaderTemplate => "header template load",
            Self::FooterTemplate => "footer template load",
            Self::Readability => "readability extraction",
            Self::Persist => "bundle persistence",
        };
        f.write_str(name)
    }
}

/// Fatal pipeline error.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("network error in {producer}: {message}")]
    Network { producer: Producer, message: String },

    #[error("I/O error in {producer} at {path}: {source}")]
    Io {
        producer: Producer,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {producer}: {message}")]
    Parse { producer: Producer, message: String },

    #[error("{producer} timed out after {timeout:?}")]
    Timeout { producer: Producer, timeout: Duration },

    #[error("{producer} task did not complete: {message}")]
    Task { producer: Producer, message: String },
}

impl ArchiveError {
    pub fn network(producer: Producer, message: impl fmt::Display) -> Self {
        Self::Network {
            producer,
            message: message.to_string(),
        }
    }

    pub fn io(producer: Producer, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            producer,
            path: path.into(),
            source,
        }
    }

    pub fn parse(producer: Producer, message: impl fmt::Display) -> Self {
        Self::Parse {
            producer,
            message: message.to_string(),
        }
    }

    /// The producer that failed.
    #[must_use]
    pub fn producer(&self) -> Producer {
        match self {
            Self::Network { producer, .. }
            | Self::Io { producer, .. }
            | Self::Parse { producer, .. }
            | Self::Timeout { producer, .. }
            | Self::Task { producer, .. } => *producer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_producer() {
        let err = ArchiveError::network(Producer::Snapshot, "service unavailable");
        assert_eq!(err.producer(), Producer::Snapshot);
        assert!(err.to_string().contains("snapshot request"));
    }

    #[test]
    fn test_io_error_carries_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ArchiveError::io(Producer::HeaderTemplate, "/tmp/header.html", source);
        assert_eq!(err.producer(), Producer::HeaderTemplate);
        assert!(err.to_string().contains("header.html"));
    }
}
