use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::fullpage::MonolithConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory all archives and static templates live under.
    pub archive_dir: PathBuf,

    // HTTP
    pub http_timeout: Duration,

    // Orchestration
    pub producer_timeout: Duration,

    // Full-page snapshot (monolith)
    pub monolith_path: String,
    pub monolith_timeout: Duration,
    pub monolith_include_js: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            archive_dir: resolve_archive_dir(),
            http_timeout: Duration::from_secs(parse_env_u64("KIEP_HTTP_TIMEOUT_SECS", 30)?),
            producer_timeout: Duration::from_secs(parse_env_u64("KIEP_PRODUCER_TIMEOUT_SECS", 120)?),
            monolith_path: env_or_default("KIEP_MONOLITH_PATH", "monolith"),
            monolith_timeout: Duration::from_secs(parse_env_u64("KIEP_MONOLITH_TIMEOUT_SECS", 60)?),
            monolith_include_js: parse_env_bool("KIEP_MONOLITH_INCLUDE_JS", false)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.archive_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "KIEP_ARCHIVE_DIR".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.producer_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "KIEP_PRODUCER_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "KIEP_HTTP_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Directory static templates are read from.
    #[must_use]
    pub fn static_dir(&self) -> PathBuf {
        self.archive_dir.join("static")
    }

    #[must_use]
    pub fn header_path(&self) -> PathBuf {
        self.static_dir().join("header.html")
    }

    #[must_use]
    pub fn footer_path(&self) -> PathBuf {
        self.static_dir().join("footer.html")
    }

    #[must_use]
    pub fn monolith_config(&self) -> MonolithConfig {
        MonolithConfig {
            path: self.monolith_path.clone(),
            timeout: self.monolith_timeout,
            include_js: self.monolith_include_js,
        }
    }

    /// Configuration for tests: short timeouts, archive root under a temp dir.
    #[must_use]
    pub fn for_testing(archive_dir: &Path) -> Self {
        Self {
            archive_dir: archive_dir.to_path_buf(),
            http_timeout: Duration::from_secs(5),
            producer_timeout: Duration::from_secs(10),
            monolith_path: "monolith".to_string(),
            monolith_timeout: Duration::from_secs(5),
            monolith_include_js: false,
        }
    }
}

/// Resolve the archive root directory.
///
/// Precedence: `KIEP_ARCHIVE_DIR`, then `XDG_DOCUMENTS_DIR`/kiep, then
/// `$HOME`/Documents/kiep. This is the single place the lookup happens;
/// every consumer goes through [`Config`].
#[must_use]
pub fn resolve_archive_dir() -> PathBuf {
    if let Some(dir) = optional_env("KIEP_ARCHIVE_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(docs) = optional_env("XDG_DOCUMENTS_DIR") {
        return PathBuf::from(docs).join("kiep");
    }
    PathBuf::from(env_or_default("HOME", ".")).join("Documents/kiep")
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}
