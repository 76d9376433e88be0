//! Static header/footer templates for the readable rendering.

use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::error::{ArchiveError, Producer};

/// Default header installed by `kiep init`. Contains exactly one `%s`
/// placeholder, filled with the article title at assembly time.
pub const DEFAULT_HEADER: &str = "<!DOCTYPE html>\n\
<html>\n\
<head>\n\
<meta charset=\"utf-8\">\n\
<title>%s</title>\n\
</head>\n\
<body>\n";

/// Default footer installed by `kiep init`.
pub const DEFAULT_FOOTER: &str = "</body>\n</html>\n";

/// Read a template file in full.
///
/// # Errors
///
/// Returns an I/O error naming `producer` if the file is missing or
/// unreadable. There is no fallback template; this is fatal to the run.
pub async fn load_template(path: &Path, producer: Producer) -> Result<String, ArchiveError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ArchiveError::io(producer, path, e))
}

/// Install the default templates under `{archive_dir}/static/`.
///
/// Existing files are left untouched so local customizations survive
/// re-running `kiep init`.
///
/// # Errors
///
/// Returns an I/O error if the static directory or a template cannot be
/// created.
pub async fn install_static(config: &Config) -> Result<(), ArchiveError> {
    let static_dir = config.static_dir();
    tokio::fs::create_dir_all(&static_dir)
        .await
        .map_err(|e| ArchiveError::io(Producer::HeaderTemplate, &static_dir, e))?;

    install_one(&config.header_path(), DEFAULT_HEADER, Producer::HeaderTemplate).await?;
    install_one(&config.footer_path(), DEFAULT_FOOTER, Producer::FooterTemplate).await?;

    Ok(())
}

async fn install_one(path: &Path, content: &str, producer: Producer) -> Result<(), ArchiveError> {
    if path.exists() {
        info!(path = %path.display(), "Template already installed, keeping existing file");
        return Ok(());
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| ArchiveError::io(producer, path, e))?;
    info!(path = %path.display(), "Template installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_load_missing_template_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = load_template(&temp.path().join("header.html"), Producer::HeaderTemplate)
            .await
            .unwrap_err();
        assert_eq!(err.producer(), Producer::HeaderTemplate);
        assert!(matches!(err, ArchiveError::Io { .. }));
    }

    #[tokio::test]
    async fn test_install_static_creates_both_templates() {
        let temp = TempDir::new().unwrap();
        let config = Config::for_testing(temp.path());

        install_static(&config).await.unwrap();

        let header = load_template(&config.header_path(), Producer::HeaderTemplate)
            .await
            .unwrap();
        let footer = load_template(&config.footer_path(), Producer::FooterTemplate)
            .await
            .unwrap();
        assert_eq!(header, DEFAULT_HEADER);
        assert_eq!(footer, DEFAULT_FOOTER);
        // exactly one title placeholder
        assert_eq!(header.matches("%s").count(), 1);
    }

    #[tokio::test]
    async fn test_install_static_keeps_existing_files() {
        let temp = TempDir::new().unwrap();
        let config = Config::for_testing(temp.path());

        tokio::fs::create_dir_all(config.static_dir()).await.unwrap();
        tokio::fs::write(config.header_path(), "<p>custom %s</p>")
            .await
            .unwrap();

        install_static(&config).await.unwrap();

        let header = tokio::fs::read_to_string(config.header_path()).await.unwrap();
        assert_eq!(header, "<p>custom %s</p>");
    }
}
