//! Readability boundary: distill a page into its main article content.

use dom_smoothie::{Config as ReadabilityConfig, Readability};

use crate::error::{ArchiveError, Producer};

/// The two readable renderings of an article.
#[derive(Debug, Clone)]
pub struct ReadableContent {
    /// Plain-text body.
    pub plain: String,
    /// Cleaned HTML fragment, navigation and chrome stripped.
    pub html: String,
}

/// Run readability extraction on the downloaded page.
///
/// The URL is used to resolve relative links in the cleaned fragment.
///
/// # Errors
///
/// Returns a parse error if the document cannot be processed or no article
/// content can be identified.
pub fn make_readable(html: &str, url: &str) -> Result<ReadableContent, ArchiveError> {
    let cfg = ReadabilityConfig::default();

    let mut readability = Readability::new(html, Some(url), Some(cfg))
        .map_err(|e| ArchiveError::parse(Producer::Readability, e))?;
    let article = readability
        .parse()
        .map_err(|e| ArchiveError::parse(Producer::Readability, e))?;

    Ok(ReadableContent {
        plain: article.text_content.to_string(),
        html: article.content.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_readable_extracts_article_body() {
        let paragraph = "The quick brown fox jumps over the lazy dog. ".repeat(30);
        let html = format!(
            r#"<html>
                <head><title>Fox News of the Day</title></head>
                <body>
                    <nav><a href="/">home</a><a href="/about">about</a></nav>
                    <article>
                        <p>{paragraph}</p>
                        <p>{paragraph}</p>
                    </article>
                    <footer>copyright</footer>
                </body>
            </html>"#
        );

        let readable = make_readable(&html, "https://example.com/fox").unwrap();
        assert!(readable.plain.contains("quick brown fox"));
        assert!(readable.html.contains("<p>"));
    }
}
