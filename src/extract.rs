//! Title/author extraction from raw page markup.
//!
//! This is deliberately shallow: it walks the parsed document once and picks
//! up a small set of metadata hints. Anything it does not find is simply left
//! empty; full content extraction is the readability collaborator's job.

use scraper::{Html, Node};

/// Metadata hints scraped from page markup. Fields are empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub author: String,
}

/// Scan the page for title and author hints.
///
/// Walks element nodes in document order, no early termination:
///
/// - `<meta>` tags are matched on their `name`/`property` attribute
///   (`author` fills the author, `og:title` the title); a missing `content`
///   attribute means no capture.
/// - `<title>` captures its first text child.
///
/// For the title, the first occurrence wins across both sources, so
/// duplicate `<title>` tags are harmless.
#[must_use]
pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);
    let mut meta = PageMetadata::default();

    for node in document.tree.root().descendants() {
        let Node::Element(element) = node.value() else {
            continue;
        };

        match element.name() {
            "meta" => {
                let key = element
                    .attr("name")
                    .or_else(|| element.attr("property"))
                    .unwrap_or("");
                let Some(content) = element.attr("content") else {
                    continue;
                };
                match key {
                    "author" if meta.author.is_empty() => {
                        meta.author = content.trim().to_string();
                    }
                    "og:title" if meta.title.is_empty() => {
                        meta.title = content.trim().to_string();
                    }
                    _ => {}
                }
            }
            "title" if meta.title.is_empty() => {
                let text = node.children().find_map(|child| match child.value() {
                    Node::Text(text) => Some(text.trim().to_string()),
                    _ => None,
                });
                if let Some(text) = text {
                    meta.title = text;
                }
            }
            _ => {}
        }
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_and_author() {
        let html = r#"
            <html>
                <head>
                    <title>The Title</title>
                    <meta name="author" content="Jane Doe">
                </head>
                <body><p>Hello</p></body>
            </html>
        "#;
        let meta = extract_metadata(html);
        assert_eq!(meta.title, "The Title");
        assert_eq!(meta.author, "Jane Doe");
    }

    #[test]
    fn test_first_title_wins() {
        let html = "<html><head><title>A</title><title>B</title></head></html>";
        assert_eq!(extract_metadata(html).title, "A");
    }

    #[test]
    fn test_og_title_before_title_tag_wins() {
        let html = r#"
            <html><head>
                <meta property="og:title" content="OG Title">
                <title>Plain Title</title>
            </head></html>
        "#;
        assert_eq!(extract_metadata(html).title, "OG Title");
    }

    #[test]
    fn test_og_title_does_not_overwrite_earlier_title() {
        let html = r#"
            <html><head>
                <title>Plain Title</title>
                <meta property="og:title" content="OG Title">
            </head></html>
        "#;
        assert_eq!(extract_metadata(html).title, "Plain Title");
    }

    #[test]
    fn test_missing_metadata_leaves_fields_empty() {
        let html = "<html><body><p>no head at all</p></body></html>";
        let meta = extract_metadata(html);
        assert!(meta.title.is_empty());
        assert!(meta.author.is_empty());
    }

    #[test]
    fn test_meta_without_content_attribute_is_ignored() {
        // Name-keyed lookup: a malformed meta tag must not capture anything
        // or panic the way positional attribute indexing would.
        let html = r#"<html><head><meta name="author"></head></html>"#;
        let meta = extract_metadata(html);
        assert!(meta.author.is_empty());
    }

    #[test]
    fn test_unrelated_meta_tags_are_ignored() {
        let html = r#"
            <html><head>
                <meta charset="utf-8">
                <meta name="viewport" content="width=device-width">
                <meta name="description" content="A page">
            </head></html>
        "#;
        assert_eq!(extract_metadata(html), PageMetadata::default());
    }

    #[test]
    fn test_traversal_reaches_body_meta_tags() {
        // Malformed pages sometimes carry meta tags outside <head>; the walk
        // covers all descendants regardless.
        let html = r#"<html><body><meta name="author" content="Deep Author"></body></html>"#;
        assert_eq!(extract_metadata(html).author, "Deep Author");
    }
}
