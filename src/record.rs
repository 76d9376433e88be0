//! The article record accumulated over one pipeline run.

use chrono::{DateTime, Local};

/// Calendar format used for the metadata record and directory names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Metadata for one archived article.
///
/// Each field is written exactly once, by a single owner: `url`, `tags` and
/// `captured_at` at construction, `title` and `author` by metadata
/// extraction, `archived_url` by the snapshot producer. The record is never
/// shared across tasks; the orchestrator joins all owners before it is
/// serialized.
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub url: String,
    pub archived_url: String,
    pub captured_at: DateTime<Local>,
    pub tags: Vec<String>,
    pub author: String,
    pub title: String,
}

impl ArticleRecord {
    /// Start a record at the current wall-clock time.
    #[must_use]
    pub fn new(url: &str, tags: Vec<String>) -> Self {
        Self {
            url: url.to_string(),
            archived_url: String::new(),
            captured_at: Local::now(),
            tags,
            author: String::new(),
            title: String::new(),
        }
    }

    /// Render the sidecar `.meta` record.
    ///
    /// Line-oriented `key=value`, fixed field order. Deterministic for a
    /// given record.
    #[must_use]
    pub fn render_meta(&self) -> String {
        format!(
            "title={}\ntags=[{}]\ndate={}\nauthor={}\nurl={}\narchived={}\n",
            self.title,
            self.tags.join(" | "),
            self.captured_at.format(DATE_FORMAT),
            self.author,
            self.url,
            self.archived_url,
        )
    }

    /// Destination directory name: `{date}-{title}`.
    ///
    /// An empty title degenerates to `{date}-`; collisions are resolved at
    /// commit time by appending a counter.
    #[must_use]
    pub fn dir_name(&self) -> String {
        format!(
            "{}-{}",
            self.captured_at.format(DATE_FORMAT),
            sanitize_title(&self.title)
        )
    }
}

/// Make a title safe for use as a directory-name component.
///
/// Path separators and control characters become underscores; everything
/// else, including spaces, is kept as-is.
fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_record() -> ArticleRecord {
        ArticleRecord {
            url: "https://example.com/post".to_string(),
            archived_url: "https://web.archive.org/web/20240101000000/https://example.com/post"
                .to_string(),
            captured_at: Local.with_ymd_and_hms(2024, 3, 9, 12, 30, 0).unwrap(),
            tags: vec!["rust".to_string(), "archival".to_string()],
            author: "Jane Doe".to_string(),
            title: "Example Post".to_string(),
        }
    }

    #[test]
    fn test_render_meta_fixed_order() {
        let meta = fixed_record().render_meta();
        assert_eq!(
            meta,
            "title=Example Post\n\
             tags=[rust | archival]\n\
             date=2024-03-09\n\
             author=Jane Doe\n\
             url=https://example.com/post\n\
             archived=https://web.archive.org/web/20240101000000/https://example.com/post\n"
        );
    }

    #[test]
    fn test_render_meta_is_deterministic() {
        let record = fixed_record();
        assert_eq!(record.render_meta(), record.render_meta());
    }

    #[test]
    fn test_render_meta_tolerates_empty_fields() {
        let mut record = fixed_record();
        record.title = String::new();
        record.author = String::new();
        record.archived_url = String::new();
        record.tags = Vec::new();
        let meta = record.render_meta();
        assert!(meta.contains("title=\n"));
        assert!(meta.contains("tags=[]\n"));
        assert!(meta.contains("author=\n"));
        assert!(meta.ends_with("archived=\n"));
    }

    #[test]
    fn test_dir_name() {
        assert_eq!(fixed_record().dir_name(), "2024-03-09-Example Post");
    }

    #[test]
    fn test_dir_name_empty_title() {
        let mut record = fixed_record();
        record.title = String::new();
        assert_eq!(record.dir_name(), "2024-03-09-");
    }

    #[test]
    fn test_dir_name_strips_path_separators() {
        let mut record = fixed_record();
        record.title = "TCP/IP in depth".to_string();
        assert_eq!(record.dir_name(), "2024-03-09-TCP_IP in depth");
    }
}
