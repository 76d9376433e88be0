//! Final body assembly: templates around the readable rendering.

/// Assemble the final HTML body.
///
/// Fixed order: header (with the title substituted into its single `%s`
/// placeholder), an `<h1>` title banner, the cleaned article fragment, then
/// the footer. An empty title substitutes as the empty string.
#[must_use]
pub fn assemble_html(header: &str, footer: &str, title: &str, body: &str) -> String {
    let header = header.replacen("%s", title, 1);
    format!("{header}<h1>{title}</h1><hr>{body}{footer}")
}
