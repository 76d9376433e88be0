//! Shared constants.

/// User agent sent on every outbound archival request: the page download,
/// the Wayback submission, and monolith's asset fetching.
///
/// A current desktop browser string. Sites that sniff bot agents serve
/// stripped-down or blocked responses, which would poison the archive.
pub const ARCHIVAL_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
