//! Destination file-name derivation from URLs.

use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use url::Url;

use super::constants::FALLBACK_NAME_PREFIX;

/// Derives the destination file name from the final path segment of `url`.
///
/// The segment is percent-decoded and sanitized. A URL without a usable
/// segment (root path, `.`, `..`, bare separators, unparseable URL) gets a
/// time-derived `file_<nanoseconds>` name instead.
#[must_use]
pub fn derive_file_name(url: &str) -> String {
    last_path_segment(url)
        .filter(|segment| !is_degenerate_segment(segment))
        .map(|segment| sanitize_filename(&segment))
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(fallback_file_name)
}

/// Time-derived fallback name with sub-second resolution.
pub(crate) fn fallback_file_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{FALLBACK_NAME_PREFIX}{nanos}")
}

fn last_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), Cow::into_owned);
    Some(decoded)
}

fn is_degenerate_segment(segment: &str) -> bool {
    let trimmed = segment.trim_matches(|c| c == '/' || c == '\\');
    trimmed.is_empty() || trimmed == "." || trimmed == ".."
}

/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > | and control characters.
pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
