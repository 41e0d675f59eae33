//! Shared utility functions used across multiple modules.

/// Maximum number of body characters carried into an error message.
pub const BODY_SNIPPET_CHARS: usize = 200;

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate a response body to at most [`BODY_SNIPPET_CHARS`] characters.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(BODY_SNIPPET_CHARS).collect()
}
