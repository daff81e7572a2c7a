//! Utility functions for safe string handling.

/// Clip `&str` to at most `max_chars` characters.
///
/// The prompt cap is defined in characters, not bytes, so this counts
/// codepoints and never splits one.
pub fn clip_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
