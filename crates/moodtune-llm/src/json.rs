// SPDX-License-Identifier: GPL-3.0-or-later

//! Bracket-scanning extraction of JSON payloads from free-form model output.

/// Slice from the first `{` to the last `}` (inclusive), trimmed.
///
/// Returns `None` when either bracket is missing or they are out of order.
pub fn extract_json_object(text: &str) -> Option<&str> {
    extract_between(text, '{', '}')
}

/// Slice from the first `[` to the last `]` (inclusive), trimmed.
pub fn extract_json_array(text: &str) -> Option<&str> {
    extract_between(text, '[', ']')
}

fn extract_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(text[start..=end].trim())
}
