// SPDX-License-Identifier: GPL-3.0-or-later

//! Split video titles of the form `Artist - Title` / `Artist | Title`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PARENTHESIZED: Regex = Regex::new(r"\(.*?\)").unwrap();
    static ref BRACKETED: Regex = Regex::new(r"\[.*?\]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub artist: String,
    pub title: String,
}

/// Parse a video title after dropping `(...)` and `[...]` annotations.
///
/// Returns `None` when no separator is found or either side is blank.
pub fn parse_artist_title(video_title: &str) -> Option<ParsedTitle> {
    let cleaned = PARENTHESIZED.replace_all(video_title, " ");
    let cleaned = BRACKETED.replace_all(&cleaned, " ");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim();

    [" - ", " | "]
        .iter()
        .find_map(|separator| split_once_non_blank(cleaned, separator))
}

fn split_once_non_blank(text: &str, separator: &str) -> Option<ParsedTitle> {
    let (artist, title) = text.split_once(separator)?;
    let artist = artist.trim();
    let title = title.trim();
    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some(ParsedTitle {
        artist: artist.to_string(),
        title: title.to_string(),
    })
}
