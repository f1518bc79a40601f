// SPDX-License-Identifier: GPL-3.0-or-later

//! Case- and diacritic-insensitive text folding used for matching and
//! deduplication.

use lazy_static::lazy_static;
use moodtune_domain::Track;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref ANNOTATIONS: Regex = Regex::new(r"\s*[\(\[][^\)\]]*[\)\]]").unwrap();
}

/// Fold `text` for comparison.
///
/// Lowercases, strips diacritics (dotless `ı` folds to `i`), drops anything
/// that is not a letter, digit or whitespace, and collapses whitespace.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace('ı', "i")
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove `(Remastered 2011)` / `[Live]` style annotations from a title.
pub fn strip_annotations(title: &str) -> String {
    let stripped = ANNOTATIONS.replace_all(title, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        title.trim().to_string()
    } else {
        stripped.to_string()
    }
}

/// Dedup key for generated candidates.
pub fn candidate_key(title: &str, artist: &str) -> String {
    format!("{}|{}", normalize(title), normalize(artist))
}

/// Dedup key for output tracks.
pub fn track_key(artist: &str, title: &str) -> String {
    format!("{}|{}", normalize(artist), normalize(title))
}

/// Keep the first track per folded `artist|title`.
pub fn dedup_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|track| seen.insert(track_key(&track.artist, &track.title)))
        .collect()
}
