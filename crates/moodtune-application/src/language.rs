// SPDX-License-Identifier: GPL-3.0-or-later

//! Target-language detection for (title, artist) pairs.
//!
//! Signals, strongest first:
//! 1. the artist is on a curated whitelist
//! 2. the text uses a character specific to the language
//! 3. a token of the text is a common word of the language

use crate::normalization::normalize;
use moodtune_config::TargetLanguageSignals;
use std::collections::HashSet;

/// Pure classifier; holds only folded lookup tables.
#[derive(Debug, Clone)]
pub struct LanguageHeuristic {
    artists: Vec<String>,
    hint_words: HashSet<String>,
    characters: Vec<char>,
}

impl LanguageHeuristic {
    pub fn new<'a>(
        artists: impl IntoIterator<Item = &'a str>,
        hint_words: impl IntoIterator<Item = &'a str>,
        characters: &str,
    ) -> Self {
        let mut folded_artists: Vec<String> = Vec::new();
        for artist in artists.into_iter().map(normalize) {
            if !artist.is_empty() && !folded_artists.contains(&artist) {
                folded_artists.push(artist);
            }
        }

        Self {
            artists: folded_artists,
            hint_words: hint_words
                .into_iter()
                .map(normalize)
                .filter(|word| !word.is_empty())
                .collect(),
            characters: characters.chars().collect(),
        }
    }

    pub fn from_signals(signals: &TargetLanguageSignals) -> Self {
        Self::new(
            signals.artists.iter().map(String::as_str),
            signals.hint_words.iter().map(String::as_str),
            &signals.characters,
        )
    }

    /// Heuristic for the default target language (Turkish).
    pub fn turkish() -> Self {
        Self::from_signals(&TargetLanguageSignals::default())
    }

    pub fn is_probably_target_language(&self, title: &str, artist: &str) -> bool {
        let folded_artist = normalize(artist);
        if !folded_artist.is_empty() {
            let padded = format!(" {} ", folded_artist);
            if self
                .artists
                .iter()
                .any(|known| padded.contains(&format!(" {} ", known)))
            {
                return true;
            }
        }

        if title
            .chars()
            .chain(artist.chars())
            .any(|c| self.characters.contains(&c))
        {
            return true;
        }

        normalize(&format!("{} {}", title, artist))
            .split_whitespace()
            .any(|token| self.hint_words.contains(token))
    }

    /// Stable reorder putting probable target-language items first.
    pub fn prioritise<T, F>(&self, items: Vec<T>, title_artist: F) -> Vec<T>
    where
        F: Fn(&T) -> (&str, &str),
    {
        let (mut target, other): (Vec<T>, Vec<T>) = items.into_iter().partition(|item| {
            let (title, artist) = title_artist(item);
            self.is_probably_target_language(title, artist)
        });
        target.extend(other);
        target
    }
}

impl Default for LanguageHeuristic {
    fn default() -> Self {
        Self::turkish()
    }
}
