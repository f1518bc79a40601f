// SPDX-License-Identifier: GPL-3.0-or-later

//! Candidate-to-catalog matching.
//!
//! Title and artist are scored independently on folded text. An exact field
//! match outscores containment, and an exact match on both fields earns a
//! joint bonus. An item is only a candidate for acceptance when both fields
//! match; the best such item is accepted at or above the acceptance
//! threshold, and ties keep the catalog's ranking order.

use crate::normalization::{normalize, strip_annotations};
use moodtune_catalog::title_parser::parse_artist_title;
use moodtune_config::ScoringConfig;
use moodtune_domain::{Candidate, CatalogItem, CatalogMatch, VideoItem};
use tracing::debug;

/// How well one field matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch {
    None,
    Partial,
    Exact,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogMatcher {
    scoring: ScoringConfig,
}

impl CatalogMatcher {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> ScoringConfig {
        self.scoring
    }

    /// Score a candidate against one catalog item.
    pub fn score(&self, candidate: &Candidate, item: &CatalogItem) -> i32 {
        self.score_fields(&candidate.title, &candidate.artist, &item.title, &item.artists)
    }

    /// Score a (title, artist) pair against an item's title and artist list.
    /// The first artist is the primary one; a match on any other artist
    /// counts as partial at best.
    pub fn score_fields(
        &self,
        title: &str,
        artist: &str,
        item_title: &str,
        item_artists: &[String],
    ) -> i32 {
        self.evaluate(title, artist, item_title, item_artists).0
    }

    /// Whether a score clears the acceptance threshold. Acceptance also
    /// requires both fields to match; see [`CatalogMatcher::best_match`].
    pub fn accepts(&self, score: i32) -> bool {
        score >= self.scoring.accept_threshold
    }

    /// Highest-scoring item that matches on both title and artist, or `None`
    /// when no such item reaches the threshold.
    pub fn best_match(&self, candidate: &Candidate, items: &[CatalogItem]) -> Option<CatalogMatch> {
        let mut best: Option<(i32, &CatalogItem)> = None;
        for item in items {
            let score = self.pair_score(&candidate.title, &candidate.artist, &item.title, &item.artists);
            if let Some(score) = score {
                if best.map_or(true, |(best_score, _)| score > best_score) {
                    best = Some((score, item));
                }
            }
        }

        let Some((score, item)) = best.filter(|(score, _)| self.accepts(*score)) else {
            debug!(
                target: "matching",
                candidate = %candidate.title,
                artist = %candidate.artist,
                items = items.len(),
                "no catalog item matched title and artist"
            );
            return None;
        };

        Some(CatalogMatch {
            catalog_id: item.id.clone(),
            title: item.title.clone(),
            artist: item.primary_artist().unwrap_or_default().to_string(),
            canonical_url: item.canonical_url.clone(),
            score,
        })
    }

    /// Best accepted video for a candidate. Titles of the form
    /// `Artist - Title` are split; otherwise the whole title is compared and
    /// the channel stands in for the artist.
    pub fn best_video(&self, candidate: &Candidate, videos: &[VideoItem]) -> Option<VideoItem> {
        let mut best: Option<(i32, &VideoItem)> = None;
        for video in videos {
            let score = match parse_artist_title(&video.title) {
                Some(parsed) => self.pair_score(
                    &candidate.title,
                    &candidate.artist,
                    &parsed.title,
                    &[parsed.artist, video.channel.clone()],
                ),
                None => self.pair_score(
                    &candidate.title,
                    &candidate.artist,
                    &video.title,
                    std::slice::from_ref(&video.channel),
                ),
            };
            if let Some(score) = score {
                if best.map_or(true, |(best_score, _)| score > best_score) {
                    best = Some((score, video));
                }
            }
        }

        match best {
            Some((score, video)) if self.accepts(score) => Some(video.clone()),
            _ => None,
        }
    }

    /// Score only when neither field is a miss.
    fn pair_score(
        &self,
        title: &str,
        artist: &str,
        item_title: &str,
        item_artists: &[String],
    ) -> Option<i32> {
        match self.evaluate(title, artist, item_title, item_artists) {
            (score, true) => Some(score),
            (_, false) => None,
        }
    }

    fn evaluate(
        &self,
        title: &str,
        artist: &str,
        item_title: &str,
        item_artists: &[String],
    ) -> (i32, bool) {
        let title_match = match_titles(title, item_title);
        let artist_match = match_artists(artist, item_artists);

        let mut score = self.points(title_match) + self.points(artist_match);
        if title_match == FieldMatch::Exact && artist_match == FieldMatch::Exact {
            score += self.scoring.joint_bonus;
        }
        let both = title_match != FieldMatch::None && artist_match != FieldMatch::None;
        (score, both)
    }

    fn points(&self, field: FieldMatch) -> i32 {
        match field {
            FieldMatch::None => 0,
            FieldMatch::Partial => self.scoring.partial_match,
            FieldMatch::Exact => self.scoring.exact_match,
        }
    }
}

fn match_titles(left: &str, right: &str) -> FieldMatch {
    match compare(&normalize(left), &normalize(right)) {
        FieldMatch::Exact => FieldMatch::Exact,
        _ => {
            let left = normalize(&strip_annotations(left));
            let right = normalize(&strip_annotations(right));
            compare(&left, &right)
        }
    }
}

fn match_artists(artist: &str, item_artists: &[String]) -> FieldMatch {
    let artist = normalize(artist);
    let mut folded = item_artists.iter().map(|name| normalize(name));

    let primary = match folded.next() {
        Some(primary) => compare(&artist, &primary),
        None => return FieldMatch::None,
    };
    if primary != FieldMatch::None {
        return primary;
    }

    if folded.any(|other| compare(&artist, &other) != FieldMatch::None) {
        FieldMatch::Partial
    } else {
        FieldMatch::None
    }
}

fn compare(left: &str, right: &str) -> FieldMatch {
    if left.is_empty() || right.is_empty() {
        FieldMatch::None
    } else if left == right {
        FieldMatch::Exact
    } else if left.contains(right) || right.contains(left) {
        FieldMatch::Partial
    } else {
        FieldMatch::None
    }
}
