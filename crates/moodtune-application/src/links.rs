// SPDX-License-Identifier: GPL-3.0-or-later

//! Search links used when a catalog could not confirm a track.

use crate::normalization::strip_annotations;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const PRIMARY_SEARCH_BASE: &str = "https://open.spotify.com/search/";
const SECONDARY_SEARCH_BASE: &str = "https://www.youtube.com/results?search_query=";

const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Free-text query `"<title> <artist>"`.
pub fn search_query(title: &str, artist: &str) -> String {
    format!("{} {}", title.trim(), artist.trim()).trim().to_string()
}

/// Field-qualified primary catalog query; the artist clause is omitted when blank.
pub fn catalog_query(title: &str, artist: &str) -> String {
    let title = strip_annotations(title);
    let artist = artist.trim();
    if artist.is_empty() {
        format!("track:\"{}\"", title)
    } else {
        format!("track:\"{}\" artist:\"{}\"", title, artist)
    }
}

pub fn primary_search_link(title: &str, artist: &str) -> String {
    format!("{}{}", PRIMARY_SEARCH_BASE, encode(&search_query(title, artist)))
}

pub fn secondary_search_link(title: &str, artist: &str) -> String {
    format!("{}{}", SECONDARY_SEARCH_BASE, encode(&search_query(title, artist)))
}

fn encode(query: &str) -> String {
    utf8_percent_encode(query, COMPONENT).to_string()
}
