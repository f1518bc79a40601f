// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{CatalogError, Result};
use crate::traits::VideoSearch;
use async_trait::async_trait;
use lazy_static::lazy_static;
use moodtune_domain::{LanguageMode, VideoItem};
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, trace};
use url::Url;

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const MUSIC_CATEGORY_ID: &str = "10";
const MAX_SEARCH_RESULTS: usize = 25;

lazy_static! {
    static ref ISO8601_DURATION: Regex =
        Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").unwrap();
}

const BLOCKED_TITLE_WORDS: &[&str] = &[
    "shorts", "tiktok", "meme", "prank", "reaction", "edit", "trailer",
];

const GLOBAL_MUSIC_HINTS: &[&str] = &[
    "music", "lofi", "lo-fi", "beat", "beats", "instrumental", "study", "focus", "ambient",
    "classical", "piano", "soundtrack", "playlist", "mix", "official", "audio", "lyrics",
];

const TARGET_MUSIC_HINTS: &[&str] = &[
    "müzik", "muzik", "enstrümantal", "ders", "çalış", "calis", "odak", "konsantrasyon", "piyano",
    "lofi", "mix", "playlist", "şarkı", "sarki", "klip",
];

/// Rules a video must satisfy to count as a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoFilter {
    pub min_duration_secs: u32,
    pub max_duration_secs: u32,
}

impl Default for VideoFilter {
    fn default() -> Self {
        Self {
            min_duration_secs: 90,
            max_duration_secs: 8 * 60,
        }
    }
}

impl VideoFilter {
    /// Duration must be in range. Target-language mode requires the Music
    /// category; global mode also accepts music-like titles.
    pub fn accepts(&self, video: &VideoItem, mode: LanguageMode) -> bool {
        let in_range = (self.min_duration_secs..=self.max_duration_secs)
            .contains(&video.duration_seconds);
        if !in_range {
            return false;
        }

        let is_music_category = video.category_id == MUSIC_CATEGORY_ID;
        if mode.is_target() {
            is_music_category
        } else {
            is_music_category || is_music_like_title(&video.title, mode)
        }
    }
}

/// Title heuristic for videos outside the Music category.
pub fn is_music_like_title(title: &str, mode: LanguageMode) -> bool {
    let title = title.to_lowercase();

    if BLOCKED_TITLE_WORDS.iter().any(|word| title.contains(word)) {
        return false;
    }

    let hints = if mode.is_target() {
        TARGET_MUSIC_HINTS
    } else {
        GLOBAL_MUSIC_HINTS
    };
    hints.iter().any(|hint| title.contains(hint))
}

/// Convert an ISO-8601 `PT#H#M#S` duration to seconds; anything else is 0.
pub fn parse_iso8601_duration(value: &str) -> u32 {
    let Some(captures) = ISO8601_DURATION.captures(value.trim()) else {
        return 0;
    };
    let part = |index: usize| -> u32 {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };
    part(1)
        .saturating_mul(3600)
        .saturating_add(part(2).saturating_mul(60))
        .saturating_add(part(3))
}

/// YouTube Data API client that only returns verified music videos.
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_results: usize,
    target_region: String,
    filter: VideoFilter,
}

impl YoutubeClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> YoutubeClientBuilder {
        YoutubeClientBuilder::new(api_key)
    }

    /// Search, fetch details, and keep the videos accepted by the filter,
    /// in search relevance order.
    #[instrument(skip(self))]
    pub async fn verified_music_videos(
        &self,
        query: &str,
        mode: LanguageMode,
    ) -> Result<Vec<VideoItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let snippets = self.search_snippets(query, mode).await?;
        if snippets.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<&str> = Vec::new();
        for snippet in &snippets {
            if !ids.contains(&snippet.id.as_str()) {
                ids.push(snippet.id.as_str());
            }
        }
        let details = self.video_details(&ids).await?;

        let videos: Vec<VideoItem> = snippets
            .iter()
            .filter_map(|snippet| {
                let detail = details.get(&snippet.id)?;
                Some(VideoItem {
                    id: snippet.id.clone(),
                    title: snippet.title.clone(),
                    channel: snippet.channel.clone(),
                    duration_seconds: detail.duration_seconds,
                    category_id: detail.category_id.clone(),
                })
            })
            .filter(|video| self.filter.accepts(video, mode))
            .collect();

        debug!(
            target: "youtube",
            candidates = snippets.len(),
            verified = videos.len(),
            "music video verification complete"
        );

        Ok(videos)
    }

    async fn search_snippets(&self, query: &str, mode: LanguageMode) -> Result<Vec<Snippet>> {
        let (region, relevance_language) = if mode.is_target() {
            (self.target_region.clone(), self.target_region.to_lowercase())
        } else {
            ("US".to_string(), "en".to_string())
        };
        let max_results = (self.max_results * 4).clamp(1, MAX_SEARCH_RESULTS);

        let mut url = self.endpoint("search")?;
        url.query_pairs_mut()
            .append_pair("part", "snippet")
            .append_pair("type", "video")
            .append_pair("maxResults", &max_results.to_string())
            .append_pair("q", query)
            .append_pair("regionCode", &region)
            .append_pair("relevanceLanguage", &relevance_language)
            .append_pair("key", &self.api_key);

        let page: SearchPage = self.get(url).await?;

        Ok(page
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?.trim().to_string();
                let snippet = item.snippet?;
                let title = snippet.title.unwrap_or_default().trim().to_string();
                if id.is_empty() || title.is_empty() {
                    return None;
                }
                Some(Snippet {
                    id,
                    title,
                    channel: snippet.channel_title.unwrap_or_default().trim().to_string(),
                })
            })
            .collect())
    }

    async fn video_details(&self, ids: &[&str]) -> Result<HashMap<String, VideoDetail>> {
        let mut url = self.endpoint("videos")?;
        url.query_pairs_mut()
            .append_pair("part", "contentDetails,snippet")
            .append_pair("id", &ids.join(","))
            .append_pair("key", &self.api_key);

        let page: VideosPage = self.get(url).await?;

        Ok(page
            .items
            .into_iter()
            .filter_map(|item| {
                let category_id = item.snippet?.category_id?.trim().to_string();
                let duration = item.content_details?.duration?;
                if item.id.trim().is_empty() || category_id.is_empty() {
                    return None;
                }
                Some((
                    item.id.trim().to_string(),
                    VideoDetail {
                        duration_seconds: parse_iso8601_duration(&duration),
                        category_id,
                    },
                ))
            })
            .collect())
    }

    fn endpoint(&self, resource: &str) -> Result<Url> {
        Url::parse(&format!("{}/{}", self.base_url, resource))
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        trace!(target: "youtube", "GET {}", url.path());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!(target: "youtube", "response status: {}", status);

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            CatalogError::InvalidResponse(format!("Failed to parse response: {}", e))
        })
    }
}

#[async_trait]
impl VideoSearch for YoutubeClient {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn search_music_videos(
        &self,
        query: &str,
        mode: LanguageMode,
    ) -> Result<Vec<VideoItem>> {
        self.verified_music_videos(query, mode).await
    }
}

#[derive(Debug)]
struct Snippet {
    id: String,
    title: String,
    channel: String,
}

#[derive(Debug)]
struct VideoDetail {
    duration_seconds: u32,
    category_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Option<SearchSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    title: Option<String>,
    channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosPage {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    snippet: Option<VideoSnippet>,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    category_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

/// Builder for configuring a YouTube client.
#[derive(Debug)]
pub struct YoutubeClientBuilder {
    api_key: String,
    base_url: String,
    max_results: usize,
    target_region: String,
    filter: VideoFilter,
    timeout: Duration,
}

impl YoutubeClientBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: YOUTUBE_API_BASE.to_string(),
            max_results: 10,
            target_region: "TR".to_string(),
            filter: VideoFilter::default(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Region code used in target-language mode.
    pub fn target_region(mut self, region: impl Into<String>) -> Self {
        self.target_region = region.into();
        self
    }

    pub fn filter(mut self, filter: VideoFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<YoutubeClient> {
        if self.api_key.trim().is_empty() {
            return Err(CatalogError::NotConfigured(
                "youtube api key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(YoutubeClient {
            client,
            base_url: self.base_url,
            api_key: self.api_key,
            max_results: self.max_results,
            target_region: self.target_region,
            filter: self.filter,
        })
    }
}
