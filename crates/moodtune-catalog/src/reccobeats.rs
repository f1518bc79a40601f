// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{CatalogError, Result};
use crate::traits::SeedRecommender;
use async_trait::async_trait;
use moodtune_domain::RecommendedItem;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};
use url::Url;

const RECCOBEATS_API_BASE: &str = "https://api.reccobeats.com/v1";

/// ReccoBeats seed-based recommendation client. No authentication.
#[derive(Debug, Clone)]
pub struct ReccoBeatsClient {
    client: Client,
    base_url: String,
    max_size: usize,
}

impl ReccoBeatsClient {
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ReccoBeatsClientBuilder {
        ReccoBeatsClientBuilder::default()
    }

    /// Fetch up to `size` recommendations for the given catalog track IDs.
    /// Duplicate seeds are sent once; an empty seed list makes no request.
    #[instrument(skip(self, seed_ids), fields(seeds = seed_ids.len()))]
    pub async fn recommendations(
        &self,
        seed_ids: &[String],
        size: usize,
    ) -> Result<Vec<RecommendedItem>> {
        let mut seeds: Vec<&str> = Vec::new();
        for id in seed_ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
            if !seeds.contains(&id) {
                seeds.push(id);
            }
        }
        if seeds.is_empty() {
            return Ok(Vec::new());
        }

        let size = size.clamp(1, self.max_size);
        let mut url = Url::parse(&format!("{}/track/recommendation", self.base_url))
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        url.query_pairs_mut().append_pair("size", &size.to_string());
        for seed in &seeds {
            url.query_pairs_mut().append_pair("seeds", seed);
        }

        trace!(target: "reccobeats", "GET {}", url);

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        debug!(target: "reccobeats", "response status: {}", status);

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
        parse_recommendations(&body)
    }
}

#[async_trait]
impl SeedRecommender for ReccoBeatsClient {
    fn name(&self) -> &str {
        "reccobeats"
    }

    async fn recommend(&self, seed_ids: &[String], size: usize) -> Result<Vec<RecommendedItem>> {
        self.recommendations(seed_ids, size).await
    }
}

/// Accepts a bare array, a `{ "content": [...] }` page, or a single track.
pub(crate) fn parse_recommendations(body: &str) -> Result<Vec<RecommendedItem>> {
    let payload: Payload = serde_json::from_str(body).map_err(|e| {
        warn!(target: "reccobeats", error = %e, "unparseable recommendation payload");
        CatalogError::InvalidResponse(format!("Failed to parse recommendations: {}", e))
    })?;

    let tracks = match payload {
        Payload::List(tracks) => tracks,
        Payload::Page { content } => content,
        Payload::Single(track) => vec![track],
    };

    Ok(tracks.into_iter().map(ReccoTrack::into_item).collect())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    List(Vec<ReccoTrack>),
    Page { content: Vec<ReccoTrack> },
    Single(ReccoTrack),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReccoTrack {
    track_title: Option<String>,
    #[serde(default)]
    artists: Vec<ReccoArtist>,
    href: Option<String>,
}

impl ReccoTrack {
    fn into_item(self) -> RecommendedItem {
        RecommendedItem {
            title: self.track_title,
            artists: self
                .artists
                .into_iter()
                .filter_map(|artist| artist.name)
                .filter(|name| !name.trim().is_empty())
                .collect(),
            canonical_url: self.href.filter(|href| !href.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReccoArtist {
    name: Option<String>,
}

/// Builder for configuring a ReccoBeats client.
#[derive(Debug)]
pub struct ReccoBeatsClientBuilder {
    base_url: String,
    timeout: Duration,
    max_size: usize,
}

impl Default for ReccoBeatsClientBuilder {
    fn default() -> Self {
        Self {
            base_url: RECCOBEATS_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
            max_size: 50,
        }
    }
}

impl ReccoBeatsClientBuilder {
    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upper bound on the `size` parameter sent to the API.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    pub fn build(self) -> Result<ReccoBeatsClient> {
        let client = Client::builder().timeout(self.timeout).build()?;
        Ok(ReccoBeatsClient {
            client,
            base_url: self.base_url,
            max_size: self.max_size,
        })
    }
}
