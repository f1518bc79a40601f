// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{CatalogError, Result};
use crate::token::{CachedToken, TokenCache};
use crate::traits::CatalogSearch;
use async_trait::async_trait;
use moka::sync::Cache;
use moodtune_domain::CatalogItem;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, trace};
use url::Url;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Spotify track search authenticated with the client-credentials flow.
///
/// The access token lives in a shared [`TokenCache`]; clones of the client
/// share both the token and the search result cache.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    api_base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    search_limit: usize,
    token_cache: Arc<TokenCache>,
    search_cache: Cache<String, Vec<CatalogItem>>,
}

impl SpotifyClient {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::builder(client_id, client_secret).build()
    }

    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> SpotifyClientBuilder {
        SpotifyClientBuilder::new(client_id, client_secret)
    }

    /// Search tracks and map them to catalog items in Spotify's ranking order.
    #[instrument(skip(self), fields(limit = self.search_limit))]
    pub async fn search_tracks(
        &self,
        query: &str,
        market: Option<&str>,
    ) -> Result<Vec<CatalogItem>> {
        let cache_key = format!("{}|{}", market.unwrap_or("-"), query);
        if let Some(cached) = self.search_cache.get(&cache_key) {
            trace!(target: "spotify", "search cache hit");
            return Ok(cached);
        }

        let token = self.access_token().await?;

        let mut url = Url::parse(&format!("{}/search", self.api_base_url))
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", "track")
            .append_pair("limit", &self.search_limit.to_string());
        if let Some(market) = market {
            url.query_pairs_mut().append_pair("market", market);
        }

        trace!(target: "spotify", "GET {}", url);

        let response = self
            .client
            .get(url.as_str())
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        debug!(target: "spotify", "search response status: {}", status);

        if status == StatusCode::UNAUTHORIZED {
            self.token_cache.invalidate().await;
        }

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
        let payload: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            CatalogError::InvalidResponse(format!("Failed to parse search response: {}", e))
        })?;

        let items: Vec<CatalogItem> = payload
            .tracks
            .map(|tracks| tracks.items)
            .unwrap_or_default()
            .into_iter()
            .map(TrackObject::into_catalog_item)
            .collect();

        self.search_cache.insert(cache_key, items.clone());
        Ok(items)
    }

    async fn access_token(&self) -> Result<String> {
        self.token_cache
            .get_or_refresh(|now| self.exchange_client_credentials(now))
            .await
    }

    async fn exchange_client_credentials(&self, now: i64) -> Result<CachedToken> {
        debug!(target: "spotify", "requesting client-credentials token");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::TokenAcquisition(format!(
                "HTTP {}: {}",
                status, message
            )));
        }

        let token: TokenResponse = response.json().await?;
        let access_token = token
            .access_token
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                CatalogError::TokenAcquisition("token response had no access_token".to_string())
            })?;

        Ok(CachedToken::expiring_in(
            access_token,
            now,
            token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
        ))
    }
}

#[async_trait]
impl CatalogSearch for SpotifyClient {
    fn name(&self) -> &str {
        "spotify"
    }

    async fn search(&self, query: &str, market: Option<&str>) -> Result<Vec<CatalogItem>> {
        self.search_tracks(query, market).await
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
    album: Option<AlbumObject>,
    #[serde(default)]
    external_urls: HashMap<String, String>,
}

impl TrackObject {
    fn into_catalog_item(self) -> CatalogItem {
        let canonical_url = self
            .external_urls
            .get("spotify")
            .cloned()
            .unwrap_or_else(|| format!("https://open.spotify.com/track/{}", self.id));
        let thumbnail_url = self
            .album
            .and_then(|album| album.images.into_iter().next())
            .map(|image| image.url);

        CatalogItem {
            id: self.id,
            title: self.name,
            artists: self.artists.into_iter().map(|artist| artist.name).collect(),
            canonical_url,
            thumbnail_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumObject {
    #[serde(default)]
    images: Vec<ImageObject>,
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: String,
}

/// Builder for configuring a Spotify client.
#[derive(Debug)]
pub struct SpotifyClientBuilder {
    client_id: String,
    client_secret: String,
    api_base_url: String,
    token_url: String,
    search_limit: usize,
    timeout: Duration,
    token_expiry_skew_secs: i64,
    token_failure_cooldown_secs: i64,
    search_cache_ttl: Duration,
}

impl SpotifyClientBuilder {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base_url: SPOTIFY_API_BASE.to_string(),
            token_url: SPOTIFY_TOKEN_URL.to_string(),
            search_limit: 5,
            timeout: Duration::from_secs(10),
            token_expiry_skew_secs: 30,
            token_failure_cooldown_secs: 30,
            search_cache_ttl: Duration::from_secs(15 * 60),
        }
    }

    /// Set a custom API base URL (useful for testing with mock servers).
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.clamp(1, 50);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn token_expiry_skew_secs(mut self, secs: i64) -> Self {
        self.token_expiry_skew_secs = secs;
        self
    }

    pub fn token_failure_cooldown_secs(mut self, secs: i64) -> Self {
        self.token_failure_cooldown_secs = secs;
        self
    }

    pub fn search_cache_ttl(mut self, ttl: Duration) -> Self {
        self.search_cache_ttl = ttl;
        self
    }

    pub fn build(self) -> Result<SpotifyClient> {
        if self.client_id.trim().is_empty() || self.client_secret.trim().is_empty() {
            return Err(CatalogError::NotConfigured(
                "spotify client id and secret are required".to_string(),
            ));
        }

        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(SpotifyClient {
            client,
            api_base_url: self.api_base_url,
            token_url: self.token_url,
            client_id: self.client_id,
            client_secret: self.client_secret,
            search_limit: self.search_limit,
            token_cache: Arc::new(TokenCache::new(
                self.token_expiry_skew_secs,
                self.token_failure_cooldown_secs,
            )),
            search_cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(self.search_cache_ttl)
                .build(),
        })
    }
}
