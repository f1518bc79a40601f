// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory collaborators for pipeline tests.

use async_trait::async_trait;
use moodtune_catalog::{CatalogError, CatalogSearch, SeedRecommender, VideoSearch};
use moodtune_domain::{CatalogItem, LanguageMode, RecommendedItem, VideoItem};
use moodtune_llm::{LlmError, TextModel};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) fn catalog_item(id: &str, title: &str, artist: &str) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        title: title.to_string(),
        artists: vec![artist.to_string()],
        canonical_url: format!("https://open.spotify.com/track/{id}"),
        thumbnail_url: None,
    }
}

pub(crate) fn video_item(id: &str, title: &str, channel: &str) -> VideoItem {
    VideoItem {
        id: id.to_string(),
        title: title.to_string(),
        channel: channel.to_string(),
        duration_seconds: 215,
        category_id: "10".to_string(),
    }
}

pub(crate) fn recommended(title: &str, artist: &str, url: Option<&str>) -> RecommendedItem {
    RecommendedItem {
        title: Some(title.to_string()),
        artists: vec![artist.to_string()],
        canonical_url: url.map(str::to_string),
    }
}

// ============================================================================
// Text model
// ============================================================================

/// Answers prompts from a queue; an exhausted queue is an error.
#[derive(Clone, Default)]
pub(crate) struct ScriptedModel {
    answers: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl ScriptedModel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn answer(self, text: &str) -> Self {
        self.answers.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub(crate) fn fail(self, error: LlmError) -> Self {
        self.answers.lock().unwrap().push_back(Err(error));
        self
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn ask(&self, prompt: &str) -> moodtune_llm::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.answers.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(LlmError::InvalidResponse("no scripted answer".to_string())))
    }
}

// ============================================================================
// Primary catalog
// ============================================================================

#[derive(Default)]
struct SearchLog {
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
    markets: Mutex<Vec<Option<String>>>,
}

/// Serves canned pages for queries containing a key.
#[derive(Clone, Default)]
pub(crate) struct FakeCatalog {
    responses: Vec<(String, Vec<CatalogItem>)>,
    failing: Vec<String>,
    slow: Vec<(String, Duration)>,
    token_failure: bool,
    log: Arc<SearchLog>,
}

impl FakeCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_items(mut self, key: &str, items: Vec<CatalogItem>) -> Self {
        self.responses.push((key.to_string(), items));
        self
    }

    pub(crate) fn failing_on(mut self, key: &str) -> Self {
        self.failing.push(key.to_string());
        self
    }

    pub(crate) fn slow_on(mut self, key: &str, delay: Duration) -> Self {
        self.slow.push((key.to_string(), delay));
        self
    }

    pub(crate) fn without_token(mut self) -> Self {
        self.token_failure = true;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.log.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.log.queries.lock().unwrap().clone()
    }

    pub(crate) fn markets(&self) -> Vec<Option<String>> {
        self.log.markets.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogSearch for FakeCatalog {
    fn name(&self) -> &str {
        "fake-catalog"
    }

    async fn search(
        &self,
        query: &str,
        market: Option<&str>,
    ) -> moodtune_catalog::Result<Vec<CatalogItem>> {
        self.log.calls.fetch_add(1, Ordering::SeqCst);
        self.log.queries.lock().unwrap().push(query.to_string());
        self.log
            .markets
            .lock()
            .unwrap()
            .push(market.map(str::to_string));

        if let Some((_, delay)) = self.slow.iter().find(|(key, _)| query.contains(key.as_str())) {
            tokio::time::sleep(*delay).await;
        }
        if self.token_failure {
            return Err(CatalogError::TokenAcquisition("invalid_client".to_string()));
        }
        if self.failing.iter().any(|key| query.contains(key.as_str())) {
            return Err(CatalogError::ApiError {
                status: 500,
                message: "boom".to_string(),
            });
        }

        Ok(self
            .responses
            .iter()
            .find(|(key, _)| query.contains(key.as_str()))
            .map(|(_, items)| items.clone())
            .unwrap_or_default())
    }
}

// ============================================================================
// Video catalog
// ============================================================================

#[derive(Clone, Default)]
pub(crate) struct FakeVideos {
    videos: Vec<VideoItem>,
    calls: Arc<AtomicUsize>,
}

impl FakeVideos {
    pub(crate) fn new(videos: Vec<VideoItem>) -> Self {
        Self {
            videos,
            calls: Arc::default(),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoSearch for FakeVideos {
    fn name(&self) -> &str {
        "fake-videos"
    }

    async fn search_music_videos(
        &self,
        _query: &str,
        _mode: LanguageMode,
    ) -> moodtune_catalog::Result<Vec<VideoItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.videos.clone())
    }
}

// ============================================================================
// Recommendation API
// ============================================================================

#[derive(Clone, Default)]
pub(crate) struct FakeRecommender {
    items: Vec<RecommendedItem>,
    fail: bool,
    requests: Arc<Mutex<Vec<(Vec<String>, usize)>>>,
}

impl FakeRecommender {
    pub(crate) fn new(items: Vec<RecommendedItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn requests(&self) -> Vec<(Vec<String>, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SeedRecommender for FakeRecommender {
    fn name(&self) -> &str {
        "fake-recommender"
    }

    async fn recommend(
        &self,
        seed_ids: &[String],
        size: usize,
    ) -> moodtune_catalog::Result<Vec<RecommendedItem>> {
        self.requests
            .lock()
            .unwrap()
            .push((seed_ids.to_vec(), size));
        if self.fail {
            return Err(CatalogError::ApiError {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self.items.clone())
    }
}
