// SPDX-License-Identifier: GPL-3.0-or-later

//! Catalog validation of generated candidates.
//!
//! Candidates are looked up concurrently with bounded parallelism. Each
//! lookup carries its own timeout, and a failed or slow lookup only costs
//! that one candidate.

use crate::error::RecommendationError;
use crate::links::{catalog_query, search_query, secondary_search_link};
use crate::matching::CatalogMatcher;
use futures_util::stream::{self, StreamExt};
use moodtune_catalog::{CatalogError, CatalogSearch, VideoSearch};
use moodtune_config::PipelineConfig;
use moodtune_domain::{
    Candidate, CatalogMatch, LanguageMode, LanguagePreference, MoodRequest, Track, VideoItem,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Seeds confirmed by the primary catalog, plus the tracks built from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub seeds: Vec<CatalogMatch>,
    pub fallback_tracks: Vec<Track>,
}

impl ValidationOutcome {
    pub fn has_seeds(&self) -> bool {
        !self.seeds.is_empty()
    }

    /// Catalog IDs of the seeds, deduplicated, in validation order.
    pub fn seed_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for seed in &self.seeds {
            if !ids.contains(&seed.catalog_id) {
                ids.push(seed.catalog_id.clone());
            }
        }
        ids
    }
}

pub struct CatalogValidator {
    catalog: Option<Arc<dyn CatalogSearch>>,
    videos: Option<Arc<dyn VideoSearch>>,
    matcher: CatalogMatcher,
    validate_limit: usize,
    max_concurrent_lookups: usize,
    lookup_timeout: Duration,
    target_market: String,
}

impl CatalogValidator {
    pub fn new(
        catalog: Option<Arc<dyn CatalogSearch>>,
        videos: Option<Arc<dyn VideoSearch>>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            catalog,
            videos,
            matcher: CatalogMatcher::new(config.scoring),
            validate_limit: config.validate_limit.max(1),
            max_concurrent_lookups: config.max_concurrent_lookups.max(1),
            lookup_timeout: config.lookup_timeout(),
            target_market: config.target_market.clone(),
        }
    }

    /// Market hint for the primary catalog.
    pub fn market_for(&self, request: &MoodRequest) -> Option<&str> {
        match request.language_preference {
            LanguagePreference::Target => Some(self.target_market.as_str()),
            LanguagePreference::Global => None,
        }
    }

    /// Validate the first `validate_limit` candidates. Results keep the
    /// candidates' order regardless of which lookup finishes first.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub async fn validate(
        &self,
        request: &MoodRequest,
        mode: LanguageMode,
        candidates: &[Candidate],
    ) -> ValidationOutcome {
        let Some(catalog) = self.catalog.as_deref() else {
            warn!(
                target: "pipeline",
                stage = "validate_seeds",
                "primary catalog not configured, no candidate can be validated"
            );
            return ValidationOutcome::default();
        };

        let market = self.market_for(request);
        let batch: Vec<&Candidate> = candidates.iter().take(self.validate_limit).collect();
        let concurrency = self.max_concurrent_lookups.min(batch.len()).max(1);

        // Futures are built up front (they stay lazy until `buffered` polls
        // them) so the stream carries no closure; a closure here trips
        // rustc's higher-ranked `Send` inference in the axum handler.
        let lookups: Vec<_> = batch
            .into_iter()
            .map(|candidate| self.validate_one(catalog, candidate, request, mode, market))
            .collect();
        let results: Vec<Option<(CatalogMatch, Track)>> = stream::iter(lookups)
            .buffered(concurrency)
            .collect()
            .await;

        let mut outcome = ValidationOutcome::default();
        for (seed, track) in results.into_iter().flatten() {
            outcome.seeds.push(seed);
            outcome.fallback_tracks.push(track);
        }

        debug!(
            target: "pipeline",
            validated = outcome.seeds.len(),
            "catalog validation complete"
        );
        outcome
    }

    async fn validate_one(
        &self,
        catalog: &dyn CatalogSearch,
        candidate: &Candidate,
        request: &MoodRequest,
        mode: LanguageMode,
        market: Option<&str>,
    ) -> Option<(CatalogMatch, Track)> {
        let want_video = request.want_secondary_catalog_links;
        let (matched, video) = tokio::join!(
            self.lookup_primary(catalog, candidate, market),
            async {
                if want_video {
                    self.lookup_video(candidate, mode).await
                } else {
                    None
                }
            }
        );
        let matched = matched?;

        let (secondary_catalog_url, secondary_catalog_id) = match video {
            Some(video) => (Some(video.watch_url()), Some(video.id)),
            None if request.want_secondary_catalog_links => (
                Some(secondary_search_link(&matched.title, &matched.artist)),
                None,
            ),
            None => (None, None),
        };

        let track = Track {
            title: matched.title.clone(),
            artist: matched.artist.clone(),
            primary_catalog_url: request
                .want_primary_catalog_links
                .then(|| matched.canonical_url.clone()),
            secondary_catalog_url,
            secondary_catalog_id,
            reason: candidate.reason.clone().filter(|_| request.include_reason),
        };

        Some((matched, track))
    }

    async fn lookup_primary(
        &self,
        catalog: &dyn CatalogSearch,
        candidate: &Candidate,
        market: Option<&str>,
    ) -> Option<CatalogMatch> {
        let query = catalog_query(&candidate.title, &candidate.artist);
        let result = match timeout(self.lookup_timeout, catalog.search(&query, market)).await {
            Ok(result) => result.map_err(RecommendationError::from),
            Err(_) => Err(RecommendationError::from(CatalogError::Timeout)),
        };

        match result {
            Ok(items) => {
                let matched = self.matcher.best_match(candidate, &items);
                debug!(
                    target: "pipeline",
                    candidate = %candidate.title,
                    artist = %candidate.artist,
                    results = items.len(),
                    accepted = matched.is_some(),
                    "primary catalog lookup"
                );
                matched
            }
            Err(error) => {
                warn!(
                    target: "pipeline",
                    stage = "validate_seeds",
                    catalog = catalog.name(),
                    candidate = %candidate.title,
                    artist = %candidate.artist,
                    error = %error,
                    "catalog lookup failed, treating as no match"
                );
                None
            }
        }
    }

    async fn lookup_video(&self, candidate: &Candidate, mode: LanguageMode) -> Option<VideoItem> {
        let videos = self.videos.as_deref()?;
        let query = search_query(&candidate.title, &candidate.artist);

        let result = match timeout(self.lookup_timeout, videos.search_music_videos(&query, mode)).await
        {
            Ok(result) => result.map_err(RecommendationError::from),
            Err(_) => Err(RecommendationError::from(CatalogError::Timeout)),
        };

        match result {
            Ok(found) => self.matcher.best_video(candidate, &found),
            Err(error) => {
                warn!(
                    target: "pipeline",
                    stage = "validate_seeds",
                    catalog = videos.name(),
                    candidate = %candidate.title,
                    error = %error,
                    "video lookup failed, falling back to a search link"
                );
                None
            }
        }
    }
}
