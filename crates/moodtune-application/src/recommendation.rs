// SPDX-License-Identifier: GPL-3.0-or-later

//! Recommendation pipeline with an enforced fallback order.
//!
//! 1. **Analyze**: mood profile, or a degraded profile on failure
//! 2. **GenerateSeeds**: candidates from the text model; none ends the run
//! 3. **ValidateSeeds**: primary catalog confirmation of candidates
//! 4. **Expand**: seed-based recommendations from validated seeds
//! 5. **UseValidatedFallback**: the validated seeds themselves
//! 6. **SearchLinkOnly**: unconfirmed candidates with search links
//!
//! Each stage is entered only when the previous one produced nothing usable.
//! The run never fails; the worst outcome is an empty track list.

use crate::expansion::ExpansionEngine;
use crate::language::LanguageHeuristic;
use crate::links::{primary_search_link, secondary_search_link};
use crate::mood_profile::MoodProfileAnalyzer;
use crate::normalization::dedup_tracks;
use crate::seeds::SeedCandidateGenerator;
use crate::validation::CatalogValidator;
use moodtune_catalog::{CatalogSearch, SeedRecommender, VideoSearch};
use moodtune_config::PipelineConfig;
use moodtune_domain::{Candidate, LanguageMode, MoodProfile, MoodRequest, Track};
use moodtune_llm::TextModel;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Pipeline stage, for logging and outcome reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Analyze,
    GenerateSeeds,
    ValidateSeeds,
    Expand,
    UseValidatedFallback,
    SearchLinkOnly,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Analyze => "analyze",
            PipelineStage::GenerateSeeds => "generate_seeds",
            PipelineStage::ValidateSeeds => "validate_seeds",
            PipelineStage::Expand => "expand",
            PipelineStage::UseValidatedFallback => "use_validated_fallback",
            PipelineStage::SearchLinkOnly => "search_link_only",
        };
        f.write_str(name)
    }
}

/// Where the returned tracks came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Expanded,
    ValidatedSeeds,
    SearchLinks,
    Empty,
}

impl RecommendationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationSource::Expanded => "expanded",
            RecommendationSource::ValidatedSeeds => "validated_seeds",
            RecommendationSource::SearchLinks => "search_links",
            RecommendationSource::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationOutcome {
    pub tracks: Vec<Track>,
    pub source: RecommendationSource,
    pub profile: Option<MoodProfile>,
}

impl RecommendationOutcome {
    fn empty(profile: Option<MoodProfile>) -> Self {
        Self {
            tracks: Vec::new(),
            source: RecommendationSource::Empty,
            profile,
        }
    }
}

/// External services the pipeline talks to.
///
/// Only the text model and the recommendation API are mandatory. Without a
/// primary catalog every run ends in search links; without a video catalog
/// secondary links are search links.
#[derive(Clone)]
pub struct Collaborators {
    pub text_model: Arc<dyn TextModel>,
    pub catalog: Option<Arc<dyn CatalogSearch>>,
    pub videos: Option<Arc<dyn VideoSearch>>,
    pub recommender: Arc<dyn SeedRecommender>,
}

pub struct RecommendationService {
    analyzer: MoodProfileAnalyzer,
    generator: SeedCandidateGenerator,
    validator: CatalogValidator,
    expansion: ExpansionEngine,
    language: LanguageHeuristic,
    request_timeout: Duration,
}

impl RecommendationService {
    pub fn new(collaborators: Collaborators, config: &PipelineConfig) -> Self {
        let language = LanguageHeuristic::from_signals(&config.target_language_signals);
        Self {
            analyzer: MoodProfileAnalyzer::new(
                Arc::clone(&collaborators.text_model),
                config.target_language_name.clone(),
            )
            .with_target_codes(config.target_language_signals.codes.clone()),
            generator: SeedCandidateGenerator::new(
                collaborators.text_model,
                config.target_language_name.clone(),
                config.max_suggestions,
            ),
            validator: CatalogValidator::new(collaborators.catalog, collaborators.videos, config),
            expansion: ExpansionEngine::new(collaborators.recommender, language.clone(), config),
            language,
            request_timeout: config.request_timeout(),
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Tracks only; see [`RecommendationService::recommend`].
    pub async fn get_recommendations(&self, request: &MoodRequest) -> Vec<Track> {
        self.recommend(request).await.tracks
    }

    /// Run the whole pipeline under the request deadline. On expiry every
    /// in-flight lookup is dropped and the outcome is empty.
    pub async fn recommend(&self, request: &MoodRequest) -> RecommendationOutcome {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            target: "pipeline",
            "recommend",
            %request_id,
            language = request.language_preference.as_str(),
            desired = request.effective_count()
        );

        async {
            match timeout(self.request_timeout, self.run(request)).await {
                Ok(outcome) => {
                    info!(
                        target: "pipeline",
                        source = outcome.source.as_str(),
                        tracks = outcome.tracks.len(),
                        "recommendation finished"
                    );
                    outcome
                }
                Err(_) => {
                    warn!(
                        target: "pipeline",
                        timeout_ms = self.request_timeout.as_millis() as u64,
                        "recommendation deadline exceeded, returning no tracks"
                    );
                    RecommendationOutcome::empty(None)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &MoodRequest) -> RecommendationOutcome {
        let desired = request.effective_count();

        let profile = match self.analyzer.analyze(request).await {
            Ok(profile) => profile,
            Err(error) => {
                warn!(
                    target: "pipeline",
                    stage = %PipelineStage::Analyze,
                    error = %error,
                    "using degraded mood profile"
                );
                MoodProfile::degraded(request)
            }
        };

        let candidates = self.generator.generate(request, &profile).await;
        if candidates.is_empty() {
            warn!(
                target: "pipeline",
                stage = %PipelineStage::GenerateSeeds,
                "no candidates generated, returning no tracks"
            );
            return RecommendationOutcome::empty(Some(profile));
        }

        let mode = profile.language_mode;
        let mut validation = self.validator.validate(request, mode, &candidates).await;

        if !validation.has_seeds() {
            info!(
                target: "pipeline",
                stage = %PipelineStage::SearchLinkOnly,
                candidates = candidates.len(),
                "no candidate validated, falling back to search links"
            );
            let tracks = candidates
                .iter()
                .map(|candidate| search_link_track(candidate, request))
                .collect();
            return self.finish(tracks, RecommendationSource::SearchLinks, desired, profile);
        }

        if mode == LanguageMode::Target {
            validation.seeds = self.language.prioritise(validation.seeds, |seed| {
                (seed.title.as_str(), seed.artist.as_str())
            });
            validation.fallback_tracks = self
                .language
                .prioritise(validation.fallback_tracks, |track| {
                    (track.title.as_str(), track.artist.as_str())
                });
        }

        let seed_ids = validation.seed_ids();
        let expanded = self
            .expansion
            .expand(request, &profile, &seed_ids, desired)
            .await;
        if !expanded.is_empty() {
            return self.finish(expanded, RecommendationSource::Expanded, desired, profile);
        }

        info!(
            target: "pipeline",
            stage = %PipelineStage::UseValidatedFallback,
            seeds = seed_ids.len(),
            "expansion empty, returning validated seeds"
        );
        self.finish(
            validation.fallback_tracks,
            RecommendationSource::ValidatedSeeds,
            desired,
            profile,
        )
    }

    fn finish(
        &self,
        tracks: Vec<Track>,
        source: RecommendationSource,
        desired: usize,
        profile: MoodProfile,
    ) -> RecommendationOutcome {
        let mut tracks = dedup_tracks(tracks);
        tracks.truncate(desired);
        RecommendationOutcome {
            source: if tracks.is_empty() {
                RecommendationSource::Empty
            } else {
                source
            },
            tracks,
            profile: Some(profile),
        }
    }
}

fn search_link_track(candidate: &Candidate, request: &MoodRequest) -> Track {
    Track {
        title: candidate.title.clone(),
        artist: candidate.artist.clone(),
        primary_catalog_url: request
            .want_primary_catalog_links
            .then(|| primary_search_link(&candidate.title, &candidate.artist)),
        secondary_catalog_url: request
            .want_secondary_catalog_links
            .then(|| secondary_search_link(&candidate.title, &candidate.artist)),
        secondary_catalog_id: None,
        reason: candidate.reason.clone().filter(|_| request.include_reason),
    }
}
