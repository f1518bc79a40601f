// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::RecommendationError;
use crate::language::LanguageHeuristic;
use crate::links::{primary_search_link, secondary_search_link};
use crate::normalization::track_key;
use moodtune_catalog::{CatalogError, SeedRecommender};
use moodtune_config::PipelineConfig;
use moodtune_domain::{LanguageMode, MoodProfile, MoodRequest, RecommendedItem, Track};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Builds tracks from the seed-based recommendation API.
pub struct ExpansionEngine {
    recommender: Arc<dyn SeedRecommender>,
    language: LanguageHeuristic,
    overfetch_factor: usize,
    strict_language_filter: bool,
    lookup_timeout: Duration,
}

impl ExpansionEngine {
    pub fn new(
        recommender: Arc<dyn SeedRecommender>,
        language: LanguageHeuristic,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            recommender,
            language,
            overfetch_factor: config.overfetch_factor.max(1),
            strict_language_filter: config.strict_language_filter,
            lookup_timeout: config.lookup_timeout(),
        }
    }

    /// Up to `desired` tracks expanded from `seed_ids`. Over-fetches to
    /// leave room for filtering; any failure yields an empty list.
    #[instrument(skip_all, fields(seeds = seed_ids.len(), desired = desired))]
    pub async fn expand(
        &self,
        request: &MoodRequest,
        profile: &MoodProfile,
        seed_ids: &[String],
        desired: usize,
    ) -> Vec<Track> {
        if seed_ids.is_empty() || desired == 0 {
            return Vec::new();
        }

        let size = desired.saturating_mul(self.overfetch_factor);
        let result = match timeout(self.lookup_timeout, self.recommender.recommend(seed_ids, size)).await
        {
            Ok(result) => result.map_err(RecommendationError::from),
            Err(_) => Err(RecommendationError::from(CatalogError::Timeout)),
        };

        let items = match result {
            Ok(items) => items,
            Err(error) => {
                warn!(
                    target: "pipeline",
                    stage = "expand",
                    recommender = self.recommender.name(),
                    error = %error,
                    "expansion failed"
                );
                return Vec::new();
            }
        };

        let fetched = items.len();
        let mut seen = HashSet::new();
        let tracks = items
            .into_iter()
            .filter_map(|item| build_track(item, request, profile))
            .filter(|track| seen.insert(track_key(&track.artist, &track.title)));

        let tracks: Vec<Track> = if profile.language_mode == LanguageMode::Target {
            let tracks: Vec<Track> = if self.strict_language_filter {
                tracks
                    .filter(|track| {
                        self.language
                            .is_probably_target_language(&track.title, &track.artist)
                    })
                    .collect()
            } else {
                tracks.collect()
            };
            let mut ordered = self
                .language
                .prioritise(tracks, |track| (track.title.as_str(), track.artist.as_str()));
            ordered.truncate(desired);
            ordered
        } else {
            tracks.take(desired).collect()
        };

        debug!(
            target: "pipeline",
            fetched,
            kept = tracks.len(),
            "expansion complete"
        );
        tracks
    }
}

fn build_track(item: RecommendedItem, request: &MoodRequest, profile: &MoodProfile) -> Option<Track> {
    let title = item
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())?;
    let artist = item
        .artists
        .into_iter()
        .map(|artist| artist.trim().to_string())
        .find(|artist| !artist.is_empty())
        .unwrap_or_default();

    let primary_catalog_url = if request.want_primary_catalog_links {
        Some(
            item.canonical_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| primary_search_link(&title, &artist)),
        )
    } else {
        None
    };
    let secondary_catalog_url = request
        .want_secondary_catalog_links
        .then(|| secondary_search_link(&title, &artist));
    let reason = request
        .include_reason
        .then(|| reason_from_profile(&title, profile));

    Some(Track {
        title,
        artist,
        primary_catalog_url,
        secondary_catalog_url,
        secondary_catalog_id: None,
        reason,
    })
}

/// Templated reason, picked by the strongest signal in the profile.
pub fn reason_from_profile(title: &str, profile: &MoodProfile) -> String {
    if profile.need_calm >= 7 {
        format!("{title} has a soft, calm feel that can help you unwind.")
    } else if profile.need_motivation >= 7 {
        format!("{title} brings tempo and drive to give you a push.")
    } else if profile.energy <= 4 {
        format!("{title} is a low-key, mid-tempo track that sits well in the background.")
    } else if profile.energy >= 7 {
        format!("{title} was picked for its high energy to lift your mood.")
    } else {
        format!("{title} keeps a balanced atmosphere without pulling your mood to extremes.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{recommended, FakeRecommender};
    use moodtune_domain::LanguagePreference;

    fn profile(mode: LanguageMode) -> MoodProfile {
        let mut profile = MoodProfile::degraded(&MoodRequest::new("meh", LanguagePreference::Global));
        profile.language_mode = mode;
        profile
    }

    fn engine(recommender: FakeRecommender, config: &PipelineConfig) -> ExpansionEngine {
        ExpansionEngine::new(Arc::new(recommender), LanguageHeuristic::turkish(), config)
    }

    fn request() -> MoodRequest {
        MoodRequest::new("meh", LanguagePreference::Global)
    }

    #[tokio::test]
    async fn overfetches_and_stops_at_desired() {
        let recommender = FakeRecommender::new(vec![
            recommended("One", "A", Some("https://open.spotify.com/track/1")),
            recommended("Two", "B", None),
            recommended("Three", "C", None),
        ]);
        let engine = engine(recommender.clone(), &PipelineConfig::default());

        let tracks = engine
            .expand(&request(), &profile(LanguageMode::Global), &["seed".to_string()], 2)
            .await;

        assert_eq!(tracks.len(), 2);
        assert_eq!(recommender.requests(), vec![(vec!["seed".to_string()], 6)]);
        assert_eq!(
            tracks[0].primary_catalog_url.as_deref(),
            Some("https://open.spotify.com/track/1")
        );
        assert_eq!(
            tracks[1].primary_catalog_url.as_deref(),
            Some("https://open.spotify.com/search/Two%20B")
        );
        assert_eq!(
            tracks[1].secondary_catalog_url.as_deref(),
            Some("https://www.youtube.com/results?search_query=Two%20B")
        );
    }

    #[tokio::test]
    async fn items_without_title_are_skipped_and_artist_defaults_to_empty() {
        let recommender = FakeRecommender::new(vec![
            RecommendedItem::default(),
            RecommendedItem {
                title: Some("Lonely Title".to_string()),
                artists: vec![" ".to_string()],
                canonical_url: None,
            },
        ]);
        let engine = engine(recommender, &PipelineConfig::default());

        let tracks = engine
            .expand(&request(), &profile(LanguageMode::Global), &["seed".to_string()], 5)
            .await;

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].artist, "");
        assert_eq!(
            tracks[0].primary_catalog_url.as_deref(),
            Some("https://open.spotify.com/search/Lonely%20Title")
        );
    }

    #[tokio::test]
    async fn failure_and_missing_seeds_yield_nothing() {
        let failing = FakeRecommender::failing();
        let engine = engine(failing.clone(), &PipelineConfig::default());

        let tracks = engine
            .expand(&request(), &profile(LanguageMode::Global), &["seed".to_string()], 3)
            .await;
        assert!(tracks.is_empty());

        let tracks = engine
            .expand(&request(), &profile(LanguageMode::Global), &[], 3)
            .await;
        assert!(tracks.is_empty());
        assert_eq!(failing.requests().len(), 1);
    }

    #[tokio::test]
    async fn target_mode_puts_target_language_first() {
        let recommender = FakeRecommender::new(vec![
            recommended("Yesterday", "The Beatles", None),
            recommended("Dudu", "Tarkan", None),
            recommended("Imagine", "John Lennon", None),
        ]);
        let engine = engine(recommender, &PipelineConfig::default());

        let tracks = engine
            .expand(&request(), &profile(LanguageMode::Target), &["seed".to_string()], 2)
            .await;

        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Dudu", "Yesterday"]);
    }

    #[tokio::test]
    async fn strict_filter_drops_other_languages() {
        let recommender = FakeRecommender::new(vec![
            recommended("Yesterday", "The Beatles", None),
            recommended("Dudu", "Tarkan", None),
        ]);
        let config = PipelineConfig {
            strict_language_filter: true,
            ..PipelineConfig::default()
        };
        let engine = engine(recommender, &config);

        let tracks = engine
            .expand(&request(), &profile(LanguageMode::Target), &["seed".to_string()], 5)
            .await;

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].artist, "Tarkan");
    }

    #[tokio::test]
    async fn reasons_follow_request_flag() {
        let recommender = FakeRecommender::new(vec![recommended("Dudu", "Tarkan", None)]);
        let engine = engine(recommender, &PipelineConfig::default());
        let mut calm = profile(LanguageMode::Global);
        calm.need_calm = 9;

        let tracks = engine
            .expand(&request(), &calm, &["seed".to_string()], 1)
            .await;
        assert_eq!(
            tracks[0].reason.as_deref(),
            Some("Dudu has a soft, calm feel that can help you unwind.")
        );

        let mut quiet = request();
        quiet.include_reason = false;
        let tracks = engine.expand(&quiet, &calm, &["seed".to_string()], 1).await;
        assert_eq!(tracks[0].reason, None);
    }

    #[test]
    fn reason_templates_follow_priority() {
        let mut profile = profile(LanguageMode::Global);
        assert!(reason_from_profile("X", &profile).contains("balanced"));

        profile.energy = 8;
        assert!(reason_from_profile("X", &profile).contains("high energy"));

        profile.energy = 3;
        assert!(reason_from_profile("X", &profile).contains("low-key"));

        profile.need_motivation = 7;
        assert!(reason_from_profile("X", &profile).contains("push"));

        profile.need_calm = 7;
        assert!(reason_from_profile("X", &profile).contains("calm"));
    }
}
