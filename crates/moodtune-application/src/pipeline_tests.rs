// SPDX-License-Identifier: GPL-3.0-or-later

//! End-to-end tests of the fallback chain against in-memory collaborators.

use crate::normalization::track_key;
use crate::recommendation::{Collaborators, RecommendationService, RecommendationSource};
use crate::test_support::{
    catalog_item, recommended, FakeCatalog, FakeRecommender, FakeVideos, ScriptedModel,
};
use moodtune_catalog::CatalogSearch;
use moodtune_config::PipelineConfig;
use moodtune_domain::{LanguagePreference, MoodRequest};
use moodtune_llm::LlmError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

const PROFILE: &str = r#"{"summary": "Nostalgic and a bit tired", "energy": 4, "valence": 5,
"stress": 6, "focus": 4, "needCalm": 8, "needMotivation": 3, "languageMode": "target",
"seedGenres": ["turkish pop"], "seedMoods": ["nostalgic"]}"#;

const SEEDS: &str = r#"```json
[
  {"title": "Kuzu Kuzu", "artist": "Tarkan", "reason": "Upbeat classic."},
  {"title": "Gülümse", "artist": "Sezen Aksu", "reason": "Warm and hopeful."},
  {"title": "Imagine", "artist": "John Lennon", "reason": "Calm reflection."}
]
```"#;

fn config() -> PipelineConfig {
    PipelineConfig {
        lookup_timeout_ms: 200,
        ..PipelineConfig::default()
    }
}

fn request(desired: usize) -> MoodRequest {
    let mut request = MoodRequest::new("nostalgic evening after work", LanguagePreference::Target);
    request.desired_count = desired;
    request
}

fn validating_catalog() -> FakeCatalog {
    FakeCatalog::new()
        .with_items("Kuzu Kuzu", vec![catalog_item("kuzu", "Kuzu Kuzu", "Tarkan")])
        .with_items("Gülümse", vec![catalog_item("gulumse", "Gülümse", "Sezen Aksu")])
        .with_items("Imagine", vec![catalog_item("yesterday", "Yesterday", "The Beatles")])
}

fn service(
    model: ScriptedModel,
    catalog: Option<FakeCatalog>,
    recommender: FakeRecommender,
) -> RecommendationService {
    let collaborators = Collaborators {
        text_model: Arc::new(model),
        catalog: catalog.map(|catalog| Arc::new(catalog) as Arc<dyn CatalogSearch>),
        videos: None,
        recommender: Arc::new(recommender),
    };
    RecommendationService::new(collaborators, &config())
}

fn assert_unique(tracks: &[moodtune_domain::Track]) {
    let keys: HashSet<_> = tracks
        .iter()
        .map(|track| track_key(&track.artist, &track.title))
        .collect();
    assert_eq!(keys.len(), tracks.len(), "duplicate tracks: {tracks:?}");
}

#[tokio::test]
async fn expansion_results_are_returned_deduplicated_and_bounded() {
    let model = ScriptedModel::new().answer(PROFILE).answer(SEEDS);
    let recommender = FakeRecommender::new(vec![
        recommended("Dudu", "Tarkan", Some("https://open.spotify.com/track/dudu")),
        recommended("DUDU", "tarkan", None),
        recommended("Yesterday", "The Beatles", None),
        recommended("Şımarık", "Tarkan", None),
        recommended("Hata", "Sezen Aksu", None),
    ]);
    let service = service(model, Some(validating_catalog()), recommender.clone());

    let outcome = service.recommend(&request(3)).await;

    assert_eq!(outcome.source, RecommendationSource::Expanded);
    assert!(outcome.tracks.len() <= 3);
    assert_unique(&outcome.tracks);
    assert_eq!(outcome.tracks[0].title, "Dudu");
    assert!(outcome.tracks.iter().all(|t| t.reason.is_some()));

    let requests = recommender.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0],
        (vec!["kuzu".to_string(), "gulumse".to_string()], 9)
    );
}

#[tokio::test]
async fn empty_candidate_list_returns_no_tracks() {
    let model = ScriptedModel::new().answer(PROFILE).answer("[]");
    let catalog = validating_catalog();
    let service = service(model, Some(catalog.clone()), FakeRecommender::default());

    let outcome = service.recommend(&request(5)).await;

    assert!(outcome.tracks.is_empty());
    assert_eq!(outcome.source, RecommendationSource::Empty);
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn unvalidated_candidates_fall_back_to_search_links() {
    let model = ScriptedModel::new().answer(PROFILE).answer(SEEDS);
    let catalog = FakeCatalog::new()
        .with_items("Kuzu Kuzu", vec![catalog_item("x", "Something Else", "Nobody")]);
    let recommender = FakeRecommender::default();
    let service = service(model, Some(catalog), recommender.clone());

    let outcome = service.recommend(&request(2)).await;

    assert_eq!(outcome.source, RecommendationSource::SearchLinks);
    assert_eq!(outcome.tracks.len(), 2);
    for track in &outcome.tracks {
        let primary = track.primary_catalog_url.as_deref().unwrap();
        assert!(primary.starts_with("https://open.spotify.com/search/"), "{primary}");
        assert!(track
            .secondary_catalog_url
            .as_deref()
            .unwrap()
            .starts_with("https://www.youtube.com/results?search_query="));
        assert_eq!(track.secondary_catalog_id, None);
    }
    assert_eq!(outcome.tracks[0].title, "Kuzu Kuzu");
    assert!(recommender.requests().is_empty());
}

#[tokio::test]
async fn empty_expansion_returns_validated_seeds() {
    let model = ScriptedModel::new().answer(PROFILE).answer(SEEDS);
    let service = service(model, Some(validating_catalog()), FakeRecommender::failing());

    let outcome = service.recommend(&request(10)).await;

    assert_eq!(outcome.source, RecommendationSource::ValidatedSeeds);
    let titles: Vec<_> = outcome.tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Kuzu Kuzu", "Gülümse"]);
    assert_eq!(
        outcome.tracks[0].primary_catalog_url.as_deref(),
        Some("https://open.spotify.com/track/kuzu")
    );
    assert_eq!(outcome.tracks[0].reason.as_deref(), Some("Upbeat classic."));
}

#[tokio::test]
async fn analysis_failure_degrades_profile_and_continues() {
    let model = ScriptedModel::new()
        .fail(LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        })
        .answer(SEEDS);
    let service = service(
        model.clone(),
        Some(validating_catalog()),
        FakeRecommender::failing(),
    );

    let outcome = service.recommend(&request(5)).await;

    let profile = outcome.profile.unwrap();
    assert_eq!(profile.summary, "nostalgic evening after work");
    assert_eq!(profile.need_calm, 5);
    assert_eq!(outcome.source, RecommendationSource::ValidatedSeeds);
    assert_eq!(model.prompts().len(), 2);
}

#[tokio::test]
async fn token_failure_degrades_to_search_links() {
    let model = ScriptedModel::new().answer(PROFILE).answer(SEEDS);
    let catalog = validating_catalog().without_token();
    let service = service(model, Some(catalog), FakeRecommender::default());

    let outcome = service.recommend(&request(10)).await;

    assert_eq!(outcome.source, RecommendationSource::SearchLinks);
    assert_eq!(outcome.tracks.len(), 3);
}

#[tokio::test]
async fn missing_catalog_degrades_to_search_links() {
    let model = ScriptedModel::new().answer(PROFILE).answer(SEEDS);
    let service = service(model, None, FakeRecommender::default());

    let tracks = service.get_recommendations(&request(1)).await;

    assert_eq!(tracks.len(), 1);
    assert_eq!(
        tracks[0].primary_catalog_url.as_deref(),
        Some("https://open.spotify.com/search/Kuzu%20Kuzu%20Tarkan")
    );
}

#[tokio::test]
async fn overall_deadline_returns_empty_result() {
    let model = ScriptedModel::new()
        .answer(PROFILE)
        .answer(SEEDS)
        .delayed(Duration::from_secs(5));
    let service = service(model, Some(validating_catalog()), FakeRecommender::default())
        .with_request_timeout(Duration::from_millis(50));

    let started = std::time::Instant::now();
    let outcome = service.recommend(&request(5)).await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(outcome.tracks.is_empty());
    assert_eq!(outcome.source, RecommendationSource::Empty);
    assert_eq!(outcome.profile, None);
}

#[tokio::test]
async fn video_links_are_attached_to_validated_seeds() {
    let model = ScriptedModel::new().answer(PROFILE).answer(SEEDS);
    let videos = FakeVideos::new(vec![crate::test_support::video_item(
        "vid-kuzu",
        "Tarkan - Kuzu Kuzu (Official Video)",
        "TarkanVEVO",
    )]);
    let collaborators = Collaborators {
        text_model: Arc::new(model),
        catalog: Some(Arc::new(validating_catalog())),
        videos: Some(Arc::new(videos.clone())),
        recommender: Arc::new(FakeRecommender::failing()),
    };
    let service = RecommendationService::new(collaborators, &config());

    let outcome = service.recommend(&request(5)).await;

    let kuzu = outcome
        .tracks
        .iter()
        .find(|track| track.title == "Kuzu Kuzu")
        .unwrap();
    assert_eq!(kuzu.secondary_catalog_id.as_deref(), Some("vid-kuzu"));
    assert_eq!(videos.calls(), 3);
}

#[tokio::test]
async fn requested_count_is_clamped() {
    let model = ScriptedModel::new().answer(PROFILE).answer(SEEDS);
    let service = service(model, None, FakeRecommender::default());

    let tracks = service.get_recommendations(&request(0)).await;

    assert_eq!(tracks.len(), 1);
}
