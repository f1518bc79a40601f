// SPDX-License-Identifier: GPL-3.0-or-later
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use moodtune_application::AppState;
use moodtune_domain::{LanguageMode, LanguagePreference, MoodProfile, MoodRequest, Track};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

fn default_limit() -> i64 {
    10
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    /// Free-text description of how the user feels.
    pub mood: String,
    /// Language code; a configured target code (default `tr`) selects the
    /// target-language pool.
    #[serde(default)]
    pub language: String,
    /// Number of tracks wanted, clamped to 1..=10.
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_true")]
    pub use_spotify: bool,
    #[serde(default = "default_true")]
    pub use_youtube: bool,
    #[serde(default = "default_true")]
    pub include_reason: bool,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub preferred_genres: Vec<String>,
}

impl RecommendationRequest {
    /// Convert to a pipeline request; `target_codes` select the target pool.
    pub fn into_mood_request(self, target_codes: &[String]) -> MoodRequest {
        let mut request = MoodRequest::new(
            self.mood.trim(),
            LanguagePreference::from_language_code(&self.language, target_codes),
        );
        request.desired_count = self.limit.max(0) as usize;
        request.want_primary_catalog_links = self.use_spotify;
        request.want_secondary_catalog_links = self.use_youtube;
        request.include_reason = self.include_reason;
        request.context = self.context;
        request.preferred_genres = self
            .preferred_genres
            .into_iter()
            .map(|genre| genre.trim().to_string())
            .filter(|genre| !genre.is_empty())
            .collect();
        request
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub title: String,
    pub artist: String,
    pub spotify_url: Option<String>,
    pub youtube_url: Option<String>,
    pub youtube_video_id: Option<String>,
    pub reason: Option<String>,
}

impl From<Track> for TrackResponse {
    fn from(value: Track) -> Self {
        Self {
            title: value.title,
            artist: value.artist,
            spotify_url: value.primary_catalog_url,
            youtube_url: value.secondary_catalog_url,
            youtube_video_id: value.secondary_catalog_id,
            reason: value.reason,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub summary: String,
    pub energy: u8,
    pub valence: u8,
    pub stress: u8,
    pub focus: u8,
    pub need_calm: u8,
    pub need_motivation: u8,
    pub language_mode: String,
}

impl From<MoodProfile> for AnalysisResponse {
    fn from(value: MoodProfile) -> Self {
        Self {
            summary: value.summary,
            energy: value.energy,
            valence: value.valence,
            stress: value.stress,
            focus: value.focus,
            need_calm: value.need_calm,
            need_motivation: value.need_motivation,
            language_mode: match value.language_mode {
                LanguageMode::Target => "target".to_string(),
                LanguageMode::Global => "global".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub tracks: Vec<TrackResponse>,
    /// Pipeline stage that produced the tracks.
    pub source: String,
    pub analysis: Option<AnalysisResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Recommend songs for a mood description.
#[utoipa::path(
    post,
    path = "/api/mood/recommendations",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Recommendations produced", body = RecommendationResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "recommendations"
)]
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> impl IntoResponse {
    if request.mood.trim().is_empty() {
        debug!(target: "api", "rejecting request with blank mood");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "mood is required".to_string(),
            }),
        )
            .into_response();
    }

    let request =
        request.into_mood_request(&state.config.pipeline.target_language_signals.codes);
    let outcome = state.recommendations.recommend(&request).await;
    info!(
        target: "api",
        source = outcome.source.as_str(),
        tracks = outcome.tracks.len(),
        "recommendations served"
    );

    (
        StatusCode::OK,
        Json(RecommendationResponse {
            source: outcome.source.as_str().to_string(),
            tracks: outcome.tracks.into_iter().map(TrackResponse::from).collect(),
            analysis: outcome.profile.map(AnalysisResponse::from),
        }),
    )
        .into_response()
}
