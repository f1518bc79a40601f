// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{RecommendationError, Result};
use crate::normalization::candidate_key;
use moodtune_domain::{Candidate, MoodProfile, MoodRequest};
use moodtune_llm::{extract_json_array, TextModel};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Asks the text model for a short list of real seed songs.
pub struct SeedCandidateGenerator {
    model: Arc<dyn TextModel>,
    target_language_name: String,
    max_suggestions: usize,
}

impl SeedCandidateGenerator {
    pub fn new(
        model: Arc<dyn TextModel>,
        target_language_name: impl Into<String>,
        max_suggestions: usize,
    ) -> Self {
        Self {
            model,
            target_language_name: target_language_name.into(),
            max_suggestions: max_suggestions.max(1),
        }
    }

    /// Deduplicated candidates, at most `max_suggestions`. Failures are
    /// logged and yield an empty list.
    #[instrument(skip_all, fields(model = self.model.name()))]
    pub async fn generate(&self, request: &MoodRequest, profile: &MoodProfile) -> Vec<Candidate> {
        match self.try_generate(request, profile).await {
            Ok(candidates) => {
                debug!(target: "pipeline", count = candidates.len(), "seed candidates generated");
                candidates
            }
            Err(error) => {
                warn!(target: "pipeline", stage = "generate_seeds", error = %error, "no seed candidates");
                Vec::new()
            }
        }
    }

    async fn try_generate(
        &self,
        request: &MoodRequest,
        profile: &MoodProfile,
    ) -> Result<Vec<Candidate>> {
        let prompt = self.build_prompt(request, profile)?;
        let answer = self
            .model
            .ask(&prompt)
            .await
            .map_err(|e| RecommendationError::GenerationFailure(e.to_string()))?;

        parse_candidates(&answer, request.include_reason, self.max_suggestions)
    }

    pub fn build_prompt(&self, request: &MoodRequest, profile: &MoodProfile) -> Result<String> {
        let profile_json = serde_json::to_string(profile)
            .map_err(|e| RecommendationError::GenerationFailure(e.to_string()))?;

        let language_instruction = if profile.language_mode.is_target() {
            format!(
                "- Prefer {} songs. Add a few global songs only when needed.",
                self.target_language_name
            )
        } else {
            "- Songs may come from any language; do not limit yourself to English.".to_string()
        };

        let reason_instruction = if request.include_reason {
            "- Give every song a \"reason\" of at most 1-2 short sentences."
        } else {
            "- Set \"reason\" to null for every song and write no explanation."
        };

        Ok(format!(
            r#"You are a music curator.

The user's MOOD PROFILE as JSON:
{profile_json}

Your task is to produce between 2 and {max} REAL song + artist combinations for
this profile. They are used ONLY as seeds for further recommendations.

RULES:
- Never invent songs or artists.
- Do not list combinations you are unsure about.
- Prefer well-known songs that are very likely to exist on streaming catalogs.
- Do not repeat a song.
- Produce at most {max} candidates.
{language_instruction}

APPLY THIS POINT SYSTEM WHILE CHOOSING:
- You are sure the song title is correct: +2 points
- You are sure the artist name is correct: +2 points
- Title and artist correctly belong together: +3 extra points
- Do not list any song scoring BELOW 3 points.

THE OUTPUT IS A STRICT JSON ARRAY:

[
  {{
    "title": "Song title",
    "artist": "Artist name",
    "reason": "Short explanation or null"
  }}
]

{reason_instruction}"#,
            profile_json = profile_json,
            max = self.max_suggestions,
            language_instruction = language_instruction,
            reason_instruction = reason_instruction,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Parse the model's array answer. Entries without a title or artist are
/// dropped, duplicates (by folded `title|artist`) keep their first position.
pub(crate) fn parse_candidates(
    answer: &str,
    include_reason: bool,
    max_suggestions: usize,
) -> Result<Vec<Candidate>> {
    let json = extract_json_array(answer).ok_or_else(|| {
        RecommendationError::GenerationFailure("answer contained no JSON array".to_string())
    })?;

    let raw: Vec<RawCandidate> = serde_json::from_str(json).map_err(|e| {
        RecommendationError::GenerationFailure(format!("malformed candidate list: {}", e))
    })?;

    let mut seen = HashSet::new();
    let candidates = raw
        .into_iter()
        .filter_map(|entry| {
            let title = entry.title?.trim().to_string();
            let artist = entry.artist?.trim().to_string();
            if title.is_empty() || artist.is_empty() {
                return None;
            }
            let reason = entry
                .reason
                .filter(|_| include_reason)
                .map(|reason| reason.trim().to_string())
                .filter(|reason| !reason.is_empty());
            Some(Candidate {
                title,
                artist,
                reason,
            })
        })
        .filter(|candidate| seen.insert(candidate_key(&candidate.title, &candidate.artist)))
        .take(max_suggestions)
        .collect();

    Ok(candidates)
}
