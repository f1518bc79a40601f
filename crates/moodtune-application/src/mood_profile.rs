// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{RecommendationError, Result};
use moodtune_domain::{LanguageMode, MoodProfile, MoodRequest, DEFAULT_SCORE};
use moodtune_llm::{extract_json_object, TextModel};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Turns free mood text into a [`MoodProfile`] via the text model.
pub struct MoodProfileAnalyzer {
    model: Arc<dyn TextModel>,
    target_language_name: String,
    target_codes: Vec<String>,
}

impl MoodProfileAnalyzer {
    pub fn new(model: Arc<dyn TextModel>, target_language_name: impl Into<String>) -> Self {
        let target_language_name = target_language_name.into();
        Self {
            model,
            target_codes: vec![target_language_name.to_lowercase()],
            target_language_name,
        }
    }

    /// Language codes the model may answer with instead of `target`.
    pub fn with_target_codes(mut self, codes: Vec<String>) -> Self {
        self.target_codes = codes;
        self
    }

    #[instrument(skip_all, fields(model = self.model.name()))]
    pub async fn analyze(&self, request: &MoodRequest) -> Result<MoodProfile> {
        let prompt = self.build_prompt(request);
        let answer = self
            .model
            .ask(&prompt)
            .await
            .map_err(|e| RecommendationError::AnalysisFailure(e.to_string()))?;

        let profile = parse_profile(&answer, request, &self.target_codes)?;
        debug!(
            target: "pipeline",
            energy = profile.energy,
            need_calm = profile.need_calm,
            language_mode = ?profile.language_mode,
            "mood profile parsed"
        );
        Ok(profile)
    }

    pub fn build_prompt(&self, request: &MoodRequest) -> String {
        let context = match request.context_text() {
            Some(context) => format!("The user's current situation: \"{}\".", context),
            None => "The user did not describe their current situation.".to_string(),
        };
        let genres = if request.preferred_genres.is_empty() {
            "The user did not name any favourite genres.".to_string()
        } else {
            format!(
                "The user's favourite genres: {}.",
                request.preferred_genres.join(", ")
            )
        };

        format!(
            r#"You are an expert in emotion analysis.

Analyse the user's text below and produce a profile in STRICT JSON.

User text:
"{mood}"

Additional information:
- Requested language pool: {preference}
- {context}
- {genres}

OUTPUT FORMAT EXAMPLE:

{{
  "summary": "Short summary",
  "energy": 4,
  "valence": 6,
  "stress": 3,
  "focus": 7,
  "needCalm": 8,
  "needMotivation": 5,
  "languageMode": "target",
  "seedGenres": ["lofi", "pop"],
  "seedMoods": ["calm", "melancholic"]
}}

RULES:
- Return exactly ONE JSON object and no text outside it.
- "summary" is a short summary of at most 2-3 sentences.
- Every score field (energy, valence, stress, focus, needCalm, needMotivation) is an INTEGER from 1 to 10.
- "languageMode" is either "target" (prefer {language} songs) or "global".
- "seedGenres" are real genre names as used by music streaming catalogs."#,
            mood = request.mood_text.trim(),
            preference = request.language_preference.as_str(),
            context = context,
            genres = genres,
            language = self.target_language_name,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfile {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    energy: Option<Value>,
    #[serde(default)]
    valence: Option<Value>,
    #[serde(default)]
    stress: Option<Value>,
    #[serde(default)]
    focus: Option<Value>,
    #[serde(default)]
    need_calm: Option<Value>,
    #[serde(default)]
    need_motivation: Option<Value>,
    #[serde(default, alias = "language")]
    language_mode: Option<String>,
    #[serde(default)]
    seed_genres: Option<Vec<String>>,
    #[serde(default)]
    seed_moods: Option<Vec<String>>,
}

/// Lenient profile parse: missing or malformed scores fall back to the
/// midpoint, out-of-range scores are clamped, and an unknown language mode
/// falls back to the request's preference.
pub(crate) fn parse_profile(
    answer: &str,
    request: &MoodRequest,
    target_codes: &[String],
) -> Result<MoodProfile> {
    let json = extract_json_object(answer).ok_or_else(|| {
        RecommendationError::AnalysisFailure("answer contained no JSON object".to_string())
    })?;

    let raw: RawProfile = serde_json::from_str(json)
        .map_err(|e| RecommendationError::AnalysisFailure(format!("malformed profile: {}", e)))?;

    let summary = raw
        .summary
        .map(|summary| summary.trim().to_string())
        .filter(|summary| !summary.is_empty())
        .ok_or_else(|| RecommendationError::AnalysisFailure("empty summary".to_string()))?;

    let language_mode = raw
        .language_mode
        .as_deref()
        .and_then(|value| LanguageMode::parse(value, target_codes))
        .unwrap_or_else(|| request.language_preference.into());

    Ok(MoodProfile {
        summary,
        energy: score(raw.energy.as_ref()),
        valence: score(raw.valence.as_ref()),
        stress: score(raw.stress.as_ref()),
        focus: score(raw.focus.as_ref()),
        need_calm: score(raw.need_calm.as_ref()),
        need_motivation: score(raw.need_motivation.as_ref()),
        language_mode,
        seed_genres: non_blank(raw.seed_genres),
        seed_moods: non_blank(raw.seed_moods),
    })
}

fn score(value: Option<&Value>) -> u8 {
    let number = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(number) if number.is_finite() => number.round().clamp(1.0, 10.0) as u8,
        _ => DEFAULT_SCORE,
    }
}

fn non_blank(values: Option<Vec<String>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}
