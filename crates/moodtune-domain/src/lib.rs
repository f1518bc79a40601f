// SPDX-License-Identifier: GPL-3.0-or-later
use serde::{Deserialize, Serialize};

/// Smallest and largest number of tracks a single request may ask for.
pub const MIN_DESIRED_COUNT: usize = 1;
pub const MAX_DESIRED_COUNT: usize = 10;

// ============================================================================
// Request
// ============================================================================

/// Which language pool the caller wants recommendations from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LanguagePreference {
    /// Prefer songs in the configured target language.
    Target,
    /// Mixed languages, no preference.
    #[default]
    Global,
}

impl LanguagePreference {
    /// Map a client-supplied language code onto a preference.
    ///
    /// `target` and any of `target_codes` (case-insensitive) select
    /// [`LanguagePreference::Target`]; every other code, including empty, is
    /// treated as global.
    pub fn from_language_code(code: &str, target_codes: &[String]) -> Self {
        if is_target_code(code, target_codes) {
            Self::Target
        } else {
            Self::Global
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Global => "global",
        }
    }
}

fn is_target_code(code: &str, target_codes: &[String]) -> bool {
    let code = code.trim().to_lowercase();
    !code.is_empty()
        && (code == "target"
            || target_codes
                .iter()
                .any(|target| target.trim().to_lowercase() == code))
}

/// A single incoming mood recommendation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodRequest {
    pub mood_text: String,
    pub language_preference: LanguagePreference,
    pub desired_count: usize,
    pub want_primary_catalog_links: bool,
    pub want_secondary_catalog_links: bool,
    pub include_reason: bool,
    pub context: Option<String>,
    #[serde(default)]
    pub preferred_genres: Vec<String>,
}

impl MoodRequest {
    pub fn new(mood_text: impl Into<String>, language_preference: LanguagePreference) -> Self {
        Self {
            mood_text: mood_text.into(),
            language_preference,
            desired_count: MAX_DESIRED_COUNT,
            want_primary_catalog_links: true,
            want_secondary_catalog_links: true,
            include_reason: true,
            context: None,
            preferred_genres: Vec::new(),
        }
    }

    /// Requested count clamped into `1..=10`.
    pub fn effective_count(&self) -> usize {
        self.desired_count
            .clamp(MIN_DESIRED_COUNT, MAX_DESIRED_COUNT)
    }

    /// Non-blank context, if any.
    pub fn context_text(&self) -> Option<&str> {
        self.context
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

// ============================================================================
// Mood profile
// ============================================================================

/// Language mode chosen by the mood analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    Target,
    Global,
}

impl LanguageMode {
    /// Lenient parse of the model's `languageMode` value; a target language
    /// code is read as `target`.
    pub fn parse(value: &str, target_codes: &[String]) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("global") {
            Some(Self::Global)
        } else if is_target_code(value, target_codes) {
            Some(Self::Target)
        } else {
            None
        }
    }

    pub fn is_target(&self) -> bool {
        matches!(self, Self::Target)
    }
}

impl From<LanguagePreference> for LanguageMode {
    fn from(value: LanguagePreference) -> Self {
        match value {
            LanguagePreference::Target => Self::Target,
            LanguagePreference::Global => Self::Global,
        }
    }
}

/// Midpoint used for any score the model left out.
pub const DEFAULT_SCORE: u8 = 5;

/// Structured summary of the user's emotional state. All scores are in `1..=10`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodProfile {
    pub summary: String,
    pub energy: u8,
    pub valence: u8,
    pub stress: u8,
    pub focus: u8,
    pub need_calm: u8,
    pub need_motivation: u8,
    pub language_mode: LanguageMode,
    pub seed_genres: Vec<String>,
    pub seed_moods: Vec<String>,
}

impl MoodProfile {
    /// Profile used when the analysis stage could not produce one.
    pub fn degraded(request: &MoodRequest) -> Self {
        Self {
            summary: request.mood_text.trim().to_string(),
            energy: DEFAULT_SCORE,
            valence: DEFAULT_SCORE,
            stress: DEFAULT_SCORE,
            focus: DEFAULT_SCORE,
            need_calm: DEFAULT_SCORE,
            need_motivation: DEFAULT_SCORE,
            language_mode: request.language_preference.into(),
            seed_genres: request.preferred_genres.clone(),
            seed_moods: Vec::new(),
        }
    }
}

// ============================================================================
// Candidates and catalog results
// ============================================================================

/// Unvalidated (title, artist) suggestion produced by the text model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub artist: String,
    pub reason: Option<String>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// One entry of a primary catalog search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub canonical_url: String,
    pub thumbnail_url: Option<String>,
}

impl CatalogItem {
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }
}

/// A candidate accepted against a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMatch {
    pub catalog_id: String,
    pub title: String,
    pub artist: String,
    pub canonical_url: String,
    pub score: i32,
}

/// Item returned by the seed-based recommendation API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RecommendedItem {
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    pub canonical_url: Option<String>,
}

/// Result of a secondary (video) catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub duration_seconds: u32,
    pub category_id: String,
}

impl VideoItem {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

// ============================================================================
// Output
// ============================================================================

/// A playable song reference, the terminal artifact of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub primary_catalog_url: Option<String>,
    pub secondary_catalog_url: Option<String>,
    pub secondary_catalog_id: Option<String>,
    pub reason: Option<String>,
}
