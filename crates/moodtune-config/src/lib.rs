// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 30,
        }
    }
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: String,
    pub token_url: String,
    pub search_limit: usize,
    pub timeout_secs: u64,
    pub token_expiry_skew_secs: i64,
    pub token_failure_cooldown_secs: i64,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base_url: "https://api.spotify.com/v1".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            search_limit: 5,
            timeout_secs: 10,
            token_expiry_skew_secs: 30,
            token_failure_cooldown_secs: 30,
        }
    }
}

impl SpotifyConfig {
    /// Credentials, when both halves are present and non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let id = self.client_id.as_deref().map(str::trim)?;
        let secret = self.client_secret.as_deref().map(str::trim)?;
        if id.is_empty() || secret.is_empty() {
            return None;
        }
        Some((id, secret))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_results: usize,
    pub min_duration_secs: u32,
    pub max_duration_secs: u32,
    pub timeout_secs: u64,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            max_results: 10,
            min_duration_secs: 90,
            max_duration_secs: 8 * 60,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReccoBeatsConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_size: usize,
}

impl Default for ReccoBeatsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.reccobeats.com/v1".to_string(),
            timeout_secs: 10,
            max_size: 50,
        }
    }
}

/// Match-scoring constants. These are tunable, not protocol requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub exact_match: i32,
    pub partial_match: i32,
    pub joint_bonus: i32,
    pub accept_threshold: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            exact_match: 4,
            partial_match: 2,
            joint_bonus: 3,
            accept_threshold: 3,
        }
    }
}

/// Signals that identify the target language, for both request mapping and
/// the track heuristic. Defaults describe Turkish; replace them together with
/// `target_language_name` and `target_market`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLanguageSignals {
    /// Request language codes that select the target pool.
    pub codes: Vec<String>,
    /// Artists known to sing in the target language.
    pub artists: Vec<String>,
    /// Common words of the language.
    pub hint_words: Vec<String>,
    /// Letters specific to the language.
    pub characters: String,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Default for TargetLanguageSignals {
    fn default() -> Self {
        Self {
            codes: strings(&["tr", "turkce", "türkçe", "turkish"]),
            artists: strings(&[
                "tarkan", "sezen aksu", "mabel matiz", "ceza", "sagopa kajmer", "şanışer",
                "mor ve ötesi", "duman", "athena", "teoman", "manga", "sertab erener",
                "kenan doğulu", "hadise", "gülşen", "sıla", "göksel", "yıldız tilbe", "emre aydın",
                "manuş baba", "zeynep bastık", "melike şahin", "eda erdem", "feridun düzağaç",
                "cem adrian", "gazapizm", "ezhel", "ufo361", "lvbel c5", "sefo", "reckol", "uzi",
            ]),
            hint_words: strings(&[
                "aşk", "sev", "sevg", "kalp", "kalbim", "göz", "gece", "hayat", "yalnız", "değil",
                "olmaz", "ben", "sen", "biz", "siz", "var", "yok", "deli", "yalan", "özledim",
                "özlem", "gönül", "şarkı", "türkçe", "bir", "çok", "bana", "sana", "yine", "kader",
                "hasret", "gitti", "gel", "git", "sevda",
            ]),
            characters: "çğıöşüÇĞİÖŞÜ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub max_suggestions: usize,
    pub validate_limit: usize,
    pub max_concurrent_lookups: usize,
    pub lookup_timeout_ms: u64,
    pub request_timeout_secs: u64,
    pub overfetch_factor: usize,
    pub target_market: String,
    pub target_language_name: String,
    pub target_language_signals: TargetLanguageSignals,
    pub strict_language_filter: bool,
    pub scoring: ScoringConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_suggestions: 4,
            validate_limit: 4,
            max_concurrent_lookups: 8,
            lookup_timeout_ms: 6_000,
            request_timeout_secs: 60,
            overfetch_factor: 3,
            target_market: "TR".to_string(),
            target_language_name: "Turkish".to_string(),
            target_language_signals: TargetLanguageSignals::default(),
            strict_language_filter: false,
            scoring: ScoringConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub telemetry: TelemetryConfig,
    pub gemini: GeminiConfig,
    pub spotify: SpotifyConfig,
    pub youtube: YoutubeConfig,
    pub reccobeats: ReccoBeatsConfig,
    pub pipeline: PipelineConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: MOODTUNE_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("MOODTUNE_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}
