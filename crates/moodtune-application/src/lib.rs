// SPDX-License-Identifier: GPL-3.0-or-later
use moodtune_config::AppConfig;
use std::sync::Arc;

pub mod error;
pub mod expansion;
pub mod language;
pub mod links;
pub mod matching;
pub mod mood_profile;
pub mod normalization;
pub mod recommendation;
pub mod seeds;
pub mod validation;

#[cfg(test)]
mod pipeline_tests;
#[cfg(test)]
mod test_support;

pub use error::{RecommendationError, Result};
pub use expansion::ExpansionEngine;
pub use language::LanguageHeuristic;
pub use matching::{CatalogMatcher, FieldMatch};
pub use mood_profile::MoodProfileAnalyzer;
pub use recommendation::{
    Collaborators, PipelineStage, RecommendationOutcome, RecommendationService,
    RecommendationSource,
};
pub use seeds::SeedCandidateGenerator;
pub use validation::{CatalogValidator, ValidationOutcome};

use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub recommendations: Arc<RecommendationService>,
}

impl AppState {
    pub fn new(config: AppConfig, recommendations: Arc<RecommendationService>) -> Self {
        Self {
            config,
            recommendations,
        }
    }

    pub fn on_start(&self) {
        info!(
            target: "application",
            market = %self.config.pipeline.target_market,
            max_suggestions = self.config.pipeline.max_suggestions,
            "application state initialized"
        );
    }
}
