// SPDX-License-Identifier: GPL-3.0-or-later

use moodtune_catalog::CatalogError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendationError>;

/// Recoverable pipeline failures. None of these reach the caller of
/// [`crate::RecommendationService`]; they are logged and degrade the result.
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Mood analysis failed: {0}")]
    AnalysisFailure(String),

    #[error("Seed generation failed: {0}")]
    GenerationFailure(String),

    #[error("Catalog lookup failed: {0}")]
    CatalogLookupFailure(String),

    #[error("Catalog token acquisition failed: {0}")]
    TokenAcquisitionFailure(String),
}

impl From<CatalogError> for RecommendationError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::TokenAcquisition(message) => {
                RecommendationError::TokenAcquisitionFailure(message)
            }
            other => RecommendationError::CatalogLookupFailure(other.to_string()),
        }
    }
}
