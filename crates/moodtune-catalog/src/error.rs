// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response from catalog: {0}")]
    InvalidResponse(String),

    #[error("Token acquisition failed: {0}")]
    TokenAcquisition(String),

    #[error("Catalog lookup timed out")]
    Timeout,

    #[error("Catalog client is not configured: {0}")]
    NotConfigured(String),
}
