// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{CatalogError, Result};
use std::future::Future;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Bearer credential with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at_epoch_second: i64,
}

impl CachedToken {
    /// Build a token that expires `expires_in` seconds after `now`.
    pub fn expiring_in(access_token: impl Into<String>, now: i64, expires_in: i64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at_epoch_second: now.saturating_add(expires_in),
        }
    }

    /// Usable at `now` only while more than `skew` seconds remain.
    pub fn is_fresh_at(&self, now: i64, skew: i64) -> bool {
        now < self.expires_at_epoch_second - skew
    }
}

#[derive(Debug, Default)]
struct TokenState {
    token: Option<CachedToken>,
    last_failure_at: Option<i64>,
}

/// Process-wide token cache.
///
/// The lock is held across a refresh, so concurrent callers that find the
/// token stale queue behind a single exchange and then observe its result.
/// After a failed exchange the cache fails fast for the cooldown window.
#[derive(Debug)]
pub struct TokenCache {
    state: Mutex<TokenState>,
    expiry_skew_secs: i64,
    failure_cooldown_secs: i64,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(30, 30)
    }
}

impl TokenCache {
    pub fn new(expiry_skew_secs: i64, failure_cooldown_secs: i64) -> Self {
        Self {
            state: Mutex::new(TokenState::default()),
            expiry_skew_secs,
            failure_cooldown_secs,
        }
    }

    /// Return the cached token, running `refresh` only when it is missing or stale.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<String>
    where
        F: FnOnce(i64) -> Fut,
        Fut: Future<Output = Result<CachedToken>>,
    {
        self.get_or_refresh_at(now_epoch_seconds(), refresh).await
    }

    /// Same as [`TokenCache::get_or_refresh`] with an explicit clock.
    pub async fn get_or_refresh_at<F, Fut>(&self, now: i64, refresh: F) -> Result<String>
    where
        F: FnOnce(i64) -> Fut,
        Fut: Future<Output = Result<CachedToken>>,
    {
        let mut state = self.state.lock().await;

        if let Some(token) = state.token.as_ref() {
            if token.is_fresh_at(now, self.expiry_skew_secs) {
                return Ok(token.access_token.clone());
            }
            debug!(target: "spotify", "cached token stale, refreshing");
        }

        if let Some(failed_at) = state.last_failure_at {
            if now - failed_at < self.failure_cooldown_secs {
                return Err(CatalogError::TokenAcquisition(
                    "token exchange cooling down after failure".to_string(),
                ));
            }
        }

        match refresh(now).await {
            Ok(token) => {
                let access_token = token.access_token.clone();
                state.token = Some(token);
                state.last_failure_at = None;
                Ok(access_token)
            }
            Err(error) => {
                warn!(target: "spotify", error = %error, "token exchange failed");
                state.token = None;
                state.last_failure_at = Some(now);
                Err(match error {
                    CatalogError::TokenAcquisition(message) => {
                        CatalogError::TokenAcquisition(message)
                    }
                    other => CatalogError::TokenAcquisition(other.to_string()),
                })
            }
        }
    }

    /// Drop the cached token (e.g. after the API rejected it).
    pub async fn invalidate(&self) {
        self.state.lock().await.token = None;
    }
}

fn now_epoch_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}
