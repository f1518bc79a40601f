// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::Result;
use async_trait::async_trait;
use moodtune_domain::{CatalogItem, LanguageMode, RecommendedItem, VideoItem};

/// Primary catalog track search.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    fn name(&self) -> &str;

    /// Search tracks, optionally restricted to a market (ISO country code).
    /// Items come back in the catalog's own ranking order.
    async fn search(&self, query: &str, market: Option<&str>) -> Result<Vec<CatalogItem>>;
}

/// Secondary catalog returning only videos that look like songs.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    fn name(&self) -> &str;

    async fn search_music_videos(&self, query: &str, mode: LanguageMode)
        -> Result<Vec<VideoItem>>;
}

/// Seed-based recommendation API.
#[async_trait]
pub trait SeedRecommender: Send + Sync {
    fn name(&self) -> &str;

    async fn recommend(&self, seed_ids: &[String], size: usize) -> Result<Vec<RecommendedItem>>;
}
