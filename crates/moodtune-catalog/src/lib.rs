// SPDX-License-Identifier: GPL-3.0-or-later

//! Music catalog collaborators.
//!
//! - [`SpotifyClient`]: primary catalog search behind a cached
//!   client-credentials token.
//! - [`YoutubeClient`]: secondary catalog, verified music videos only.
//! - [`ReccoBeatsClient`]: seed-based recommendation expansion.
//!
//! The pipeline talks to them through the traits in [`traits`] so stages can
//! be exercised against fakes.

pub mod error;
pub mod reccobeats;
pub mod spotify;
pub mod title_parser;
pub mod token;
pub mod traits;
pub mod youtube;

pub use error::{CatalogError, Result};
pub use reccobeats::ReccoBeatsClient;
pub use spotify::SpotifyClient;
pub use token::{CachedToken, TokenCache};
pub use traits::{CatalogSearch, SeedRecommender, VideoSearch};
pub use youtube::{VideoFilter, YoutubeClient};
