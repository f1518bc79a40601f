// SPDX-License-Identifier: GPL-3.0-or-later
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::serve;
use moodtune_api::router;
use moodtune_application::{AppState, Collaborators, RecommendationService};
use moodtune_catalog::{
    CatalogSearch, ReccoBeatsClient, SpotifyClient, VideoFilter, VideoSearch, YoutubeClient,
};
use moodtune_config::{load as load_config, AppConfig};
use moodtune_llm::GeminiClient;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var_os("MOODTUNE_CONFIG").map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;
    init_tracing(&config.telemetry.log_level);

    let service = RecommendationService::new(collaborators(&config)?, &config.pipeline);
    let state = AppState::new(config.clone(), Arc::new(service));
    state.on_start();

    let listener = TcpListener::bind(bind_addr(&config.http)?).await?;
    let addr = listener.local_addr()?;
    info!(target: "cli", "listening on {}", addr);

    serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(default_level: &str) {
    let fmt_layer = fmt::layer().with_target(true).with_thread_names(true).with_level(true);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn collaborators(config: &AppConfig) -> Result<Collaborators> {
    let api_key = config
        .gemini
        .api_key
        .as_deref()
        .context("gemini.api_key is required (set MOODTUNE_GEMINI__API_KEY)")?;
    let text_model = GeminiClient::builder(api_key)
        .base_url(&config.gemini.base_url)
        .model(&config.gemini.model)
        .timeout(config.gemini.timeout())
        .build()?;

    let catalog: Option<Arc<dyn CatalogSearch>> = match config.spotify.credentials() {
        Some((client_id, client_secret)) => {
            let spotify = &config.spotify;
            let client = SpotifyClient::builder(client_id, client_secret)
                .api_base_url(&spotify.api_base_url)
                .token_url(&spotify.token_url)
                .search_limit(spotify.search_limit)
                .timeout(Duration::from_secs(spotify.timeout_secs))
                .token_expiry_skew_secs(spotify.token_expiry_skew_secs)
                .token_failure_cooldown_secs(spotify.token_failure_cooldown_secs)
                .build()?;
            Some(Arc::new(client))
        }
        None => {
            warn!(target: "cli", "spotify credentials missing, catalog validation disabled");
            None
        }
    };

    let videos: Option<Arc<dyn VideoSearch>> = match config
        .youtube
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
    {
        Some(api_key) => {
            let youtube = &config.youtube;
            let client = YoutubeClient::builder(api_key)
                .base_url(&youtube.base_url)
                .max_results(youtube.max_results)
                .target_region(&config.pipeline.target_market)
                .filter(VideoFilter {
                    min_duration_secs: youtube.min_duration_secs,
                    max_duration_secs: youtube.max_duration_secs,
                })
                .timeout(Duration::from_secs(youtube.timeout_secs))
                .build()?;
            Some(Arc::new(client))
        }
        None => {
            warn!(target: "cli", "youtube api key missing, video links will be search links");
            None
        }
    };

    let recommender = ReccoBeatsClient::builder()
        .base_url(&config.reccobeats.base_url)
        .timeout(Duration::from_secs(config.reccobeats.timeout_secs))
        .max_size(config.reccobeats.max_size)
        .build()?;

    Ok(Collaborators {
        text_model: Arc::new(text_model),
        catalog,
        videos,
        recommender: Arc::new(recommender),
    })
}

fn bind_addr(http: &moodtune_config::HttpConfig) -> Result<SocketAddr> {
    let addr = format!("{}:{}", http.host, http.port);
    addr.parse()
        .with_context(|| format!("invalid listen address {addr}"))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let mut interrupt = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .expect("install SIGINT handler");

    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("install SIGTERM handler");

    #[cfg(not(unix))]
    let interrupt = tokio::signal::ctrl_c();

    #[cfg(unix)]
    tokio::select! {
        _ = interrupt.recv() => {},
        _ = terminate.recv() => {},
    }

    #[cfg(not(unix))]
    {
        interrupt.await.expect("ctrl_c handler");
    }

    info!(target: "cli", "shutdown signal received");
}
