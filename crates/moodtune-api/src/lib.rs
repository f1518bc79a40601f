// SPDX-License-Identifier: GPL-3.0-or-later
pub mod handlers;

use axum::{
    routing::{get, post},
    Json, Router,
};
use handlers::recommendations::{
    recommend, AnalysisResponse, ErrorResponse, RecommendationRequest, RecommendationResponse,
    TrackResponse, __path_recommend,
};
use moodtune_application::AppState;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize, utoipa::ToSchema)]
struct HealthResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
#[allow(dead_code)]
async fn health() -> Json<HealthResponse> {
    health_handler().await
}

#[derive(OpenApi)]
#[openapi(
    paths(health, recommend),
    components(
        schemas(
            HealthResponse,
            RecommendationRequest,
            RecommendationResponse,
            TrackResponse,
            AnalysisResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "recommendations", description = "Mood based song recommendations")
    ),
    info(
        title = "Moodtune API",
        version = "0.1.0",
        description = "Mood to song recommendation service",
    )
)]
struct ApiDoc;

pub fn router(state: AppState) -> Router {
    info!(target: "api", "building router");

    let openapi = ApiDoc::openapi();

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/mood/recommendations", post(recommend))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", openapi))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
