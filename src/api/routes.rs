//! HTTP route definitions

use crate::api::handlers;
use crate::api::models::*;
use crate::error::{ErrorDetail, ErrorResponse};
use crate::resources::{ResourceUnit, UnitKind};
use crate::stats::StatsSnapshot;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Image Generation Server API",
        description = "HTTP front-end that serializes image generation jobs onto a small pool of exclusive GPUs.",
        license(name = "MIT"),
    ),
    paths(
        handlers::generate_image,
        handlers::get_status,
        handlers::health_check,
        handlers::list_models,
    ),
    components(schemas(
        GenerateRequest,
        GenerateResponse,
        GenerationMetadata,
        StatusResponse,
        HealthResponse,
        ModelsResponse,
        ResourceUnit,
        UnitKind,
        StatsSnapshot,
        ErrorResponse,
        ErrorDetail,
    )),
    tags(
        (name = "Generation", description = "Image generation endpoints"),
        (name = "Monitoring", description = "Health and status endpoints"),
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: Arc<crate::AppState>) -> Router {
    Router::new()
        .route("/generate", post(handlers::generate_image))
        .route("/status", get(handlers::get_status))
        .route("/health", get(handlers::health_check))
        .route("/models", get(handlers::list_models))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
