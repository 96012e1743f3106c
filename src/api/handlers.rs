//! HTTP request handlers

use crate::api::models::{
    GenerateRequest, GenerateResponse, HealthResponse, ModelsResponse, StatusResponse,
};
use crate::error::AppError;
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

/// Generate an image from a prompt
#[utoipa::path(
    post,
    path = "/generate",
    tag = "Generation",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Image generated", body = GenerateResponse),
        (status = 400, description = "Unsupported model", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid parameters", body = crate::error::ErrorResponse),
        (status = 503, description = "No compute unit available within the timeout", body = crate::error::ErrorResponse),
        (status = 500, description = "Generation failed", body = crate::error::ErrorResponse),
    )
)]
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    info!(model = %request.model, width = request.width, height = request.height, "received generation request");

    let completed = state.orchestrator.execute(request.into()).await?;

    info!(
        unit_id = completed.unit_id,
        generation_time = completed.generation_time,
        "generation request served"
    );

    Ok(Json(completed.into()))
}

/// Detailed server status: resource inventory plus statistics snapshot
#[utoipa::path(
    get,
    path = "/status",
    tag = "Monitoring",
    responses(
        (status = 200, description = "Server status", body = StatusResponse),
    )
)]
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "running".to_string(),
        application: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        resources: state.inventory.units().to_vec(),
        resource_count: state.inventory.len(),
        stats: state.stats.snapshot(),
    })
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "Monitoring",
    responses(
        (status = 200, description = "Server is alive", body = HealthResponse),
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List supported model names
#[utoipa::path(
    get,
    path = "/models",
    tag = "Generation",
    responses(
        (status = 200, description = "Supported models", body = ModelsResponse),
    )
)]
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.registry.supported_models(),
    })
}
