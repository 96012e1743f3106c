//! Main entry point for the Image Generation Server

use img_gen_server::{
    api, config::Settings, generator::GeneratorRegistry, orchestrator::GenerationOrchestrator,
    resources::{Allocator, Inventory}, stats::ServerStats, AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));

    if settings.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    info!("Starting Image Generation Server");

    // Discover compute units once; the catalog is static for the process
    let inventory = Arc::new(Inventory::discover());
    for unit in inventory.units() {
        info!(id = unit.id, kind = ?unit.kind, memory = %unit.memory, name = %unit.name, "discovered compute unit");
    }
    if inventory.lockable_count() == 0 {
        warn!("no exclusive compute unit found; generation requests will time out");
    }

    let allocator = Arc::new(Allocator::new(&inventory));
    let stats = Arc::new(ServerStats::new());

    let registry = Arc::new(GeneratorRegistry::from_config(&settings)?);
    info!(models = registry.len(), "registered generation models");

    let orchestrator = Arc::new(GenerationOrchestrator::new(
        allocator.clone(),
        stats.clone(),
        registry.clone(),
        Duration::from_secs_f64(settings.generation.image_generation_timeout),
    ));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let app_state = Arc::new(AppState {
        settings,
        inventory,
        allocator,
        stats,
        registry,
        orchestrator,
    });

    let app = api::routes::create_router(app_state);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
