//! Image Generation Server
//!
//! HTTP front-end that serializes image generation jobs onto a small pool of
//! exclusive compute units (GPUs). The core is the resource admission and
//! allocation path: a bounded lock set with blocking-with-timeout
//! acquisition, guaranteed release on every exit path, and a concurrent
//! statistics aggregator.

pub mod api;
pub mod config;
pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod resources;
pub mod stats;

pub use error::{AppError, Result};

use std::sync::Arc;

use generator::GeneratorRegistry;
use orchestrator::GenerationOrchestrator;
use resources::{Allocator, Inventory};
use stats::ServerStats;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: config::Settings,
    pub inventory: Arc<Inventory>,
    pub allocator: Arc<Allocator>,
    pub stats: Arc<ServerStats>,
    pub registry: Arc<GeneratorRegistry>,
    pub orchestrator: Arc<GenerationOrchestrator>,
}
