//! Generator registry
//!
//! Maps normalized model names to generator instances. Built once from
//! configuration at startup; models without a configured endpoint are served
//! by the mock generator.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use async_trait::async_trait;

use crate::config::Settings;
use crate::error::Result;
use crate::generator::http::HttpGenerator;
use crate::generator::mock::MockGenerator;
use crate::generator::traits::{GeneratedImage, GenerationParams, ImageGenerator};

/// Registry of supported models
pub struct GeneratorRegistry {
    generators: DashMap<String, Arc<dyn ImageGenerator>>,
}

impl GeneratorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            generators: DashMap::new(),
        }
    }

    /// Build the registry from configuration.
    ///
    /// Models with an endpoint get an HTTP generator, optionally wrapped with
    /// a mock fallback when `generation.mock_fallback` is enabled. Models
    /// without an endpoint are served by the mock generator directly.
    pub fn from_config(settings: &Settings) -> Result<Self> {
        let registry = Self::new();

        for model in &settings.generation.models {
            let name = model.name.trim().to_lowercase();

            let generator: Arc<dyn ImageGenerator> = match &model.endpoint {
                Some(endpoint) => {
                    let http = Arc::new(HttpGenerator::new(
                        name.clone(),
                        endpoint.clone(),
                        Duration::from_millis(model.timeout_ms),
                    )?);
                    if settings.generation.mock_fallback {
                        Arc::new(FallbackGenerator::new(
                            http,
                            Arc::new(MockGenerator::new(name.clone())),
                        ))
                    } else {
                        http
                    }
                }
                None => Arc::new(MockGenerator::new(name.clone())),
            };

            info!(
                model = %name,
                endpoint = model.endpoint.as_deref().unwrap_or("(mock)"),
                "registered model"
            );
            registry.insert(name, generator);
        }

        Ok(registry)
    }

    /// Register a generator under a normalized model name
    pub fn insert(&self, name: impl Into<String>, generator: Arc<dyn ImageGenerator>) {
        self.generators.insert(name.into().to_lowercase(), generator);
    }

    /// Look up a generator by normalized model name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ImageGenerator>> {
        self.generators.get(name).map(|r| r.value().clone())
    }

    /// Sorted list of supported model names
    pub fn supported_models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.generators.iter().map(|r| r.key().clone()).collect();
        models.sort();
        models
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a primary generator with an explicit mock fallback.
///
/// Only constructed when `generation.mock_fallback` is enabled; the fallback
/// is logged so masked backend failures remain visible.
pub struct FallbackGenerator {
    primary: Arc<dyn ImageGenerator>,
    fallback: Arc<dyn ImageGenerator>,
}

impl FallbackGenerator {
    pub fn new(primary: Arc<dyn ImageGenerator>, fallback: Arc<dyn ImageGenerator>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl ImageGenerator for FallbackGenerator {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn generate(&self, params: &GenerationParams) -> Result<GeneratedImage> {
        match self.primary.generate(params).await {
            Ok(image) => Ok(image),
            Err(e) => {
                warn!(model = %self.primary.name(), error = %e, "primary backend failed, serving mock fallback");
                self.fallback.generate(params).await
            }
        }
    }
}
