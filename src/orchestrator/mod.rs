//! Request orchestration
//!
//! Drives a generation request through its lifecycle: admission (validation,
//! model lookup), unit acquisition with a bounded wait, dispatch to the
//! generation collaborator, statistics updates, and guaranteed release of the
//! acquired unit on every exit path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::generator::{GenerationParams, GeneratorRegistry};
use crate::resources::Allocator;
use crate::stats::ServerStats;

/// One generation request, as admitted from the HTTP layer (unvalidated)
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub prompt: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub guidance_scale: f32,
    pub seed: Option<u64>,
    /// Per-request wait budget in seconds; falls back to the configured default
    pub timeout: Option<f64>,
}

impl GenerationJob {
    /// Enforce the request schema constraints.
    ///
    /// Runs before any resource side effect; a failure here never reaches
    /// allocation.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(AppError::Validation("Prompt must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::Validation("Model must not be empty".to_string()));
        }
        if !(64..=2048).contains(&self.width) || !(64..=2048).contains(&self.height) {
            return Err(AppError::Validation(
                "Width and height must be between 64 and 2048 pixels".to_string(),
            ));
        }
        if !(1..=100).contains(&self.steps) {
            return Err(AppError::Validation(
                "Steps must be between 1 and 100".to_string(),
            ));
        }
        if !self.guidance_scale.is_finite() || !(1.0..=20.0).contains(&self.guidance_scale) {
            return Err(AppError::Validation(
                "Guidance scale must be between 1.0 and 20.0".to_string(),
            ));
        }
        if let Some(timeout) = self.timeout {
            // try_from_secs_f64 also rejects values that overflow Duration
            if !timeout.is_finite() || Duration::try_from_secs_f64(timeout).is_err() {
                return Err(AppError::Validation(
                    "Timeout must be a non-negative number of seconds".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn params(&self) -> GenerationParams {
        GenerationParams {
            prompt: self.prompt.clone(),
            width: self.width,
            height: self.height,
            steps: self.steps,
            guidance_scale: self.guidance_scale,
            seed: self.seed,
        }
    }
}

/// Outcome of a completed generation
#[derive(Debug, Clone)]
pub struct CompletedGeneration {
    pub image: String,
    pub prompt: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub guidance_scale: f32,
    /// Seed actually used by the collaborator
    pub seed: u64,
    pub generation_time: f64,
    pub unit_id: u32,
}

/// Scoped hold on a compute unit.
///
/// Dropping the lease releases the unit and refreshes the active-generations
/// gauge, so release happens on every exit path from the allocated region.
struct UnitLease {
    allocator: Arc<Allocator>,
    stats: Arc<ServerStats>,
    unit_id: u32,
}

impl UnitLease {
    fn new(allocator: Arc<Allocator>, stats: Arc<ServerStats>, unit_id: u32) -> Self {
        stats.set_active_generations(allocator.held_count());
        Self {
            allocator,
            stats,
            unit_id,
        }
    }
}

impl Drop for UnitLease {
    fn drop(&mut self) {
        self.allocator.release(self.unit_id);
        self.stats.set_active_generations(self.allocator.held_count());
    }
}

/// Per-request control flow around the allocator, stats, and generators
pub struct GenerationOrchestrator {
    allocator: Arc<Allocator>,
    stats: Arc<ServerStats>,
    registry: Arc<GeneratorRegistry>,
    default_timeout: Duration,
    waiting: AtomicUsize,
}

impl GenerationOrchestrator {
    pub fn new(
        allocator: Arc<Allocator>,
        stats: Arc<ServerStats>,
        registry: Arc<GeneratorRegistry>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            allocator,
            stats,
            registry,
            default_timeout,
            waiting: AtomicUsize::new(0),
        }
    }

    /// Run one generation request to completion.
    ///
    /// Every call increments `total_requests` exactly once and exactly one of
    /// the success/failure counters, whichever branch it exits through.
    pub async fn execute(&self, job: GenerationJob) -> Result<CompletedGeneration> {
        self.stats.record_request();
        let started = Instant::now();
        let job_id = Uuid::new_v4();

        if let Err(e) = job.validate() {
            self.stats.record_failure();
            return Err(e);
        }

        // Resolve the model before touching the lock set so an invalid
        // request never wastes a unit.
        let model = job.model.trim().to_lowercase();
        let Some(generator) = self.registry.get(&model) else {
            self.stats.record_failure();
            return Err(AppError::UnsupportedModel(job.model.clone()));
        };

        // Already validated as convertible
        let timeout = job
            .timeout
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(self.default_timeout);

        info!(%job_id, model = %model, width = job.width, height = job.height, "admitted generation request");

        let waiting = self.waiting.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.set_queue_length(waiting);
        let acquired = self.allocator.acquire(timeout).await;
        let waiting = self.waiting.fetch_sub(1, Ordering::SeqCst) - 1;
        self.stats.set_queue_length(waiting);

        let Some(unit_id) = acquired else {
            self.stats.record_failure();
            warn!(%job_id, timeout_secs = timeout.as_secs_f64(), "no compute unit became free");
            return Err(AppError::ResourceTimeout(format!(
                "no compute unit became free within {:.1}s",
                timeout.as_secs_f64()
            )));
        };

        // Held from here on; the lease releases on every path out.
        let _lease = UnitLease::new(self.allocator.clone(), self.stats.clone(), unit_id);

        match generator.generate(&job.params()).await {
            Ok(image) => {
                let generation_time = started.elapsed().as_secs_f64();
                self.stats.record_success();
                info!(%job_id, unit_id, seed = image.seed, generation_time, "generation completed");
                Ok(CompletedGeneration {
                    image: image.b64_json,
                    prompt: job.prompt,
                    model,
                    width: job.width,
                    height: job.height,
                    steps: job.steps,
                    guidance_scale: job.guidance_scale,
                    seed: image.seed,
                    generation_time,
                    unit_id,
                })
            }
            Err(e) => {
                self.stats.record_failure();
                warn!(%job_id, unit_id, error = %e, "generation failed");
                Err(e)
            }
        }
    }
}
