//! API request and response models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::orchestrator::{CompletedGeneration, GenerationJob};
use crate::resources::ResourceUnit;
use crate::stats::StatsSnapshot;

/// Image generation request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GenerateRequest {
    /// Text description of the image to generate
    pub prompt: String,

    /// Model to use, e.g. "flux" or "sdxl" (case-insensitive)
    pub model: String,

    /// Image width in pixels (64-2048)
    #[serde(default = "default_dimension")]
    pub width: u32,

    /// Image height in pixels (64-2048)
    #[serde(default = "default_dimension")]
    pub height: u32,

    /// Number of inference steps (1-100)
    #[serde(default = "default_steps")]
    pub steps: u32,

    /// Guidance scale for generation (1.0-20.0)
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f32,

    /// Random seed for reproducible results
    #[serde(default)]
    pub seed: Option<u64>,

    /// Seconds to wait for a free compute unit; server default when omitted
    #[serde(default)]
    pub timeout: Option<f64>,
}

fn default_dimension() -> u32 {
    512
}

fn default_steps() -> u32 {
    20
}

fn default_guidance_scale() -> f32 {
    7.5
}

impl From<GenerateRequest> for GenerationJob {
    fn from(request: GenerateRequest) -> Self {
        GenerationJob {
            prompt: request.prompt,
            model: request.model,
            width: request.width,
            height: request.height,
            steps: request.steps,
            guidance_scale: request.guidance_scale,
            seed: request.seed,
            timeout: request.timeout,
        }
    }
}

/// Metadata echoed back with a generated image
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GenerationMetadata {
    pub prompt: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub guidance_scale: f32,
    /// Seed actually used; equals the requested seed when one was given
    pub seed: u64,
    /// Wall-clock duration of the request in seconds
    pub generation_time: f64,
    /// Id of the compute unit that ran the generation
    pub unit_id: u32,
}

/// Image generation response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GenerateResponse {
    /// Base64 encoded image payload
    pub image: String,
    pub metadata: GenerationMetadata,
}

impl From<CompletedGeneration> for GenerateResponse {
    fn from(completed: CompletedGeneration) -> Self {
        GenerateResponse {
            image: completed.image,
            metadata: GenerationMetadata {
                prompt: completed.prompt,
                model: completed.model,
                width: completed.width,
                height: completed.height,
                steps: completed.steps,
                guidance_scale: completed.guidance_scale,
                seed: completed.seed,
                generation_time: completed.generation_time,
                unit_id: completed.unit_id,
            },
        }
    }
}

/// Detailed server status
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub application: String,
    pub version: String,
    pub resources: Vec<ResourceUnit>,
    pub resource_count: usize,
    pub stats: StatsSnapshot,
}

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Supported model list
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}
