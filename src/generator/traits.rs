//! Common traits and types for image generators

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parameters handed to a generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// The prompt to generate an image from
    pub prompt: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Number of inference steps
    pub steps: u32,

    /// Guidance scale / CFG scale
    pub guidance_scale: f32,

    /// Random seed for reproducibility; the generator chooses one when absent
    pub seed: Option<u64>,
}

/// A produced image with the seed that was actually used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Base64 encoded image payload
    pub b64_json: String,

    /// Seed used for generation. Equals the requested seed when one was
    /// given; otherwise chosen by the generator.
    pub seed: u64,
}

/// Trait for image generation collaborators
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Model name this generator serves
    fn name(&self) -> &str;

    /// Produce an image from the given parameters
    async fn generate(&self, params: &GenerationParams) -> Result<GeneratedImage>;
}
