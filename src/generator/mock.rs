//! Mock image generator
//!
//! Produces a small deterministic placeholder raster so the full request
//! path can run without any model backend. The same seed always yields the
//! same payload.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::Rng;
use tracing::debug;

use crate::error::Result;
use crate::generator::traits::{GeneratedImage, GenerationParams, ImageGenerator};

const MAX_PREVIEW_DIM: u32 = 64;

/// Deterministic placeholder generator
pub struct MockGenerator {
    name: String,
}

impl MockGenerator {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Render a PPM raster with a seed-derived solid color
    fn render(&self, params: &GenerationParams, seed: u64) -> Vec<u8> {
        let width = params.width.clamp(1, MAX_PREVIEW_DIM);
        let height = params.height.clamp(1, MAX_PREVIEW_DIM);

        let r = (seed & 0xff) as u8;
        let g = ((seed >> 8) & 0xff) as u8;
        let b = ((seed >> 16) & 0xff) as u8;

        let mut payload = format!("P6\n# mock {}\n{} {}\n255\n", self.name, width, height)
            .into_bytes();
        payload.reserve((width * height * 3) as usize);
        for _ in 0..(width * height) {
            payload.extend_from_slice(&[r, g, b]);
        }
        payload
    }
}

#[async_trait]
impl ImageGenerator for MockGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, params: &GenerationParams) -> Result<GeneratedImage> {
        let seed = params
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen::<u32>() as u64);

        debug!(model = %self.name, seed, "serving mock image");

        let payload = self.render(params, seed);
        Ok(GeneratedImage {
            b64_json: STANDARD.encode(payload),
            seed,
        })
    }
}
