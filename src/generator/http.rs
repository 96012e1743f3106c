//! HTTP-delegating image generator
//!
//! Forwards generation requests to a remote diffusion backend. Transport
//! failures and non-2xx replies surface as generation errors; nothing is
//! substituted silently.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::generator::traits::{GeneratedImage, GenerationParams, ImageGenerator};

/// Remote diffusion backend client
pub struct HttpGenerator {
    name: String,
    endpoint: String,
    client: Client,
}

/// Wire request sent to the backend
#[derive(Debug, Serialize)]
struct RemoteGenerateRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    width: u32,
    height: u32,
    steps: u32,
    guidance_scale: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

/// Wire response from the backend
#[derive(Debug, Deserialize)]
struct RemoteGenerateResponse {
    image: String,
    seed: u64,
}

impl HttpGenerator {
    /// Create a client for one model backend
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageGenerator for HttpGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, params: &GenerationParams) -> Result<GeneratedImage> {
        let url = format!("{}/generate", self.endpoint);
        debug!(model = %self.name, url = %url, "delegating to remote backend");

        let request = RemoteGenerateRequest {
            prompt: &params.prompt,
            model: &self.name,
            width: params.width,
            height: params.height,
            steps: params.steps,
            guidance_scale: params.guidance_scale,
            seed: params.seed,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("backend '{}' unreachable: {}", self.name, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "backend '{}' returned {}: {}",
                self.name, status, body
            )));
        }

        let reply: RemoteGenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("backend '{}' sent malformed reply: {}", self.name, e)))?;

        Ok(GeneratedImage {
            b64_json: reply.image,
            seed: reply.seed,
        })
    }
}
