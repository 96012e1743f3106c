//! Application settings and configuration management

use crate::error::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Image generation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Default wait budget for a free compute unit, in seconds.
    /// Callers may override per request.
    #[serde(default = "default_generation_timeout")]
    pub image_generation_timeout: f64,

    /// Substitute a mock image when a remote model backend fails.
    /// Off by default: backend failures surface as generation errors.
    #[serde(default)]
    pub mock_fallback: bool,

    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,
}

fn default_generation_timeout() -> f64 {
    60.0
}

fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig {
            name: "flux".to_string(),
            endpoint: None,
            timeout_ms: default_model_timeout(),
        },
        ModelConfig {
            name: "sdxl".to_string(),
            endpoint: None,
            timeout_ms: default_model_timeout(),
        },
    ]
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            image_generation_timeout: default_generation_timeout(),
            mock_fallback: false,
            models: default_models(),
        }
    }
}

/// A single supported model
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    pub name: String,

    /// Remote diffusion backend URL. When absent the model is served
    /// by the built-in mock generator.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_model_timeout")]
    pub timeout_ms: u64,
}

fn default_model_timeout() -> u64 {
    120000
}

impl Settings {
    /// Load settings from the default configuration file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/server.yaml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let format = if path.extension().map_or(false, |ext| ext == "toml") {
            FileFormat::Toml
        } else {
            FileFormat::Yaml
        };

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("generation.image_generation_timeout", 60.0)?
            .set_default("generation.mock_fallback", false)?;

        if path.exists() {
            builder = builder.add_source(File::from(path).format(format));
        }

        builder = builder.add_source(
            Environment::with_prefix("IMG_SERVER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )
            .into());
        }

        if !self.generation.image_generation_timeout.is_finite()
            || self.generation.image_generation_timeout <= 0.0
        {
            return Err(config::ConfigError::Message(
                "generation.image_generation_timeout must be positive".to_string(),
            )
            .into());
        }

        if self.generation.models.is_empty() {
            return Err(config::ConfigError::Message(
                "At least one model must be configured".to_string(),
            )
            .into());
        }

        for model in &self.generation.models {
            if model.name.trim().is_empty() {
                return Err(config::ConfigError::Message(
                    "Model name cannot be empty".to_string(),
                )
                .into());
            }
            if let Some(endpoint) = &model.endpoint {
                if endpoint.trim().is_empty() {
                    return Err(config::ConfigError::Message(format!(
                        "Model '{}' has an empty endpoint",
                        model.name
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.generation.image_generation_timeout, 60.0);
        assert!(!settings.generation.mock_fallback);
        assert_eq!(settings.generation.models.len(), 2);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_timeout() {
        let mut settings = Settings::default();
        settings.generation.image_generation_timeout = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_model_name() {
        let mut settings = Settings::default();
        settings.generation.models[0].name = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_model_config_yaml_roundtrip() {
        let model = ModelConfig {
            name: "flux".to_string(),
            endpoint: Some("http://localhost:8001".to_string()),
            timeout_ms: 60000,
        };

        let yaml = serde_yaml::to_string(&model).unwrap();
        assert!(yaml.contains("name: flux"));
        let parsed: ModelConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.endpoint.as_deref(), Some("http://localhost:8001"));
    }
}
