//! Configuration management

pub mod settings;

pub use settings::{GenerationConfig, LoggingConfig, ModelConfig, ServerConfig, Settings};
