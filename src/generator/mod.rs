//! Image generation collaborators
//!
//! The orchestrator is agnostic to how an image is produced; it dispatches
//! through [`traits::ImageGenerator`]. Implementations: a deterministic mock
//! and an HTTP client delegating to a remote diffusion backend.

pub mod http;
pub mod mock;
pub mod registry;
pub mod traits;

pub use http::HttpGenerator;
pub use mock::MockGenerator;
pub use registry::{FallbackGenerator, GeneratorRegistry};
pub use traits::{GeneratedImage, GenerationParams, ImageGenerator};
