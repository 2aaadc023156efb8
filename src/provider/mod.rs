pub mod huggingface;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

pub use huggingface::HuggingFaceProvider;

/// Sampling parameters sent alongside every prompt.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GenerationParams {
    pub guidance_scale: f32,
    pub num_inference_steps: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            guidance_scale: 7.5,
            num_inference_steps: 30,
            width: 768,
            height: 960,
        }
    }
}

/// A text-to-image backend. Implementations return the raw image bytes of a
/// successful generation.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate_image(
        &self,
        token: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<u8>>;
}
