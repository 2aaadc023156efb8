use std::sync::Arc;

use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::presets::{Composition, Style};
use crate::prompt::build_prompt;
use crate::provider::{GenerationParams, ImageProvider};
use crate::storage::ImageStore;

const GENERATED_PREFIX: &str = "gen";
const MISSING_TOKEN: &str = "HF_TOKEN is missing. Set it in your .env file.";

/// Fields accepted by a generation request. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GenerationRequest {
    pub style: Option<String>,
    pub composition: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub image_url: String,
    pub prompt_used: String,
}

pub struct PromptOrchestrator {
    provider: Arc<dyn ImageProvider>,
    generated: ImageStore,
    token: Option<String>,
    params: GenerationParams,
}

impl PromptOrchestrator {
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        generated: ImageStore,
        token: Option<String>,
    ) -> Self {
        Self {
            provider,
            generated,
            token,
            params: GenerationParams::default(),
        }
    }

    pub fn from_config(
        config: &Config,
        provider: Arc<dyn ImageProvider>,
        generated: ImageStore,
    ) -> Self {
        Self::new(provider, generated, config.hf_token.clone())
    }

    pub fn prepare_prompt(&self, request: &GenerationRequest) -> String {
        let style = Style::resolve(request.style.as_deref());
        let composition = Composition::resolve(request.composition.as_deref());
        tracing::debug!(
            style = style.key(),
            composition = composition.key(),
            "Resolved presets"
        );
        build_prompt(
            request.prompt.as_deref().unwrap_or_default(),
            style,
            composition,
        )
    }

    /// Builds the prompt, calls the provider once and stores the result.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| AppError::Configuration(MISSING_TOKEN.to_string()))?;

        let prompt = self.prepare_prompt(request);
        tracing::debug!(prompt = %prompt, "Requesting image");

        let bytes = self
            .provider
            .generate_image(token, &prompt, &self.params)
            .await?;
        let stored = self.generated.save(GENERATED_PREFIX, ".png", &bytes).await?;
        tracing::info!(filename = %stored.filename, size = bytes.len(), "Stored generated image");

        Ok(GenerationOutcome {
            image_url: stored.url,
            prompt_used: prompt,
        })
    }
}
