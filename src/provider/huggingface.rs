use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Serialize;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::provider::{GenerationParams, ImageProvider};

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

/// Hugging Face Inference API client for text-to-image models.
#[derive(Clone, Debug)]
pub struct HuggingFaceProvider {
    client: Client,
    endpoint: String,
}

impl HuggingFaceProvider {
    pub fn new(api_base: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = format!(
            "{}/models/{}",
            api_base.trim_end_matches('/'),
            model.trim_start_matches('/')
        );
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.hf_api_base, &config.hf_model, config.request_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageProvider for HuggingFaceProvider {
    async fn generate_image(
        &self,
        token: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<u8>> {
        tracing::debug!(endpoint = %self.endpoint(), "Sending text-to-image request");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .header(header::ACCEPT, "image/png")
            .json(&InferenceRequest {
                inputs: prompt,
                parameters: params,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(err) => {
                    tracing::debug!(status = %status, "Failed to read error body: {}", err);
                    String::new()
                }
            };
            let message = describe_error_body(&text)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(AppError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!(size = bytes.len(), "Received image bytes");
        Ok(bytes.to_vec())
    }
}

/// Pulls a readable message out of an error body: the `error` field of a
/// JSON object, the compact JSON otherwise, or the raw text.
fn describe_error_body(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => {
            if let Some(message) = value.get("error").and_then(|err| err.as_str()) {
                return Some(message.to_string());
            }
            Some(value.to_string())
        }
        Err(_) => Some(trimmed.to_string()),
    }
}
