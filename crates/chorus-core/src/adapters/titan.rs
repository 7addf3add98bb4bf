//! Titan image generation adapter.
//!
//! Invokes the Titan Image model through a Bedrock-style runtime endpoint
//! and decodes the base64 image from the response body.

use super::{ProviderAdapter, DEFAULT_IMAGE_SIZE};
use crate::error::{ProviderError, ProviderResult};
use crate::types::{Modality, Payload, Prompt, ProviderSpec};
use async_trait::async_trait;
use base64::Engine;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Titan seeds are bounded at i32::MAX by the model API.
const MAX_SEED: u64 = 2_147_483_647;

/// Titan image adapter.
pub struct TitanAdapter {
    spec: ProviderSpec,
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl TitanAdapter {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            spec: ProviderSpec::new("titan", model, Modality::Image),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeRequest {
    task_type: String,
    text_to_image_params: TextToImageParams,
    image_generation_config: ImageGenerationConfig,
}

#[derive(Serialize)]
struct TextToImageParams {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageGenerationConfig {
    number_of_images: u32,
    quality: String,
    cfg_scale: f32,
    height: u32,
    width: u32,
    seed: u64,
}

// --- Response types ---

#[derive(Deserialize)]
struct InvokeResponse {
    images: Vec<String>,
}

#[async_trait]
impl ProviderAdapter for TitanAdapter {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    async fn generate(&self, prompt: &Prompt) -> ProviderResult<Payload> {
        let params = prompt.params();
        let seed = params
            .seed
            .map(|s| s.min(MAX_SEED))
            .unwrap_or_else(|| rand::thread_rng().gen_range(0..=MAX_SEED));

        let body = InvokeRequest {
            task_type: "TEXT_IMAGE".to_string(),
            text_to_image_params: TextToImageParams {
                text: prompt.text().to_string(),
            },
            image_generation_config: ImageGenerationConfig {
                number_of_images: 1,
                quality: "standard".to_string(),
                cfg_scale: 8.0,
                height: params.height.unwrap_or(DEFAULT_IMAGE_SIZE),
                width: params.width.unwrap_or(DEFAULT_IMAGE_SIZE),
                seed,
            },
        };

        let url = format!("{}/model/{}/invoke", self.endpoint, self.spec.model);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(
                status.as_u16(),
                format!("Titan HTTP {status}: {text}"),
            ));
        }

        let invoke_resp: InvokeResponse = resp.json().await.map_err(|e| ProviderError::Unknown {
            message: format!("Failed to parse Titan response: {e}"),
        })?;

        let base64_image = invoke_resp
            .images
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Unknown {
                message: "Titan returned no images".to_string(),
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(base64_image.as_bytes())
            .map_err(|e| ProviderError::Unknown {
                message: format!("Titan returned invalid base64 image data: {e}"),
            })?;

        Ok(Payload::image(bytes, "png"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_uses_titan_field_names() {
        let body = InvokeRequest {
            task_type: "TEXT_IMAGE".to_string(),
            text_to_image_params: TextToImageParams {
                text: "a red fox in snow".to_string(),
            },
            image_generation_config: ImageGenerationConfig {
                number_of_images: 1,
                quality: "standard".to_string(),
                cfg_scale: 8.0,
                height: 1024,
                width: 1024,
                seed: 42,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["taskType"], "TEXT_IMAGE");
        assert_eq!(json["textToImageParams"]["text"], "a red fox in snow");
        assert_eq!(json["imageGenerationConfig"]["numberOfImages"], 1);
        assert_eq!(json["imageGenerationConfig"]["cfgScale"], 8.0);
        assert_eq!(json["imageGenerationConfig"]["seed"], 42);
    }

    #[test]
    fn test_adapter_spec() {
        let adapter = TitanAdapter::new(
            "https://bedrock-runtime.us-west-2.amazonaws.com/",
            "key",
            "amazon.titan-image-generator-v1",
            Duration::from_secs(60),
        );
        assert_eq!(adapter.spec().provider, "titan");
        assert_eq!(adapter.spec().modality, Modality::Image);
        // Trailing slash is trimmed so the invoke path joins cleanly
        assert!(!adapter.endpoint.ends_with('/'));
    }
}
