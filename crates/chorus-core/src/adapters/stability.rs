//! Stable Diffusion XL image generation adapter.
//!
//! Invokes the Stability model through a Bedrock-style runtime endpoint.
//! Supports an optional style preset to steer the model toward a look.

use super::{ProviderAdapter, DEFAULT_IMAGE_SIZE};
use crate::error::{ProviderError, ProviderResult};
use crate::types::{Modality, Payload, Prompt, ProviderSpec};
use async_trait::async_trait;
use base64::Engine;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stability accepts the full u32 seed range.
const MAX_SEED: u64 = 4_294_967_295;

/// Stable Diffusion XL adapter.
pub struct StabilityAdapter {
    spec: ProviderSpec,
    endpoint: String,
    api_key: String,
    style_preset: Option<String>,
    client: reqwest::Client,
    timeout: Duration,
}

impl StabilityAdapter {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        model: &str,
        style_preset: Option<&str>,
        timeout: Duration,
    ) -> Self {
        Self {
            spec: ProviderSpec::new("stability", model, Modality::Image),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            style_preset: style_preset.map(String::from),
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct InvokeRequest {
    text_prompts: Vec<TextPrompt>,
    seed: u64,
    cfg_scale: f32,
    steps: u32,
    height: u32,
    width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    style_preset: Option<String>,
}

#[derive(Serialize)]
struct TextPrompt {
    text: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct InvokeResponse {
    artifacts: Vec<Artifact>,
}

#[derive(Deserialize)]
struct Artifact {
    base64: String,
}

#[async_trait]
impl ProviderAdapter for StabilityAdapter {
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
            text_prompts: vec![TextPrompt {
                text: prompt.text().to_string(),
            }],
            seed,
            cfg_scale: 10.0,
            steps: 30,
            height: params.height.unwrap_or(DEFAULT_IMAGE_SIZE),
            width: params.width.unwrap_or(DEFAULT_IMAGE_SIZE),
            style_preset: self.style_preset.clone(),
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
                format!("Stability HTTP {status}: {text}"),
            ));
        }

        let invoke_resp: InvokeResponse = resp.json().await.map_err(|e| ProviderError::Unknown {
            message: format!("Failed to parse Stability response: {e}"),
        })?;

        let artifact = invoke_resp
            .artifacts
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Unknown {
                message: "Stability returned no artifacts".to_string(),
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(artifact.base64.as_bytes())
            .map_err(|e| ProviderError::Unknown {
                message: format!("Stability returned invalid base64 image data: {e}"),
            })?;

        Ok(Payload::image(bytes, "png"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let body = InvokeRequest {
            text_prompts: vec![TextPrompt {
                text: "a red fox in snow".to_string(),
            }],
            seed: 7,
            cfg_scale: 10.0,
            steps: 30,
            height: 1024,
            width: 1024,
            style_preset: Some("photographic".to_string()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["text_prompts"][0]["text"], "a red fox in snow");
        assert_eq!(json["cfg_scale"], 10.0);
        assert_eq!(json["steps"], 30);
        assert_eq!(json["style_preset"], "photographic");
    }

    #[test]
    fn test_style_preset_omitted_when_unset() {
        let body = InvokeRequest {
            text_prompts: vec![TextPrompt {
                text: "x".to_string(),
            }],
            seed: 0,
            cfg_scale: 10.0,
            steps: 30,
            height: 512,
            width: 512,
            style_preset: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("style_preset").is_none());
    }

    #[test]
    fn test_adapter_spec() {
        let adapter = StabilityAdapter::new(
            "https://bedrock-runtime.us-west-2.amazonaws.com",
            "key",
            "stability.stable-diffusion-xl",
            None,
            Duration::from_secs(60),
        );
        assert_eq!(adapter.spec().provider, "stability");
        assert_eq!(adapter.spec().modality, Modality::Image);
    }
}
