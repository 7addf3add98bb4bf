//! Anthropic text adapter using the Messages API.

use super::{ProviderAdapter, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::error::{ProviderError, ProviderResult};
use crate::types::{Modality, Payload, Prompt, ProviderSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Anthropic adapter using the Messages API.
pub struct AnthropicAdapter {
    spec: ProviderSpec,
    api_key: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl AnthropicAdapter {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            spec: ProviderSpec::new("anthropic", model, Modality::Text),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    text: Option<String>,
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    async fn generate(&self, prompt: &Prompt) -> ProviderResult<Payload> {
        let params = prompt.params();
        let body = MessagesRequest {
            model: self.spec.model.clone(),
            max_tokens: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: Some(params.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.text().to_string(),
            }],
        };

        let resp = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
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
                format!("Anthropic HTTP {status}: {text}"),
            ));
        }

        let messages_resp: MessagesResponse =
            resp.json().await.map_err(|e| ProviderError::Unknown {
                message: format!("Failed to parse Anthropic response: {e}"),
            })?;

        let text = messages_resp
            .content
            .into_iter()
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ProviderError::Unknown {
                message: "Anthropic returned no text content".to_string(),
            });
        }

        Ok(Payload::text(text))
    }
}
